//! Urgent-relief clause selection
//!
//! `HAS_ATIVO` tells whether any contract is still being deducted from the
//! plaintiff's benefit. When it is, the petition asks for urgent injunctive
//! relief: the action title gains the request, the injunction section is
//! shown, and the clause below is emitted as a rich-text block. The clause is
//! fixed text and does not depend on any other field.

use crate::value::{Context, RichText, Value};

/// Input flag
pub const HAS_ATIVO: &str = "HAS_ATIVO";
/// Action title written into the header
pub const NOME_ACAO: &str = "NOME_ACAO";
/// Whether the injunction section renders
pub const MOSTRAR_TUTELA: &str = "MOSTRAR_TUTELA";
/// The urgent-relief clause
pub const TUTELA_URGENCIA: &str = "TUTELA_URGENCIA";

const BASE_TITLE: &str =
    "AÇÃO DECLARATÓRIA DE NULIDADE CONTRATUAL C/C REPETIÇÃO DE INDÉBITO E DANOS MORAIS";

const INJUNCTION_TITLE: &str = "AÇÃO DECLARATÓRIA DE NULIDADE CONTRATUAL C/C REPETIÇÃO DE INDÉBITO E DANOS MORAIS COM PEDIDO DE TUTELA ANTECIPADA";

const URGENT_RELIEF_CLAUSE: &[(&str, bool)] = &[
    ("Nos termos do ", false),
    ("art. 300 do Código de Processo Civil", true),
    (
        ", a tutela de urgência será concedida quando houver elementos que evidenciem a ",
        false,
    ),
    ("probabilidade do direito", true),
    (" e o ", false),
    ("perigo de dano ou o risco ao resultado útil do processo", true),
    (
        ". A probabilidade do direito decorre da inexistência de contratação válida dos \
         empréstimos consignados impugnados, cabendo à instituição ré comprovar a \
         regularidade da contratação, diante da ",
        false,
    ),
    ("inversão do ônus da prova", true),
    (" prevista no ", false),
    ("art. 6º, inciso VIII, do Código de Defesa do Consumidor", true),
    (
        ", em favor da parte autora, consumidora hipossuficiente. O perigo de dano é \
         evidente, pois os descontos incidem mensalmente sobre verba de natureza \
         alimentar, comprometendo a subsistência da parte autora e de sua família. \
         Assim, requer-se a concessão de tutela de urgência para determinar que a ré ",
        false,
    ),
    ("suspenda imediatamente os descontos", true),
    (
        " relativos aos contratos ativos no benefício previdenciário da parte autora, \
         sob pena de ",
        false,
    ),
    ("multa diária de R$ 500,00 (quinhentos reais)", true),
    (", nos termos do ", false),
    ("art. 537 do Código de Processo Civil", true),
    (".", false),
];

/// Outcome of the `HAS_ATIVO` condition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Injunction {
    /// At least one contract is active: request urgent relief
    Active,
    /// No active contract
    Inactive,
}

impl Injunction {
    /// Read the flag. Only `"true"` (any case) activates; absent means
    /// inactive.
    pub fn from_flag(flag: Option<&str>) -> Self {
        match flag {
            Some(f) if f.eq_ignore_ascii_case("true") => Injunction::Active,
            _ => Injunction::Inactive,
        }
    }

    /// Decide from a context
    pub fn from_context(ctx: &Context) -> Self {
        match ctx.get(HAS_ATIVO) {
            Some(Value::Bool(b)) => {
                if *b {
                    Injunction::Active
                } else {
                    Injunction::Inactive
                }
            }
            other => Self::from_flag(other.and_then(Value::as_str)),
        }
    }

    /// The action title for the petition header
    pub fn action_title(self) -> &'static str {
        match self {
            Injunction::Active => INJUNCTION_TITLE,
            Injunction::Inactive => BASE_TITLE,
        }
    }

    /// Whether the injunction section is shown
    pub fn shows_section(self) -> bool {
        self == Injunction::Active
    }

    /// The clause block; empty when inactive
    pub fn clause(self) -> RichText {
        match self {
            Injunction::Active => urgent_relief_clause(),
            Injunction::Inactive => RichText::new(),
        }
    }
}

/// The full urgent-relief clause
pub fn urgent_relief_clause() -> RichText {
    RichText::from_pairs(URGENT_RELIEF_CLAUSE.iter().copied())
}

/// Write the action title, the display flag and the clause
pub fn apply_clause(ctx: Context) -> Context {
    let injunction = Injunction::from_context(&ctx);
    ctx.with(NOME_ACAO, injunction.action_title())
        .with(MOSTRAR_TUTELA, injunction.shows_section())
        .with(TUTELA_URGENCIA, injunction.clause())
}

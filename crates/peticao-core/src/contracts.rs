//! Contract list rendering

use crate::value::{ContractRecord, Context, Value};

/// Input list field
pub const CONTRATOS: &str = "CONTRATOS";
/// Rendered text field
pub const CONTRATOS_TEXTO: &str = "CONTRATOS_TEXTO";
/// Text used when no contract was given
pub const NO_CONTRACTS: &str = "Nenhum contrato informado.";
/// Placeholder for a missing contract field
pub const MISSING: &str = "N/A";

impl ContractRecord {
    /// One pipe-delimited line describing the contract
    pub fn summary_line(&self) -> String {
        let f = |value: &Option<String>| value.as_deref().unwrap_or(MISSING).to_string();
        format!(
            "Contrato nº {} | Início: {} | Fim: {} | Situação: {} | Parcela: {} | Pago: {} | A Pagar: {} | Cópia: {}",
            f(&self.numero),
            f(&self.inicio),
            f(&self.fim),
            f(&self.situacao),
            f(&self.parcela),
            f(&self.pago),
            f(&self.a_pagar),
            f(&self.copia),
        )
    }
}

/// Render a list of contracts, one line each, separated by a blank line
pub fn render_contract_list(records: &[ContractRecord]) -> String {
    if records.is_empty() {
        return NO_CONTRACTS.to_string();
    }
    records
        .iter()
        .map(ContractRecord::summary_line)
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Write `CONTRATOS_TEXTO` from `CONTRATOS`.
///
/// A missing field or one that is not a contract list renders the fallback.
pub fn apply_contract_list(ctx: Context) -> Context {
    let text = render_contract_list(
        ctx.get(CONTRATOS)
            .and_then(Value::as_contracts)
            .unwrap_or_default(),
    );
    ctx.with(CONTRATOS_TEXTO, text)
}

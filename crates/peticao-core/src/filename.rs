//! Output file naming
//!
//! Names follow `01_Peticao_Inicial_{First}_{Last}_x_{Company}.{ext}`. The
//! name depends only on the two identity fields, so two requests for the
//! same parties produce the same file name.

use std::sync::OnceLock;

use regex::Regex;

use crate::value::Context;

/// Plaintiff full name
pub const NOME_COMPLETO: &str = "NOME_COMPLETO";
/// Defendant company name
pub const NOME_EMPRESA: &str = "NOME_EMPRESA";

const NAME_ABSENT: &str = "Autor_Desconhecido";
const NAME_BLANK: &str = "Autor";
const COMPANY_ABSENT: &str = "Empresa_Desconhecida";

/// Derive the output file name for `extension` (without the dot)
pub fn generate_filename(ctx: &Context, extension: &str) -> String {
    let name = name_component(ctx.get_str(NOME_COMPLETO));
    let company = company_component(ctx.get_str(NOME_EMPRESA).unwrap_or(COMPANY_ABSENT));
    format!("01_Peticao_Inicial_{}_x_{}.{}", name, company, extension)
}

/// First and last token of the full name joined by `_`
fn name_component(full_name: Option<&str>) -> String {
    let Some(full_name) = full_name else {
        return NAME_ABSENT.to_string();
    };

    let tokens: Vec<&str> = full_name.split_whitespace().collect();
    match tokens.as_slice() {
        [] => NAME_BLANK.to_string(),
        [only] => (*only).to_string(),
        [first, .., last] => format!("{}_{}", first, last),
    }
}

/// Strip everything but word characters, whitespace and hyphens, then
/// collapse whitespace runs into `_`
fn company_component(company: &str) -> String {
    static DISALLOWED_RE: OnceLock<Regex> = OnceLock::new();
    static SPACES_RE: OnceLock<Regex> = OnceLock::new();

    let disallowed = DISALLOWED_RE.get_or_init(|| Regex::new(r"[^\w\s-]").unwrap());
    let spaces = SPACES_RE.get_or_init(|| Regex::new(r"\s+").unwrap());

    let cleaned = disallowed.replace_all(company, "");
    spaces.replace_all(cleaned.trim(), "_").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(name: &str, company: &str) -> Context {
        Context::new()
            .with(NOME_COMPLETO, name)
            .with(NOME_EMPRESA, company)
    }

    #[test]
    fn test_reference_example() {
        assert_eq!(
            generate_filename(&ctx("Juliano Garbuggio", "Banco do Brasil"), "docx"),
            "01_Peticao_Inicial_Juliano_Garbuggio_x_Banco_do_Brasil.docx"
        );
    }

    #[test]
    fn test_first_and_last_token_only() {
        assert_eq!(
            generate_filename(&ctx("  MARIA  DA SILVA   SOUZA ", "BANCO PAN"), "pdf"),
            "01_Peticao_Inicial_MARIA_SOUZA_x_BANCO_PAN.pdf"
        );
    }

    #[test]
    fn test_single_token_name() {
        assert_eq!(
            generate_filename(&ctx("Cher", "X"), "docx"),
            "01_Peticao_Inicial_Cher_x_X.docx"
        );
    }

    #[test]
    fn test_fallbacks() {
        assert_eq!(
            generate_filename(&Context::new(), "docx"),
            "01_Peticao_Inicial_Autor_Desconhecido_x_Empresa_Desconhecida.docx"
        );
        assert_eq!(
            generate_filename(&ctx("   ", "B"), "docx"),
            "01_Peticao_Inicial_Autor_x_B.docx"
        );
    }

    #[test]
    fn test_company_sanitized() {
        assert_eq!(
            company_component("BANCO BMG S.A. / (Matriz)"),
            "BANCO_BMG_SA_Matriz"
        );
        assert_eq!(company_component("CRÉDITO-FÁCIL  LTDA."), "CRÉDITO-FÁCIL_LTDA");
    }

    #[test]
    fn test_stable_across_calls() {
        let c = ctx("Ana Lima", "Banco Itaú S/A");
        assert_eq!(generate_filename(&c, "docx"), generate_filename(&c, "docx"));
    }
}

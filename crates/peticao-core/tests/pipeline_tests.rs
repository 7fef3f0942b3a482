//! End-to-end tests for context assembly
//!
//! These go through `ContextBuilder` with payloads shaped like the ones the
//! petition form sends.

use chrono::NaiveDate;
use peticao_core::{generate_filename, ContextBuilder, Payload, Value};
use serde_json::json;

fn build(payload: serde_json::Value) -> peticao_core::Context {
    let payload = Payload::from_json_value(payload).unwrap();
    ContextBuilder::new(&payload)
        .with_date(NaiveDate::from_ymd_opt(2025, 6, 30).unwrap())
        .build()
}

#[test]
fn full_form_payload() {
    let ctx = build(json!({
        "template": "template_peticaoconsig.docx",
        "context": {
            "CIDADE": "são paulo",
            "ESTADO": "sp",
            "TIPO_ORGAO": "da vara cível",
            "NOME_COMPLETO": "Maria Aparecida dos Santos",
            "NOME_EMPRESA": "Banco Pan S.A.",
            "CPF": "123.456.789-00",
            "HAS_ATIVO": "true",
            "VALOR_PAGO_INDEVIDO": "R$ 3.000,00",
            "VALOR_INDEVIDO_DOBRO": 6000,
            "VALOR_CAUSA_FLOAT": 16000.5,
            "TOTAL_PARCELAS": 12,
            "CONTRATOS": [
                {"numero": "555", "inicio": "01/22", "fim": "12/27", "situacao": "ATIVO",
                 "parcela": "R$ 250,00", "pago": 10500.0, "a_pagar": 7250, "copia": "SIM"},
                {"numero": "777"}
            ]
        }
    }));

    assert_eq!(ctx.get_str("CIDADE"), Some("SÃO PAULO"));
    assert_eq!(ctx.get_str("ESTADO"), Some("SP"));
    assert_eq!(ctx.get_str("TIPO_ORGAO"), Some("DA VARA CÍVEL"));
    assert_eq!(ctx.get_str("NOME_COMPLETO"), Some("MARIA APARECIDA DOS SANTOS"));
    assert_eq!(ctx.get_str("CPF"), Some("123.456.789-00"));

    assert_eq!(ctx.get_str("VALOR_PAGO_INDEVIDO"), Some("R$ 3.000,00"));
    assert_eq!(ctx.get_str("VALOR_INDEVIDO_DOBRO"), Some("R$ 6.000,00"));
    assert_eq!(ctx.get_str("VALOR_CAUSA"), Some("R$ 16.000,50"));
    assert!(!ctx.contains_key("VALOR_CAUSA_FLOAT"));
    assert_eq!(ctx.get_str("TOTAL_PARCELAS"), Some("12"));

    assert_eq!(ctx.get_str("DIA"), Some("30"));
    assert_eq!(ctx.get_str("MES_EXTENSO"), Some("junho"));
    assert_eq!(ctx.get_str("ANO"), Some("2025"));

    assert_eq!(ctx.get("MOSTRAR_TUTELA"), Some(&Value::Bool(true)));
    assert!(ctx
        .get_str("NOME_ACAO")
        .is_some_and(|t| t.ends_with("COM PEDIDO DE TUTELA ANTECIPADA")));

    let contratos = ctx.get_str("CONTRATOS_TEXTO").unwrap();
    assert!(contratos.contains("Contrato nº 555 | Início: 01/22 | Fim: 12/27 | Situação: ATIVO"));
    assert!(contratos.contains("Pago: 10500.0 | A Pagar: 7250 | Cópia: SIM"));
    assert!(contratos.contains("\n\nContrato nº 777 | Início: N/A"));
    assert!(matches!(ctx.get("CONTRATOS"), Some(Value::Contracts(list)) if list.len() == 2));

    assert_eq!(
        generate_filename(&ctx, "docx"),
        "01_Peticao_Inicial_MARIA_SANTOS_x_BANCO_PAN_SA.docx"
    );
}

#[test]
fn only_text_scalars_survive() {
    let ctx = build(json!({
        "NOME_COMPLETO": "João",
        "IDADE": 71,
        "APOSENTADO": true,
        "OBS": null
    }));

    for (key, value) in &ctx {
        match key.as_str() {
            "MOSTRAR_TUTELA" => assert!(matches!(value, Value::Bool(_))),
            "TUTELA_URGENCIA" => assert!(matches!(value, Value::Rich(_))),
            _ => assert!(matches!(value, Value::Text(_)), "{} is not text", key),
        }
    }
    assert_eq!(ctx.get_str("APOSENTADO"), Some("true"));
    assert_eq!(ctx.get_str("OBS"), Some(""));
}

#[test]
fn no_float_keys_survive() {
    let ctx = build(json!({
        "A_FLOAT": 1.0,
        "B_FLOAT": "2.5",
        "VALOR_PAGO_INDEVIDO_FLOAT": 0
    }));

    assert!(ctx.keys().all(|k| !k.ends_with("_FLOAT")));
    assert_eq!(ctx.get_str("A"), Some("R$ 1,00"));
    assert_eq!(ctx.get_str("B"), Some("R$ 2,50"));
    assert_eq!(ctx.get_str("VALOR_PAGO_INDEVIDO"), Some("R$ 0,00"));
}

#[test]
fn inactive_without_flag() {
    let ctx = build(json!({"NOME_COMPLETO": "Ana"}));
    assert_eq!(ctx.get("MOSTRAR_TUTELA"), Some(&Value::Bool(false)));
    assert!(ctx.get("TUTELA_URGENCIA").is_some_and(Value::is_empty));
    assert_eq!(ctx.get_str("CONTRATOS_TEXTO"), Some("Nenhum contrato informado."));
}

#[test]
fn boolean_flag_from_json() {
    let ctx = build(json!({"HAS_ATIVO": true}));
    assert_eq!(ctx.get("MOSTRAR_TUTELA"), Some(&Value::Bool(true)));
    let clause = ctx.get("TUTELA_URGENCIA").and_then(Value::as_rich).unwrap();
    assert!(clause.bold_phrases().any(|p| p == "probabilidade do direito"));
}

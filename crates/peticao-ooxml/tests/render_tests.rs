//! Rendering a petition template end to end
//!
//! Templates are assembled in memory, rendered through `DocumentRenderer`
//! into a temporary directory and read back.

use std::io::{Cursor, Write};

use chrono::NaiveDate;
use peticao_core::{ContextBuilder, Payload};
use peticao_ooxml::{DocumentRenderer, OoxmlArchive, OoxmlError, Template};
use serde_json::json;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

fn para(text: &str) -> String {
    format!("<w:p><w:r><w:t xml:space=\"preserve\">{}</w:t></w:r></w:p>", text)
}

fn build_docx(body: &str, header: &str) -> Vec<u8> {
    let mut buffer = Cursor::new(Vec::new());
    let mut zip = ZipWriter::new(&mut buffer);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);

    zip.start_file("[Content_Types].xml", options).unwrap();
    zip.write_all(br#"<?xml version="1.0" encoding="UTF-8"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="xml" ContentType="application/xml"/></Types>"#).unwrap();

    zip.start_file("word/document.xml", options).unwrap();
    let document = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:w="{}"><w:body>{}</w:body></w:document>"#,
        W_NS, body
    );
    zip.write_all(document.as_bytes()).unwrap();

    zip.start_file("word/header1.xml", options).unwrap();
    let header = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:hdr xmlns:w="{}">{}</w:hdr>"#,
        W_NS, header
    );
    zip.write_all(header.as_bytes()).unwrap();

    zip.start_file("word/media/logo.png", options).unwrap();
    zip.write_all(&[0x89, b'P', b'N', b'G']).unwrap();

    zip.finish().unwrap();
    buffer.into_inner()
}

fn petition_template() -> Template {
    let body = [
        para("EXCELENTÍSSIMO SENHOR DOUTOR JUIZ DE DIREITO {{ TIPO_ORGAO }} DE {{ CIDADE }}/{{ ESTADO }}"),
        // Split the tag the way Word does after a spell check pass
        "<w:p><w:r><w:t>{{ NOME_</w:t></w:r><w:r><w:rPr><w:b/></w:rPr><w:t>COMPLETO }}</w:t></w:r><w:r><w:t xml:space=\"preserve\">, vem propor</w:t></w:r></w:p>".to_string(),
        para("{{ NOME_ACAO }}"),
        para("em face de {{ NOME_EMPRESA }}."),
        para("{%p if MOSTRAR_TUTELA %}"),
        para("DA TUTELA DE URGÊNCIA"),
        "<w:p><w:r><w:rPr><w:rFonts w:ascii=\"Arial\"/></w:rPr><w:t>{{r TUTELA_URGENCIA }}</w:t></w:r></w:p>".to_string(),
        para("{%p endif %}"),
        para("{{ CONTRATOS_TEXTO }}"),
        "<w:tbl>\
         <w:tr><w:tc><w:p><w:r><w:t>{%tr for c in CONTRATOS %}</w:t></w:r></w:p></w:tc></w:tr>\
         <w:tr><w:tc><w:p><w:r><w:t>{{ c.numero }}</w:t></w:r></w:p></w:tc><w:tc><w:p><w:r><w:t>{{ c.parcela }}</w:t></w:r></w:p></w:tc></w:tr>\
         <w:tr><w:tc><w:p><w:r><w:t>{%tr endfor %}</w:t></w:r></w:p></w:tc></w:tr>\
         </w:tbl>"
            .to_string(),
        para("Valor da causa: {{ VALOR_CAUSA }}"),
        para("{{ CIDADE }}, {{ DIA }} de {{ MES_EXTENSO }} de {{ ANO }}."),
    ]
    .concat();

    let bytes = build_docx(&body, &para("{{ NOME_COMPLETO }} x {{ NOME_EMPRESA }}"));
    Template::from_bytes(&bytes).unwrap()
}

fn context(payload: serde_json::Value) -> peticao_core::Context {
    let payload = Payload::from_json_value(payload).unwrap();
    ContextBuilder::new(&payload)
        .with_date(NaiveDate::from_ymd_opt(2025, 8, 4).unwrap())
        .build()
}

fn sample_payload(has_ativo: &str) -> serde_json::Value {
    json!({
        "CIDADE": "curitiba",
        "ESTADO": "pr",
        "TIPO_ORGAO": "do juizado especial cível",
        "NOME_COMPLETO": "José Carlos Pereira",
        "NOME_EMPRESA": "Banco Bradesco S/A",
        "HAS_ATIVO": has_ativo,
        "VALOR_CAUSA_FLOAT": 25300.7,
        "CONTRATOS": [
            {"numero": "9001", "parcela": "R$ 310,00"},
            {"numero": 9002}
        ]
    })
}

fn rendered_document(path: &std::path::Path) -> String {
    OoxmlArchive::open(path)
        .unwrap()
        .get_string("word/document.xml")
        .unwrap()
}

#[test]
fn renders_full_petition() {
    let dir = tempfile::tempdir().unwrap();
    let renderer = DocumentRenderer::new(petition_template(), dir.path());

    let artifact = renderer.render(&context(sample_payload("true"))).unwrap();

    assert_eq!(
        artifact.file_name(),
        "01_Peticao_Inicial_JOSÉ_PEREIRA_x_BANCO_BRADESCO_SA.docx"
    );
    assert!(artifact.exists());
    assert_eq!(artifact.url("/out"), format!("/out/{}", artifact.file_name()));

    let xml = rendered_document(artifact.path());
    assert!(xml.contains("DO JUIZADO ESPECIAL CÍVEL DE CURITIBA/PR"));
    assert!(xml.contains("JOSÉ CARLOS PEREIRA"));
    assert!(xml.contains("COM PEDIDO DE TUTELA ANTECIPADA"));
    assert!(xml.contains("DA TUTELA DE URGÊNCIA"));
    assert!(xml.contains("probabilidade do direito"));
    assert!(xml.contains("<w:b/><w:bCs/>"));
    assert!(xml.contains("Contrato nº 9001 | Início: N/A"));
    assert!(xml.contains(">9002<"));
    assert!(xml.contains(">R$ 310,00<"));
    assert!(xml.contains("Valor da causa: R$ 25.300,70"));
    assert!(xml.contains("CURITIBA, 4 de agosto de 2025."));
    assert!(!xml.contains("{{"));
    assert!(!xml.contains("{%"));

    let archive = OoxmlArchive::open(artifact.path()).unwrap();
    let header = archive.get_string("word/header1.xml").unwrap();
    assert!(header.contains("JOSÉ CARLOS PEREIRA x BANCO BRADESCO S/A"));
    assert_eq!(archive.get("word/media/logo.png"), Some(&[0x89, b'P', b'N', b'G'][..]));
}

#[test]
fn inactive_injunction_omits_section() {
    let dir = tempfile::tempdir().unwrap();
    let renderer = DocumentRenderer::new(petition_template(), dir.path());

    let artifact = renderer.render(&context(sample_payload("false"))).unwrap();
    let xml = rendered_document(artifact.path());

    assert!(!xml.contains("DA TUTELA DE URGÊNCIA"));
    assert!(!xml.contains("probabilidade do direito"));
    assert!(!xml.contains("TUTELA ANTECIPADA"));
}

#[test]
fn same_parties_overwrite_previous_file() {
    let dir = tempfile::tempdir().unwrap();
    let renderer = DocumentRenderer::new(petition_template(), dir.path());

    let first = renderer.render(&context(sample_payload("true"))).unwrap();
    let second = renderer.render(&context(sample_payload("false"))).unwrap();
    assert_eq!(first.path(), second.path());

    let xml = rendered_document(second.path());
    assert!(!xml.contains("DA TUTELA DE URGÊNCIA"));

    // Only the final file remains, no temporaries
    let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
    assert_eq!(entries.len(), 1);
}

#[test]
fn creates_missing_output_dir() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out").join("nested");
    let renderer = DocumentRenderer::new(petition_template(), &out);

    let artifact = renderer.render(&context(json!({"NOME_COMPLETO": "Ana"}))).unwrap();
    assert!(artifact.path().starts_with(&out));
    assert_eq!(
        artifact.file_name(),
        "01_Peticao_Inicial_ANA_x_Empresa_Desconhecida.docx"
    );
}

#[test]
fn unbalanced_template_fails_without_output() {
    let bytes = build_docx(&para("{%p if MOSTRAR_TUTELA %}"), "");
    let template = Template::from_bytes(&bytes).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let renderer = DocumentRenderer::new(template, dir.path());

    let err = renderer.render(&context(json!({}))).unwrap_err();
    assert!(matches!(err, OoxmlError::Template(ref m) if m.starts_with("word/document.xml")));
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn missing_document_part_is_rejected() {
    let mut buffer = Cursor::new(Vec::new());
    let mut zip = ZipWriter::new(&mut buffer);
    zip.start_file("word/styles.xml", SimpleFileOptions::default())
        .unwrap();
    zip.write_all(b"<w:styles/>").unwrap();
    zip.finish().unwrap();

    let err = Template::from_bytes(&buffer.into_inner()).unwrap_err();
    assert!(matches!(err, OoxmlError::MissingFile(_)));
}

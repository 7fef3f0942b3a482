//! peticao-core - context pipeline for petition documents
//!
//! Turns a loosely typed key/value payload describing a consumer-credit case
//! into the context consumed by the DOCX template: scalar fields become text,
//! currency amounts are formatted, the urgent-relief clause is chosen and the
//! contract list is rendered. Also derives the output file name.
//!
//! # Example
//!
//! ```
//! use peticao_core::{generate_filename, ContextBuilder, Payload};
//! use chrono::NaiveDate;
//!
//! let payload = Payload::from_json_str(r#"{
//!     "NOME_COMPLETO": "Juliano Garbuggio",
//!     "NOME_EMPRESA": "Banco do Brasil",
//!     "VALOR_CAUSA": 1234.5,
//!     "HAS_ATIVO": "false"
//! }"#).unwrap();
//!
//! let ctx = ContextBuilder::new(&payload)
//!     .with_date(NaiveDate::from_ymd_opt(2025, 1, 15).unwrap())
//!     .build();
//!
//! assert_eq!(ctx.get_str("VALOR_CAUSA"), Some("R$ 1.234,50"));
//! assert_eq!(ctx.get_str("CONTRATOS_TEXTO"), Some("Nenhum contrato informado."));
//! assert_eq!(
//!     generate_filename(&ctx, "docx"),
//!     "01_Peticao_Inicial_JULIANO_GARBUGGIO_x_BANCO_DO_BRASIL.docx"
//! );
//! ```

pub mod artifact;
pub mod builder;
pub mod clause;
pub mod contracts;
pub mod dates;
pub mod filename;
pub mod money;
pub mod normalize;
pub mod value;

// Re-export main types and functions
pub use artifact::Artifact;
pub use builder::{build_context, ContextBuilder};
pub use clause::{urgent_relief_clause, Injunction};
pub use contracts::render_contract_list;
pub use filename::generate_filename;
pub use money::format_money;
pub use normalize::{normalize, Payload};
pub use value::{ContractRecord, Context, RichText, Segment, Value};

//! peticao-ooxml - DOCX templating for petition documents
//!
//! This crate fills a Word template with a petition context:
//!
//! - [`OoxmlArchive`] unpacks and repacks the DOCX container
//! - [`Template`] renders `{{ }}` placeholders and `{%p %}`/`{%tr %}` blocks
//! - [`DocumentRenderer`] writes the result atomically under its derived name
//!
//! # Example
//!
//! ```ignore
//! use peticao_core::{build_context, Payload};
//! use peticao_ooxml::DocumentRenderer;
//!
//! let payload = Payload::from_json_str(r#"{"NOME_COMPLETO": "Ana Lima"}"#)?;
//! let renderer = DocumentRenderer::from_path("template_peticaoconsig.docx", "out")?;
//! let artifact = renderer.render(&build_context(&payload))?;
//! println!("{}", artifact.url("/out"));
//! ```

pub mod archive;
pub mod error;
pub mod render;
pub mod tags;
pub mod template;
pub mod xml;

#[cfg(test)]
mod test_utils;

pub use archive::OoxmlArchive;
pub use error::{OoxmlError, Result};
pub use render::DocumentRenderer;
pub use template::Template;

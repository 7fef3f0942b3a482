//! peticao-convert - format conversion for rendered petitions
//!
//! Rendered DOCX files are turned into PDF by an external office suite
//! running headless. Each conversion is bounded by a time budget; a timeout,
//! a failing exit status, a converter that cannot be started and a missing
//! output file are reported as distinct errors.
//!
//! # Example
//!
//! ```ignore
//! use peticao_convert::{Converter, LibreOfficeConverter};
//! use std::time::Duration;
//!
//! let converter = LibreOfficeConverter::default().with_timeout(Duration::from_secs(60));
//! let pdf = converter.convert("out/peticao.docx".as_ref()).await?;
//! ```

mod converter;
mod error;

pub use converter::{
    Converter, LibreOfficeConverter, DEFAULT_PROGRAM, DEFAULT_TARGET, DEFAULT_TIMEOUT,
};
pub use error::{ConvertError, Result};

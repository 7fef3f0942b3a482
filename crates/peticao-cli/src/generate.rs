//! Request orchestration
//!
//! A [`Generator`] turns one payload into the requested artifacts: build the
//! context, render the DOCX on a blocking worker, and convert it when a PDF
//! is wanted. Generators are cheap to clone and share nothing mutable, so
//! independent payloads can be generated concurrently.

use std::sync::Arc;

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use peticao_convert::{ConvertError, Converter};
use peticao_core::{Artifact, Context, ContextBuilder, Payload};
use peticao_ooxml::{DocumentRenderer, OoxmlError};

/// Which artifacts to produce
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerateMode {
    /// Only the DOCX
    #[default]
    Docx,
    /// Only the PDF (the DOCX is still written)
    Pdf,
    /// DOCX and PDF
    Both,
}

impl GenerateMode {
    fn reports_docx(self) -> bool {
        matches!(self, GenerateMode::Docx | GenerateMode::Both)
    }

    fn needs_pdf(self) -> bool {
        matches!(self, GenerateMode::Pdf | GenerateMode::Both)
    }
}

/// Public references to the produced files
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedArtifacts {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub docx_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pdf_url: Option<String>,
}

/// Errors from one generation request
#[derive(Error, Debug)]
pub enum GenerateError {
    /// Rendering the DOCX failed
    #[error("rendering failed: {0}")]
    Render(#[from] OoxmlError),

    /// Converting the DOCX failed
    #[error(transparent)]
    Conversion(#[from] ConvertError),

    /// The rendering worker panicked or was cancelled
    #[error("rendering worker failed: {0}")]
    Worker(String),
}

/// Produces petition artifacts from payloads
#[derive(Clone)]
pub struct Generator {
    renderer: Arc<DocumentRenderer>,
    converter: Arc<dyn Converter>,
    url_prefix: String,
    date: Option<NaiveDate>,
}

impl Generator {
    /// Create a generator
    pub fn new(renderer: DocumentRenderer, converter: Arc<dyn Converter>) -> Self {
        Self {
            renderer: Arc::new(renderer),
            converter,
            url_prefix: "/out".to_string(),
            date: None,
        }
    }

    /// Prefix for returned URLs
    pub fn with_url_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.url_prefix = prefix.into();
        self
    }

    /// Sign petitions with a fixed date instead of today
    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    /// Build the template context for `payload`
    pub fn context(&self, payload: &Payload) -> Context {
        let builder = ContextBuilder::new(payload);
        match self.date {
            Some(date) => builder.with_date(date).build(),
            None => builder.build(),
        }
    }

    /// Generate the artifacts requested by `mode`
    pub async fn generate(
        &self,
        payload: &Payload,
        mode: GenerateMode,
    ) -> Result<GeneratedArtifacts, GenerateError> {
        let ctx = self.context(payload);
        let renderer = Arc::clone(&self.renderer);
        let docx = tokio::task::spawn_blocking(move || renderer.render(&ctx))
            .await
            .map_err(|e| GenerateError::Worker(e.to_string()))??;

        let mut artifacts = GeneratedArtifacts::default();
        if mode.reports_docx() {
            artifacts.docx_url = Some(docx.url(&self.url_prefix));
        }
        if mode.needs_pdf() {
            let pdf = Artifact::new(self.converter.convert(docx.path()).await?);
            artifacts.pdf_url = Some(pdf.url(&self.url_prefix));
        }

        info!(file = docx.file_name(), ?mode, "petition generated");
        Ok(artifacts)
    }
}

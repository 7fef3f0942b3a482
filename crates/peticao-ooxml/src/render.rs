//! Writing rendered petitions to the output directory

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::Builder;
use tracing::info;

use peticao_core::{generate_filename, Artifact, Context};

use crate::error::{OoxmlError, Result};
use crate::template::Template;

/// Renders contexts through one template into one output directory
#[derive(Debug, Clone)]
pub struct DocumentRenderer {
    template: Template,
    output_dir: PathBuf,
}

impl DocumentRenderer {
    /// Create a renderer for an already loaded template
    pub fn new(template: Template, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            template,
            output_dir: output_dir.into(),
        }
    }

    /// Load the template from `template_path`
    pub fn from_path(template_path: impl AsRef<Path>, output_dir: impl Into<PathBuf>) -> Result<Self> {
        let template = Template::load(template_path)?;
        Ok(Self::new(template, output_dir))
    }

    /// Render `ctx` and store it under its derived file name.
    ///
    /// The document is written to a temporary file in the output directory
    /// and renamed into place, so the final name only ever holds a complete
    /// file. An existing file with the same name is replaced.
    pub fn render(&self, ctx: &Context) -> Result<Artifact> {
        let file_name = generate_filename(ctx, "docx");
        check_file_name(&file_name)?;

        let archive = self.template.render(ctx)?;

        fs::create_dir_all(&self.output_dir)?;
        let mut tmp = Builder::new()
            .prefix(".peticao-")
            .suffix(".docx.part")
            .tempfile_in(&self.output_dir)?;
        archive.write_to(tmp.as_file_mut())?;
        tmp.as_file().sync_all()?;

        let path = self.output_dir.join(&file_name);
        tmp.persist(&path).map_err(|e| OoxmlError::Io(e.error))?;

        info!(file = %file_name, "document rendered");
        Ok(Artifact::new(path))
    }
}

/// Derived names come from user input and must stay inside the output directory
fn check_file_name(name: &str) -> Result<()> {
    let stem = name.rsplit_once('.').map_or(name, |(stem, _)| stem);
    if name.contains(['/', '\\', '\0']) || stem.is_empty() || stem.starts_with('.') {
        return Err(OoxmlError::InvalidFileName(name.to_string()));
    }
    Ok(())
}

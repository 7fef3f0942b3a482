//! Configuration settings
//!
//! Read from `peticao.toml`. Every section and key is optional.
//!
//! ```toml
//! [paths]
//! template = "templates/template_peticaoconsig.docx"
//! output_dir = "out"
//! url_prefix = "/out"
//!
//! [converter]
//! program = "libreoffice"
//! args = []
//! target_extension = "pdf"
//! timeout_secs = 90
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use peticao_convert::{LibreOfficeConverter, DEFAULT_PROGRAM, DEFAULT_TARGET, DEFAULT_TIMEOUT};

/// Config file looked up in the working directory when none is given
pub const CONFIG_FILE: &str = "peticao.toml";

/// Top-level settings structure
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Template and output locations
    pub paths: PathSettings,
    /// External format converter
    pub converter: ConverterSettings,
}

impl Settings {
    /// Parse settings from a TOML string
    pub fn from_toml_str(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }

    /// Load settings from `path`, or from `peticao.toml` in the working
    /// directory when present, or fall back to defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                if !path.exists() {
                    anyhow::bail!("Config file not found: {}", path.display());
                }
                let content = fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config: {}", path.display()))?;
                Self::from_toml_str(&content)
                    .with_context(|| format!("Failed to parse config: {}", path.display()))
            }
            None if Path::new(CONFIG_FILE).exists() => Self::load(Some(Path::new(CONFIG_FILE))),
            None => Ok(Self::default()),
        }
    }
}

/// File locations
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PathSettings {
    /// DOCX template
    pub template: PathBuf,
    /// Directory receiving generated files
    pub output_dir: PathBuf,
    /// Public prefix under which the output directory is served
    pub url_prefix: String,
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            template: PathBuf::from("templates/template_peticaoconsig.docx"),
            output_dir: PathBuf::from("out"),
            url_prefix: "/out".to_string(),
        }
    }
}

/// Converter invocation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ConverterSettings {
    /// Program to run
    pub program: String,
    /// Extra arguments placed before the standard ones
    pub args: Vec<String>,
    /// Extension of converted files
    pub target_extension: String,
    /// Time budget per conversion, in seconds
    pub timeout_secs: u64,
}

impl Default for ConverterSettings {
    fn default() -> Self {
        Self {
            program: DEFAULT_PROGRAM.to_string(),
            args: Vec::new(),
            target_extension: DEFAULT_TARGET.to_string(),
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
        }
    }
}

impl ConverterSettings {
    /// Build the converter these settings describe
    pub fn build(&self) -> LibreOfficeConverter {
        LibreOfficeConverter::new(self.program.clone())
            .with_args(self.args.iter().cloned())
            .with_target_extension(self.target_extension.clone())
            .with_timeout(Duration::from_secs(self.timeout_secs))
    }
}

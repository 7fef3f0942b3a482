//! Generated output files

use std::path::{Path, PathBuf};

/// A generated file in the output directory.
///
/// Artifacts are written once and served read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    path: PathBuf,
    file_name: String,
}

impl Artifact {
    /// Wrap a path. The file name is taken from the last path component.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self { path, file_name }
    }

    /// Full path on disk
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name within the output directory
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Public reference under `prefix`, e.g. `/out/name.docx`
    pub fn url(&self, prefix: &str) -> String {
        format!("{}/{}", prefix.trim_end_matches('/'), self.file_name)
    }

    /// Whether the file is present on disk
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }
}

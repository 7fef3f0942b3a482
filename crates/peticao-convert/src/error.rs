//! Error types for document conversion

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Result type for conversion operations
pub type Result<T> = std::result::Result<T, ConvertError>;

/// Errors that can occur while converting a rendered document
#[derive(Error, Debug)]
pub enum ConvertError {
    /// The converter ran past its time budget and was killed
    #[error("conversion timed out after {after:?}")]
    Timeout { after: Duration },

    /// The converter exited with a failure status
    #[error("conversion failed: {diagnostic}")]
    Failed { diagnostic: String },

    /// The converter reported success but the output file is not there
    #[error("conversion produced no output at {}", path.display())]
    MissingOutput { path: PathBuf },

    /// The converter could not be started or awaited
    #[error("unexpected conversion error: {0}")]
    Unexpected(String),
}

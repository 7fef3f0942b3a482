//! Conversion through a headless office suite
//!
//! The converter is an external program invoked as
//!
//! ```text
//! <program> [args...] --headless --convert-to <ext> --outdir <dir> <input>
//! ```
//!
//! which is LibreOffice's command line. The output lands next to the input
//! with the target extension.

use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, error, info};

use crate::error::{ConvertError, Result};

/// Default converter program
pub const DEFAULT_PROGRAM: &str = "libreoffice";
/// Default target extension
pub const DEFAULT_TARGET: &str = "pdf";
/// Default time budget for one conversion
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(90);

/// Converts a rendered document into another format
#[async_trait]
pub trait Converter: Send + Sync {
    /// Convert `input`, returning the path of the produced sibling file
    async fn convert(&self, input: &Path) -> Result<PathBuf>;

    /// Extension of the produced files, without the dot
    fn target_extension(&self) -> &str;
}

/// [`Converter`] backed by a LibreOffice-compatible command line
#[derive(Debug, Clone)]
pub struct LibreOfficeConverter {
    program: String,
    args: Vec<String>,
    target_extension: String,
    timeout: Duration,
}

impl Default for LibreOfficeConverter {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRAM)
    }
}

impl LibreOfficeConverter {
    /// Converter running `program` with the default target and budget
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            target_extension: DEFAULT_TARGET.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Extra arguments placed before the standard ones
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Produce files with `extension` instead of pdf
    pub fn with_target_extension(mut self, extension: impl Into<String>) -> Self {
        self.target_extension = extension.into();
        self
    }

    /// Time budget for one conversion
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Program being invoked
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Time budget for one conversion
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn command(&self, input: &Path, out_dir: &Path) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .arg("--headless")
            .arg("--convert-to")
            .arg(&self.target_extension)
            .arg("--outdir")
            .arg(out_dir)
            .arg(input)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }
}

#[async_trait]
impl Converter for LibreOfficeConverter {
    async fn convert(&self, input: &Path) -> Result<PathBuf> {
        let out_dir = match input.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        let expected = input.with_extension(&self.target_extension);

        // A leftover file would satisfy the existence check on its own
        remove_if_present(&expected).await?;

        info!(input = %input.display(), program = %self.program, "conversion started");
        let started = Instant::now();

        let child = self.command(input, out_dir).spawn().map_err(|e| {
            ConvertError::Unexpected(format!("failed to start {}: {}", self.program, e))
        })?;

        let output = match timeout(self.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => return Err(ConvertError::Unexpected(e.to_string())),
            Err(_) => {
                // Dropping the wait future killed the child
                error!(input = %input.display(), after = ?self.timeout, "conversion timed out");
                if let Err(e) = remove_if_present(&expected).await {
                    debug!(error = %e, "could not remove partial output");
                }
                return Err(ConvertError::Timeout {
                    after: self.timeout,
                });
            }
        };

        if !output.status.success() {
            let diagnostic = diagnostic(&output);
            error!(status = %output.status, diagnostic = %diagnostic, "conversion failed");
            return Err(ConvertError::Failed { diagnostic });
        }

        if !tokio::fs::try_exists(&expected).await.unwrap_or(false) {
            error!(path = %expected.display(), "converter exited cleanly without output");
            return Err(ConvertError::MissingOutput { path: expected });
        }

        info!(
            output = %expected.display(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "conversion finished"
        );
        Ok(expected)
    }

    fn target_extension(&self) -> &str {
        &self.target_extension
    }
}

async fn remove_if_present(path: &Path) -> Result<()> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(ConvertError::Unexpected(format!(
            "cannot clear {}: {}",
            path.display(),
            e
        ))),
    }
}

/// What the converter printed, preferring stderr
fn diagnostic(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);
    let diagnostic = [stderr.trim(), stdout.trim()]
        .into_iter()
        .find(|s| !s.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| output.status.to_string());
    diagnostic
}

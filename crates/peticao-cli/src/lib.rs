//! peticao CLI - Command-line interface library
//!
//! This library provides the CLI functionality for peticao:
//! - Generate: render petitions (DOCX, PDF or both) from JSON payloads
//! - Context: inspect the normalized template context
//! - Filename: show the derived output file name
//!
//! # Binary Usage
//!
//! ```bash
//! # Render two petitions concurrently, DOCX and PDF
//! peticao generate maria.json jose.json --format both
//!
//! # Inspect what the template will receive
//! peticao context maria.json --date 2025-06-30
//! ```

pub mod app;
pub mod config;
pub mod generate;

// Re-export main entry point and types
pub use app::{
    build_generator, context_command, filename_command, generate_all, generate_command,
    load_payload, run_cli,
};
pub use config::Settings;
pub use generate::{GenerateError, GenerateMode, GeneratedArtifacts, Generator};

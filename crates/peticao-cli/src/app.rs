//! CLI Application logic
//!
//! Contains the command-line interface implementation.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing::{error, info};

use peticao_core::{generate_filename, ContextBuilder, Payload};
use peticao_ooxml::DocumentRenderer;

use crate::config::Settings;
use crate::generate::{GenerateMode, Generator};

#[derive(Parser)]
#[command(name = "peticao")]
#[command(author, version, about = "Generate initial petitions from a DOCX template", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render petitions from JSON payload files
    Generate {
        /// Payload files (`{"template": ..., "context": {...}}` or a bare context)
        #[arg(required = true)]
        payloads: Vec<PathBuf>,

        /// Artifacts to produce
        #[arg(short, long, value_enum, default_value = "docx")]
        format: GenerateMode,

        /// Configuration file path
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// DOCX template (overrides the config file)
        #[arg(short, long)]
        template: Option<PathBuf>,

        /// Output directory (overrides the config file)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },

    /// Print the normalized template context as JSON
    Context {
        /// Payload file
        payload: PathBuf,

        /// Signature date (YYYY-MM-DD), today when omitted
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Print the output file name derived from a payload
    Filename {
        /// Payload file
        payload: PathBuf,

        /// Extension to append
        #[arg(short, long, default_value = "docx")]
        extension: String,
    },
}

/// Run the CLI application
///
/// This is the main entry point for the command-line interface.
/// It parses arguments and dispatches to the appropriate command.
pub async fn run_cli() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            payloads,
            format,
            config,
            template,
            output_dir,
        } => {
            let mut settings = Settings::load(config.as_deref())?;
            if let Some(template) = template {
                settings.paths.template = template;
            }
            if let Some(output_dir) = output_dir {
                settings.paths.output_dir = output_dir;
            }
            generate_command(&payloads, format, &settings).await?;
        }
        Commands::Context { payload, date } => {
            context_command(&payload, date)?;
        }
        Commands::Filename { payload, extension } => {
            filename_command(&payload, &extension)?;
        }
    }

    Ok(())
}

/// Log to stderr, `info` and above unless `RUST_LOG` says otherwise
fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Read and parse a payload file
pub fn load_payload(path: &Path) -> Result<Payload> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read payload: {}", path.display()))?;
    Payload::from_json_str(&content)
        .with_context(|| format!("Failed to parse payload: {}", path.display()))
}

/// Build a generator from settings, creating the output directory
pub fn build_generator(settings: &Settings) -> Result<Generator> {
    let paths = &settings.paths;
    fs::create_dir_all(&paths.output_dir).with_context(|| {
        format!(
            "Failed to create output directory: {}",
            paths.output_dir.display()
        )
    })?;

    let renderer = DocumentRenderer::from_path(&paths.template, &paths.output_dir)
        .with_context(|| format!("Failed to load template: {}", paths.template.display()))?;
    let converter = Arc::new(settings.converter.build());

    Ok(Generator::new(renderer, converter).with_url_prefix(paths.url_prefix.clone()))
}

/// Generate every payload concurrently.
///
/// Results come back in input order, one per payload.
pub async fn generate_all(
    generator: &Generator,
    payloads: &[PathBuf],
    mode: GenerateMode,
) -> Vec<Result<serde_json::Value>> {
    let handles: Vec<_> = payloads
        .iter()
        .cloned()
        .map(|path| {
            let generator = generator.clone();
            tokio::spawn(async move {
                let payload = load_payload(&path)?;
                let artifacts = generator
                    .generate(&payload, mode)
                    .await
                    .with_context(|| format!("Failed to generate {}", path.display()))?;
                anyhow::Ok(serde_json::to_value(artifacts)?)
            })
        })
        .collect();

    let mut results = Vec::with_capacity(handles.len());
    for handle in handles {
        results.push(match handle.await {
            Ok(result) => result,
            Err(e) => Err(anyhow::anyhow!("generation task failed: {}", e)),
        });
    }
    results
}

/// Execute the generate command
///
/// Prints one JSON line per payload. Fails if any payload failed.
pub async fn generate_command(
    payloads: &[PathBuf],
    mode: GenerateMode,
    settings: &Settings,
) -> Result<()> {
    let generator = build_generator(settings)?;
    info!(count = payloads.len(), ?mode, "generating petitions");

    let results = generate_all(&generator, payloads, mode).await;
    let mut failed = 0;
    for (path, result) in payloads.iter().zip(results) {
        match result {
            Ok(value) => println!("{}", value),
            Err(e) => {
                failed += 1;
                error!(payload = %path.display(), error = %format!("{:#}", e), "generation failed");
                println!("{}", serde_json::json!({ "error": format!("{:#}", e) }));
            }
        }
    }

    if failed > 0 {
        anyhow::bail!("{} of {} payloads failed", failed, payloads.len());
    }
    Ok(())
}

/// Execute the context command
pub fn context_command(payload: &Path, date: Option<NaiveDate>) -> Result<()> {
    let payload = load_payload(payload)?;
    let builder = ContextBuilder::new(&payload);
    let ctx = match date {
        Some(date) => builder.with_date(date).build(),
        None => builder.build(),
    };
    let json = serde_json::to_string_pretty(&ctx).context("Failed to serialize context")?;
    println!("{}", json);
    Ok(())
}

/// Execute the filename command
pub fn filename_command(payload: &Path, extension: &str) -> Result<()> {
    let payload = load_payload(payload)?;
    let ctx = ContextBuilder::new(&payload).build();
    println!("{}", generate_filename(&ctx, extension));
    Ok(())
}

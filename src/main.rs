//! Autominutes CLI
//!
//! Runs the minutes pipeline over one audio file and writes the minutes
//! document.

use anyhow::{bail, Context, Result};
use autominutes::config::{self, Settings};
use autominutes::pipeline::{MinutesService, RunStage};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "autominutes", version, about = "Turn a meeting recording into written minutes")]
struct Cli {
    /// Audio file to process
    input: PathBuf,

    /// Write the minutes document here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Settings file (TOML); defaults to the per-user config location
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the segment length in seconds
    #[arg(long)]
    chunk_secs: Option<u64>,

    /// Override the transcription language hint (ISO 639-1)
    #[arg(long)]
    language: Option<String>,

    /// Also print the assembled transcript to stderr
    #[arg(long)]
    print_transcript: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "autominutes=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let mut settings = match &cli.config {
        Some(path) => config::load_settings_from(path)?,
        None => Settings::load()?,
    };
    if let Some(chunk_secs) = cli.chunk_secs {
        settings.media.chunk_secs = chunk_secs;
    }
    if let Some(language) = &cli.language {
        settings.transcription.language = language.clone();
    }
    settings.validate()?;

    let bytes = std::fs::read(&cli.input)
        .with_context(|| format!("failed to read {:?}", cli.input))?;
    let filename = cli
        .input
        .file_name()
        .and_then(|name| name.to_str())
        .context("input path has no file name")?;

    let service = MinutesService::from_settings(&settings)?;
    let state = service.run(&bytes, filename).await;

    if cli.print_transcript {
        if let Some(transcript) = &state.transcript {
            eprintln!("{}", transcript);
        }
    }

    match state.stage {
        RunStage::Done => {
            let minutes = state.summary.unwrap_or_default();
            match &cli.output {
                Some(path) => {
                    std::fs::write(path, &minutes)
                        .with_context(|| format!("failed to write {:?}", path))?;
                    tracing::info!("minutes written to {:?}", path);
                }
                None => println!("{}", minutes),
            }
            Ok(())
        }
        _ => bail!(state
            .error
            .unwrap_or_else(|| "pipeline did not complete".to_string())),
    }
}

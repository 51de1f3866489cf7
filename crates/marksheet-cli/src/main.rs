//! marksheet-cli - Answer-key extraction command line front end.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use marksheet_core::{ExtractionConfig, ExtractionMode, PdfiumConfig, VisionConfig};
use marksheet_extractors::ExtractorFactory;
use marksheet_vision::VisionFactory;

#[derive(Parser)]
#[command(name = "marksheet")]
#[command(about = "Extract a bubble-sheet answer key from a PDF")]
struct Args {
    /// Path to the answer-key PDF
    input: PathBuf,

    /// Extraction mode: deterministic (regex over embedded text) or ai
    /// (vision model over rasterized pages)
    #[arg(short, long, default_value = "deterministic")]
    mode: String,

    /// Path to a TOML or JSON extraction config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Vision model to use in ai mode (default: from environment or
    /// gemini-1.5-flash)
    #[arg(long)]
    model: Option<String>,

    /// Directory containing the pdfium dynamic library
    #[arg(long)]
    pdfium_path: Option<PathBuf>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing; results go to stdout, diagnostics to stderr
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::from_default_env().add_directive(Level::INFO.into()),
        )
        .init();

    let args = Args::parse();

    let mode = match args.mode.as_str() {
        "deterministic" => ExtractionMode::Deterministic,
        "ai" => ExtractionMode::Ai,
        other => anyhow::bail!("unknown mode '{}', expected 'deterministic' or 'ai'", other),
    };

    let config = match &args.config {
        Some(path) => ExtractionConfig::from_file(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => ExtractionConfig::default(),
    };

    let pdfium = PdfiumConfig {
        library_path: args.pdfium_path.clone(),
    };

    let vision_model = if mode == ExtractionMode::Ai {
        let mut vision_config = VisionConfig::from_env();
        if let Some(model) = &args.model {
            vision_config.model = model.clone();
        }
        let model = VisionFactory::gemini_with_config(vision_config)?;
        info!(model = %model.model_name(), "vision model ready");
        Some(model)
    } else {
        None
    };

    let pipeline = ExtractorFactory::pipeline(pdfium, &config, vision_model);

    let pdf = std::fs::read(&args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;

    let answers = pipeline.extract(&pdf, mode).await?;
    info!(count = answers.len(), "extraction finished");

    let json = if args.pretty {
        serde_json::to_string_pretty(&answers)?
    } else {
        serde_json::to_string(&answers)?
    };
    println!("{}", json);

    Ok(())
}

//! pvtriage CLI
//!
//! Triage adverse event reports from files or free text, browse the demo
//! case board, and render follow-up letters.

mod render;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use pvtriage_core::{
    letters_for, parse_batch_yaml, AdverseEventReport, CaseFilter, CaseStore, PartialReport,
};
use pvtriage_runtime::{IntakePipeline, ProviderRegistry, ReportExtractor, RuntimeConfig};

use render::{CaseBoard, CaseView, ExtractView};

const DEMO_CASES: &str = include_str!("../fixtures/demo_cases.yaml");

#[derive(Parser)]
#[command(name = "pvtriage")]
#[command(version, about = "Adverse event case triage for pharmacovigilance")]
struct Cli {
    /// Log filter used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Triage a report file (YAML or JSON)
    Triage {
        /// Report file
        file: PathBuf,
        /// Case id to assign when the report has none
        #[arg(long)]
        id: Option<String>,
        /// Receipt date (YYYY-MM-DD), defaults to the report's date or today
        #[arg(long)]
        received: Option<NaiveDate>,
        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
    },
    /// Extract a report from free text with the configured provider
    Extract {
        /// Report text
        #[arg(long, conflicts_with = "file", required_unless_present = "file")]
        text: Option<String>,
        /// File containing the report text
        #[arg(long)]
        file: Option<PathBuf>,
        /// Runtime config (YAML)
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
    },
    /// Show the seeded demo case board
    Demo {
        /// Only list high-priority cases
        #[arg(long)]
        high_only: bool,
        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
    },
    /// Render follow-up letters for a report file
    Letters {
        /// Report file
        file: PathBuf,
        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
    },
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_logging(&cli.log_level)?;

    match cli.command {
        Commands::Triage {
            file,
            id,
            received,
            format,
        } => {
            let record = triage_file(&file, id, received)?;
            emit(format, &CaseView::new(&record), CaseView::to_text)
        }
        Commands::Extract {
            text,
            file,
            config,
            format,
        } => {
            let text = match (text, file) {
                (Some(text), _) => text,
                (None, Some(path)) => fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read {}", path.display()))?,
                (None, None) => return Err(anyhow!("Provide --text or --file")),
            };
            let view = extract(&text, config).await?;
            emit(format, &view, ExtractView::to_text)
        }
        Commands::Demo { high_only, format } => {
            let store = demo_store()?;
            let filter = if high_only {
                CaseFilter::HighPriority
            } else {
                CaseFilter::All
            };
            emit(format, &CaseBoard::new(&store, filter), CaseBoard::to_text)
        }
        Commands::Letters { file, format } => {
            let record = triage_file(&file, None, None)?;
            let letters = letters_for(&record);
            match format {
                OutputFormat::Json => print_json(&letters),
                OutputFormat::Text => {
                    println!("{}", render::letters_text(&record, &letters));
                    Ok(())
                }
            }
        }
    }
}

/// Install the stderr subscriber. `RUST_LOG` wins over `--log-level`.
fn init_logging(level: &str) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(level)
            .with_context(|| format!("Invalid log level/filter '{}'", level))?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .try_init()
        .map_err(|e| anyhow!("Failed to install logger: {}", e))
}

fn triage_file(
    file: &Path,
    id: Option<String>,
    received: Option<NaiveDate>,
) -> Result<AdverseEventReport> {
    let mut partial = PartialReport::from_path(file)
        .with_context(|| format!("Failed to load report {}", file.display()))?;
    if id.is_some() && partial.id.is_none() {
        partial.id = id;
    }
    let received = received
        .or(partial.date_received)
        .unwrap_or_else(|| Local::now().date_naive());

    let mut store = CaseStore::new();
    let record = store.ingest(partial, received)?;
    Ok(record.clone())
}

async fn extract(text: &str, config_path: Option<PathBuf>) -> Result<ExtractView> {
    let config = match config_path {
        Some(path) => RuntimeConfig::from_yaml_file(&path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => RuntimeConfig::default(),
    }
    .with_env_overrides()
    .context("Invalid environment override")?;

    let registry = ProviderRegistry::with_defaults();
    let provider = registry
        .create(&config.provider, &config.provider_options)
        .with_context(|| format!("Failed to create provider '{}'", config.provider))?;
    tracing::info!(provider = provider.name(), model = %config.model, "provider ready");

    let extractor = ReportExtractor::new(provider, &config);
    extractor
        .ensure_ready()
        .await
        .context("Provider is not ready; check its API key")?;

    let pipeline = IntakePipeline::new(extractor);
    let mut store = CaseStore::new();
    let outcome = pipeline
        .process(text, &mut store, Local::now().date_naive())
        .await
        .context("Report processing failed; the report was not stored, retry when ready")?;

    Ok(ExtractView::new(outcome))
}

fn demo_store() -> Result<CaseStore> {
    let seeds = parse_batch_yaml(DEMO_CASES).context("Demo fixtures are invalid")?;
    let received = NaiveDate::from_ymd_opt(2024, 5, 15).context("Invalid demo date")?;
    Ok(CaseStore::seeded(seeds, received)?)
}

fn emit<T: serde::Serialize>(
    format: OutputFormat,
    view: &T,
    text: impl Fn(&T) -> String,
) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(view),
        OutputFormat::Text => {
            println!("{}", text(view));
            Ok(())
        }
    }
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", json);
    Ok(())
}

//! weekgap CLI — weekly gap-down scans over an index basket.
//!
//! Commands:
//! - `friday` — find Thursday/Friday setups and store the watchlist batch
//! - `monday` — measure Monday gaps against the stored batch and size trades
//! - `init-config` — write a sample `weekgap.toml`
//! - `batches` — list stored setup batches

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;
use weekgap_core::data::{CircuitBreaker, CsvDirProvider, DataProvider, YahooProvider};
use weekgap_runner::config::{write_sample, DEFAULT_CONFIG_FILE};
use weekgap_runner::{
    BatchStore, LogSink, MultiSink, NotificationSink, OutboxSink, WeekgapConfig, Workflow,
};

#[derive(Parser)]
#[command(
    name = "weekgap",
    about = "weekgap — Friday setup / Monday gap-down scanner"
)]
struct Cli {
    /// Path to the TOML config file.
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Scan date (YYYY-MM-DD). Defaults to today.
    #[arg(long, global = true)]
    today: Option<NaiveDate>,

    /// Read `<SYMBOL>.csv` files from this directory instead of Yahoo Finance.
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan the basket for this week's setups and store the watchlist.
    Friday,
    /// Check Monday's gaps against a stored watchlist and emit trade signals.
    Monday {
        /// Batch id to use. Defaults to the newest batch.
        #[arg(long)]
        batch: Option<String>,
    },
    /// Write a sample config file.
    InitConfig {
        /// Destination. Defaults to the --config path.
        #[arg(long)]
        path: Option<PathBuf>,
    },
    /// List stored setup batches, oldest first.
    Batches,
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "weekgap=info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let today = cli.today.unwrap_or_else(|| Local::now().date_naive());
    tracing::debug!(config = %cli.config.display(), %today, "resolved run date");

    match cli.command {
        Commands::Friday => run_friday(&cli.config, cli.data_dir, today),
        Commands::Monday { batch } => run_monday(&cli.config, cli.data_dir, batch, today),
        Commands::InitConfig { path } => run_init_config(path.as_deref().unwrap_or(&cli.config)),
        Commands::Batches => run_batches(&cli.config),
    }
}

fn load_config(path: &Path) -> Result<WeekgapConfig> {
    WeekgapConfig::load(path).with_context(|| {
        format!(
            "failed to load config {} (run `weekgap init-config` to create one)",
            path.display()
        )
    })
}

fn build_provider(
    config: &WeekgapConfig,
    data_dir: Option<PathBuf>,
) -> Result<Box<dyn DataProvider>> {
    match data_dir {
        Some(dir) => Ok(Box::new(CsvDirProvider::new(dir))),
        None => {
            let circuit_breaker = Arc::new(CircuitBreaker::default_provider());
            let provider = YahooProvider::new(circuit_breaker, config.provider_options())
                .context("failed to build Yahoo Finance client")?;
            Ok(Box::new(provider))
        }
    }
}

fn build_sink(config: &WeekgapConfig) -> MultiSink {
    let recipient = config.notify.recipient.clone();
    let sinks: Vec<Box<dyn NotificationSink>> = vec![
        Box::new(OutboxSink::new(&config.paths.outbox_dir, recipient.clone())),
        Box::new(LogSink::new(recipient)),
    ];
    MultiSink::new(sinks)
}

fn run_friday(config_path: &Path, data_dir: Option<PathBuf>, today: NaiveDate) -> Result<()> {
    let config = load_config(config_path)?;
    let provider = build_provider(&config, data_dir)?;
    let sink = build_sink(&config);

    let summary = Workflow::new(&config, provider.as_ref(), &sink)
        .friday(Utc::now(), today)
        .context("Friday scan failed")?;

    println!("Batch:            {}", summary.batch_id);
    println!("Week ending:      {}", summary.week_ending);
    println!("Setups found:     {}", summary.setups);
    println!("Data unavailable: {}", summary.data_unavailable);
    println!("Stored in:        {}", summary.batch_dir.display());
    if let Some(dir) = summary.delivered_to {
        println!("Report:           {}", dir.display());
    }
    Ok(())
}

fn run_monday(
    config_path: &Path,
    data_dir: Option<PathBuf>,
    batch: Option<String>,
    today: NaiveDate,
) -> Result<()> {
    let config = load_config(config_path)?;
    let provider = build_provider(&config, data_dir)?;
    let sink = build_sink(&config);

    let summary = Workflow::new(&config, provider.as_ref(), &sink)
        .monday(batch.as_deref(), today)
        .context("Monday scan failed")?;

    let counts = summary.counts;
    println!("Batch:            {}", summary.batch_id);
    println!("Signals:          {}", counts.signals);
    println!("Not actionable:   {}", counts.not_actionable);
    println!("No gap data:      {}", counts.no_gap);
    println!("Stale setups:     {}", counts.stale);
    println!("Skipped:          {} ({} anomalies)", counts.skipped, counts.anomalies);
    println!("Data unavailable: {}", counts.data_unavailable);
    if let Some(path) = summary.signals_csv {
        println!("Signals CSV:      {}", path.display());
    }
    if let Some(dir) = summary.delivered_to {
        println!("Report:           {}", dir.display());
    }
    Ok(())
}

fn run_init_config(path: &Path) -> Result<()> {
    write_sample(path)?;
    println!("Wrote sample config to {}", path.display());
    Ok(())
}

fn run_batches(config_path: &Path) -> Result<()> {
    let config = load_config(config_path)?;
    let store = BatchStore::new(&config.paths.store_dir);
    let manifests = store.list().context("failed to list setup batches")?;

    if manifests.is_empty() {
        println!("No batches in {}", config.paths.store_dir.display());
        return Ok(());
    }

    println!("{:<24} {:<25} {:<12} {:>7}", "Batch", "Created", "Week", "Setups");
    println!("{}", "-".repeat(71));
    for m in &manifests {
        println!(
            "{:<24} {:<25} {:<12} {:>7}",
            m.batch_id,
            m.created_at.format("%Y-%m-%d %H:%M:%S UTC"),
            m.week_ending,
            m.record_count
        );
    }
    Ok(())
}

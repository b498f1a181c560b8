//! Book Harvester main entry point
//!
//! This is the command-line interface for the fetch, clean, load and report stages.

use anyhow::Context;
use book_harvester::cleaning::run_cleaning;
use book_harvester::config::{load_config_with_hash, resolve_api_key, Config};
use book_harvester::harvest::fetch_and_save;
use book_harvester::output::{print_cleaning_summary, print_harvest_summary, run_reports};
use book_harvester::storage::{load_dataset, open_storage};
use clap::{Parser, Subcommand};
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Book Harvester: collect, clean and analyse book metadata
///
/// Fetches volumes from the Google Books API into raw CSV files, merges and
/// cleans those files into one dataset, loads it into SQLite and prints a set
/// of analytical reports.
#[derive(Parser, Debug)]
#[command(name = "book-harvester")]
#[command(version = "1.0.0")]
#[command(about = "Fetch, clean and analyse Google Books metadata", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch volumes from the API and write them to a new raw file
    Fetch,

    /// Merge and clean the raw files into one dataset
    Clean,

    /// Load the cleaned dataset into the database
    Load,

    /// Print the analytical reports
    Report,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;

    setup_logging(cli.verbose, cli.quiet, Path::new(&config.output.log_path))?;
    tracing::info!("Configuration loaded (hash: {})", config_hash);

    match cli.command {
        Command::Fetch => handle_fetch(&config).await,
        Command::Clean => handle_clean(&config),
        Command::Load => handle_load(&config, &config_hash),
        Command::Report => handle_report(&config),
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// Events go to stderr and, without colour codes, to the log file.
fn setup_logging(verbose: u8, quiet: bool, log_path: &Path) -> anyhow::Result<()> {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("book_harvester=info,warn"),
            1 => EnvFilter::new("book_harvester=debug,info"),
            2 => EnvFilter::new("book_harvester=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    if let Some(parent) = log_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory {}", parent.display()))?;
    }
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
        .with_context(|| format!("Failed to open log file {}", log_path.display()))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(Mutex::new(log_file))
                .with_ansi(false),
        )
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false),
        )
        .init();

    Ok(())
}

/// Handles `fetch`: runs the pagination loop and saves whatever it collected
async fn handle_fetch(config: &Config) -> anyhow::Result<()> {
    let api_key = resolve_api_key(&config.api)?;

    let cancel = CancellationToken::new();
    let signal_token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, saving the books collected so far");
            signal_token.cancel();
        }
    });

    tracing::info!(
        "Fetching up to {} books from {}",
        config.fetch.target_count,
        config.api.base_url
    );
    let (outcome, saved) = fetch_and_save(config, api_key, cancel)
        .await
        .context("Fetch failed")?;
    print_harvest_summary(&outcome);

    if let Some(path) = saved {
        println!("\nData saved to {}", path.display());
    }

    Ok(())
}

/// Handles `clean`: merges the raw files into the cleaned dataset
fn handle_clean(config: &Config) -> anyhow::Result<()> {
    let dataset = run_cleaning(&config.cleaning).context("Cleaning failed")?;
    print_cleaning_summary(&dataset, config.cleaning.schema);
    println!("\nCleaned data saved to {}", config.cleaning.output_path);
    Ok(())
}

/// Handles `load`: replaces the stored books with the cleaned dataset
fn handle_load(config: &Config, config_hash: &str) -> anyhow::Result<()> {
    let mut storage = open_storage(Path::new(&config.database.path))
        .with_context(|| format!("Failed to open database {}", config.database.path))?;

    let inserted = load_dataset(
        &mut storage,
        Path::new(&config.cleaning.output_path),
        config_hash,
    )
    .context("Loading failed")?;

    println!("Loaded {} books into {}", inserted, config.database.path);
    Ok(())
}

/// Handles `report`: prints store statistics and every report
fn handle_report(config: &Config) -> anyhow::Result<()> {
    let storage = open_storage(Path::new(&config.database.path))
        .with_context(|| format!("Failed to open database {}", config.database.path))?;

    run_reports(&storage)?;
    Ok(())
}

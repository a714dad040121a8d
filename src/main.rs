//! Job-Harvest main entry point
//!
//! This is the command-line interface for the Job-Harvest listing crawler.

use anyhow::Context;
use clap::Parser;
use job_harvest::config::{compute_config_hash, read_config, validate, Config};
use job_harvest::crawler::crawl;
use job_harvest::output::{print_summary, summarize, write_all, CsvSink, ResultSink};
use job_harvest::storage::SqliteStorage;
use job_harvest::url::SearchUrlBuilder;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Locality used when the prompt is left blank
const DEFAULT_LOCALITY: &str = "Istanbul";

/// Job-Harvest: a polite paginated job-listing crawler
///
/// Fetches search-result pages for one locality, extracts job title,
/// company and location from each listing, and writes the records to CSV
/// (and optionally SQLite).
#[derive(Parser, Debug)]
#[command(name = "job-harvest")]
#[command(version = "1.0.0")]
#[command(about = "A polite paginated job-listing crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults apply when omitted)
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Locality to search, overriding the config file
    #[arg(short, long)]
    locality: Option<String>,

    /// Number of pages to request, overriding the config file
    #[arg(short = 'p', long)]
    max_pages: Option<u32>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show the URLs that would be fetched
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show statistics from the database and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let (mut config, config_hash) = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let config = read_config(path)
                .with_context(|| format!("failed to load configuration from {}", path.display()))?;
            let hash = compute_config_hash(path)?;
            tracing::info!("Configuration loaded (hash: {})", hash);
            (config, hash)
        }
        None => {
            tracing::info!("No configuration file given, using defaults");
            (Config::default(), String::new())
        }
    };

    if cli.stats {
        return handle_stats(&config);
    }

    apply_overrides(&mut config, &cli)?;
    validate(&config).context("invalid configuration")?;

    if cli.dry_run {
        handle_dry_run(&config)?;
    } else {
        handle_crawl(&config, &config_hash).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("job_harvest=info,warn"),
            1 => EnvFilter::new("job_harvest=debug,info"),
            2 => EnvFilter::new("job_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Applies CLI overrides, prompting for a locality if none is configured
fn apply_overrides(config: &mut Config, cli: &Cli) -> anyhow::Result<()> {
    if let Some(locality) = &cli.locality {
        config.crawler.locality = locality.clone();
    }
    if let Some(max_pages) = cli.max_pages {
        config.crawler.max_pages = max_pages;
    }

    if config.crawler.locality.trim().is_empty() {
        config.crawler.locality = prompt_locality().context("failed to read locality")?;
    }
    config.crawler.locality = config.crawler.locality.trim().to_lowercase();

    Ok(())
}

/// Asks for a locality on stdin; a blank answer selects the default
fn prompt_locality() -> std::io::Result<String> {
    print!("Enter your city (e.g., Istanbul, Ankara, Izmir): ");
    std::io::stdout().flush()?;

    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;

    let answer = line.trim();
    Ok(if answer.is_empty() {
        DEFAULT_LOCALITY.to_string()
    } else {
        answer.to_string()
    })
}

/// Handles the --dry-run mode: shows what would be crawled
fn handle_dry_run(config: &Config) -> anyhow::Result<()> {
    println!("=== Job-Harvest Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Locality: {}", config.crawler.locality);
    println!("  Max pages: {}", config.crawler.max_pages);
    println!(
        "  Delay window: {}s - {}s",
        config.crawler.min_delay_seconds, config.crawler.max_delay_seconds
    );
    println!("  Request timeout: {}s", config.crawler.request_timeout_seconds);
    println!("  Concurrent pages: {}", config.crawler.max_concurrent_pages);
    println!("  Retries: {}", config.crawler.max_retries);

    println!("\nSource:");
    println!("  User agent: {}", config.source.user_agent);
    println!(
        "  Listing selectors: {} -> title '{}', company '{}', location '{}'",
        config.selectors.container,
        config.selectors.title,
        config.selectors.company,
        config.selectors.location
    );

    println!("\nOutput:");
    println!("  CSV: {}", config.output.csv_path);
    println!(
        "  Database: {}",
        config.output.database().unwrap_or("(disabled)")
    );

    let urls = SearchUrlBuilder::new(&config.source)?;
    println!("\nPages ({}):", config.crawler.max_pages);
    for page_number in 1..=config.crawler.max_pages {
        println!("  - {}", urls.page_url(&config.crawler.locality, page_number));
    }

    println!("\n✓ Configuration is valid");
    Ok(())
}

/// Handles the --stats mode: shows statistics from the database
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    use job_harvest::output::{load_statistics, print_statistics};

    let database = config
        .output
        .database()
        .context("no database-path configured; nothing to report")?;

    println!("Database: {}\n", database);
    let storage = SqliteStorage::new(Path::new(database))?;
    let stats = load_statistics(&storage)?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: &Config, config_hash: &str) -> anyhow::Result<()> {
    tracing::info!(
        "Collecting job data for '{}' ({} page(s))",
        config.crawler.locality,
        config.crawler.max_pages
    );

    let mut database_sink = match config.output.database() {
        Some(path) => Some(
            SqliteStorage::new(Path::new(path))?.begin_run(config_hash, &config.crawler.locality)?,
        ),
        None => None,
    };

    let cancel = CancellationToken::new();
    let ctrl_c = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Interrupt received, finishing in-flight pages");
                cancel.cancel();
            }
        })
    };

    let outcome = crawl(config, &cancel).await;
    ctrl_c.abort();
    let outcome = outcome?;

    let mut csv_sink = CsvSink::new(&config.output.csv_path);
    let mut sinks: Vec<&mut dyn ResultSink> = vec![&mut csv_sink];
    if let Some(sink) = database_sink.as_mut() {
        sinks.push(sink);
    }
    write_all(&mut sinks, &outcome).context("failed to write results")?;

    let summary = summarize(&outcome, config.output.minimum_records);
    println!("Data saved to {}", config.output.csv_path);
    print_summary(&outcome, &summary, config.output.preview_rows);

    Ok(())
}

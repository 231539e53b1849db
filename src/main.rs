//! Email crawler main entry point
//!
//! This is the command-line interface for checking robots.txt policy of
//! organization websites and crawling them for contact email addresses.

use anyhow::Context;
use clap::{Parser, Subcommand};
use email_crawler::config::{load_config_with_hash, Config};
use email_crawler::crawler::{aggregate, Coordinator};
use email_crawler::output::{print_scrapability_summary, print_statistics, CrawlStatistics};
use email_crawler::robots::BatchChecker;
use email_crawler::storage::open_checkpoint;
use email_crawler::table::{fill_emails, fill_scrapability, write_table, InputTable, TableFormat};
use email_crawler::{CrawlerError, Origin, OutputError};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Email crawler for organization websites
///
/// Checks whether each website permits crawling, then visits the
/// homepage and its contact/about pages of every permitted site and
/// collects the email addresses found there.
#[derive(Parser, Debug)]
#[command(name = "email-crawler")]
#[command(version = "1.0.0")]
#[command(about = "Collects contact emails from organization websites", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults apply without one)
    #[arg(short, long, value_name = "CONFIG", global = true)]
    config: Option<PathBuf>,

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
    /// Crawl scrapable websites and fill the emails column
    Crawl {
        /// Input table (.csv or .xlsx) with website and scrapability columns
        input: PathBuf,

        /// Where to write the table with emails (.csv or .xlsx)
        #[arg(short, long, default_value = "crawled_emails.xlsx")]
        output: PathBuf,

        /// Start a fresh crawl, ignoring any checkpoint
        #[arg(long)]
        fresh: bool,

        /// Overwrite an existing emails column without asking
        #[arg(short, long)]
        yes: bool,
    },

    /// Check robots.txt of every website and fill the scrapability column
    Check {
        /// Input table (.csv or .xlsx) with a website column
        input: PathBuf,

        /// Where to write the table with scrapability (.csv or .xlsx)
        #[arg(default_value = "scrapability.xlsx")]
        output: PathBuf,
    },

    /// Build the emails column from the last checkpoint without crawling
    Merge {
        /// The input table the checkpoint was produced from
        input: PathBuf,

        /// Where to write the table with emails (.csv or .xlsx)
        #[arg(short, long, default_value = "crawled_emails_from_checkpoint.xlsx")]
        output: PathBuf,

        /// Overwrite an existing emails column without asking
        #[arg(short, long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let (config, config_hash) = load_config_with_hash(cli.config.as_deref())
        .context("Failed to load configuration")?;
    match &cli.config {
        Some(path) => tracing::info!(
            "Configuration loaded from {} (hash: {})",
            path.display(),
            config_hash
        ),
        None => tracing::info!("No configuration file given, using defaults"),
    }

    match cli.command {
        Command::Crawl {
            input,
            output,
            fresh,
            yes,
        } => handle_crawl(config, config_hash, &input, &output, fresh, yes).await,
        Command::Check { input, output } => handle_check(&config, &input, &output).await,
        Command::Merge { input, output, yes } => handle_merge(&config, &input, &output, yes),
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("email_crawler=info,warn"),
            1 => EnvFilter::new("email_crawler=debug,info"),
            2 => EnvFilter::new("email_crawler=trace,debug"),
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

/// Rejects an output path that cannot be written, before any work is done
fn check_output_format(output: &Path) -> anyhow::Result<()> {
    if TableFormat::from_path(output).is_none() {
        return Err(OutputError::UnsupportedFormat(output.display().to_string()).into());
    }
    Ok(())
}

/// Asks before an existing emails column is replaced
fn confirm_overwrite(table: &InputTable, yes: bool) -> anyhow::Result<()> {
    if yes || !table.has_emails_column() {
        return Ok(());
    }

    let proceed = dialoguer::Confirm::new()
        .with_prompt("'emails' column will be overwritten. Continue?")
        .default(false)
        .interact()
        .context("Failed to read confirmation")?;

    if proceed {
        Ok(())
    } else {
        Err(CrawlerError::Aborted("existing emails column kept".to_string()).into())
    }
}

/// Handles the crawl command
async fn handle_crawl(
    config: Config,
    config_hash: String,
    input: &Path,
    output: &Path,
    fresh: bool,
    yes: bool,
) -> anyhow::Result<()> {
    check_output_format(output)?;
    let mut table = InputTable::read(input)?;
    confirm_overwrite(&table, yes)?;

    let targets = table.crawl_targets()?;
    tracing::info!(
        "{} of {} rows are scrapable websites",
        targets.len(),
        table.len()
    );
    let origins: Vec<Origin> = targets.iter().map(|t| t.origin.clone()).collect();

    let store = open_checkpoint(&config.checkpoint).with_context(|| {
        format!(
            "Failed to open checkpoint in {}",
            config.checkpoint.directory().display()
        )
    })?;

    let shutdown = Arc::new(AtomicBool::new(false));
    let signal_flag = Arc::clone(&shutdown);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, saving checkpoint and stopping");
            signal_flag.store(true, Ordering::SeqCst);
        }
    });

    let mut coordinator = Coordinator::new(config, store, fresh)?
        .with_config_hash(config_hash)
        .with_shutdown(shutdown);

    let outcome = match coordinator.run(&origins).await {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            return Err(e.into());
        }
    };

    fill_emails(&mut table, &targets, &outcome.aggregated);
    write_table(&table, output)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    let mut stats = CrawlStatistics::from_crawl(origins.len(), &outcome.state, &outcome.aggregated);
    stats.origins_resumed = outcome.resumed;
    stats.interrupted = outcome.interrupted;
    stats.artifacts = coordinator.artifacts();
    stats.artifacts.push(output.to_path_buf());
    print_statistics(&stats);

    Ok(())
}

/// Handles the check command
async fn handle_check(config: &Config, input: &Path, output: &Path) -> anyhow::Result<()> {
    check_output_format(output)?;
    let mut table = InputTable::read(input)?;
    let websites = table.website_cells()?;

    let checker = BatchChecker::from_config(config).context("Failed to build HTTP client")?;
    tracing::info!(
        "Checking {} websites with {} workers",
        websites.len(),
        checker.workers()
    );

    let statuses = checker.check_all(&websites).await;

    fill_scrapability(&mut table, &statuses);
    write_table(&table, output)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    print_scrapability_summary(&statuses, output);
    Ok(())
}

/// Handles the merge command: rebuilds the emails column from a checkpoint
fn handle_merge(config: &Config, input: &Path, output: &Path, yes: bool) -> anyhow::Result<()> {
    check_output_format(output)?;
    let mut table = InputTable::read(input)?;
    confirm_overwrite(&table, yes)?;
    let targets = table.crawl_targets()?;

    let store = open_checkpoint(&config.checkpoint)?;
    let state = store.load()?.with_context(|| {
        format!(
            "No checkpoint found in {}",
            config.checkpoint.directory().display()
        )
    })?;

    let aggregated = aggregate(&state, &config.filter.denylist);
    fill_emails(&mut table, &targets, &aggregated);
    write_table(&table, output)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    let mut stats = CrawlStatistics::from_crawl(targets.len(), &state, &aggregated);
    stats.artifacts = store.artifacts();
    stats.artifacts.push(output.to_path_buf());
    print_statistics(&stats);

    Ok(())
}

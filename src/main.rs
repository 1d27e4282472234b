//! Tidemark main entry point
//!
//! This is the command-line interface for the Tidemark website crawler.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tidemark::config::{load_config_or_default, validate, Config};
use tidemark::crawler::{crawl_single_page, crawl_website_with, resolve_output_dir, CrawlOptions};
use tidemark::output::{print_report, print_single_report};
use tidemark::storage::CrawlMode;
use tidemark::url::normalize_url;
use tracing_subscriber::EnvFilter;

/// Exit status used when the run is interrupted with Ctrl-C
const INTERRUPTED: u8 = 130;

/// Tidemark: a bounded, polite, resumable website crawler
///
/// Tidemark crawls a single site from a seed URL up to a depth and page
/// limit, saving each page as markdown and checkpointing progress so an
/// interrupted crawl picks up where it stopped.
#[derive(Parser, Debug)]
#[command(name = "tidemark")]
#[command(version)]
#[command(about = "A bounded, polite, resumable website crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(long, global = true, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Crawl a website starting from a seed URL
    Website(WebsiteArgs),

    /// Fetch and save a single page
    Single(SingleArgs),
}

#[derive(Args, Debug)]
struct WebsiteArgs {
    /// Seed URL
    url: String,

    /// Output directory (derived from the URL if omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Maximum link depth from the seed (overrides config)
    #[arg(short = 'd', long)]
    max_depth: Option<u32>,

    /// Maximum number of pages to crawl (overrides config)
    #[arg(short = 'p', long)]
    max_pages: Option<usize>,

    /// Maximum number of concurrent fetches (overrides config)
    #[arg(short = 'c', long)]
    concurrent: Option<usize>,

    /// Polite delay after each fetch, in milliseconds
    #[arg(long)]
    delay_ms: Option<u64>,

    /// Only follow links containing one of these substrings
    #[arg(long, value_delimiter = ',')]
    include: Vec<String>,

    /// Never follow links containing one of these substrings
    #[arg(long, value_delimiter = ',')]
    exclude: Vec<String>,

    /// Start a fresh crawl, ignoring any checkpoint
    #[arg(long)]
    fresh: bool,

    /// Validate settings and show what would be crawled without crawling
    #[arg(long)]
    dry_run: bool,
}

#[derive(Args, Debug)]
struct SingleArgs {
    /// Page URL
    url: String,

    /// Output directory (derived from the URL if omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    tokio::select! {
        result = run(cli) => match result {
            Ok(code) => code,
            Err(e) => {
                tracing::error!("{:#}", e);
                eprintln!("Error: {:#}", e);
                ExitCode::FAILURE
            }
        },
        _ = tokio::signal::ctrl_c() => {
            tracing::warn!("Interrupted; the last saved checkpoint is kept as is");
            ExitCode::from(INTERRUPTED)
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("tidemark=info,warn"),
            1 => EnvFilter::new("tidemark=debug,info"),
            2 => EnvFilter::new("tidemark=trace,debug"),
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

async fn run(cli: Cli) -> Result<ExitCode> {
    let config = load_config_or_default(cli.config.as_deref()).with_context(|| {
        match &cli.config {
            Some(path) => format!("Failed to load configuration from {}", path.display()),
            None => "Invalid default configuration".to_string(),
        }
    })?;

    match cli.command {
        Command::Website(args) => handle_website(config, args).await,
        Command::Single(args) => handle_single(config, args).await,
    }
}

/// Applies command-line overrides on top of file configuration
fn apply_overrides(mut config: Config, args: &WebsiteArgs) -> Result<Config> {
    if let Some(max_depth) = args.max_depth {
        config.crawler.max_depth = max_depth;
    }
    if let Some(max_pages) = args.max_pages {
        config.crawler.max_pages = max_pages;
    }
    if let Some(concurrent) = args.concurrent {
        config.crawler.max_concurrent = concurrent;
    }
    if let Some(delay_ms) = args.delay_ms {
        config.crawler.delay_ms = delay_ms;
    }
    if !args.include.is_empty() {
        config.filters.include = args.include.clone();
    }
    if !args.exclude.is_empty() {
        config.filters.exclude = args.exclude.clone();
    }

    validate(&config).context("Invalid crawl settings")?;
    Ok(config)
}

/// Handles the `website` subcommand
async fn handle_website(config: Config, args: WebsiteArgs) -> Result<ExitCode> {
    let config = apply_overrides(config, &args)?;

    if args.dry_run {
        handle_dry_run(&config, &args)?;
        return Ok(ExitCode::SUCCESS);
    }

    if args.fresh {
        tracing::info!("Starting fresh crawl (ignoring any checkpoint)");
    }

    let options = CrawlOptions {
        fresh: args.fresh,
        ..CrawlOptions::default()
    };
    let report = crawl_website_with(&config, &args.url, args.output.as_deref(), options).await;
    print_report(&report);

    // Individual page failures still count as a successful run
    Ok(if report.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Handles --dry-run: validates settings and shows what would be crawled
fn handle_dry_run(config: &Config, args: &WebsiteArgs) -> Result<()> {
    let seed = normalize_url(&args.url).with_context(|| format!("Invalid seed URL {}", args.url))?;
    let output = resolve_output_dir(config, &seed, CrawlMode::Website, args.output.as_deref());

    println!("=== Tidemark Dry Run ===\n");

    println!("Seed: {}", seed);
    println!("Output directory: {}", output.display());

    println!("\nCrawler Configuration:");
    println!("  Max depth: {}", config.crawler.max_depth);
    println!("  Max pages: {}", config.crawler.max_pages);
    println!("  Max concurrent fetches: {}", config.crawler.max_concurrent);
    println!("  Delay after each fetch: {}ms", config.crawler.delay_ms);
    println!("  Page timeout: {}s", config.crawler.page_timeout_secs);
    println!(
        "  Checkpoint every batch: {}",
        config.crawler.checkpoint_every_batch
    );

    println!("\nUser Agent: {}", config.user_agent.header_value());

    print_patterns("Include", &config.filters.include);
    print_patterns("Exclude", &config.filters.exclude);

    let checkpoint = tidemark::storage::CheckpointManager::new(&output);
    if checkpoint.path().exists() && !args.fresh {
        println!("\n✓ Would resume from {}", checkpoint.path().display());
    } else {
        println!("\n✓ Would start a fresh crawl");
    }

    Ok(())
}

fn print_patterns(label: &str, patterns: &[String]) {
    println!("\n{} patterns ({}):", label, patterns.len());
    for pattern in patterns {
        println!("  - {}", pattern);
    }
}

/// Handles the `single` subcommand
async fn handle_single(config: Config, args: SingleArgs) -> Result<ExitCode> {
    let report = crawl_single_page(&config, &args.url, args.output.as_deref()).await;
    print_single_report(&report);

    Ok(if report.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

//! docs-trawl main entry point
//!
//! Command-line interface that extracts a documentation site into a
//! directory of markdown files.

use anyhow::Context;
use clap::Parser;
use docs_trawl::config::{load_config, validate, Config};
use docs_trawl::crawler::HttpFetcher;
use docs_trawl::output::{print_report, HtmlConverter, MarkdownWriter};
use docs_trawl::{Dispatcher, Pipeline, TrawlError};
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// docs-trawl: documentation site extractor
///
/// Finds the pages of a documentation site (llms.txt, sitemaps, search
/// indexes, or a same-site crawl) and writes each one as markdown.
#[derive(Parser, Debug)]
#[command(name = "docs-trawl")]
#[command(version)]
#[command(about = "Extract documentation sites into markdown", long_about = None)]
struct Cli {
    /// Root URL: a docs site, an llms.txt file, or a sitemap
    #[arg(value_name = "URL")]
    url: String,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Output directory
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Maximum pages processed at once
    #[arg(short = 'j', long)]
    concurrency: Option<usize>,

    /// Stop after this many pages are written (0 = unlimited)
    #[arg(long)]
    limit: Option<usize>,

    /// Maximum link depth from the root page
    #[arg(long)]
    max_depth: Option<usize>,

    /// Skip URLs matching this regex anywhere in the full URL (repeatable)
    #[arg(long, value_name = "PATTERN")]
    exclude: Vec<String>,

    /// Only accept URLs starting with this prefix
    #[arg(long, value_name = "PREFIX")]
    filter_url: Option<String>,

    /// Overwrite documents that already exist
    #[arg(long)]
    force: bool,

    /// Fetch and convert but write nothing
    #[arg(long)]
    dry_run: bool,

    /// Render every page, not just application shells
    #[arg(long)]
    force_render: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = build_config(&cli)?;
    let options = config.crawl_options();

    let fetcher = HttpFetcher::from_config(&config.fetch).context("Failed to build HTTP client")?;
    let pipeline = Pipeline::new(
        Arc::new(fetcher),
        Arc::new(HtmlConverter::new()),
        Arc::new(MarkdownWriter::new(&config.output.directory)),
    );

    let cancel = CancellationToken::new();
    let signal_token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, finishing in-flight pages");
            signal_token.cancel();
        }
    });

    if options.dry_run {
        tracing::info!("Dry run: nothing will be written");
    }

    match Dispatcher::with_defaults()
        .execute(&cli.url, &options, &pipeline, cancel)
        .await
    {
        Ok(report) => {
            if !cli.quiet {
                print_report(&report);
            }
            Ok(())
        }
        Err(TrawlError::Cancelled) => {
            tracing::warn!("Extraction cancelled");
            std::process::exit(130);
        }
        Err(e) => {
            tracing::error!("Extraction failed: {}", e);
            Err(e.into())
        }
    }
}

/// Loads the config file (or defaults) and applies command-line overrides
fn build_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            load_config(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?
        }
        None => Config::default(),
    };

    let crawler = &mut config.crawler;
    if let Some(concurrency) = cli.concurrency {
        crawler.concurrency = concurrency;
    }
    if let Some(limit) = cli.limit {
        crawler.limit = limit;
    }
    if let Some(max_depth) = cli.max_depth {
        crawler.max_depth = max_depth;
    }
    crawler.exclude.extend(cli.exclude.iter().cloned());
    if cli.filter_url.is_some() {
        crawler.filter_url = cli.filter_url.clone();
    }
    crawler.force |= cli.force;
    crawler.dry_run |= cli.dry_run;
    crawler.force_render |= cli.force_render;

    if let Some(output) = &cli.output {
        config.output.directory = output.display().to_string();
    }

    validate(&config).context("Invalid configuration")?;
    Ok(config)
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("docs_trawl=info,warn"),
            1 => EnvFilter::new("docs_trawl=debug,info"),
            2 => EnvFilter::new("docs_trawl=trace,debug"),
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

//! docs-trawl: documentation extraction from heterogeneous web sources
//!
//! This crate picks an extraction strategy per URL and drives it to
//! completion. Sites without a usable content manifest are discovered through
//! a ranked list of cheap probes (llms.txt, sitemaps, static search indexes)
//! before falling back to a concurrent, depth-bounded link crawl.

pub mod classify;
pub mod config;
pub mod crawler;
pub mod discovery;
pub mod output;
pub mod pipeline;
pub mod state;
pub mod strategy;
pub mod url;

use thiserror::Error;

/// Run-level error type
///
/// Only fatal configuration problems and explicit cancellation surface here.
/// Failures of individual pages are reported through [`PageError`] and never
/// abort a run.
#[derive(Debug, Error)]
pub enum TrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid root URL '{url}': {reason}")]
    InvalidRootUrl { url: String, reason: String },

    #[error("No extraction strategy matches {0}")]
    NoStrategy(String),

    #[error("Failed to acquire {url}: {source}")]
    Acquisition { url: String, source: PageError },

    #[error("Failed to parse manifest {url}: {source}")]
    Manifest { url: String, source: ProbeError },

    #[error("Manifest at {url} lists no usable pages")]
    EmptyManifest { url: String },

    #[error("Run cancelled")]
    Cancelled,
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Errors for a single page of a run
///
/// These are logged and the page is skipped.
#[derive(Debug, Clone, Error)]
pub enum PageError {
    #[error("fetch failed for {url}: {message}")]
    Fetch { url: String, message: String },

    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("{stage} timed out after {secs}s for {url}")]
    Timeout {
        url: String,
        stage: &'static str,
        secs: u64,
    },

    #[error("render failed for {url}: {message}")]
    Render { url: String, message: String },

    #[error("conversion failed for {url}: {message}")]
    Convert { url: String, message: String },

    #[error("write failed for {url}: {message}")]
    Write { url: String, message: String },
}

/// Errors raised while parsing a discovery manifest
///
/// A probe that fails to parse is simply skipped; these only surface when a
/// manifest was requested explicitly.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("XML error: {0}")]
    Xml(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid link pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Unexpected format: {0}")]
    UnexpectedFormat(&'static str),
}

// Re-export commonly used types
pub use classify::{is_empty_or_error, needs_render, ClassificationVerdict};
pub use config::{Config, CrawlOptions};
pub use crawler::CrawlSession;
pub use discovery::{discover, Discovery, DiscoveryProbe, ProbeKind, DISCOVERY_PROBES};
pub use output::CrawlReport;
pub use pipeline::{Converter, Document, FetchResponse, Fetcher, Pipeline, Renderer, Writer};
pub use strategy::{Dispatcher, Strategy};

//! Configuration module for docs-trawl
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files and turning them into the [`CrawlOptions`] a run executes with.
//!
//! # Example
//!
//! ```no_run
//! use docs_trawl::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("trawl.toml")).unwrap();
//! println!("Crawler will use max depth: {}", config.crawler.max_depth);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    ClassifierConfig, Config, CrawlOptions, CrawlerConfig, FetchConfig, OutputConfig,
    RenderConfig,
};

// Re-export parser functions
pub use parser::{load_config, parse_config};
pub use validation::validate;

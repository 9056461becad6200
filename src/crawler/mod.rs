//! Crawler module for page fetching and traversal
//!
//! This module contains the generic crawling engine, including:
//! - The HTTP fetcher bundled with the binary
//! - Link extraction from fetched HTML
//! - The per-run session (admission, seen-set, page limit)
//! - The coordinator driving the bounded worker pool

mod coordinator;
mod fetcher;
mod parser;
mod session;

pub use coordinator::Coordinator;
pub use fetcher::{build_http_client, HttpFetcher};
pub use parser::extract_links;
pub use session::CrawlSession;

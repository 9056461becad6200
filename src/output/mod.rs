//! Output module for extracted documents and run reports
//!
//! This module handles:
//! - Converting fetched HTML into markdown documents
//! - Writing documents to the output directory
//! - Collecting and printing run statistics

mod convert;
mod markdown;
pub mod stats;

pub use convert::HtmlConverter;
pub use markdown::MarkdownWriter;
pub use stats::{print_report, CrawlReport};

//! Extraction strategies and the dispatcher choosing between them
//!
//! A strategy is an extraction algorithm bound to a URL predicate. The
//! dispatcher evaluates predicates in registration order, specialized
//! strategies first and the generic crawler last, and runs the first match.

mod crawl;
mod dispatcher;
mod manifest;

pub use crawl::CrawlerStrategy;
pub use dispatcher::Dispatcher;
pub use manifest::{LlmsStrategy, SitemapStrategy};

use crate::config::CrawlOptions;
use crate::output::CrawlReport;
use crate::pipeline::Pipeline;
use crate::TrawlError;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use url::Url;

/// A pluggable extraction algorithm
#[async_trait]
pub trait Strategy: Send + Sync {
    /// Short name used in logs and reports
    fn name(&self) -> &'static str;

    /// Returns true if this strategy handles `url`
    fn matches(&self, url: &Url) -> bool;

    /// Runs the extraction for `root`
    ///
    /// Per-page failures never surface here; an `Err` means the run as a
    /// whole could not proceed or was cancelled.
    async fn execute(
        &self,
        root: &Url,
        options: &CrawlOptions,
        pipeline: &Pipeline,
        cancel: CancellationToken,
    ) -> Result<CrawlReport, TrawlError>;
}

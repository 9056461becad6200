use super::{CrawlerStrategy, LlmsStrategy, SitemapStrategy, Strategy};
use crate::config::CrawlOptions;
use crate::output::CrawlReport;
use crate::pipeline::Pipeline;
use crate::url::normalize_url;
use crate::TrawlError;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Ordered strategy registry
///
/// The first strategy whose predicate accepts the root URL runs; there is
/// no fallback to later strategies after a failed run.
pub struct Dispatcher {
    strategies: Vec<Box<dyn Strategy>>,
}

impl Dispatcher {
    pub fn new(strategies: Vec<Box<dyn Strategy>>) -> Self {
        Self { strategies }
    }

    /// llms.txt, then sitemap, then the generic crawler
    pub fn with_defaults() -> Self {
        Self::new(vec![
            Box::new(LlmsStrategy),
            Box::new(SitemapStrategy),
            Box::new(CrawlerStrategy),
        ])
    }

    pub fn strategies(&self) -> impl Iterator<Item = &dyn Strategy> {
        self.strategies.iter().map(|s| s.as_ref())
    }

    /// Returns the first strategy matching `url`
    pub fn dispatch(&self, url: &Url) -> Option<&dyn Strategy> {
        self.strategies().find(|s| s.matches(url))
    }

    /// Normalizes `root`, selects a strategy, and runs it
    pub async fn execute(
        &self,
        root: &str,
        options: &CrawlOptions,
        pipeline: &Pipeline,
        cancel: CancellationToken,
    ) -> Result<CrawlReport, TrawlError> {
        let root = normalize_url(root).map_err(|e| TrawlError::InvalidRootUrl {
            url: root.to_string(),
            reason: e.to_string(),
        })?;

        let strategy = self
            .dispatch(&root)
            .ok_or_else(|| TrawlError::NoStrategy(root.to_string()))?;

        tracing::info!("Extracting {} with the {} strategy", root, strategy.name());
        let started = Instant::now();
        let mut report = strategy.execute(&root, options, pipeline, cancel).await?;
        report.elapsed = started.elapsed();

        Ok(report)
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.strategies.iter().map(|s| s.name()))
            .finish()
    }
}

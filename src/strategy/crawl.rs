use super::Strategy;
use crate::config::CrawlOptions;
use crate::crawler::{Coordinator, CrawlSession};
use crate::discovery::discover;
use crate::output::CrawlReport;
use crate::pipeline::Pipeline;
use crate::TrawlError;
use async_trait::async_trait;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Universal fallback: discovery first, link-following crawl on exhaustion
///
/// Matches every http(s) URL with a host.
#[derive(Debug, Clone, Copy, Default)]
pub struct CrawlerStrategy;

#[async_trait]
impl Strategy for CrawlerStrategy {
    fn name(&self) -> &'static str {
        "crawler"
    }

    fn matches(&self, url: &Url) -> bool {
        matches!(url.scheme(), "http" | "https") && url.host_str().is_some()
    }

    async fn execute(
        &self,
        root: &Url,
        options: &CrawlOptions,
        pipeline: &Pipeline,
        cancel: CancellationToken,
    ) -> Result<CrawlReport, TrawlError> {
        let mut report = CrawlReport::new(self.name());
        let session = Arc::new(CrawlSession::new(root.clone(), options.clone(), cancel));

        if session.is_cancelled() {
            return Err(TrawlError::Cancelled);
        }

        let discovery = discover(
            pipeline.fetcher.as_ref(),
            session.filter(),
            options.fetch_timeout,
            session.cancel_token(),
        )
        .await;

        if session.is_cancelled() {
            return Err(TrawlError::Cancelled);
        }

        let coordinator = Coordinator::new(session, pipeline.clone());
        match discovery {
            Some(found) => {
                report.probe = Some(found.probe);
                coordinator.process_inventory(&found.urls, &mut report).await?;
            }
            None => coordinator.crawl(&mut report).await?,
        }

        Ok(report)
    }
}

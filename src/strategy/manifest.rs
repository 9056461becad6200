//! Strategies for URLs that point straight at a page manifest
//!
//! The manifest is fetched and parsed with the discovery parsers; the pages
//! it lists are processed without following their links.

use super::Strategy;
use crate::config::CrawlOptions;
use crate::crawler::{Coordinator, CrawlSession};
use crate::discovery::{collect_manifest, ManifestFailure, ProbeKind};
use crate::output::CrawlReport;
use crate::pipeline::Pipeline;
use crate::TrawlError;
use async_trait::async_trait;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Handles `llms.txt` (and `llms-full.txt`) link lists
#[derive(Debug, Clone, Copy, Default)]
pub struct LlmsStrategy;

/// Handles sitemap and sitemap index XML files
#[derive(Debug, Clone, Copy, Default)]
pub struct SitemapStrategy;

#[async_trait]
impl Strategy for LlmsStrategy {
    fn name(&self) -> &'static str {
        "llms.txt"
    }

    fn matches(&self, url: &Url) -> bool {
        let file = last_segment(url);
        file == "llms.txt" || file == "llms-full.txt"
    }

    async fn execute(
        &self,
        root: &Url,
        options: &CrawlOptions,
        pipeline: &Pipeline,
        cancel: CancellationToken,
    ) -> Result<CrawlReport, TrawlError> {
        run_manifest(self.name(), ProbeKind::LlmsTxt, root, options, pipeline, cancel).await
    }
}

#[async_trait]
impl Strategy for SitemapStrategy {
    fn name(&self) -> &'static str {
        "sitemap"
    }

    fn matches(&self, url: &Url) -> bool {
        let file = last_segment(url).to_ascii_lowercase();
        file.ends_with(".xml") && file.contains("sitemap")
    }

    async fn execute(
        &self,
        root: &Url,
        options: &CrawlOptions,
        pipeline: &Pipeline,
        cancel: CancellationToken,
    ) -> Result<CrawlReport, TrawlError> {
        run_manifest(self.name(), ProbeKind::Sitemap, root, options, pipeline, cancel).await
    }
}

async fn run_manifest(
    name: &'static str,
    kind: ProbeKind,
    manifest: &Url,
    options: &CrawlOptions,
    pipeline: &Pipeline,
    cancel: CancellationToken,
) -> Result<CrawlReport, TrawlError> {
    if cancel.is_cancelled() {
        return Err(TrawlError::Cancelled);
    }

    // Relative entries resolve against the manifest's directory.
    let base = manifest.join(".").unwrap_or_else(|_| manifest.clone());

    tracing::info!("Reading {} manifest {}", name, manifest);
    let references = collect_manifest(
        pipeline.fetcher.as_ref(),
        kind,
        manifest,
        &base,
        options.fetch_timeout,
        &cancel,
    )
    .await
    .map_err(|failure| match failure {
        ManifestFailure::Cancelled => TrawlError::Cancelled,
        ManifestFailure::Fetch(source) => TrawlError::Acquisition {
            url: manifest.to_string(),
            source,
        },
        ManifestFailure::Parse(source) => TrawlError::Manifest {
            url: manifest.to_string(),
            source,
        },
    })?;

    let session = Arc::new(CrawlSession::new(base, options.clone(), cancel));
    let urls = session.filter().filter_discovered(&references);
    if urls.is_empty() {
        return Err(TrawlError::EmptyManifest {
            url: manifest.to_string(),
        });
    }

    let mut report = CrawlReport::new(name);
    Coordinator::new(session, pipeline.clone())
        .process_inventory(&urls, &mut report)
        .await?;
    Ok(report)
}

fn last_segment(url: &Url) -> &str {
    url.path().rsplit('/').next().unwrap_or("")
}

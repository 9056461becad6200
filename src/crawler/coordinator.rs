//! Crawl coordinator - the bounded worker pool
//!
//! The coordinator owns the pending queue and a `JoinSet` of page tasks.
//! Each task runs one page through the pipeline:
//! - Fetch (bounded by the fetch timeout)
//! - Classify, with an optional render retry
//! - Extract links
//! - Convert and write, under the page limit
//!
//! Links returned by a task are admitted through the session and queued one
//! level deeper, up to the maximum depth.

use crate::classify::ClassificationVerdict;
use crate::crawler::parser::extract_links;
use crate::crawler::session::CrawlSession;
use crate::output::CrawlReport;
use crate::pipeline::{with_timeout, Pipeline};
use crate::state::PageOutcome;
use crate::url::normalize_url;
use crate::{PageError, TrawlError};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use url::Url;

/// Progress is logged every this many finished pages
const PROGRESS_INTERVAL: usize = 10;

/// One unit of pending work
#[derive(Debug, Clone)]
struct QueuedPage {
    url: Url,
    depth: usize,

    /// Links of this page may be admitted
    follow_links: bool,
}

/// What a page task hands back to the coordinator
#[derive(Debug)]
struct PageResult {
    url: Url,
    depth: usize,
    outcome: PageOutcome,
    rendered: bool,
    links: Vec<String>,
}

/// Drives pages of one session through the pipeline
#[derive(Debug, Clone)]
pub struct Coordinator {
    session: Arc<CrawlSession>,
    pipeline: Pipeline,
}

impl Coordinator {
    pub fn new(session: Arc<CrawlSession>, pipeline: Pipeline) -> Self {
        Self { session, pipeline }
    }

    pub fn session(&self) -> &Arc<CrawlSession> {
        &self.session
    }

    /// Crawls outward from the session root, following links
    ///
    /// The root is always processed; its admission skips the exclusion and
    /// prefix rules.
    pub async fn crawl(&self, report: &mut CrawlReport) -> Result<(), TrawlError> {
        let root = self.session.root().clone();
        self.session.admit_root(&root);
        report.links_admitted += 1;

        tracing::info!(
            "Crawling from {} (max depth {}, concurrency {})",
            root,
            self.session.options().max_depth,
            self.session.options().concurrency
        );

        self.run(
            vec![QueuedPage {
                url: root,
                depth: 0,
                follow_links: true,
            }],
            report,
        )
        .await
    }

    /// Processes a fixed page inventory without following links
    pub async fn process_inventory(
        &self,
        urls: &[Url],
        report: &mut CrawlReport,
    ) -> Result<(), TrawlError> {
        let mut seeds = Vec::with_capacity(urls.len());
        for url in urls {
            if let Some(url) = self.session.admit(url.as_str()) {
                seeds.push(QueuedPage {
                    url,
                    depth: 0,
                    follow_links: false,
                });
            }
        }
        report.links_admitted += seeds.len();

        tracing::info!(
            "Processing {} of {} listed pages",
            seeds.len(),
            urls.len()
        );

        self.run(seeds, report).await
    }

    async fn run(
        &self,
        seeds: Vec<QueuedPage>,
        report: &mut CrawlReport,
    ) -> Result<(), TrawlError> {
        let options = self.session.options();
        let semaphore = Arc::new(Semaphore::new(options.concurrency.max(1)));
        let mut pending: VecDeque<QueuedPage> = seeds.into();
        let mut tasks: JoinSet<PageResult> = JoinSet::new();
        let mut finished = 0usize;

        loop {
            // Fill free slots from the queue.
            while !pending.is_empty() {
                if self.session.is_cancelled() {
                    tracing::debug!("Cancelled; {} queued pages not started", pending.len());
                    pending.clear();
                    break;
                }

                if self.session.limit_reached() {
                    tracing::info!("Page limit of {} reached", options.limit);
                    pending.clear();
                    break;
                }

                let Ok(permit) = Arc::clone(&semaphore).try_acquire_owned() else {
                    break;
                };

                let Some(page) = pending.pop_front() else {
                    break;
                };

                let session = Arc::clone(&self.session);
                let pipeline = self.pipeline.clone();
                tasks.spawn(async move {
                    let result = process_page(&session, &pipeline, page).await;
                    drop(permit);
                    result
                });
            }

            let Some(joined) = tasks.join_next().await else {
                break;
            };

            finished += 1;
            let result = match joined {
                Ok(result) => result,
                Err(e) => {
                    tracing::warn!("Page task aborted: {}", e);
                    report.failed += 1;
                    continue;
                }
            };

            tracing::debug!("{} -> {}", result.url, result.outcome);
            report.record(result.outcome, result.rendered);

            let next_depth = result.depth + 1;
            if !result.links.is_empty()
                && next_depth <= options.max_depth
                && !self.session.is_cancelled()
            {
                for link in &result.links {
                    if let Some(url) = self.session.admit(link) {
                        report.links_admitted += 1;
                        pending.push_back(QueuedPage {
                            url,
                            depth: next_depth,
                            follow_links: true,
                        });
                    }
                }
            }

            if finished % PROGRESS_INTERVAL == 0 {
                tracing::info!(
                    "Progress: {} pages finished, {} processed, {} queued, {} in flight",
                    finished,
                    self.session.processed(),
                    pending.len(),
                    tasks.len()
                );
            }
        }

        if self.session.is_cancelled() {
            report.cancelled = true;
            tracing::info!(
                "Run cancelled after {} pages ({} processed)",
                finished,
                self.session.processed()
            );
            return Err(TrawlError::Cancelled);
        }

        tracing::info!(
            "Crawl finished: {} pages, {} processed",
            finished,
            self.session.processed()
        );
        Ok(())
    }
}

/// Runs one page through fetch, classification, conversion, and write
async fn process_page(session: &CrawlSession, pipeline: &Pipeline, page: QueuedPage) -> PageResult {
    let QueuedPage {
        url,
        depth,
        follow_links,
    } = page;

    let mut result = PageResult {
        url: url.clone(),
        depth,
        outcome: PageOutcome::Failed,
        rendered: false,
        links: Vec::new(),
    };

    match process_page_inner(session, pipeline, &url, follow_links, &mut result).await {
        Ok(outcome) => result.outcome = outcome,
        Err(e) => {
            tracing::warn!("Skipping {}: {}", url, e);
            result.outcome = PageOutcome::Failed;
        }
    }

    if !result.outcome.follows_links() {
        result.links.clear();
    }
    result
}

async fn process_page_inner(
    session: &CrawlSession,
    pipeline: &Pipeline,
    url: &Url,
    follow_links: bool,
    result: &mut PageResult,
) -> Result<PageOutcome, PageError> {
    let options = session.options();

    if session.is_cancelled() {
        return Ok(PageOutcome::Cancelled);
    }

    let response = with_timeout(
        url,
        "fetch",
        options.fetch_timeout,
        pipeline.fetcher.get(url),
    )
    .await?;

    // A redirect lands on another page: admit it like a link so two
    // redirecting URLs never produce the same document twice.
    let page_url = if response.final_url.as_str() != url.as_str() {
        match normalize_url(response.final_url.as_str()) {
            Ok(target) if target == *url => target,
            Ok(target) if session.admit_redirect(&target) => {
                tracing::debug!("{} redirected to {}", url, target);
                target
            }
            _ => {
                tracing::debug!(
                    "Skipping {}: redirected to {}",
                    url,
                    response.final_url
                );
                return Ok(PageOutcome::SkippedRedirect);
            }
        }
    } else {
        url.clone()
    };
    let url = &page_url;

    if !response.is_html() {
        tracing::debug!("Skipping {}: content type '{}'", url, response.content_type);
        return Ok(PageOutcome::NotHtml);
    }

    let mut html = response.body;
    let mut verdict = options.thresholds.classify(&html);

    if options.force_render || verdict.needs_render {
        if let Some(rendered) = render(session, pipeline, url, verdict).await {
            html = rendered;
            verdict = options.thresholds.classify(&html);
            result.rendered = true;
        }
    }

    if verdict.is_empty_or_error {
        tracing::debug!("Skipping {}: empty or error page", url);
        return Ok(PageOutcome::SkippedEmpty);
    }

    if follow_links {
        result.links = extract_links(&html, &response.final_url);
    }

    if !options.force && !options.dry_run && pipeline.writer.exists(url).await {
        tracing::debug!("Skipping {}: already written", url);
        return Ok(PageOutcome::SkippedExisting);
    }

    if !session.try_reserve_write() {
        return Ok(PageOutcome::LimitReached);
    }

    let outcome = convert_and_write(session, pipeline, url, &html, result.rendered).await;
    session.finish_write(outcome.is_ok());
    outcome
}

/// Renders a page, returning None when no renderer is configured, the run
/// was cancelled, or rendering failed
async fn render(
    session: &CrawlSession,
    pipeline: &Pipeline,
    url: &Url,
    verdict: ClassificationVerdict,
) -> Option<String> {
    let Some(renderer) = &pipeline.renderer else {
        if verdict.needs_render {
            tracing::debug!("{} looks client-rendered but no renderer is configured", url);
        }
        return None;
    };

    if session.is_cancelled() {
        return None;
    }

    let options = &session.options().render;
    match with_timeout(url, "render", options.timeout, renderer.render(url, options)).await {
        Ok(html) => Some(html),
        Err(e) => {
            tracing::warn!("Render failed, keeping fetched body: {}", e);
            None
        }
    }
}

async fn convert_and_write(
    session: &CrawlSession,
    pipeline: &Pipeline,
    url: &Url,
    html: &str,
    rendered: bool,
) -> Result<PageOutcome, PageError> {
    let options = session.options();

    let mut document = pipeline.converter.convert(html, url).await?;
    document.rendered = rendered;

    if options.dry_run {
        tracing::info!("[dry run] {}", url);
        return Ok(PageOutcome::Converted);
    }

    with_timeout(
        url,
        "write",
        options.write_timeout,
        pipeline.writer.write(&document),
    )
    .await?;

    tracing::info!("Wrote {}", url);
    Ok(PageOutcome::Written)
}

//! Capabilities the crawl engine consumes
//!
//! Fetching, rendering, converting, and writing are collaborators of the
//! engine, not part of it. Each one is a narrow async trait so strategies can
//! be driven by the bundled implementations ([`HttpFetcher`],
//! [`HtmlConverter`], [`MarkdownWriter`]) or by test doubles.
//!
//! Implementations must tolerate concurrent calls: every worker of a crawl
//! shares the same instances.
//!
//! [`HttpFetcher`]: crate::crawler::HttpFetcher
//! [`HtmlConverter`]: crate::output::HtmlConverter
//! [`MarkdownWriter`]: crate::output::MarkdownWriter

use crate::PageError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Body and metadata returned by a fetch
#[derive(Debug, Clone)]
pub struct FetchResponse {
    /// URL the body was served from, after redirects
    pub final_url: Url,

    pub body: String,

    /// Content-Type header value (empty when absent)
    pub content_type: String,

    /// Served from a cache rather than the network
    pub from_cache: bool,
}

impl FetchResponse {
    /// Returns true if the body is HTML (or carries no content type at all)
    pub fn is_html(&self) -> bool {
        let content_type = self.content_type.to_ascii_lowercase();
        content_type.is_empty()
            || content_type.contains("text/html")
            || content_type.contains("application/xhtml")
    }
}

/// Options for a render call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Upper bound for one render call
    pub timeout: Duration,

    /// Wait until the DOM stops changing before capturing
    pub wait_stable: bool,

    /// Scroll to the bottom to trigger lazy-loaded content
    pub scroll_to_end: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(60),
            wait_stable: true,
            scroll_to_end: false,
        }
    }
}

/// A converted page, ready to be written
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub url: Url,
    pub title: Option<String>,

    /// Markdown body
    pub content: String,

    pub fetched_at: DateTime<Utc>,

    /// The body came from the renderer rather than a plain fetch
    pub rendered: bool,
}

/// Retrieves raw page bodies
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn get(&self, url: &Url) -> Result<FetchResponse, PageError>;
}

/// Renders a page in a headless browser and returns the resulting HTML
#[async_trait]
pub trait Renderer: Send + Sync {
    async fn render(&self, url: &Url, options: &RenderOptions) -> Result<String, PageError>;
}

/// Turns fetched HTML into a [`Document`]
#[async_trait]
pub trait Converter: Send + Sync {
    async fn convert(&self, html: &str, url: &Url) -> Result<Document, PageError>;
}

/// Persists documents
#[async_trait]
pub trait Writer: Send + Sync {
    async fn write(&self, document: &Document) -> Result<(), PageError>;

    /// Returns true if a document for this URL was already written
    async fn exists(&self, url: &Url) -> bool;
}

/// The set of collaborators one run is driven with
#[derive(Clone)]
pub struct Pipeline {
    pub fetcher: Arc<dyn Fetcher>,
    pub renderer: Option<Arc<dyn Renderer>>,
    pub converter: Arc<dyn Converter>,
    pub writer: Arc<dyn Writer>,
}

impl Pipeline {
    pub fn new(
        fetcher: Arc<dyn Fetcher>,
        converter: Arc<dyn Converter>,
        writer: Arc<dyn Writer>,
    ) -> Self {
        Self {
            fetcher,
            renderer: None,
            converter,
            writer,
        }
    }

    /// Adds a renderer for pages classified as application shells
    pub fn with_renderer(mut self, renderer: Arc<dyn Renderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("renderer", &self.renderer.is_some())
            .finish_non_exhaustive()
    }
}

/// Bounds one pipeline call, turning expiry into [`PageError::Timeout`]
pub(crate) async fn with_timeout<T, F>(
    url: &Url,
    stage: &'static str,
    limit: Duration,
    future: F,
) -> Result<T, PageError>
where
    F: Future<Output = Result<T, PageError>>,
{
    match tokio::time::timeout(limit, future).await {
        Ok(result) => result,
        Err(_) => Err(PageError::Timeout {
            url: url.to_string(),
            stage,
            secs: limit.as_secs(),
        }),
    }
}

//! HTTP fetcher implementation
//!
//! This module handles all plain HTTP requests of a run:
//! - Building the HTTP client with the configured user agent and timeouts
//! - GET requests for pages and discovery manifests
//! - Error classification into per-page errors

use crate::config::FetchConfig;
use crate::pipeline::{FetchResponse, Fetcher};
use crate::PageError;
use async_trait::async_trait;
use reqwest::{redirect::Policy, Client};
use std::time::Duration;
use url::Url;

/// Maximum redirect hops followed per request
const MAX_REDIRECTS: usize = 10;

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use docs_trawl::config::FetchConfig;
/// use docs_trawl::crawler::build_http_client;
///
/// let client = build_http_client(&FetchConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &FetchConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

/// [`Fetcher`] backed by `reqwest`
///
/// No retries and no caching happen here; `from_cache` is always false.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds a fetcher from the fetch configuration
    pub fn from_config(config: &FetchConfig) -> Result<Self, reqwest::Error> {
        Ok(Self::new(build_http_client(config)?))
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    /// Fetches a URL
    ///
    /// | Condition | Result |
    /// |-----------|--------|
    /// | 2xx | `Ok(FetchResponse)` |
    /// | Other status | `PageError::Status` |
    /// | Timeout | `PageError::Timeout` |
    /// | Connect / body / redirect failure | `PageError::Fetch` |
    async fn get(&self, url: &Url) -> Result<FetchResponse, PageError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| classify_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PageError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let final_url = response.url().clone();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        let body = response.text().await.map_err(|e| classify_error(url, e))?;

        tracing::trace!("Fetched {} ({} bytes, {})", final_url, body.len(), content_type);

        Ok(FetchResponse {
            final_url,
            body,
            content_type,
            from_cache: false,
        })
    }
}

fn classify_error(url: &Url, error: reqwest::Error) -> PageError {
    if error.is_timeout() {
        PageError::Timeout {
            url: url.to_string(),
            stage: "fetch",
            secs: 0,
        }
    } else if error.is_connect() {
        PageError::Fetch {
            url: url.to_string(),
            message: "connection refused".to_string(),
        }
    } else if error.is_redirect() {
        PageError::Fetch {
            url: url.to_string(),
            message: format!("redirect limit of {} exceeded", MAX_REDIRECTS),
        }
    } else {
        PageError::Fetch {
            url: url.to_string(),
            message: error.to_string(),
        }
    }
}

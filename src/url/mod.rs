//! URL handling module for docs-trawl
//!
//! This module provides URL normalization, host comparison, and the
//! exclusion/prefix rules that decide which discovered URLs belong to a run.

mod domain;
mod filter;
mod normalize;

use std::collections::HashSet;
use url::Url;

// Re-export main functions
pub use domain::{extract_host, same_host};
pub use filter::{ExcludeRules, PrefixFilter};
pub use normalize::{normalize_url, resolve_and_normalize};

/// Static admission rules of a run
///
/// Everything here is immutable after construction; the per-run mutable
/// state (seen-set, counters) lives in the crawl session.
#[derive(Debug, Clone)]
pub struct UrlFilter {
    base: Url,
    exclude: ExcludeRules,
    prefix: Option<PrefixFilter>,
}

impl UrlFilter {
    /// Creates a filter rooted at `base`
    ///
    /// Invalid exclude patterns are dropped with a warning.
    pub fn new(base: Url, exclude: &[String], filter_url: Option<&str>) -> Self {
        Self {
            base,
            exclude: ExcludeRules::compile(exclude),
            prefix: filter_url.and_then(PrefixFilter::parse),
        }
    }

    /// The base URL used for same-host checks and relative resolution
    pub fn base(&self) -> &Url {
        &self.base
    }

    pub fn exclude_rules(&self) -> &ExcludeRules {
        &self.exclude
    }

    /// Checks the static rules: same host, not excluded, shares the prefix
    pub fn accepts(&self, url: &Url) -> bool {
        if !same_host(&self.base, url) {
            return false;
        }

        if self.exclude.is_excluded(url.as_str()) {
            return false;
        }

        match &self.prefix {
            Some(prefix) => prefix.allows(url),
            None => true,
        }
    }

    /// Resolves, normalizes, filters, and deduplicates raw references
    ///
    /// Order of first appearance is preserved. References that fail to
    /// resolve are dropped silently.
    ///
    /// # Examples
    ///
    /// ```
    /// use docs_trawl::url::UrlFilter;
    /// use url::Url;
    ///
    /// let base = Url::parse("https://example.com/").unwrap();
    /// let filter = UrlFilter::new(base, &["/blog".to_string()], None);
    /// let urls = filter.filter_discovered([
    ///     "/docs/a",
    ///     "https://example.com/docs/a/",
    ///     "/blog/post",
    ///     "https://other.com/docs/b",
    /// ]);
    /// assert_eq!(urls.len(), 1);
    /// assert_eq!(urls[0].as_str(), "https://example.com/docs/a");
    /// ```
    pub fn filter_discovered<I, S>(&self, raw: I) -> Vec<Url>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let mut urls = Vec::new();

        for reference in raw {
            let reference = reference.as_ref();
            let url = match resolve_and_normalize(reference, &self.base) {
                Ok(url) => url,
                Err(e) => {
                    tracing::debug!("Dropping reference '{}': {}", reference, e);
                    continue;
                }
            };

            if !self.accepts(&url) {
                continue;
            }

            if seen.insert(url.as_str().to_string()) {
                urls.push(url);
            }
        }

        urls
    }
}

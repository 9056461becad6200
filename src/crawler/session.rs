//! Per-run crawl session
//!
//! A session holds everything a run shares between its workers: the static
//! admission rules, the effective options, the cancellation token, and the
//! single lock guarding the seen-set and page counters.

use crate::config::CrawlOptions;
use crate::url::{normalize_url, UrlFilter};
use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};
use tokio_util::sync::CancellationToken;
use url::Url;

#[derive(Debug, Default)]
struct SessionState {
    /// Normalized URLs already admitted in this run
    seen: HashSet<String>,

    /// Pages that completed processing (written, or converted in a dry run)
    processed: usize,

    /// Write slots handed out but not yet committed
    reserved: usize,
}

/// Shared state of one extraction run
///
/// Created once per run and shared by `Arc` between all workers. Nothing in
/// here outlives the run.
#[derive(Debug)]
pub struct CrawlSession {
    filter: UrlFilter,
    options: CrawlOptions,
    cancel: CancellationToken,
    state: Mutex<SessionState>,
}

impl CrawlSession {
    /// Creates a session rooted at `root`
    ///
    /// Exclusion patterns that fail to compile are dropped with a warning.
    pub fn new(root: Url, options: CrawlOptions, cancel: CancellationToken) -> Self {
        let filter = UrlFilter::new(root, &options.exclude, options.filter_url.as_deref());

        let dropped = options.exclude.len() - filter.exclude_rules().len();
        if dropped > 0 {
            tracing::warn!("{} exclusion pattern(s) ignored", dropped);
        }

        Self {
            filter,
            options,
            cancel,
            state: Mutex::new(SessionState::default()),
        }
    }

    pub fn root(&self) -> &Url {
        self.filter.base()
    }

    pub fn filter(&self) -> &UrlFilter {
        &self.filter
    }

    pub fn options(&self) -> &CrawlOptions {
        &self.options
    }

    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Decides whether a discovered link enters the run
    ///
    /// Returns false for an empty or unparseable link, another host
    /// (subdomains included), an excluded URL, a URL outside the prefix
    /// filter, an exhausted page limit, or a URL already seen. Otherwise the
    /// URL is marked seen under the same lock and true is returned, so two
    /// workers racing on one link admit it exactly once.
    pub fn should_admit(&self, link: &str) -> bool {
        self.admit(link).is_some()
    }

    /// Same as [`should_admit`](Self::should_admit), returning the normalized
    /// URL that was marked seen
    pub fn admit(&self, link: &str) -> Option<Url> {
        let link = link.trim();
        if link.is_empty() {
            return None;
        }

        let url = match normalize_url(link) {
            Ok(url) => url,
            Err(e) => {
                tracing::debug!("Rejecting '{}': {}", link, e);
                return None;
            }
        };

        if !self.filter.accepts(&url) {
            tracing::debug!("Rejecting {}: outside admission rules", url);
            return None;
        }

        let mut state = self.lock();
        if self.options.limit_reached(state.processed) {
            return None;
        }
        state.seen.insert(url.as_str().to_string()).then_some(url)
    }

    /// Marks the root page seen, bypassing the exclusion and prefix rules
    ///
    /// Returns false if the root was already admitted.
    pub fn admit_root(&self, root: &Url) -> bool {
        let key = normalize_url(root.as_str())
            .map(|url| url.to_string())
            .unwrap_or_else(|_| root.to_string());
        self.lock().seen.insert(key)
    }

    /// Admits the target of a redirect
    ///
    /// The target must pass the same host, exclusion and prefix rules as a
    /// discovered link and must not have been seen; it is marked seen under
    /// the lock. The page limit is not checked here since the redirecting
    /// page was already admitted.
    pub fn admit_redirect(&self, target: &Url) -> bool {
        let url = match normalize_url(target.as_str()) {
            Ok(url) => url,
            Err(e) => {
                tracing::debug!("Rejecting redirect to '{}': {}", target, e);
                return false;
            }
        };

        if !self.filter.accepts(&url) {
            tracing::debug!("Rejecting redirect to {}: outside admission rules", url);
            return false;
        }

        self.lock().seen.insert(url.as_str().to_string())
    }

    /// Reserves a write slot under the page limit
    ///
    /// Every successful reservation must be followed by exactly one
    /// [`finish_write`](Self::finish_write).
    pub fn try_reserve_write(&self) -> bool {
        let mut state = self.lock();
        if self.options.limit_reached(state.processed + state.reserved) {
            return false;
        }
        state.reserved += 1;
        true
    }

    /// Releases a reserved slot, counting the page when it completed
    pub fn finish_write(&self, completed: bool) {
        let mut state = self.lock();
        state.reserved = state.reserved.saturating_sub(1);
        if completed {
            state.processed += 1;
        }
    }

    /// Pages that completed processing so far
    pub fn processed(&self) -> usize {
        self.lock().processed
    }

    /// Distinct URLs admitted so far
    pub fn seen_count(&self) -> usize {
        self.lock().seen.len()
    }

    pub fn limit_reached(&self) -> bool {
        self.options.limit_reached(self.lock().processed)
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        // The state stays consistent even if a holder panicked mid-update:
        // every critical section is a single insert or counter change.
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn session(options: CrawlOptions) -> CrawlSession {
        CrawlSession::new(
            Url::parse("https://example.com/").unwrap(),
            options,
            CancellationToken::new(),
        )
    }

    #[test]
    fn test_admits_once() {
        let s = session(CrawlOptions::default());
        assert!(s.should_admit("https://example.com/docs"));
        assert!(!s.should_admit("https://example.com/docs"));
        assert!(!s.should_admit("https://example.com/docs/#intro"));
        assert_eq!(s.seen_count(), 1);
    }

    #[test]
    fn test_concurrent_admission_of_same_link() {
        let s = Arc::new(session(CrawlOptions::default()));
        let handles: Vec<_> = (0..16)
            .map(|_| {
                let s = Arc::clone(&s);
                std::thread::spawn(move || s.should_admit("https://example.com/shared"))
            })
            .collect();

        let admitted = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|admitted| *admitted)
            .count();
        assert_eq!(admitted, 1);
    }

    #[test]
    fn test_rejects_empty_and_foreign_hosts() {
        let s = session(CrawlOptions::default());
        assert!(!s.should_admit(""));
        assert!(!s.should_admit("   "));
        assert!(!s.should_admit("https://docs.example.com/guide"));
        assert!(!s.should_admit("https://other.org/"));
        assert!(!s.should_admit("ftp://example.com/file"));
    }

    #[test]
    fn test_exclude_patterns_and_invalid_pattern() {
        let options = CrawlOptions {
            exclude: vec!["/blog".to_string(), "([unclosed".to_string()],
            ..Default::default()
        };
        let s = session(options);
        assert_eq!(s.filter().exclude_rules().len(), 1);
        assert!(!s.should_admit("https://example.com/blog/post"));
        assert!(s.should_admit("https://example.com/docs/post"));
    }

    #[test]
    fn test_prefix_filter() {
        let options = CrawlOptions {
            filter_url: Some("/docs".to_string()),
            ..Default::default()
        };
        let s = session(options);
        assert!(s.should_admit("https://example.com/docs/intro"));
        assert!(!s.should_admit("https://example.com/pricing"));
    }

    #[test]
    fn test_limit_stops_admission_and_reservations() {
        let options = CrawlOptions {
            limit: 2,
            ..Default::default()
        };
        let s = session(options);

        assert!(s.try_reserve_write());
        assert!(s.try_reserve_write());
        assert!(!s.try_reserve_write());

        s.finish_write(true);
        s.finish_write(false);
        assert_eq!(s.processed(), 1);
        assert!(s.should_admit("https://example.com/a"));

        assert!(s.try_reserve_write());
        s.finish_write(true);
        assert!(s.limit_reached());
        assert!(!s.should_admit("https://example.com/b"));
        assert!(!s.try_reserve_write());
    }

    #[test]
    fn test_unlimited() {
        let s = session(CrawlOptions::default());
        for _ in 0..1_000 {
            assert!(s.try_reserve_write());
            s.finish_write(true);
        }
        assert!(!s.limit_reached());
    }

    #[test]
    fn test_admit_root_bypasses_filters() {
        let options = CrawlOptions {
            exclude: vec![".*".to_string()],
            ..Default::default()
        };
        let s = session(options);
        let root = s.root().clone();
        assert!(s.admit_root(&root));
        assert!(!s.admit_root(&root));
        assert!(!s.should_admit(root.as_str()));
    }

    #[test]
    fn test_redirect_targets_are_admitted_once() {
        let options = CrawlOptions {
            exclude: vec!["/private/".to_string()],
            ..Default::default()
        };
        let s = session(options);
        assert!(s.should_admit("https://example.com/old"));

        let target = Url::parse("https://example.com/new/").unwrap();
        assert!(s.admit_redirect(&target));
        assert!(!s.admit_redirect(&target));
        assert!(!s.should_admit("https://example.com/new"));

        let seen = Url::parse("https://example.com/old#top").unwrap();
        assert!(!s.admit_redirect(&seen));

        let foreign = Url::parse("https://other.org/new").unwrap();
        assert!(!s.admit_redirect(&foreign));
        let excluded = Url::parse("https://example.com/private/page").unwrap();
        assert!(!s.admit_redirect(&excluded));
        assert_eq!(s.seen_count(), 2);
    }

    #[test]
    fn test_cancellation_is_visible() {
        let s = session(CrawlOptions::default());
        assert!(!s.is_cancelled());
        s.cancel_token().cancel();
        assert!(s.is_cancelled());
    }
}

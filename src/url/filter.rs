//! Exclusion and prefix rules applied to every candidate URL

use regex::Regex;
use url::Url;

/// Compiled exclusion patterns
///
/// A URL is excluded when any pattern matches anywhere in its normalized
/// string form, so `"/blog"` excludes every URL containing `/blog`.
#[derive(Debug, Clone, Default)]
pub struct ExcludeRules {
    patterns: Vec<Regex>,
}

impl ExcludeRules {
    /// Compiles the given patterns
    ///
    /// Invalid patterns are dropped with a warning; they never fail the run.
    pub fn compile(patterns: &[String]) -> Self {
        let patterns = patterns
            .iter()
            .filter_map(|pattern| match Regex::new(pattern) {
                Ok(re) => Some(re),
                Err(e) => {
                    tracing::warn!("Dropping invalid exclude pattern '{}': {}", pattern, e);
                    None
                }
            })
            .collect();

        Self { patterns }
    }

    /// Returns true if any pattern matches the URL
    pub fn is_excluded(&self, url: &str) -> bool {
        self.patterns.iter().any(|re| re.is_match(url))
    }

    /// Number of patterns that compiled successfully
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

/// URL-prefix filter
///
/// Either a path prefix (`/docs`) compared against the URL path, or an
/// absolute URL prefix compared against the whole normalized URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrefixFilter {
    Path(String),
    Absolute(String),
}

impl PrefixFilter {
    /// Parses a configured filter; blank filters mean "no filter"
    pub fn parse(filter: &str) -> Option<Self> {
        let filter = filter.trim();
        if filter.is_empty() {
            return None;
        }

        if filter.starts_with('/') {
            return Some(Self::Path(filter.to_string()));
        }

        // Absolute filters go through the same normalization as candidates,
        // so "https://x.com/docs/" and "https://x.com/docs" behave the same.
        let prefix = super::normalize_url(filter)
            .map(|u| u.to_string())
            .unwrap_or_else(|_| filter.to_string());
        Some(Self::Absolute(prefix))
    }

    /// Returns true if the URL shares the prefix
    pub fn allows(&self, url: &Url) -> bool {
        match self {
            Self::Path(prefix) => url.path().starts_with(prefix.as_str()),
            Self::Absolute(prefix) => url.as_str().starts_with(prefix.as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_exclude_substring_pattern() {
        let rules = ExcludeRules::compile(&["/blog".to_string()]);
        assert!(rules.is_excluded("https://example.com/blog/post-1"));
        assert!(rules.is_excluded("https://example.com/en/blog"));
        assert!(!rules.is_excluded("https://example.com/docs/intro"));
    }

    #[test]
    fn test_exclude_regex_pattern() {
        let rules = ExcludeRules::compile(&[r"\.pdf$".to_string(), "/v[0-9]+/".to_string()]);
        assert!(rules.is_excluded("https://example.com/manual.pdf"));
        assert!(rules.is_excluded("https://example.com/v2/guide"));
        assert!(!rules.is_excluded("https://example.com/guide"));
    }

    #[test]
    fn test_invalid_pattern_dropped_others_kept() {
        let rules = ExcludeRules::compile(&[
            "([unclosed".to_string(),
            "/blog".to_string(),
            "*bad".to_string(),
        ]);
        assert_eq!(rules.len(), 1);
        assert!(rules.is_excluded("https://example.com/blog/x"));
        assert!(!rules.is_excluded("https://example.com/docs"));
    }

    #[test]
    fn test_empty_rules_exclude_nothing() {
        let rules = ExcludeRules::compile(&[]);
        assert!(rules.is_empty());
        assert!(!rules.is_excluded("https://example.com/anything"));
    }

    #[test]
    fn test_path_prefix() {
        let filter = PrefixFilter::parse("/docs").unwrap();
        assert!(filter.allows(&url("https://example.com/docs")));
        assert!(filter.allows(&url("https://example.com/docs/intro")));
        assert!(!filter.allows(&url("https://example.com/blog/docs")));
        assert!(!filter.allows(&url("https://example.com/")));
    }

    #[test]
    fn test_absolute_prefix_is_normalized() {
        let filter = PrefixFilter::parse("https://example.com/docs/").unwrap();
        assert_eq!(
            filter,
            PrefixFilter::Absolute("https://example.com/docs".to_string())
        );
        assert!(filter.allows(&url("https://example.com/docs/api")));
        assert!(!filter.allows(&url("https://example.com/api")));
    }

    #[test]
    fn test_blank_filter_is_none() {
        assert!(PrefixFilter::parse("   ").is_none());
    }
}

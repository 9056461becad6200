use std::fmt;

/// Terminal outcome of a page within one run
///
/// Every admitted page ends in exactly one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageOutcome {
    // ===== Success States =====
    /// Converted and handed to the writer
    Written,

    /// Converted; the writer was not invoked (dry run)
    Converted,

    // ===== Skip States =====
    /// A document for this URL already exists and `force` is off
    SkippedExisting,

    /// Classified as empty, placeholder, or error page
    SkippedEmpty,

    /// Content type is not HTML
    NotHtml,

    /// Redirected to a URL already seen or outside the admission rules
    SkippedRedirect,

    /// The page limit was exhausted before this page could be written
    LimitReached,

    /// The run was cancelled before this page was started
    Cancelled,

    // ===== Error States =====
    /// Fetch, render, convert, or write failed
    Failed,
}

impl PageOutcome {
    /// Returns true if the page counts toward the page limit
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Written | Self::Converted)
    }

    /// Returns true if the page was deliberately not written
    pub fn is_skipped(&self) -> bool {
        matches!(
            self,
            Self::SkippedExisting
                | Self::SkippedEmpty
                | Self::NotHtml
                | Self::SkippedRedirect
                | Self::LimitReached
        )
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Failed)
    }

    /// Returns true if the page's links may be followed
    ///
    /// Links of empty/error pages and non-HTML bodies are never followed.
    pub fn follows_links(&self) -> bool {
        matches!(
            self,
            Self::Written | Self::Converted | Self::SkippedExisting | Self::LimitReached
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Written => "written",
            Self::Converted => "converted",
            Self::SkippedExisting => "skipped_existing",
            Self::SkippedEmpty => "skipped_empty",
            Self::NotHtml => "not_html",
            Self::SkippedRedirect => "skipped_redirect",
            Self::LimitReached => "limit_reached",
            Self::Cancelled => "cancelled",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for PageOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_states() {
        assert!(PageOutcome::Written.is_success());
        assert!(PageOutcome::Converted.is_success());

        assert!(!PageOutcome::SkippedExisting.is_success());
        assert!(!PageOutcome::Failed.is_success());
    }

    #[test]
    fn test_skip_and_error_states_are_disjoint() {
        for outcome in [
            PageOutcome::Written,
            PageOutcome::Converted,
            PageOutcome::SkippedExisting,
            PageOutcome::SkippedEmpty,
            PageOutcome::NotHtml,
            PageOutcome::SkippedRedirect,
            PageOutcome::LimitReached,
            PageOutcome::Cancelled,
            PageOutcome::Failed,
        ] {
            let flags = [outcome.is_success(), outcome.is_skipped(), outcome.is_error()];
            assert!(flags.iter().filter(|f| **f).count() <= 1, "{outcome}");
        }
    }

    #[test]
    fn test_link_following() {
        assert!(PageOutcome::Written.follows_links());
        assert!(PageOutcome::SkippedExisting.follows_links());

        assert!(!PageOutcome::SkippedEmpty.follows_links());
        assert!(!PageOutcome::NotHtml.follows_links());
        assert!(!PageOutcome::SkippedRedirect.follows_links());
        assert!(!PageOutcome::Failed.follows_links());
        assert!(!PageOutcome::Cancelled.follows_links());
    }

    #[test]
    fn test_display() {
        assert_eq!(PageOutcome::SkippedEmpty.to_string(), "skipped_empty");
        assert_eq!(format!("{}", PageOutcome::Written), "written");
    }
}

//! Content quality classification of fetched HTML
//!
//! Two independent, stateless judgements are made about a page body before it
//! is converted:
//!
//! - [`needs_render`]: the body looks like a client-rendered application shell
//!   and should be retried through a renderer
//! - [`is_empty_or_error`]: the body is empty, a placeholder, or a boilerplate
//!   error page and should be skipped
//!
//! Both are heuristics. The thresholds below were chosen empirically and are
//! exposed through [`ClassifierThresholds`] so they can be tuned per run.

mod text;

use text::PageText;

/// Bodies shorter than this are assumed to need rendering
pub const RENDER_MIN_BYTES: usize = 500;

/// Visible text at or above this many characters outweighs an app-mount marker
pub const SUBSTANTIAL_TEXT_CHARS: usize = 200;

/// Bodies shorter than this are treated as empty
pub const ERROR_MIN_BYTES: usize = 100;

/// Pages with less visible text than this are checked for error signatures
pub const SHORT_TEXT_CHARS: usize = 500;

/// Element ids used by common single-page-app frameworks as their mount point
pub const SPA_ROOT_IDS: &[&str] = &[
    "root", "app", "__next", "__nuxt", "___gatsby", "svelte", "q-app",
];

/// Markup that only appears in client-rendered application shells
pub const SPA_ROOT_ELEMENTS: &[&str] = &["<app-root", "data-reactroot", "<flt-glass-pane"];

/// HTTP status words that show up on boilerplate error pages
pub const ERROR_STATUS_WORDS: &[&str] = &["301", "302", "403", "404", "500", "502", "503"];

/// Phrases that, together with a status word, identify an error page
pub const ERROR_PHRASES: &[&str] = &[
    "not found",
    "forbidden",
    "moved permanently",
    "moved temporarily",
    "service unavailable",
    "internal server error",
    "bad gateway",
    "access denied",
    "redirecting",
];

/// Result of classifying one fetched page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClassificationVerdict {
    /// The page should be retried through a renderer
    pub needs_render: bool,

    /// The page carries no usable content and should be skipped
    pub is_empty_or_error: bool,
}

/// Tunable thresholds of the classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassifierThresholds {
    pub render_min_bytes: usize,
    pub substantial_text_chars: usize,
    pub error_min_bytes: usize,
    pub short_text_chars: usize,
}

impl Default for ClassifierThresholds {
    fn default() -> Self {
        Self {
            render_min_bytes: RENDER_MIN_BYTES,
            substantial_text_chars: SUBSTANTIAL_TEXT_CHARS,
            error_min_bytes: ERROR_MIN_BYTES,
            short_text_chars: SHORT_TEXT_CHARS,
        }
    }
}

impl ClassifierThresholds {
    /// Computes both judgements, parsing the document once
    pub fn classify(&self, html: &str) -> ClassificationVerdict {
        let page = PageText::analyze(html);
        let verdict = ClassificationVerdict {
            needs_render: self.needs_render_with(html, &page),
            is_empty_or_error: self.is_empty_or_error_with(html, &page),
        };
        tracing::trace!(
            "Classified {} bytes ({} text chars): {:?}",
            html.len(),
            page.text_chars(),
            verdict
        );
        verdict
    }

    /// See [`needs_render`]
    pub fn needs_render(&self, html: &str) -> bool {
        if html.len() < self.render_min_bytes {
            return true;
        }
        self.needs_render_with(html, &PageText::analyze(html))
    }

    /// See [`is_empty_or_error`]
    pub fn is_empty_or_error(&self, html: &str) -> bool {
        if html.trim().len() < self.error_min_bytes {
            return true;
        }
        self.is_empty_or_error_with(html, &PageText::analyze(html))
    }

    fn needs_render_with(&self, html: &str, page: &PageText) -> bool {
        if html.len() < self.render_min_bytes {
            return true;
        }

        if page.is_blank() {
            return true;
        }

        has_mount_marker(html) && page.text_chars() < self.substantial_text_chars
    }

    fn is_empty_or_error_with(&self, html: &str, page: &PageText) -> bool {
        if html.trim().len() < self.error_min_bytes {
            return true;
        }

        // Covers documents that reduce to a title and an empty body.
        if page.is_blank() {
            return true;
        }

        page.text_chars() < self.short_text_chars && has_error_signature(page)
    }
}

/// Judges whether an HTML body is a client-rendered shell
///
/// True when the body is shorter than [`RENDER_MIN_BYTES`], when its visible
/// text is empty, or when it carries a single-page-app mount point without
/// substantial visible text.
///
/// # Examples
///
/// ```
/// use docs_trawl::classify::needs_render;
///
/// assert!(needs_render("<html><body><div id=\"root\"></div></body></html>"));
/// ```
pub fn needs_render(html: &str) -> bool {
    ClassifierThresholds::default().needs_render(html)
}

/// Judges whether an HTML body is empty or a boilerplate error page
///
/// True when the body is shorter than [`ERROR_MIN_BYTES`], when its visible
/// text is empty (e.g. a title and nothing else), or when a short page pairs
/// an HTTP status word with an error phrase. Pages with substantial prose are
/// never flagged, whatever numbers they mention.
///
/// # Examples
///
/// ```
/// use docs_trawl::classify::is_empty_or_error;
///
/// assert!(is_empty_or_error("<h1>404 Not Found</h1>"));
/// ```
pub fn is_empty_or_error(html: &str) -> bool {
    ClassifierThresholds::default().is_empty_or_error(html)
}

/// Classifies with the default thresholds
pub fn classify(html: &str) -> ClassificationVerdict {
    ClassifierThresholds::default().classify(html)
}

fn has_mount_marker(html: &str) -> bool {
    let lower = html.to_ascii_lowercase();

    let has_root_id = SPA_ROOT_IDS.iter().any(|id| {
        lower.contains(&format!("id=\"{}\"", id)) || lower.contains(&format!("id='{}'", id))
    });

    has_root_id || SPA_ROOT_ELEMENTS.iter().any(|marker| lower.contains(marker))
}

fn has_error_signature(page: &PageText) -> bool {
    let haystack = match page.title() {
        Some(title) => format!("{} {}", title, page.text()).to_lowercase(),
        None => page.text().to_lowercase(),
    };

    let has_status = haystack
        .split(|c: char| !c.is_ascii_alphanumeric())
        .any(|token| ERROR_STATUS_WORDS.contains(&token));

    has_status && ERROR_PHRASES.iter().any(|phrase| haystack.contains(phrase))
}

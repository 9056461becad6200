//! Link extraction from fetched pages
//!
//! Links come from `<a href>` and `<link rel="canonical">`. A `<base href>`
//! element, when present, replaces the page URL for relative resolution.
//! Skipped:
//! - `javascript:`, `mailto:`, `tel:`, `data:` references
//! - fragment-only anchors
//! - `<a download>` links
//! - anything that does not resolve to http(s)
//!
//! `rel="nofollow"` links are followed; they are often the only link to a
//! versioned docs page.

use scraper::{Html, Selector};
use url::Url;

const SKIPPED_SCHEMES: &[&str] = &["javascript:", "mailto:", "tel:", "data:"];

/// Extracts absolute http(s) link targets from a page, in document order
///
/// Duplicates are kept; admission deduplicates.
///
/// # Example
///
/// ```
/// use docs_trawl::crawler::extract_links;
/// use url::Url;
///
/// let html = r#"<html><body><a href="/guide">Guide</a></body></html>"#;
/// let page = Url::parse("https://example.com/docs/").unwrap();
/// assert_eq!(extract_links(html, &page), vec!["https://example.com/guide"]);
/// ```
pub fn extract_links(html: &str, page_url: &Url) -> Vec<String> {
    let document = Html::parse_document(html);
    let base = document_base(&document, page_url);

    let mut links = Vec::new();

    if let Ok(anchors) = Selector::parse("a[href]") {
        for element in document.select(&anchors) {
            if element.value().attr("download").is_some() {
                continue;
            }
            if let Some(link) = element.value().attr("href").and_then(|h| resolve(h, &base)) {
                links.push(link);
            }
        }
    }

    if let Ok(canonical) = Selector::parse("link[rel='canonical'][href]") {
        for element in document.select(&canonical) {
            if let Some(link) = element.value().attr("href").and_then(|h| resolve(h, &base)) {
                links.push(link);
            }
        }
    }

    links
}

/// Resolution base: the first `<base href>` if it resolves, else the page URL
fn document_base(document: &Html, page_url: &Url) -> Url {
    Selector::parse("base[href]")
        .ok()
        .and_then(|selector| {
            document
                .select(&selector)
                .next()
                .and_then(|element| element.value().attr("href"))
                .and_then(|href| page_url.join(href.trim()).ok())
        })
        .unwrap_or_else(|| page_url.clone())
}

fn resolve(href: &str, base: &Url) -> Option<String> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lower = href.to_ascii_lowercase();
    if SKIPPED_SCHEMES.iter().any(|scheme| lower.starts_with(scheme)) {
        return None;
    }

    let absolute = base.join(href).ok()?;
    matches!(absolute.scheme(), "http" | "https").then(|| absolute.to_string())
}

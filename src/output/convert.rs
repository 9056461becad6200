//! HTML to markdown conversion
//!
//! The main content region is located (`main`, `article`, `[role=main]`,
//! falling back to `body`), page chrome is stripped from it, and the rest is
//! converted with `htmd`.

use crate::pipeline::{Converter, Document};
use crate::PageError;
use async_trait::async_trait;
use chrono::Utc;
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Content regions, most specific first
const CONTENT_SELECTORS: &[&str] = &["main", "article", "[role='main']", "body"];

/// Chrome removed from the content region before conversion
const CHROME_SELECTORS: &[&str] = &[
    "script",
    "style",
    "noscript",
    "template",
    "iframe",
    "svg",
    "nav",
    "header",
    "footer",
    "aside",
    "[role='navigation']",
    ".sidebar",
    "#sidebar",
];

/// [`Converter`] producing markdown documents
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlConverter;

impl HtmlConverter {
    pub fn new() -> Self {
        Self
    }

    /// Converts synchronously; the async trait method delegates here
    pub fn convert_html(&self, html: &str, url: &Url) -> Result<Document, PageError> {
        let document = Html::parse_document(html);
        let title = page_title(&document);

        let region = content_region(&document)
            .map(strip_chrome)
            .unwrap_or_else(|| html.to_string());

        let markdown = htmd::convert(&region).map_err(|e| PageError::Convert {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        let content = tidy(&markdown);
        if content.is_empty() {
            return Err(PageError::Convert {
                url: url.to_string(),
                message: "no content left after conversion".to_string(),
            });
        }

        Ok(Document {
            url: url.clone(),
            title,
            content,
            fetched_at: Utc::now(),
            rendered: false,
        })
    }
}

#[async_trait]
impl Converter for HtmlConverter {
    async fn convert(&self, html: &str, url: &Url) -> Result<Document, PageError> {
        self.convert_html(html, url)
    }
}

/// `<title>`, else the first `<h1>`
fn page_title(document: &Html) -> Option<String> {
    ["title", "h1"].iter().find_map(|tag| {
        let selector = Selector::parse(tag).ok()?;
        document
            .select(&selector)
            .next()
            .map(|element| {
                element
                    .text()
                    .collect::<String>()
                    .split_whitespace()
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .filter(|s| !s.is_empty())
    })
}

fn content_region(document: &Html) -> Option<ElementRef<'_>> {
    CONTENT_SELECTORS.iter().find_map(|css| {
        let selector = Selector::parse(css).ok()?;
        document.select(&selector).next()
    })
}

/// Serialized content region with chrome elements cut out
fn strip_chrome(region: ElementRef<'_>) -> String {
    let mut html = region.html();
    for css in CHROME_SELECTORS {
        let Ok(selector) = Selector::parse(css) else {
            continue;
        };
        for element in region.select(&selector) {
            html = html.replace(&element.html(), "");
        }
    }
    html
}

/// Trims lines and collapses runs of blank lines
fn tidy(markdown: &str) -> String {
    let mut out = String::with_capacity(markdown.len());
    let mut blank_run = 0;

    for line in markdown.lines() {
        let line = line.trim_end();
        if line.trim().is_empty() {
            blank_run += 1;
            if blank_run > 1 {
                continue;
            }
        } else {
            blank_run = 0;
        }
        out.push_str(line);
        out.push('\n');
    }

    out.trim().to_string()
}

//! Sitemap XML parsing
//!
//! Supports both sitemap formats:
//!
//! - **Standard sitemap**: `<urlset>` with `<url><loc>` entries (pages)
//! - **Sitemap index**: `<sitemapindex>` with `<sitemap><loc>` entries
//!   pointing to child sitemaps
//!
//! Only `<loc>` is read; `lastmod`, `changefreq` and `priority` carry nothing
//! the extractor uses.

use super::probe::ProbeParse;
use crate::ProbeError;
use quick_xml::events::Event;
use quick_xml::Reader;

/// Which entry a `<loc>` currently belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Entry {
    Page,
    Sitemap,
}

/// Parses a sitemap or sitemap index
///
/// Fails if the document is not well-formed XML or its root element is
/// neither `<urlset>` nor `<sitemapindex>` (an HTML error page served with
/// status 200, for instance).
pub(crate) fn parse_sitemap(xml: &str) -> Result<ProbeParse, ProbeError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut parsed = ProbeParse::default();
    let mut buf = Vec::new();
    let mut saw_root = false;
    let mut entry: Option<Entry> = None;
    let mut in_loc = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).to_string();
                if saw_root {
                    match name.as_str() {
                        "url" => entry = Some(Entry::Page),
                        "sitemap" => entry = Some(Entry::Sitemap),
                        "loc" if entry.is_some() => in_loc = true,
                        _ => {}
                    }
                } else if name == "urlset" || name == "sitemapindex" {
                    saw_root = true;
                } else {
                    return Err(ProbeError::UnexpectedFormat(
                        "root element is not <urlset> or <sitemapindex>",
                    ));
                }
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"url" | b"sitemap" => entry = None,
                b"loc" => in_loc = false,
                _ => {}
            },
            Ok(Event::Text(e)) if in_loc => {
                let text = e.unescape().map_err(|e| ProbeError::Xml(e.to_string()))?;
                let loc = text.trim();
                if !loc.is_empty() {
                    match entry {
                        Some(Entry::Page) => parsed.pages.push(loc.to_string()),
                        Some(Entry::Sitemap) => parsed.sitemaps.push(loc.to_string()),
                        None => {}
                    }
                }
            }
            Ok(Event::CData(e)) if in_loc => {
                let loc = String::from_utf8_lossy(&e.into_inner()).trim().to_string();
                if !loc.is_empty() {
                    match entry {
                        Some(Entry::Page) => parsed.pages.push(loc),
                        Some(Entry::Sitemap) => parsed.sitemaps.push(loc),
                        None => {}
                    }
                }
            }
            Ok(Event::Empty(e)) if !saw_root => {
                // A self-closing root: valid, but lists nothing.
                let name = e.local_name();
                if name.as_ref() == b"urlset" || name.as_ref() == b"sitemapindex" {
                    saw_root = true;
                } else {
                    return Err(ProbeError::UnexpectedFormat(
                        "root element is not <urlset> or <sitemapindex>",
                    ));
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(ProbeError::Xml(format!("XML parse error: {e}"))),
            _ => {}
        }
        buf.clear();
    }

    if !saw_root {
        return Err(ProbeError::UnexpectedFormat("document has no root element"));
    }

    Ok(parsed)
}

//! Static search indexes emitted by documentation site generators
//!
//! Each generator ships a JSON file listing every page so its client-side
//! search can work offline. The formats differ only in where the page
//! location lives:
//!
//! | Generator | File | Page location |
//! |-----------|------|---------------|
//! | MkDocs | `search/search_index.json` | `docs[].location` |
//! | Docusaurus | `search-index.json` | `[].documents[].u` / `url` |
//! | Hugo | `index.json` | `[].permalink` / `url` / `uri` / `relpermalink` |
//! | Generic | `search.json` | array (possibly wrapped) of objects with a URL-ish key |
//! | VitePress | `hashmap.json` | object keys (`guide_intro.md`) |

use super::probe::ProbeParse;
use crate::ProbeError;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

/// Keys that carry a page location in Hugo and generic indexes
const HUGO_URL_KEYS: &[&str] = &["permalink", "url", "uri", "relpermalink", "relPermalink"];
const GENERIC_URL_KEYS: &[&str] = &["url", "href", "path", "permalink", "link", "location", "u"];

/// Wrapper keys generic indexes nest their entries under
const GENERIC_WRAPPER_KEYS: &[&str] = &["pages", "items", "docs", "documents", "results", "entries"];

#[derive(Debug, Deserialize)]
struct MkDocsIndex {
    docs: Vec<MkDocsEntry>,
}

#[derive(Debug, Deserialize)]
struct MkDocsEntry {
    location: String,
}

/// MkDocs: `{"config": {...}, "docs": [{"location": "guide/", ...}]}`
///
/// The empty location is the site index and is kept. Section anchors
/// (`guide/#install`) collapse onto their page during normalization.
pub(crate) fn parse_mkdocs(body: &str) -> Result<ProbeParse, ProbeError> {
    let index: MkDocsIndex = serde_json::from_str(body)?;
    let mut parsed = ProbeParse::default();
    for doc in index.docs {
        let location = doc.location.trim();
        if location.starts_with('#') {
            continue;
        }
        // "" is the site index; resolution against the base keeps it.
        parsed.push_page(if location.is_empty() { "./" } else { location });
    }
    Ok(parsed)
}

/// Docusaurus (search-local plugin): an array of index segments whose
/// `documents` carry `u` (or `url`)
pub(crate) fn parse_docusaurus(body: &str) -> Result<ProbeParse, ProbeError> {
    let value: Value = serde_json::from_str(body)?;
    let segments = value
        .as_array()
        .ok_or(ProbeError::UnexpectedFormat("expected a JSON array"))?;

    let mut parsed = ProbeParse::default();
    for segment in segments {
        let documents = segment
            .get("documents")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(std::slice::from_ref(segment));

        for document in documents {
            if let Some(location) = string_field(document, &["u", "url"]) {
                parsed.push_page(location);
            }
        }
    }
    Ok(parsed)
}

/// Hugo: a flat array of page objects
pub(crate) fn parse_hugo(body: &str) -> Result<ProbeParse, ProbeError> {
    let value: Value = serde_json::from_str(body)?;
    let entries = value
        .as_array()
        .ok_or(ProbeError::UnexpectedFormat("expected a JSON array"))?;

    let mut parsed = ProbeParse::default();
    for entry in entries {
        if let Some(location) = string_field(entry, HUGO_URL_KEYS) {
            parsed.push_page(location);
        }
    }
    Ok(parsed)
}

/// Generic `search.json`: an array of objects (or strings), either at the top
/// level or under a wrapper key
pub(crate) fn parse_generic(body: &str) -> Result<ProbeParse, ProbeError> {
    let value: Value = serde_json::from_str(body)?;

    let entries = match &value {
        Value::Array(entries) => entries,
        Value::Object(map) => GENERIC_WRAPPER_KEYS
            .iter()
            .find_map(|key| map.get(*key).and_then(Value::as_array))
            .ok_or(ProbeError::UnexpectedFormat("no page list in search index"))?,
        _ => return Err(ProbeError::UnexpectedFormat("expected a JSON array or object")),
    };

    let mut parsed = ProbeParse::default();
    for entry in entries {
        let location = match entry {
            Value::String(location) => Some(location.as_str()),
            _ => string_field(entry, GENERIC_URL_KEYS),
        };
        if let Some(location) = location {
            parsed.push_page(location);
        }
    }
    Ok(parsed)
}

/// VitePress: `{"guide_getting-started.md": "hash", ...}`
///
/// Keys are source paths with `/` flattened to `_`. They map back to routes:
/// `guide_intro.md` → `guide/intro`, `index.md` → `./`,
/// `guide_index.md` → `guide/`.
pub(crate) fn parse_vitepress(body: &str) -> Result<ProbeParse, ProbeError> {
    let map: HashMap<String, Value> = serde_json::from_str(body)?;

    let mut routes: Vec<String> = map.keys().filter_map(|key| vitepress_route(key)).collect();
    // HashMap order is random; keep the result stable.
    routes.sort();

    let mut parsed = ProbeParse::default();
    for route in &routes {
        parsed.push_page(route);
    }
    Ok(parsed)
}

fn vitepress_route(key: &str) -> Option<String> {
    let stem = key.strip_suffix(".md")?;
    let path = stem.replace('_', "/");

    if path == "index" {
        return Some("./".to_string());
    }
    match path.strip_suffix("/index") {
        Some(dir) => Some(format!("{dir}/")),
        None => Some(path),
    }
}

fn string_field<'a>(value: &'a Value, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .find_map(|key| value.get(*key).and_then(Value::as_str))
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

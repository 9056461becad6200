//! Structured page inventory discovery
//!
//! Before crawling a site link by link, a fixed, ranked list of cheap probes
//! is tried against the base URL: `llms.txt`, sitemaps, and the static search
//! indexes documentation generators emit. The first probe that parses and
//! yields at least one usable URL wins; no further probes run.
//!
//! ## Probe order
//!
//! | # | Path | Format |
//! |---|------|--------|
//! | 1 | `llms.txt` | markdown link list |
//! | 2 | `sitemap.xml` | sitemap / index |
//! | 3 | `sitemap-0.xml` | sitemap / index |
//! | 4 | `sitemap_index.xml` | sitemap / index |
//! | 5 | `search/search_index.json` | MkDocs |
//! | 6 | `search-index.json` | Docusaurus |
//! | 7 | `index.json` | Hugo |
//! | 8 | `search.json` | generic search index |
//! | 9 | `hashmap.json` | VitePress |
//!
//! Exhaustion is not an error: [`discover`] returns `None` and the caller
//! falls back to crawling.

mod llms;
mod probe;
mod search_index;
mod sitemap;

pub use probe::{ProbeKind, ProbeParse};

use crate::pipeline::{with_timeout, Fetcher};
use crate::url::UrlFilter;
use crate::{PageError, ProbeError};
use std::collections::VecDeque;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Maximum number of child sitemaps fetched while expanding an index
pub const MAX_CHILD_SITEMAPS: usize = 50;

/// Nesting depth of sitemap indexes that is still expanded
const MAX_INDEX_DEPTH: usize = 2;

/// One candidate inventory location
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiscoveryProbe {
    /// Path relative to the discovery base
    pub path: &'static str,

    pub kind: ProbeKind,

    /// Human-readable name for logs and reports
    pub name: &'static str,
}

/// All probes, in priority order
pub const DISCOVERY_PROBES: [DiscoveryProbe; 9] = [
    DiscoveryProbe {
        path: "llms.txt",
        kind: ProbeKind::LlmsTxt,
        name: "llms.txt",
    },
    DiscoveryProbe {
        path: "sitemap.xml",
        kind: ProbeKind::Sitemap,
        name: "sitemap.xml",
    },
    DiscoveryProbe {
        path: "sitemap-0.xml",
        kind: ProbeKind::Sitemap,
        name: "sitemap-0.xml",
    },
    DiscoveryProbe {
        path: "sitemap_index.xml",
        kind: ProbeKind::Sitemap,
        name: "sitemap_index.xml",
    },
    DiscoveryProbe {
        path: "search/search_index.json",
        kind: ProbeKind::MkDocs,
        name: "MkDocs search index",
    },
    DiscoveryProbe {
        path: "search-index.json",
        kind: ProbeKind::Docusaurus,
        name: "Docusaurus search index",
    },
    DiscoveryProbe {
        path: "index.json",
        kind: ProbeKind::Hugo,
        name: "Hugo index",
    },
    DiscoveryProbe {
        path: "search.json",
        kind: ProbeKind::SearchJson,
        name: "search.json",
    },
    DiscoveryProbe {
        path: "hashmap.json",
        kind: ProbeKind::VitePress,
        name: "VitePress hashmap",
    },
];

/// A successful discovery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Discovery {
    /// Normalized, same-host, deduplicated page URLs in manifest order
    pub urls: Vec<Url>,

    /// Name of the probe that produced them
    pub probe: &'static str,
}

/// Why a manifest could not be turned into page references
#[derive(Debug, Error)]
pub enum ManifestFailure {
    #[error(transparent)]
    Fetch(PageError),

    #[error(transparent)]
    Parse(ProbeError),

    #[error("cancelled")]
    Cancelled,
}

/// Directory URL the probe paths are resolved against
///
/// The root URL is treated as a directory: `https://example.com/docs`
/// probes `https://example.com/docs/llms.txt`. A last segment naming a page
/// file (`/docs/index.html`) is dropped instead; other dotted segments such
/// as a version (`/docs/3.12`) stay part of the directory.
pub fn probe_base(root: &Url) -> Url {
    let mut base = root.clone();
    base.set_query(None);
    base.set_fragment(None);

    let path = base.path().to_string();
    if !path.ends_with('/') {
        let last = path.rsplit('/').next().unwrap_or("");
        if is_page_file(last) {
            let dir = &path[..path.len() - last.len()];
            base.set_path(dir);
        } else {
            base.set_path(&format!("{}/", path));
        }
    }
    base
}

/// Extensions of server-side page files that never name a directory
const PAGE_EXTENSIONS: &[&str] = &["html", "htm", "xhtml", "php", "asp", "aspx", "jsp", "md"];

fn is_page_file(segment: &str) -> bool {
    let Some((stem, ext)) = segment.rsplit_once('.') else {
        return false;
    };
    !stem.is_empty() && PAGE_EXTENSIONS.iter().any(|known| ext.eq_ignore_ascii_case(known))
}

/// Runs the probes in order and returns the first non-empty inventory
///
/// References are resolved against [`probe_base`] of the filter's base,
/// then normalized, filtered, and deduplicated by `filter`. Fetch errors,
/// parse errors, and inventories that are empty after filtering all move on
/// to the next probe. Once `cancel` is raised no further probe is fetched and
/// `None` is returned.
pub async fn discover(
    fetcher: &dyn Fetcher,
    filter: &UrlFilter,
    timeout: Duration,
    cancel: &CancellationToken,
) -> Option<Discovery> {
    let base = probe_base(filter.base());
    tracing::info!("Probing {} for a page inventory", base);

    for probe in DISCOVERY_PROBES.iter() {
        let manifest = match base.join(probe.path) {
            Ok(url) => url,
            Err(e) => {
                tracing::debug!("Cannot build {} probe URL: {}", probe.name, e);
                continue;
            }
        };

        let collected =
            collect_manifest(fetcher, probe.kind, &manifest, &base, timeout, cancel).await;
        let references = match collected {
            Ok(references) => references,
            Err(ManifestFailure::Cancelled) => {
                tracing::debug!("Discovery cancelled before the {} probe", probe.name);
                return None;
            }
            Err(e) => {
                tracing::debug!("{} probe failed: {}", probe.name, e);
                continue;
            }
        };

        let urls = filter.filter_discovered(&references);
        if urls.is_empty() {
            tracing::debug!(
                "{} probe listed {} references, none usable",
                probe.name,
                references.len()
            );
            continue;
        }

        tracing::info!("Discovered {} pages via {}", urls.len(), probe.name);
        return Some(Discovery {
            urls,
            probe: probe.name,
        });
    }

    tracing::info!("Discovery exhausted for {}", base);
    None
}

/// Fetches and parses one manifest, returning absolute page references
///
/// Relative page references are resolved against `base`. Sitemap indexes are
/// expanded: child sitemaps (at most [`MAX_CHILD_SITEMAPS`]) are fetched and
/// their pages appended; a failing child is skipped. Cancellation is checked
/// before every fetch.
pub async fn collect_manifest(
    fetcher: &dyn Fetcher,
    kind: ProbeKind,
    manifest: &Url,
    base: &Url,
    timeout: Duration,
    cancel: &CancellationToken,
) -> Result<Vec<String>, ManifestFailure> {
    if cancel.is_cancelled() {
        return Err(ManifestFailure::Cancelled);
    }

    let response = with_timeout(manifest, "fetch", timeout, fetcher.get(manifest))
        .await
        .map_err(ManifestFailure::Fetch)?;

    let parsed = kind.parse(&response.body).map_err(ManifestFailure::Parse)?;

    let mut references = absolutize(&parsed.pages, base);
    if !parsed.sitemaps.is_empty() {
        let children = absolutize(&parsed.sitemaps, &response.final_url);
        references.extend(expand_sitemaps(fetcher, children, timeout, cancel).await);
        if cancel.is_cancelled() {
            return Err(ManifestFailure::Cancelled);
        }
    }

    Ok(references)
}

async fn expand_sitemaps(
    fetcher: &dyn Fetcher,
    children: Vec<String>,
    timeout: Duration,
    cancel: &CancellationToken,
) -> Vec<String> {
    let mut queue: VecDeque<(String, usize)> = children.into_iter().map(|c| (c, 1)).collect();
    let mut pages = Vec::new();
    let mut fetched = 0usize;

    while let Some((child, depth)) = queue.pop_front() {
        if cancel.is_cancelled() {
            break;
        }

        if fetched >= MAX_CHILD_SITEMAPS {
            tracing::warn!(
                "Sitemap index lists more than {} sitemaps; ignoring the rest",
                MAX_CHILD_SITEMAPS
            );
            break;
        }

        let Ok(url) = Url::parse(&child) else {
            continue;
        };
        fetched += 1;

        let response = match with_timeout(&url, "fetch", timeout, fetcher.get(&url)).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("Skipping child sitemap: {}", e);
                continue;
            }
        };

        match ProbeKind::Sitemap.parse(&response.body) {
            Ok(parsed) => {
                pages.extend(absolutize(&parsed.pages, &response.final_url));
                if depth < MAX_INDEX_DEPTH {
                    for nested in absolutize(&parsed.sitemaps, &response.final_url) {
                        queue.push_back((nested, depth + 1));
                    }
                }
            }
            Err(e) => tracing::warn!("Skipping child sitemap {}: {}", url, e),
        }
    }

    pages
}

fn absolutize(references: &[String], base: &Url) -> Vec<String> {
    references
        .iter()
        .filter_map(|reference| base.join(reference).ok())
        .map(String::from)
        .collect()
}

//! Markdown document writer
//!
//! Documents are written to `<dir>/<host>/<path>.md`, each starting with a
//! small YAML frontmatter block (title, url, fetched_at).

use crate::pipeline::{Document, Writer};
use crate::PageError;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use url::Url;

/// [`Writer`] storing one markdown file per page
#[derive(Debug, Clone)]
pub struct MarkdownWriter {
    root: PathBuf,
}

impl MarkdownWriter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Maps a page URL to its file
    ///
    /// | URL | File |
    /// |-----|------|
    /// | `https://example.com/` | `example.com/index.md` |
    /// | `https://example.com/docs/intro` | `example.com/docs/intro.md` |
    /// | `https://example.com/docs/intro.html` | `example.com/docs/intro.md` |
    /// | `http://localhost:8080/a?v=2` | `localhost_8080/a_v_2.md` |
    pub fn path_for(&self, url: &Url) -> PathBuf {
        let mut path = self.root.clone();

        let host = url.host_str().unwrap_or("unknown-host");
        match url.port() {
            Some(port) => path.push(format!("{}_{}", sanitize(host), port)),
            None => path.push(sanitize(host)),
        }

        let segments: Vec<String> = url
            .path_segments()
            .map(|segments| {
                segments
                    .filter(|s| !s.is_empty() && *s != "." && *s != "..")
                    .map(sanitize)
                    .collect()
            })
            .unwrap_or_default();

        let mut stem = match segments.split_last() {
            Some((last, dirs)) => {
                for dir in dirs {
                    path.push(dir);
                }
                strip_html_extension(last).to_string()
            }
            None => "index".to_string(),
        };

        if let Some(query) = url.query().filter(|q| !q.is_empty()) {
            stem.push('_');
            stem.push_str(&sanitize(query));
        }

        path.push(format!("{}.md", stem));
        path
    }
}

#[async_trait]
impl Writer for MarkdownWriter {
    async fn write(&self, document: &Document) -> Result<(), PageError> {
        let path = self.path_for(&document.url);
        let io_error = |e: std::io::Error| PageError::Write {
            url: document.url.to_string(),
            message: format!("{}: {}", path.display(), e),
        };

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(io_error)?;
        }
        tokio::fs::write(&path, render(document))
            .await
            .map_err(io_error)?;

        tracing::debug!("Wrote {}", path.display());
        Ok(())
    }

    async fn exists(&self, url: &Url) -> bool {
        tokio::fs::metadata(self.path_for(url)).await.is_ok()
    }
}

/// Frontmatter plus body
fn render(document: &Document) -> String {
    let mut out = String::from("---\n");
    if let Some(title) = &document.title {
        // A JSON string is a valid YAML scalar and escapes everything needed.
        let quoted = serde_json::to_string(title).unwrap_or_else(|_| "\"\"".to_string());
        out.push_str(&format!("title: {}\n", quoted));
    }
    out.push_str(&format!("url: {}\n", document.url));
    out.push_str(&format!(
        "fetched_at: {}\n",
        document.fetched_at.to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
    ));
    if document.rendered {
        out.push_str("rendered: true\n");
    }
    out.push_str("---\n\n");
    out.push_str(&document.content);
    out.push('\n');
    out
}

fn sanitize(segment: &str) -> String {
    segment
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

fn strip_html_extension(name: &str) -> &str {
    name.strip_suffix(".html")
        .or_else(|| name.strip_suffix(".htm"))
        .filter(|stem| !stem.is_empty())
        .unwrap_or(name)
}

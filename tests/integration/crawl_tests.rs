//! Integration tests for the extraction pipeline
//!
//! These tests use wiremock to create mock documentation sites and run the
//! dispatcher end-to-end with the real HTTP fetcher and HTML converter.

use async_trait::async_trait;
use docs_trawl::config::FetchConfig;
use docs_trawl::crawler::HttpFetcher;
use docs_trawl::output::{HtmlConverter, MarkdownWriter};
use docs_trawl::pipeline::RenderOptions;
use docs_trawl::{
    CrawlOptions, CrawlReport, Dispatcher, Document, PageError, Pipeline, Renderer, TrawlError,
    Writer,
};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Writer double remembering every document it was handed
#[derive(Default)]
struct RecordingWriter {
    documents: Mutex<Vec<Document>>,
}

impl RecordingWriter {
    fn paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self
            .documents
            .lock()
            .unwrap()
            .iter()
            .map(|d| d.url.path().to_string())
            .collect();
        paths.sort();
        paths
    }
}

#[async_trait]
impl Writer for RecordingWriter {
    async fn write(&self, document: &Document) -> Result<(), PageError> {
        self.documents.lock().unwrap().push(document.clone());
        Ok(())
    }

    async fn exists(&self, _url: &Url) -> bool {
        false
    }
}

/// Renderer double returning a fixed static page
struct StaticRenderer {
    html: String,
}

#[async_trait]
impl Renderer for StaticRenderer {
    async fn render(&self, _url: &Url, _options: &RenderOptions) -> Result<String, PageError> {
        Ok(self.html.clone())
    }
}

/// A prose page comfortably above the classifier thresholds
fn doc_page(title: &str, links: &[&str]) -> String {
    let anchors: String = links
        .iter()
        .map(|href| format!("<li><a href=\"{href}\">{href}</a></li>"))
        .collect();
    format!(
        "<!DOCTYPE html><html><head><title>{title}</title></head><body>\
         <nav><ul>{anchors}</ul></nav>\
         <main><h1>{title}</h1>\
         <p>This page documents the {title} part of the toolkit. It covers the \
         options that control behaviour, the defaults that apply when nothing \
         is configured, and the situations in which changing them is useful.</p>\
         <p>Each option is described together with an example, so that readers \
         can copy a working snippet into their own project and adjust it from \
         there without reading the whole reference first.</p>\
         </main></body></html>"
    )
}

fn html(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body, "text/html")
}

async fn mount_page(server: &MockServer, route: &str, body: String, expected: u64) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(html(body))
        .expect(expected)
        .mount(server)
        .await;
}

fn pipeline_with(writer: Arc<dyn Writer>) -> Pipeline {
    let fetcher = HttpFetcher::from_config(&FetchConfig::default()).unwrap();
    Pipeline::new(Arc::new(fetcher), Arc::new(HtmlConverter::new()), writer)
}

fn options() -> CrawlOptions {
    CrawlOptions {
        concurrency: 4,
        ..CrawlOptions::default()
    }
}

async fn run(root: &str, options: &CrawlOptions, pipeline: &Pipeline) -> CrawlReport {
    Dispatcher::with_defaults()
        .execute(root, options, pipeline, CancellationToken::new())
        .await
        .unwrap()
}

#[tokio::test]
async fn test_crawl_visits_each_page_once() {
    let server = MockServer::start().await;

    mount_page(&server, "/", doc_page("Home", &["/a", "/b", "/a#usage"]), 1).await;
    mount_page(&server, "/a", doc_page("Alpha", &["/b", "/", "/a/"]), 1).await;
    mount_page(&server, "/b", doc_page("Beta", &["/a", "/b"]), 1).await;

    let writer = Arc::new(RecordingWriter::default());
    let report = run(&server.uri(), &options(), &pipeline_with(writer.clone())).await;

    assert_eq!(report.strategy, "crawler");
    assert_eq!(report.probe, None);
    assert_eq!(report.written, 3);
    assert_eq!(report.failed, 0);
    assert_eq!(writer.paths(), vec!["/", "/a", "/b"]);
}

#[tokio::test]
async fn test_crawl_respects_limit() {
    let server = MockServer::start().await;

    let links: Vec<String> = (0..10).map(|i| format!("/page{i}")).collect();
    let link_refs: Vec<&str> = links.iter().map(String::as_str).collect();
    mount_page(&server, "/", doc_page("Home", &link_refs), 1).await;
    for link in &links {
        Mock::given(method("GET"))
            .and(path(link.as_str()))
            .respond_with(html(doc_page("Child", &[])))
            .mount(&server)
            .await;
    }

    let writer = Arc::new(RecordingWriter::default());
    let options = CrawlOptions {
        limit: 3,
        ..options()
    };
    let report = run(&server.uri(), &options, &pipeline_with(writer.clone())).await;

    assert_eq!(report.written, 3);
    assert_eq!(writer.paths().len(), 3);
}

#[tokio::test]
async fn test_crawl_skips_excluded_paths() {
    let server = MockServer::start().await;

    mount_page(&server, "/", doc_page("Home", &["/guide", "/blog/news"]), 1).await;
    mount_page(&server, "/guide", doc_page("Guide", &[]), 1).await;
    mount_page(&server, "/blog/news", doc_page("News", &[]), 0).await;

    let writer = Arc::new(RecordingWriter::default());
    let options = CrawlOptions {
        exclude: vec!["/blog".to_string()],
        ..options()
    };
    run(&server.uri(), &options, &pipeline_with(writer.clone())).await;

    assert_eq!(writer.paths(), vec!["/", "/guide"]);
}

#[tokio::test]
async fn test_crawl_stays_under_prefix() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        "/docs",
        doc_page("Docs", &["/docs/install", "/pricing"]),
        1,
    )
    .await;
    mount_page(&server, "/docs/install", doc_page("Install", &[]), 1).await;
    mount_page(&server, "/pricing", doc_page("Pricing", &[]), 0).await;

    let writer = Arc::new(RecordingWriter::default());
    let options = CrawlOptions {
        filter_url: Some(format!("{}/docs", server.uri())),
        ..options()
    };
    run(
        &format!("{}/docs/", server.uri()),
        &options,
        &pipeline_with(writer.clone()),
    )
    .await;

    assert_eq!(writer.paths(), vec!["/docs", "/docs/install"]);
}

#[tokio::test]
async fn test_crawl_stops_at_max_depth() {
    let server = MockServer::start().await;

    mount_page(&server, "/", doc_page("Home", &["/one"]), 1).await;
    mount_page(&server, "/one", doc_page("One", &["/two"]), 1).await;
    mount_page(&server, "/two", doc_page("Two", &["/three"]), 0).await;

    let writer = Arc::new(RecordingWriter::default());
    let options = CrawlOptions {
        max_depth: 1,
        ..options()
    };
    let report = run(&server.uri(), &options, &pipeline_with(writer.clone())).await;

    assert_eq!(report.written, 2);
    assert_eq!(writer.paths(), vec!["/", "/one"]);
}

#[tokio::test]
async fn test_failed_and_error_pages_do_not_abort() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        "/",
        doc_page("Home", &["/missing", "/soft-404", "/ok"]),
        1,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    mount_page(
        &server,
        "/soft-404",
        "<html><head><title>404 Not Found</title></head><body><h1>404 Not Found</h1>\
         <p>The page you requested could not be found.</p></body></html>"
            .to_string(),
        1,
    )
    .await;
    mount_page(&server, "/ok", doc_page("Ok", &[]), 1).await;

    let writer = Arc::new(RecordingWriter::default());
    let report = run(&server.uri(), &options(), &pipeline_with(writer.clone())).await;

    assert_eq!(report.failed, 1);
    assert_eq!(report.skipped_empty, 1);
    assert_eq!(writer.paths(), vec!["/", "/ok"]);
}

#[tokio::test]
async fn test_application_shell_is_rendered() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        "/",
        "<html><head><title>App</title></head><body><div id=\"root\"></div></body></html>"
            .to_string(),
        1,
    )
    .await;

    let writer = Arc::new(RecordingWriter::default());
    let renderer = Arc::new(StaticRenderer {
        html: doc_page("Rendered", &[]),
    });
    let pipeline = pipeline_with(writer.clone()).with_renderer(renderer);
    let report = run(&server.uri(), &options(), &pipeline).await;

    assert_eq!(report.rendered, 1);
    assert_eq!(report.written, 1);
    let documents = writer.documents.lock().unwrap();
    assert!(documents[0].rendered);
    assert!(documents[0].content.contains("Rendered"));
}

fn redirect_to(location: String) -> ResponseTemplate {
    ResponseTemplate::new(301).insert_header("Location", location.as_str())
}

#[tokio::test]
async fn test_redirects_do_not_duplicate_pages() {
    let server = MockServer::start().await;

    mount_page(&server, "/", doc_page("Home", &["/old", "/new", "/moved"]), 1).await;
    // Once directly, once through the redirect from /old.
    mount_page(&server, "/new", doc_page("New", &[]), 2).await;
    mount_page(&server, "/target", doc_page("Target", &[]), 1).await;
    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(redirect_to(format!("{}/new", server.uri())))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/moved"))
        .respond_with(redirect_to(format!("{}/target", server.uri())))
        .expect(1)
        .mount(&server)
        .await;

    let writer = Arc::new(RecordingWriter::default());
    let report = run(&server.uri(), &options(), &pipeline_with(writer.clone())).await;

    assert_eq!(report.skipped_redirect, 1);
    assert_eq!(report.written, 3);
    assert_eq!(writer.paths(), vec!["/", "/new", "/target"]);
}

#[tokio::test]
async fn test_discovery_uses_search_index() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search/search_index.json"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"{"docs":[
                {"location":"","title":"Home","text":""},
                {"location":"setup/","title":"Setup","text":""},
                {"location":"setup/#requirements","title":"Requirements","text":""},
                {"location":"reference/cli/","title":"CLI","text":""}
            ]}"#,
            "application/json",
        ))
        .mount(&server)
        .await;

    // Links on discovered pages are not followed.
    mount_page(&server, "/", doc_page("Home", &["/hidden"]), 1).await;
    mount_page(&server, "/setup", doc_page("Setup", &[]), 1).await;
    mount_page(&server, "/reference/cli", doc_page("CLI", &[]), 1).await;
    mount_page(&server, "/hidden", doc_page("Hidden", &[]), 0).await;

    let writer = Arc::new(RecordingWriter::default());
    let report = run(&server.uri(), &options(), &pipeline_with(writer.clone())).await;

    assert_eq!(report.strategy, "crawler");
    assert_eq!(report.probe, Some("MkDocs search index"));
    // Trailing slashes are trimmed during normalization.
    assert_eq!(writer.paths(), vec!["/", "/reference/cli", "/setup"]);
}

#[tokio::test]
async fn test_llms_txt_strategy() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/llms.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            "# Toolkit\n\n> Docs for the toolkit.\n\n## Guides\n\n\
             - [Install](/install): getting started\n\
             - [Usage](usage.html)\n\
             - [Elsewhere](https://other.example.org/page)\n",
            "text/plain",
        ))
        .mount(&server)
        .await;
    mount_page(&server, "/install", doc_page("Install", &["/not-followed"]), 1).await;
    mount_page(&server, "/usage.html", doc_page("Usage", &[]), 1).await;
    mount_page(&server, "/not-followed", doc_page("Nope", &[]), 0).await;

    let writer = Arc::new(RecordingWriter::default());
    let report = run(
        &format!("{}/llms.txt", server.uri()),
        &options(),
        &pipeline_with(writer.clone()),
    )
    .await;

    assert_eq!(report.strategy, "llms.txt");
    assert_eq!(writer.paths(), vec!["/install", "/usage.html"]);
}

#[tokio::test]
async fn test_sitemap_strategy_expands_index() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/sitemap_index.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            format!(
                r#"<?xml version="1.0" encoding="UTF-8"?>
<sitemapindex xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <sitemap><loc>{base}/sitemap-docs.xml</loc></sitemap>
</sitemapindex>"#
            ),
            "application/xml",
        ))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/sitemap-docs.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            format!(
                r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <url><loc>{base}/guide</loc></url>
  <url><loc>{base}/api</loc></url>
</urlset>"#
            ),
            "application/xml",
        ))
        .mount(&server)
        .await;
    mount_page(&server, "/guide", doc_page("Guide", &[]), 1).await;
    mount_page(&server, "/api", doc_page("API", &[]), 1).await;

    let writer = Arc::new(RecordingWriter::default());
    let report = run(
        &format!("{base}/sitemap_index.xml"),
        &options(),
        &pipeline_with(writer.clone()),
    )
    .await;

    assert_eq!(report.strategy, "sitemap");
    assert_eq!(writer.paths(), vec!["/api", "/guide"]);
}

#[tokio::test]
async fn test_missing_manifest_is_fatal() {
    let server = MockServer::start().await;

    let writer = Arc::new(RecordingWriter::default());
    let result = Dispatcher::with_defaults()
        .execute(
            &format!("{}/sitemap.xml", server.uri()),
            &options(),
            &pipeline_with(writer),
            CancellationToken::new(),
        )
        .await;

    assert!(matches!(result, Err(TrawlError::Acquisition { .. })));
}

#[tokio::test]
async fn test_cancelled_run_fetches_nothing() {
    let server = MockServer::start().await;
    mount_page(&server, "/", doc_page("Home", &[]), 0).await;

    let cancel = CancellationToken::new();
    cancel.cancel();

    let writer = Arc::new(RecordingWriter::default());
    let result = Dispatcher::with_defaults()
        .execute(&server.uri(), &options(), &pipeline_with(writer.clone()), cancel)
        .await;

    assert!(matches!(result, Err(TrawlError::Cancelled)));
    assert!(writer.paths().is_empty());
}

#[tokio::test]
async fn test_markdown_output_and_skip_existing() {
    let server = MockServer::start().await;
    mount_page(&server, "/", doc_page("Home", &["/guide"]), 2).await;
    mount_page(&server, "/guide", doc_page("Guide", &[]), 2).await;

    let dir = TempDir::new().unwrap();
    let writer = Arc::new(MarkdownWriter::new(dir.path()));

    let first = run(&server.uri(), &options(), &pipeline_with(writer.clone())).await;
    assert_eq!(first.written, 2);

    let guide = writer.path_for(&Url::parse(&format!("{}/guide", server.uri())).unwrap());
    let text = std::fs::read_to_string(&guide).unwrap();
    assert!(text.starts_with("---\ntitle: \"Guide\"\n"));
    assert!(text.contains("This page documents the Guide part"));

    let second = run(&server.uri(), &options(), &pipeline_with(writer.clone())).await;
    assert_eq!(second.written, 0);
    assert_eq!(second.skipped_existing, 2);
}

#[tokio::test]
async fn test_dry_run_writes_nothing() {
    let server = MockServer::start().await;
    mount_page(&server, "/", doc_page("Home", &["/guide"]), 1).await;
    mount_page(&server, "/guide", doc_page("Guide", &[]), 1).await;

    let dir = TempDir::new().unwrap();
    let writer = Arc::new(MarkdownWriter::new(dir.path()));
    let options = CrawlOptions {
        dry_run: true,
        ..options()
    };
    let report = run(&server.uri(), &options, &pipeline_with(writer)).await;

    assert_eq!(report.converted, 2);
    assert_eq!(report.written, 0);
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

use crate::classify::ClassifierThresholds;
use crate::pipeline::RenderOptions;
use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for docs-trawl
///
/// Every section is optional; a missing section takes its defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    pub fetch: FetchConfig,
    pub render: RenderConfig,
    pub classifier: ClassifierConfig,
    pub output: OutputConfig,
}

/// Crawl behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CrawlerConfig {
    /// Number of pages processed concurrently
    pub concurrency: usize,

    /// Maximum number of pages written (0 = unlimited)
    pub limit: usize,

    /// Maximum link depth from the root page (0 = root page only)
    pub max_depth: usize,

    /// Regex patterns matched against the full URL; matching URLs are never admitted
    pub exclude: Vec<String>,

    /// Only URLs sharing this prefix are admitted (path or absolute URL)
    pub filter_url: Option<String>,

    /// Rewrite pages that already exist in the output
    pub force: bool,

    /// Fetch and convert but never invoke the writer
    pub dry_run: bool,

    /// Render every page, not only the ones classified as app shells
    pub force_render: bool,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            concurrency: 5,
            limit: 0,
            max_depth: 3,
            exclude: Vec::new(),
            filter_url: None,
            force: false,
            dry_run: false,
            force_render: false,
        }
    }
}

/// HTTP fetch configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct FetchConfig {
    pub user_agent: String,

    /// Whole-request timeout (seconds)
    pub timeout_secs: u64,

    /// Connection establishment timeout (seconds)
    pub connect_timeout_secs: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: format!("docs-trawl/{}", env!("CARGO_PKG_VERSION")),
            timeout_secs: 30,
            connect_timeout_secs: 10,
        }
    }
}

/// Settings handed to the renderer when a page needs client-side rendering
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct RenderConfig {
    pub timeout_secs: u64,
    pub wait_stable: bool,
    pub scroll_to_end: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 60,
            wait_stable: true,
            scroll_to_end: false,
        }
    }
}

/// Optional overrides of the classifier thresholds
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ClassifierConfig {
    pub render_min_bytes: Option<usize>,
    pub substantial_text_chars: Option<usize>,
    pub error_min_bytes: Option<usize>,
    pub short_text_chars: Option<usize>,
}

impl ClassifierConfig {
    /// Applies the configured overrides on top of the default thresholds
    pub fn thresholds(&self) -> ClassifierThresholds {
        let defaults = ClassifierThresholds::default();
        ClassifierThresholds {
            render_min_bytes: self.render_min_bytes.unwrap_or(defaults.render_min_bytes),
            substantial_text_chars: self
                .substantial_text_chars
                .unwrap_or(defaults.substantial_text_chars),
            error_min_bytes: self.error_min_bytes.unwrap_or(defaults.error_min_bytes),
            short_text_chars: self.short_text_chars.unwrap_or(defaults.short_text_chars),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Directory the markdown documents are written under
    pub directory: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: "./docs".to_string(),
        }
    }
}

/// Effective options of one run
///
/// This is the fixed option set every strategy receives. It is built from a
/// [`Config`] (plus CLI overrides) or directly in code.
#[derive(Debug, Clone)]
pub struct CrawlOptions {
    pub concurrency: usize,
    pub limit: usize,
    pub max_depth: usize,
    pub exclude: Vec<String>,
    pub filter_url: Option<String>,
    pub force: bool,
    pub dry_run: bool,
    pub force_render: bool,

    /// Per-fetch timeout
    pub fetch_timeout: Duration,

    /// Per-write timeout
    pub write_timeout: Duration,

    /// Options passed to the renderer; its timeout bounds each render call
    pub render: RenderOptions,

    pub thresholds: ClassifierThresholds,
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Config::default().crawl_options()
    }
}

impl CrawlOptions {
    /// Returns true when `processed` pages exhaust the page limit
    pub fn limit_reached(&self, processed: usize) -> bool {
        self.limit > 0 && processed >= self.limit
    }
}

impl Config {
    /// Builds the run options from this configuration
    pub fn crawl_options(&self) -> CrawlOptions {
        CrawlOptions {
            concurrency: self.crawler.concurrency,
            limit: self.crawler.limit,
            max_depth: self.crawler.max_depth,
            exclude: self.crawler.exclude.clone(),
            filter_url: self.crawler.filter_url.clone(),
            force: self.crawler.force,
            dry_run: self.crawler.dry_run,
            force_render: self.crawler.force_render,
            fetch_timeout: Duration::from_secs(self.fetch.timeout_secs),
            write_timeout: Duration::from_secs(30),
            render: RenderOptions {
                timeout: Duration::from_secs(self.render.timeout_secs),
                wait_stable: self.render.wait_stable,
                scroll_to_end: self.render.scroll_to_end,
            },
            thresholds: self.classifier.thresholds(),
        }
    }
}

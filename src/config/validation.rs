use crate::config::types::{Config, CrawlerConfig, FetchConfig, OutputConfig, RenderConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_fetch_config(&config.fetch)?;
    validate_render_config(&config.render)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates crawler configuration
///
/// Exclude patterns are not checked here; an invalid pattern is dropped with
/// a warning when the crawl session compiles them.
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.concurrency < 1 || config.concurrency > 100 {
        return Err(ConfigError::Validation(format!(
            "concurrency must be between 1 and 100, got {}",
            config.concurrency
        )));
    }

    if let Some(filter) = &config.filter_url {
        validate_filter_url(filter)?;
    }

    Ok(())
}

/// A filter is either a path prefix ("/docs") or an absolute http(s) URL
fn validate_filter_url(filter: &str) -> Result<(), ConfigError> {
    if filter.is_empty() {
        return Err(ConfigError::Validation(
            "filter-url cannot be empty".to_string(),
        ));
    }

    if filter.starts_with('/') {
        return Ok(());
    }

    let url = Url::parse(filter)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid filter-url '{}': {}", filter, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "filter-url '{}' must use http or https",
            filter
        )));
    }

    Ok(())
}

/// Validates fetch configuration
fn validate_fetch_config(config: &FetchConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "fetch timeout must be >= 1s, got {}s",
            config.timeout_secs
        )));
    }

    if config.connect_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "connect timeout must be >= 1s, got {}s",
            config.connect_timeout_secs
        )));
    }

    Ok(())
}

fn validate_render_config(config: &RenderConfig) -> Result<(), ConfigError> {
    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "render timeout must be >= 1s, got {}s",
            config.timeout_secs
        )));
    }
    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.directory.trim().is_empty() {
        return Err(ConfigError::Validation(
            "output directory cannot be empty".to_string(),
        ));
    }
    Ok(())
}

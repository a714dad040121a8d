use crate::config::types::{Config, CrawlConfig, OutputConfig, SelectorConfig, SourceConfig};
use crate::ConfigError;
use scraper::Selector;
use std::time::Duration;
use url::Url;

/// Upper bound for `max-concurrent-pages`
const MAX_CONCURRENT_PAGES: u32 = 16;

/// Upper bound for `max-retries`
const MAX_RETRIES: u32 = 5;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawl_config(&config.crawler)?;
    validate_source_config(&config.source)?;
    validate_selector_config(&config.selectors)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates crawl configuration
///
/// This is the construction-time check the coordinator runs; a config that
/// fails here never issues a request.
pub fn validate_crawl_config(config: &CrawlConfig) -> Result<(), ConfigError> {
    if config.locality.trim().is_empty() {
        return Err(ConfigError::Validation(
            "locality cannot be empty".to_string(),
        ));
    }

    if config.max_pages < 1 {
        return Err(ConfigError::Validation(format!(
            "max_pages must be >= 1, got {}",
            config.max_pages
        )));
    }

    validate_seconds("min_delay_seconds", config.min_delay_seconds)?;
    validate_seconds("max_delay_seconds", config.max_delay_seconds)?;

    if config.min_delay_seconds > config.max_delay_seconds {
        return Err(ConfigError::Validation(format!(
            "min_delay_seconds ({}) must not exceed max_delay_seconds ({})",
            config.min_delay_seconds, config.max_delay_seconds
        )));
    }

    validate_seconds("request_timeout_seconds", config.request_timeout_seconds)?;
    if config.request_timeout_seconds == 0.0 {
        return Err(ConfigError::Validation(
            "request_timeout_seconds must be > 0".to_string(),
        ));
    }

    if config.max_concurrent_pages < 1 || config.max_concurrent_pages > MAX_CONCURRENT_PAGES {
        return Err(ConfigError::Validation(format!(
            "max_concurrent_pages must be between 1 and {}, got {}",
            MAX_CONCURRENT_PAGES, config.max_concurrent_pages
        )));
    }

    if config.max_retries > MAX_RETRIES {
        return Err(ConfigError::Validation(format!(
            "max_retries must be <= {}, got {}",
            MAX_RETRIES, config.max_retries
        )));
    }

    Ok(())
}

/// Validates a duration given in seconds
///
/// The value must be non-negative and representable as a `Duration`.
fn validate_seconds(name: &str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ConfigError::Validation(format!(
            "{} must be a finite number >= 0, got {}",
            name, value
        )));
    }
    if Duration::try_from_secs_f64(value).is_err() {
        return Err(ConfigError::Validation(format!(
            "{} is too large, got {}",
            name, value
        )));
    }
    Ok(())
}

/// Validates source configuration
fn validate_source_config(config: &SourceConfig) -> Result<(), ConfigError> {
    let base = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base_url: {}", e)))?;

    if base.scheme() != "http" && base.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "base_url '{}' must use http or https",
            config.base_url
        )));
    }

    for (name, value) in [
        ("search_path", &config.search_path),
        ("locality_param", &config.locality_param),
        ("page_param", &config.page_param),
        ("user_agent", &config.user_agent),
    ] {
        if value.trim().is_empty() {
            return Err(ConfigError::Validation(format!("{} cannot be empty", name)));
        }
    }

    Ok(())
}

/// Validates that every selector compiles
fn validate_selector_config(config: &SelectorConfig) -> Result<(), ConfigError> {
    for selector in [
        &config.container,
        &config.title,
        &config.company,
        &config.location,
    ] {
        compile_selector(selector)?;
    }
    Ok(())
}

/// Compiles a CSS selector, mapping failures to a configuration error
pub(crate) fn compile_selector(selector: &str) -> Result<Selector, ConfigError> {
    Selector::parse(selector).map_err(|e| ConfigError::InvalidSelector {
        selector: selector.to_string(),
        message: e.to_string(),
    })
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.csv_path.trim().is_empty() {
        return Err(ConfigError::Validation(
            "csv_path cannot be empty".to_string(),
        ));
    }
    Ok(())
}

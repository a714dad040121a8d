use serde::Deserialize;

/// Main configuration structure for Job-Harvest
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlConfig,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub selectors: SelectorConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Crawl behavior configuration
///
/// Immutable for the duration of a run.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlConfig {
    /// Geographic filter embedded in every search URL
    pub locality: String,

    /// Number of result pages to request, starting at page 1
    #[serde(rename = "max-pages")]
    pub max_pages: u32,

    /// Lower bound of the politeness delay (seconds)
    #[serde(rename = "min-delay-seconds")]
    pub min_delay_seconds: f64,

    /// Upper bound of the politeness delay (seconds)
    #[serde(rename = "max-delay-seconds")]
    pub max_delay_seconds: f64,

    /// Per-fetch timeout (seconds)
    #[serde(rename = "request-timeout-seconds")]
    pub request_timeout_seconds: f64,

    /// Number of pages allowed in flight at once
    #[serde(rename = "max-concurrent-pages")]
    pub max_concurrent_pages: u32,

    /// Extra attempts for a page that failed transiently
    #[serde(rename = "max-retries")]
    pub max_retries: u32,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            locality: String::new(),
            max_pages: 5,
            min_delay_seconds: 1.0,
            max_delay_seconds: 3.0,
            request_timeout_seconds: 10.0,
            max_concurrent_pages: 1,
            max_retries: 0,
        }
    }
}

/// Where and how the listing pages are requested
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Site root, e.g. `https://www.kariyer.net`
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Path of the search endpoint under the site root
    #[serde(rename = "search-path")]
    pub search_path: String,

    /// Query parameter carrying the locality
    #[serde(rename = "locality-param")]
    pub locality_param: String,

    /// Query parameter carrying the page number
    #[serde(rename = "page-param")]
    pub page_param: String,

    /// Fixed User-Agent header sent with every request
    #[serde(rename = "user-agent")]
    pub user_agent: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.kariyer.net".to_string(),
            search_path: "is-ilanlari".to_string(),
            locality_param: "sehir".to_string(),
            page_param: "page".to_string(),
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36"
                .to_string(),
        }
    }
}

/// CSS selectors describing the listing markup
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    /// One match per listing candidate
    pub container: String,
    /// Required, searched inside the container
    pub title: String,
    /// Required, searched inside the container
    pub company: String,
    /// Optional, searched inside the container
    pub location: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            container: "div.list-item".to_string(),
            title: "a.job-title".to_string(),
            company: "span.company-name".to_string(),
            location: "span.location".to_string(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Path of the CSV file receiving one row per record
    #[serde(rename = "csv-path")]
    pub csv_path: String,

    /// Path to the SQLite database file (empty disables persistence)
    #[serde(rename = "database-path")]
    pub database_path: String,

    /// Rows shown in the console preview
    #[serde(rename = "preview-rows")]
    pub preview_rows: usize,

    /// Record count below which the run is reported as insufficient
    #[serde(rename = "minimum-records")]
    pub minimum_records: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            csv_path: "meslekler.csv".to_string(),
            database_path: String::new(),
            preview_rows: 10,
            minimum_records: 100,
        }
    }
}

impl OutputConfig {
    /// Returns the database path if SQLite persistence is enabled
    pub fn database(&self) -> Option<&str> {
        let path = self.database_path.trim();
        (!path.is_empty()).then_some(path)
    }
}

//! HTML parser for extracting job listings
//!
//! Each listing container on a result page becomes at most one `JobRecord`.
//! A container without a title or company is skipped; the rest of the page
//! is still extracted.

use crate::config::{compile_selector, SelectorConfig};
use crate::ConfigError;
use scraper::{ElementRef, Html, Selector};

/// Category assigned until a downstream classifier fills it in
pub const UNKNOWN_CATEGORY: &str = "Unknown";

/// One extracted job listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRecord {
    /// Never empty
    pub title: String,
    /// Never empty
    pub company: String,
    /// Listing location, or the requested locality when the page has none
    pub location: String,
    pub category: String,
}

impl JobRecord {
    /// Creates a record with the unknown category
    pub fn new(
        title: impl Into<String>,
        company: impl Into<String>,
        location: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            company: company.into(),
            location: location.into(),
            category: UNKNOWN_CATEGORY.to_string(),
        }
    }
}

/// Compiled selectors for one listing layout
#[derive(Debug, Clone)]
pub struct RecordExtractor {
    container: Selector,
    title: Selector,
    company: Selector,
    location: Selector,
}

impl RecordExtractor {
    /// Compiles the configured selectors
    ///
    /// # Returns
    ///
    /// * `Ok(RecordExtractor)` - All selectors compiled
    /// * `Err(ConfigError::InvalidSelector)` - A selector is not valid CSS
    pub fn new(selectors: &SelectorConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            container: compile_selector(&selectors.container)?,
            title: compile_selector(&selectors.title)?,
            company: compile_selector(&selectors.company)?,
            location: compile_selector(&selectors.location)?,
        })
    }

    /// Extracts job records from one page of HTML
    ///
    /// # Extraction Rules
    ///
    /// - Containers are visited in document order
    /// - Title and company are required; a container missing either (or
    ///   whose text is blank) is skipped
    /// - A missing or blank location falls back to `fallback_location`
    /// - Text is trimmed and internal whitespace collapsed
    ///
    /// A page with no containers yields an empty vector.
    ///
    /// # Example
    ///
    /// ```
    /// use job_harvest::config::SelectorConfig;
    /// use job_harvest::crawler::RecordExtractor;
    ///
    /// let html = r#"<div class="list-item">
    ///     <a class="job-title">Backend Developer</a>
    ///     <span class="company-name">Acme</span>
    /// </div>"#;
    /// let extractor = RecordExtractor::new(&SelectorConfig::default()).unwrap();
    /// let records = extractor.extract(html, "istanbul");
    /// assert_eq!(records.len(), 1);
    /// assert_eq!(records[0].location, "istanbul");
    /// ```
    pub fn extract(&self, html: &str, fallback_location: &str) -> Vec<JobRecord> {
        let document = Html::parse_document(html);
        let mut records = Vec::new();

        for (index, container) in document.select(&self.container).enumerate() {
            match self.extract_container(container, fallback_location) {
                Some(record) => records.push(record),
                None => {
                    tracing::debug!("Skipping listing {}: missing title or company", index + 1);
                }
            }
        }

        records
    }

    /// Reads one container, all or nothing
    fn extract_container(&self, container: ElementRef<'_>, fallback_location: &str) -> Option<JobRecord> {
        let title = first_text(container, &self.title)?;
        let company = first_text(container, &self.company)?;
        let location =
            first_text(container, &self.location).unwrap_or_else(|| fallback_location.to_string());

        Some(JobRecord::new(title, company, location))
    }
}

/// Returns the normalized text of the first match, if it is non-empty
fn first_text(container: ElementRef<'_>, selector: &Selector) -> Option<String> {
    container
        .select(selector)
        .next()
        .map(|element| normalize_text(element.text()))
        .filter(|s| !s.is_empty())
}

/// Joins text nodes and collapses runs of whitespace
fn normalize_text<'a>(parts: impl Iterator<Item = &'a str>) -> String {
    parts
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

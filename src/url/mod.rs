//! URL handling module for Job-Harvest
//!
//! Builds the search-result URL for each page number:
//! `{base_url}/{search_path}?{locality_param}={locality}&{page_param}={n}`.

use crate::config::SourceConfig;
use crate::{UrlError, UrlResult};
use url::Url;

/// Builds page URLs for one search endpoint
#[derive(Debug, Clone)]
pub struct SearchUrlBuilder {
    endpoint: Url,
    locality_param: String,
    page_param: String,
}

impl SearchUrlBuilder {
    /// Creates a builder from the source configuration
    ///
    /// The base URL is treated as a directory, so a base of
    /// `https://example.com/tr` with a search path of `jobs` yields
    /// `https://example.com/tr/jobs`.
    ///
    /// # Examples
    ///
    /// ```
    /// use job_harvest::config::SourceConfig;
    /// use job_harvest::url::SearchUrlBuilder;
    ///
    /// let builder = SearchUrlBuilder::new(&SourceConfig::default()).unwrap();
    /// let url = builder.page_url("istanbul", 2);
    /// assert_eq!(
    ///     url.as_str(),
    ///     "https://www.kariyer.net/is-ilanlari?sehir=istanbul&page=2"
    /// );
    /// ```
    pub fn new(source: &SourceConfig) -> UrlResult<Self> {
        let mut base = Url::parse(source.base_url.trim())?;

        if base.scheme() != "http" && base.scheme() != "https" {
            return Err(UrlError::InvalidScheme(base.scheme().to_string()));
        }
        if base.cannot_be_a_base() {
            return Err(UrlError::CannotBeABase(source.base_url.clone()));
        }

        base.set_query(None);
        base.set_fragment(None);
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let endpoint = base.join(source.search_path.trim().trim_start_matches('/'))?;

        Ok(Self {
            endpoint,
            locality_param: source.locality_param.clone(),
            page_param: source.page_param.clone(),
        })
    }

    /// Returns the URL of one result page for the given locality
    pub fn page_url(&self, locality: &str, page_number: u32) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .clear()
            .append_pair(&self.locality_param, locality)
            .append_pair(&self.page_param, &page_number.to_string());
        url
    }

    /// Returns the search endpoint without query parameters
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(base_url: &str, search_path: &str) -> SourceConfig {
        SourceConfig {
            base_url: base_url.to_string(),
            search_path: search_path.to_string(),
            ..SourceConfig::default()
        }
    }

    #[test]
    fn test_default_source_url() {
        let builder = SearchUrlBuilder::new(&SourceConfig::default()).unwrap();
        assert_eq!(
            builder.page_url("ankara", 1).as_str(),
            "https://www.kariyer.net/is-ilanlari?sehir=ankara&page=1"
        );
    }

    #[test]
    fn test_base_with_path_and_trailing_slash() {
        let with_slash = SearchUrlBuilder::new(&source("https://example.com/tr/", "/jobs")).unwrap();
        let without_slash = SearchUrlBuilder::new(&source("https://example.com/tr", "jobs")).unwrap();

        assert_eq!(with_slash.endpoint().as_str(), "https://example.com/tr/jobs");
        assert_eq!(without_slash.endpoint().as_str(), "https://example.com/tr/jobs");
    }

    #[test]
    fn test_locality_is_percent_encoded() {
        let builder = SearchUrlBuilder::new(&source("https://example.com", "search")).unwrap();
        let url = builder.page_url("izmir merkez", 3);

        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("sehir".to_string(), "izmir merkez".to_string()),
                ("page".to_string(), "3".to_string()),
            ]
        );
    }

    #[test]
    fn test_base_query_is_dropped() {
        let builder = SearchUrlBuilder::new(&source("https://example.com/?x=1#top", "search")).unwrap();
        assert_eq!(
            builder.page_url("bursa", 1).as_str(),
            "https://example.com/search?sehir=bursa&page=1"
        );
    }

    #[test]
    fn test_rejects_non_http_base() {
        let result = SearchUrlBuilder::new(&source("ftp://example.com", "search"));
        assert!(matches!(result, Err(UrlError::InvalidScheme(_))));
    }

    #[test]
    fn test_rejects_unparseable_base() {
        let result = SearchUrlBuilder::new(&source("not a url", "search"));
        assert!(matches!(result, Err(UrlError::Parse(_))));
    }
}

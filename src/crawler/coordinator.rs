//! Crawler coordinator - main crawl orchestration logic
//!
//! This module drives the page loop:
//! - Building each page URL from the locality and page number
//! - Passing every dispatch through the politeness gate
//! - Fetching, retrying transient failures, and extracting records
//! - Folding page results into one ordered `CrawlOutcome`
//!
//! A page failure only ever affects that page. The only error a caller can
//! see is a configuration error at construction time.

use crate::config::{validate_crawl_config, Config, CrawlConfig};
use crate::crawler::fetcher::{FetchResult, PageFetcher};
use crate::crawler::limiter::{DispatchGate, RateLimiter};
use crate::crawler::parser::RecordExtractor;
use crate::state::{CrawlOutcome, PageResult, PageStatus};
use crate::url::SearchUrlBuilder;
use crate::ConfigError;
use futures::stream::{self, StreamExt};
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use url::Url;

/// Main crawler coordinator structure
pub struct Coordinator<F, L> {
    crawl: CrawlConfig,
    urls: SearchUrlBuilder,
    extractor: RecordExtractor,
    fetcher: F,
    limiter: L,
    timeout: Duration,
}

impl<F: PageFetcher, L: RateLimiter> Coordinator<F, L> {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `config` - The full configuration; crawl, source and selector
    ///   sections are used
    /// * `fetcher` - Issues one request per page attempt
    /// * `limiter` - Supplies the politeness delay between dispatches
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Configuration is usable
    /// * `Err(ConfigError)` - Invalid crawl settings, base URL or selectors;
    ///   nothing has been fetched
    pub fn new(config: &Config, fetcher: F, limiter: L) -> Result<Self, ConfigError> {
        validate_crawl_config(&config.crawler)?;

        let urls = SearchUrlBuilder::new(&config.source)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base_url: {}", e)))?;
        let extractor = RecordExtractor::new(&config.selectors)?;
        let timeout = Duration::try_from_secs_f64(config.crawler.request_timeout_seconds)
            .map_err(|e| ConfigError::Validation(format!("request_timeout_seconds: {}", e)))?;

        Ok(Self {
            timeout,
            crawl: config.crawler.clone(),
            urls,
            extractor,
            fetcher,
            limiter,
        })
    }

    /// Runs the crawl over pages `1..=max_pages`
    ///
    /// Always completes; an outcome without records is a valid result.
    pub async fn run(&self) -> CrawlOutcome {
        self.run_until_cancelled(&CancellationToken::new()).await
    }

    /// Runs the crawl, stopping dispatch once `cancel` fires
    ///
    /// Pages already in flight finish normally; pages not yet dispatched are
    /// not attempted and the outcome is marked cancelled.
    pub async fn run_until_cancelled(&self, cancel: &CancellationToken) -> CrawlOutcome {
        let start_time = Instant::now();
        let workers = self.crawl.max_concurrent_pages.max(1) as usize;
        let gate = DispatchGate::new(&self.limiter);

        tracing::info!(
            "Starting crawl of {} page(s) for '{}' ({} worker(s))",
            self.crawl.max_pages,
            self.crawl.locality,
            workers
        );

        let results: Vec<PageResult> = stream::iter(1..=self.crawl.max_pages)
            .map(|page_number| self.process_page(page_number, &gate, cancel))
            .buffer_unordered(workers)
            .filter_map(|result| async move { result })
            .collect()
            .await;

        let cancelled = results.len() < self.crawl.max_pages as usize;
        let outcome = CrawlOutcome::from_pages(results, cancelled);

        if cancelled {
            tracing::warn!(
                "Crawl cancelled after {} of {} page(s)",
                outcome.pages_attempted,
                self.crawl.max_pages
            );
        }

        tracing::info!(
            "Crawl finished in {:?}: {} record(s), {} succeeded, {} empty, {} failed",
            start_time.elapsed(),
            outcome.records.len(),
            outcome.pages_succeeded,
            outcome.pages_empty,
            outcome.pages_failed
        );

        outcome
    }

    /// Processes a single page, retrying transient failures
    ///
    /// Returns `None` only if the page was never dispatched.
    async fn process_page(
        &self,
        page_number: u32,
        gate: &DispatchGate<'_, L>,
        cancel: &CancellationToken,
    ) -> Option<PageResult> {
        let url = self.urls.page_url(&self.crawl.locality, page_number);
        let max_attempts = self.crawl.max_retries + 1;
        let mut attempts = 0;
        let mut last_failure = None;

        while attempts < max_attempts {
            if !self.dispatch(gate, cancel).await {
                break;
            }
            attempts += 1;

            match self.fetch_once(page_number, &url, attempts).await {
                Ok(result) => return Some(result),
                Err(status) => {
                    let retry = status.is_transient() && attempts < max_attempts;
                    if retry {
                        tracing::warn!("Page {} failed ({}), retrying", page_number, status);
                    }
                    last_failure = Some(status);
                    if !retry {
                        break;
                    }
                }
            }
        }

        let status = last_failure?;
        tracing::warn!(
            "Page {} failed after {} attempt(s): {}",
            page_number,
            attempts,
            status
        );
        Some(PageResult::failed(page_number, status, attempts))
    }

    /// One fetch attempt; failures come back as the page status to record
    async fn fetch_once(
        &self,
        page_number: u32,
        url: &Url,
        attempt: u32,
    ) -> Result<PageResult, PageStatus> {
        tracing::info!("Fetching page {} (attempt {}): {}", page_number, attempt, url);

        match self.fetcher.fetch(url, self.timeout).await {
            FetchResult::Success(body) => {
                let records = self.extractor.extract(&body, &self.crawl.locality);
                if records.is_empty() {
                    tracing::info!("No job listings found on page {}", page_number);
                } else {
                    tracing::info!("Page {}: {} listing(s)", page_number, records.len());
                }
                Ok(PageResult::extracted(page_number, records, attempt))
            }
            FetchResult::HttpFailure(code) => Err(PageStatus::HttpError(code)),
            FetchResult::NetworkFailure(cause) => Err(PageStatus::NetworkError(cause)),
        }
    }

    /// Passes the politeness gate unless cancelled first
    async fn dispatch(&self, gate: &DispatchGate<'_, L>, cancel: &CancellationToken) -> bool {
        if cancel.is_cancelled() {
            return false;
        }

        tokio::select! {
            _ = cancel.cancelled() => false,
            _ = gate.admit() => !cancel.is_cancelled(),
        }
    }

    /// Returns the URL requested for a page number
    pub fn page_url(&self, page_number: u32) -> Url {
        self.urls.page_url(&self.crawl.locality, page_number)
    }

    /// Returns the crawl settings this coordinator runs with
    pub fn crawl_config(&self) -> &CrawlConfig {
        &self.crawl
    }

    #[cfg(test)]
    fn fetcher(&self) -> &F {
        &self.fetcher
    }

    #[cfg(test)]
    fn limiter(&self) -> &L {
        &self.limiter
    }
}

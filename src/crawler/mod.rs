//! Crawler module for paginated listing retrieval
//!
//! This module contains the core crawling logic, including:
//! - Single-attempt HTTP fetching with outcome classification
//! - Listing extraction from result pages
//! - Politeness delays between dispatches
//! - Overall crawl coordination

mod coordinator;
mod fetcher;
mod limiter;
mod parser;

pub use coordinator::Coordinator;
pub use fetcher::{build_http_client, fetch_url, FetchResult, HttpFetcher, NetworkCause, PageFetcher};
pub use limiter::{DispatchGate, RandomDelay, RateLimiter};
pub use parser::{JobRecord, RecordExtractor, UNKNOWN_CATEGORY};

use crate::config::Config;
use crate::state::CrawlOutcome;
use crate::HarvestError;
use tokio_util::sync::CancellationToken;

/// Runs a complete crawl with the HTTP fetcher and random politeness delays
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Validate the crawl settings and compile the selectors
/// 2. Build the HTTP client
/// 3. Fetch pages `1..=max_pages`, waiting between dispatches
/// 4. Return the ordered outcome
///
/// # Returns
///
/// * `Ok(CrawlOutcome)` - The crawl ran; it may hold zero records
/// * `Err(HarvestError)` - Configuration or HTTP client setup failed
pub async fn crawl(config: &Config, cancel: &CancellationToken) -> Result<CrawlOutcome, HarvestError> {
    crate::config::validate(config)?;

    let fetcher = HttpFetcher::new(&config.source)?;
    let limiter = RandomDelay::from_config(&config.crawler);
    let coordinator = Coordinator::new(config, fetcher, limiter)?;
    Ok(coordinator.run_until_cancelled(cancel).await)
}

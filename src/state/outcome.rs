//! Aggregate result of one crawl run

use crate::crawler::JobRecord;
use crate::state::{PageReport, PageResult, PageStatus};

/// Everything a run produced, handed to result sinks
///
/// Records are in page order, then in-page extraction order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlOutcome {
    pub records: Vec<JobRecord>,
    pub pages_attempted: u32,
    pub pages_succeeded: u32,
    pub pages_failed: u32,
    pub pages_empty: u32,
    /// Per-page status, sorted by page number
    pub pages: Vec<PageReport>,
    /// True if the run stopped before dispatching every page
    pub cancelled: bool,
}

impl CrawlOutcome {
    /// Builds an outcome from page results in any completion order
    pub fn from_pages(mut results: Vec<PageResult>, cancelled: bool) -> Self {
        results.sort_by_key(|result| result.page_number);

        let mut outcome = Self {
            cancelled,
            ..Self::default()
        };

        for result in results {
            outcome.pages_attempted += 1;
            match &result.status {
                PageStatus::Ok => outcome.pages_succeeded += 1,
                PageStatus::Empty => outcome.pages_empty += 1,
                PageStatus::HttpError(_) | PageStatus::NetworkError(_) => {
                    outcome.pages_failed += 1
                }
            }

            outcome.pages.push(PageReport {
                page_number: result.page_number,
                status: result.status,
                record_count: result.records.len(),
                attempts: result.attempts,
            });
            outcome.records.extend(result.records);
        }

        outcome
    }

    /// Returns true if no records were collected
    ///
    /// This is a valid terminal state, not an error.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Total fetch attempts across all pages, retries included
    pub fn total_attempts(&self) -> u32 {
        self.pages.iter().map(|page| page.attempts).sum()
    }
}

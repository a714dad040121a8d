//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `PageStatus`: final status of one result page (ok, HTTP error, network error, empty)
//! - `PageResult`: status plus the records extracted from one page
//! - `CrawlOutcome`: the ordered aggregate of a whole run

mod outcome;
mod page_state;

// Re-export main types
pub use outcome::CrawlOutcome;
pub use page_state::{PageReport, PageResult, PageStatus};

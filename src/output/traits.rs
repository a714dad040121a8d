//! Result sink trait and error types
//!
//! A result sink receives the finished outcome of a run and makes it durable.

use crate::state::CrawlOutcome;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write output: {0}")]
    Write(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage error: {0}")]
    Storage(String),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Trait for result sinks
///
/// Sinks see each outcome once, after the crawl has finished. Records must
/// be written in outcome order.
pub trait ResultSink {
    /// Persists the outcome
    ///
    /// # Arguments
    ///
    /// * `outcome` - The finished crawl outcome; may hold zero records
    fn write(&mut self, outcome: &CrawlOutcome) -> OutputResult<()>;
}

//! Storage traits and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types.

use crate::crawler::JobRecord;
use crate::state::CrawlOutcome;
use crate::storage::{RunRecord, RunStatus};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Run not found: {0}")]
    RunNotFound(i64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for storage backend implementations
///
/// A run is opened before crawling starts and finished once with the
/// outcome; the read side serves statistics across all stored runs.
pub trait Storage {
    // ===== Run Management =====

    /// Creates a new run in the `running` state
    ///
    /// # Arguments
    ///
    /// * `config_hash` - Hash of the configuration file
    /// * `locality` - Locality being crawled
    ///
    /// # Returns
    ///
    /// The ID of the newly created run
    fn create_run(&mut self, config_hash: &str, locality: &str) -> StorageResult<i64>;

    /// Stores the outcome of a run and closes it with `status`
    ///
    /// Page reports and records are written in one transaction.
    fn finish_run(
        &mut self,
        run_id: i64,
        outcome: &CrawlOutcome,
        status: RunStatus,
    ) -> StorageResult<()>;

    /// Gets a run by ID
    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord>;

    /// Gets the most recently created run, if any
    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>>;

    // ===== Records =====

    /// Returns the records of one run in their stored order
    fn get_jobs(&self, run_id: i64) -> StorageResult<Vec<JobRecord>>;

    // ===== Statistics =====

    fn count_runs(&self) -> StorageResult<u64>;

    fn count_jobs(&self) -> StorageResult<u64>;

    /// (category, count), most frequent first
    fn count_jobs_by_category(&self) -> StorageResult<Vec<(String, u64)>>;

    /// (location, count), most frequent first
    fn count_jobs_by_location(&self) -> StorageResult<Vec<(String, u64)>>;

    /// (page status, count), most frequent first
    fn count_pages_by_status(&self) -> StorageResult<Vec<(String, u64)>>;
}

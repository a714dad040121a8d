//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Storage trait
//! and a result sink that finishes one run with its outcome.

use crate::crawler::JobRecord;
use crate::output::{OutputError, OutputResult, ResultSink};
use crate::state::{CrawlOutcome, PageStatus};
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Storage, StorageError, StorageResult};
use crate::storage::{RunRecord, RunStatus};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

const RUN_COLUMNS: &str = "id, started_at, finished_at, config_hash, locality, status, \
     pages_attempted, pages_succeeded, pages_empty, pages_failed, record_count";

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Creates a new SqliteStorage instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database
    pub fn new(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Opens a run and returns a sink that will finish it
    pub fn begin_run(mut self, config_hash: &str, locality: &str) -> StorageResult<SqliteRunSink> {
        let run_id = self.create_run(config_hash, locality)?;
        tracing::debug!("Opened run {} in database", run_id);
        Ok(SqliteRunSink {
            storage: self,
            run_id,
        })
    }

    fn count(&self, sql: &str) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(sql, [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn grouped_counts(&self, sql: &str) -> StorageResult<Vec<(String, u64)>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? as u64))
        })?;

        let mut counts = Vec::new();
        for row in rows {
            counts.push(row?);
        }
        Ok(counts)
    }
}

fn run_from_row(row: &Row<'_>) -> rusqlite::Result<RunRecord> {
    Ok(RunRecord {
        id: row.get(0)?,
        started_at: row.get(1)?,
        finished_at: row.get(2)?,
        config_hash: row.get(3)?,
        locality: row.get(4)?,
        status: RunStatus::from_db_string(&row.get::<_, String>(5)?).unwrap_or(RunStatus::Running),
        pages_attempted: row.get(6)?,
        pages_succeeded: row.get(7)?,
        pages_empty: row.get(8)?,
        pages_failed: row.get(9)?,
        record_count: row.get(10)?,
    })
}

fn error_message(status: &PageStatus) -> Option<String> {
    match status {
        PageStatus::NetworkError(cause) => Some(cause.to_string()),
        PageStatus::HttpError(code) => Some(format!("HTTP {}", code)),
        PageStatus::Ok | PageStatus::Empty => None,
    }
}

impl Storage for SqliteStorage {
    // ===== Run Management =====

    fn create_run(&mut self, config_hash: &str, locality: &str) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO runs (started_at, config_hash, locality, status) VALUES (?1, ?2, ?3, ?4)",
            params![now, config_hash, locality, RunStatus::Running.to_db_string()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn finish_run(
        &mut self,
        run_id: i64,
        outcome: &CrawlOutcome,
        status: RunStatus,
    ) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let tx = self.conn.transaction()?;

        let updated = tx.execute(
            "UPDATE runs SET finished_at = ?1, status = ?2, pages_attempted = ?3,
                pages_succeeded = ?4, pages_empty = ?5, pages_failed = ?6, record_count = ?7
             WHERE id = ?8",
            params![
                now,
                status.to_db_string(),
                outcome.pages_attempted,
                outcome.pages_succeeded,
                outcome.pages_empty,
                outcome.pages_failed,
                outcome.records.len() as i64,
                run_id
            ],
        )?;
        if updated == 0 {
            return Err(StorageError::RunNotFound(run_id));
        }

        {
            let mut insert_page = tx.prepare(
                "INSERT INTO pages (run_id, page_number, status, http_code, error_message, record_count, attempts)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )?;
            for page in &outcome.pages {
                insert_page.execute(params![
                    run_id,
                    page.page_number,
                    page.status.to_db_string(),
                    page.status.http_code(),
                    error_message(&page.status),
                    page.record_count as i64,
                    page.attempts
                ])?;
            }

            let mut insert_job = tx.prepare(
                "INSERT INTO jobs (run_id, position, title, company, location, category)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;
            for (position, record) in outcome.records.iter().enumerate() {
                insert_job.execute(params![
                    run_id,
                    position as i64,
                    record.title,
                    record.company,
                    record.location,
                    record.category
                ])?;
            }
        }

        tx.commit()?;
        Ok(())
    }

    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord> {
        let sql = format!("SELECT {} FROM runs WHERE id = ?1", RUN_COLUMNS);
        self.conn
            .query_row(&sql, params![run_id], run_from_row)
            .optional()?
            .ok_or(StorageError::RunNotFound(run_id))
    }

    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>> {
        let sql = format!("SELECT {} FROM runs ORDER BY id DESC LIMIT 1", RUN_COLUMNS);
        Ok(self.conn.query_row(&sql, [], run_from_row).optional()?)
    }

    // ===== Records =====

    fn get_jobs(&self, run_id: i64) -> StorageResult<Vec<JobRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT title, company, location, category FROM jobs WHERE run_id = ?1 ORDER BY position",
        )?;
        let rows = stmt.query_map(params![run_id], |row| {
            Ok(JobRecord {
                title: row.get(0)?,
                company: row.get(1)?,
                location: row.get(2)?,
                category: row.get(3)?,
            })
        })?;

        let mut jobs = Vec::new();
        for row in rows {
            jobs.push(row?);
        }
        Ok(jobs)
    }

    // ===== Statistics =====

    fn count_runs(&self) -> StorageResult<u64> {
        self.count("SELECT COUNT(*) FROM runs")
    }

    fn count_jobs(&self) -> StorageResult<u64> {
        self.count("SELECT COUNT(*) FROM jobs")
    }

    fn count_jobs_by_category(&self) -> StorageResult<Vec<(String, u64)>> {
        self.grouped_counts(
            "SELECT category, COUNT(*) AS n FROM jobs GROUP BY category ORDER BY n DESC, category",
        )
    }

    fn count_jobs_by_location(&self) -> StorageResult<Vec<(String, u64)>> {
        self.grouped_counts(
            "SELECT location, COUNT(*) AS n FROM jobs GROUP BY location ORDER BY n DESC, location",
        )
    }

    fn count_pages_by_status(&self) -> StorageResult<Vec<(String, u64)>> {
        self.grouped_counts(
            "SELECT status, COUNT(*) AS n FROM pages GROUP BY status ORDER BY n DESC, status",
        )
    }
}

/// Result sink that finishes one open run
pub struct SqliteRunSink {
    storage: SqliteStorage,
    run_id: i64,
}

impl SqliteRunSink {
    pub fn run_id(&self) -> i64 {
        self.run_id
    }

    pub fn storage(&self) -> &SqliteStorage {
        &self.storage
    }

    pub fn into_storage(self) -> SqliteStorage {
        self.storage
    }
}

impl ResultSink for SqliteRunSink {
    fn write(&mut self, outcome: &CrawlOutcome) -> OutputResult<()> {
        let status = if outcome.cancelled {
            RunStatus::Interrupted
        } else {
            RunStatus::Completed
        };

        self.storage
            .finish_run(self.run_id, outcome, status)
            .map_err(|e| OutputError::Storage(e.to_string()))?;

        tracing::info!(
            "Stored run {} ({} record(s), {})",
            self.run_id,
            outcome.records.len(),
            status.to_db_string()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::NetworkCause;
    use crate::state::PageResult;

    fn sample_outcome(cancelled: bool) -> CrawlOutcome {
        let mut classified = JobRecord::new("Analyst", "Globex", "ankara");
        classified.category = "Finans / Muhasebe".to_string();

        CrawlOutcome::from_pages(
            vec![
                PageResult::extracted(
                    1,
                    vec![
                        JobRecord::new("Cook", "Diner", "istanbul"),
                        JobRecord::new("Driver", "Cargo", "istanbul"),
                    ],
                    1,
                ),
                PageResult::failed(2, PageStatus::HttpError(503), 2),
                PageResult::failed(3, PageStatus::NetworkError(NetworkCause::Timeout), 1),
                PageResult::extracted(4, vec![classified], 1),
                PageResult::extracted(5, Vec::new(), 1),
            ],
            cancelled,
        )
    }

    #[test]
    fn test_create_and_get_run() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        let run_id = storage.create_run("abc123", "istanbul").unwrap();

        let run = storage.get_run(run_id).unwrap();
        assert_eq!(run.config_hash, "abc123");
        assert_eq!(run.locality, "istanbul");
        assert_eq!(run.status, RunStatus::Running);
        assert!(run.finished_at.is_none());
    }

    #[test]
    fn test_get_missing_run() {
        let storage = SqliteStorage::new_in_memory().unwrap();
        assert!(matches!(storage.get_run(42), Err(StorageError::RunNotFound(42))));
        assert!(storage.get_latest_run().unwrap().is_none());
    }

    #[test]
    fn test_finish_run_stores_pages_and_jobs() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        let run_id = storage.create_run("hash", "istanbul").unwrap();
        let outcome = sample_outcome(false);

        storage
            .finish_run(run_id, &outcome, RunStatus::Completed)
            .unwrap();

        let run = storage.get_run(run_id).unwrap();
        assert_eq!(run.status, RunStatus::Completed);
        assert!(run.finished_at.is_some());
        assert_eq!(run.pages_attempted, 5);
        assert_eq!(run.pages_succeeded, 2);
        assert_eq!(run.pages_failed, 2);
        assert_eq!(run.pages_empty, 1);
        assert_eq!(run.record_count, 3);

        assert_eq!(storage.get_jobs(run_id).unwrap(), outcome.records);
        assert_eq!(storage.count_jobs().unwrap(), 3);
        assert_eq!(
            storage.count_jobs_by_category().unwrap(),
            vec![
                ("Unknown".to_string(), 2),
                ("Finans / Muhasebe".to_string(), 1)
            ]
        );
        assert_eq!(
            storage.count_pages_by_status().unwrap(),
            vec![
                ("ok".to_string(), 2),
                ("empty".to_string(), 1),
                ("http_error".to_string(), 1),
                ("network_error".to_string(), 1),
            ]
        );
    }

    #[test]
    fn test_finish_unknown_run_fails() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        let result = storage.finish_run(7, &CrawlOutcome::default(), RunStatus::Completed);
        assert!(matches!(result, Err(StorageError::RunNotFound(7))));
    }

    #[test]
    fn test_sink_marks_cancelled_run_interrupted() {
        let storage = SqliteStorage::new_in_memory().unwrap();
        let mut sink = storage.begin_run("hash", "izmir").unwrap();

        sink.write(&sample_outcome(true)).unwrap();

        let run = sink.storage().get_run(sink.run_id()).unwrap();
        assert_eq!(run.status, RunStatus::Interrupted);
    }

    #[test]
    fn test_empty_outcome_is_stored_as_completed() {
        let storage = SqliteStorage::new_in_memory().unwrap();
        let mut sink = storage.begin_run("hash", "bursa").unwrap();

        sink.write(&CrawlOutcome::default()).unwrap();

        let storage = sink.into_storage();
        let run = storage.get_latest_run().unwrap().unwrap();
        assert_eq!(run.status, RunStatus::Completed);
        assert_eq!(run.record_count, 0);
        assert_eq!(storage.count_runs().unwrap(), 1);
    }

    #[test]
    fn test_on_disk_database_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jobs.db");

        {
            let mut sink = SqliteStorage::new(&path)
                .unwrap()
                .begin_run("hash", "istanbul")
                .unwrap();
            sink.write(&sample_outcome(false)).unwrap();
        }

        let reopened = SqliteStorage::new(&path).unwrap();
        assert_eq!(reopened.count_jobs().unwrap(), 3);
        assert_eq!(
            reopened.count_jobs_by_location().unwrap()[0],
            ("istanbul".to_string(), 2)
        );
    }
}

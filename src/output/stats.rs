//! Run summaries and statistics display
//!
//! Builds the console report for a finished run (totals, per-category
//! counts, a row preview) and for the history stored in SQLite.

use crate::state::CrawlOutcome;
use crate::storage::{RunRecord, Storage};
use crate::HarvestError;
use std::collections::HashMap;

/// Summary of a single crawl outcome
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub total_records: usize,
    pub pages_attempted: u32,
    pub pages_succeeded: u32,
    pub pages_empty: u32,
    pub pages_failed: u32,
    /// (category, count), most frequent first, ties by name
    pub categories: Vec<(String, u64)>,
    /// Fewer records than the configured minimum were collected
    pub insufficient: bool,
    pub cancelled: bool,
}

/// Counts values, most frequent first
pub fn count_by<'a>(values: impl Iterator<Item = &'a str>) -> Vec<(String, u64)> {
    let mut counts: HashMap<&str, u64> = HashMap::new();
    for value in values {
        *counts.entry(value).or_insert(0) += 1;
    }

    let mut counts: Vec<(String, u64)> = counts
        .into_iter()
        .map(|(value, count)| (value.to_string(), count))
        .collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    counts
}

/// Summarizes an outcome
///
/// # Arguments
///
/// * `outcome` - The finished crawl outcome
/// * `minimum_records` - Threshold below which the run is flagged as insufficient
pub fn summarize(outcome: &CrawlOutcome, minimum_records: usize) -> RunSummary {
    RunSummary {
        total_records: outcome.records.len(),
        pages_attempted: outcome.pages_attempted,
        pages_succeeded: outcome.pages_succeeded,
        pages_empty: outcome.pages_empty,
        pages_failed: outcome.pages_failed,
        categories: count_by(outcome.records.iter().map(|r| r.category.as_str())),
        insufficient: outcome.records.len() < minimum_records,
        cancelled: outcome.cancelled,
    }
}

/// Prints the run report to stdout
///
/// # Arguments
///
/// * `outcome` - The finished crawl outcome
/// * `summary` - Its summary
/// * `preview_rows` - Number of records to preview
pub fn print_summary(outcome: &CrawlOutcome, summary: &RunSummary, preview_rows: usize) {
    let rule = "=".repeat(60);
    println!("{}", rule);
    println!("Total records: {}", summary.total_records);
    println!(
        "Pages: {} attempted, {} succeeded, {} empty, {} failed",
        summary.pages_attempted, summary.pages_succeeded, summary.pages_empty, summary.pages_failed
    );

    if summary.cancelled {
        println!("Run was cancelled before all pages were requested.");
    }

    if summary.total_records == 0 {
        println!("\nNo job listings were collected.");
    } else if summary.insufficient {
        println!("\nFewer listings than expected were collected.");
    }

    if !summary.categories.is_empty() {
        println!("\nJob type distribution:");
        for (category, count) in &summary.categories {
            println!("  {}: {}", category, count);
        }
    }

    if preview_rows > 0 && !outcome.records.is_empty() {
        println!("\nFirst {} row(s):", preview_rows.min(outcome.records.len()));
        for (index, record) in outcome.records.iter().take(preview_rows).enumerate() {
            println!(
                "  {:>3}  {} | {} | {} | {}",
                index, record.title, record.company, record.location, record.category
            );
        }
    }
    println!("{}", rule);
}

/// Statistics read back from storage
#[derive(Debug, Clone)]
pub struct StoredStatistics {
    pub total_runs: u64,
    pub total_jobs: u64,
    pub latest_run: Option<RunRecord>,
    /// (category, count), most frequent first
    pub jobs_by_category: Vec<(String, u64)>,
    /// (location, count), most frequent first
    pub jobs_by_location: Vec<(String, u64)>,
    /// (page status, count) across all runs
    pub pages_by_status: Vec<(String, u64)>,
}

/// Loads statistics from storage
///
/// # Returns
///
/// * `Ok(StoredStatistics)` - Successfully loaded statistics
/// * `Err(HarvestError)` - Failed to query storage
pub fn load_statistics(storage: &dyn Storage) -> Result<StoredStatistics, HarvestError> {
    Ok(StoredStatistics {
        total_runs: storage.count_runs()?,
        total_jobs: storage.count_jobs()?,
        latest_run: storage.get_latest_run()?,
        jobs_by_category: storage.count_jobs_by_category()?,
        jobs_by_location: storage.count_jobs_by_location()?,
        pages_by_status: storage.count_pages_by_status()?,
    })
}

/// Prints stored statistics to stdout in a formatted manner
pub fn print_statistics(stats: &StoredStatistics) {
    println!("=== Harvest Statistics ===\n");

    println!("Overview:");
    println!("  Runs recorded: {}", stats.total_runs);
    println!("  Jobs stored: {}", stats.total_jobs);
    println!();

    if let Some(run) = &stats.latest_run {
        println!("Latest Run (#{}):", run.id);
        println!("  Locality: {}", run.locality);
        println!("  Started: {}", run.started_at);
        if let Some(finished) = &run.finished_at {
            println!("  Finished: {}", finished);
        }
        println!("  Status: {}", run.status.to_db_string());
        println!(
            "  Pages: {} attempted, {} succeeded, {} empty, {} failed",
            run.pages_attempted, run.pages_succeeded, run.pages_empty, run.pages_failed
        );
        println!("  Records: {}", run.record_count);
        println!();
    }

    if !stats.jobs_by_category.is_empty() {
        println!("Jobs by Category:");
        for (category, count) in &stats.jobs_by_category {
            println!("  {}: {}", category, count);
        }
        println!();
    }

    if !stats.jobs_by_location.is_empty() {
        println!("Top Locations:");
        for (location, count) in stats.jobs_by_location.iter().take(10) {
            println!("  {}: {}", location, count);
        }
        println!();
    }

    if !stats.pages_by_status.is_empty() {
        println!("Pages by Status:");
        for (status, count) in &stats.pages_by_status {
            println!("  {}: {}", status, count);
        }
    }
}

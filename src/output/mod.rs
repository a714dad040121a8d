//! Output module for writing crawl results and reports
//!
//! This module handles:
//! - The `ResultSink` boundary that receives a finished outcome
//! - CSV export of the collected records
//! - Console summaries (category counts, row preview, stored statistics)

mod csv;
pub mod stats;
mod traits;

pub use csv::{write_records, CsvSink, CSV_HEADER};
pub use stats::{
    count_by, load_statistics, print_statistics, print_summary, summarize, RunSummary,
    StoredStatistics,
};
pub use traits::{OutputError, OutputResult, ResultSink};

use crate::state::CrawlOutcome;

/// Hands one outcome to every sink in order
///
/// Stops at the first sink that fails.
pub fn write_all(sinks: &mut [&mut dyn ResultSink], outcome: &CrawlOutcome) -> OutputResult<()> {
    for sink in sinks.iter_mut() {
        sink.write(outcome)?;
    }
    Ok(())
}

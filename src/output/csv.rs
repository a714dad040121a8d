//! CSV result sink
//!
//! Writes one row per record with the header
//! `job_title,company,location,job_type`. The file starts with a UTF-8 byte
//! order mark so spreadsheet tools pick the right encoding for Turkish text.
//! Rows end with a bare `\n`.

use crate::crawler::JobRecord;
use crate::output::traits::{OutputResult, ResultSink};
use crate::state::CrawlOutcome;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Column names, in order
pub const CSV_HEADER: [&str; 4] = ["job_title", "company", "location", "job_type"];

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Writes records to a CSV file, replacing any previous content
#[derive(Debug, Clone)]
pub struct CsvSink {
    path: PathBuf,
}

impl CsvSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ResultSink for CsvSink {
    fn write(&mut self, outcome: &CrawlOutcome) -> OutputResult<()> {
        let file = File::create(&self.path)?;
        let mut writer = BufWriter::new(file);
        write_records(&mut writer, &outcome.records)?;
        writer.flush()?;

        tracing::info!(
            "Wrote {} record(s) to {}",
            outcome.records.len(),
            self.path.display()
        );
        Ok(())
    }
}

/// Writes the BOM, the header and one row per record
pub fn write_records<W: Write>(writer: &mut W, records: &[JobRecord]) -> OutputResult<()> {
    writer.write_all(UTF8_BOM)?;
    write_row(writer, &CSV_HEADER)?;

    for record in records {
        write_row(
            writer,
            &[
                record.title.as_str(),
                record.company.as_str(),
                record.location.as_str(),
                record.category.as_str(),
            ],
        )?;
    }

    Ok(())
}

fn write_row<W: Write>(writer: &mut W, fields: &[&str]) -> OutputResult<()> {
    let line = fields
        .iter()
        .map(|field| escape_field(field))
        .collect::<Vec<_>>()
        .join(",");
    writer.write_all(line.as_bytes())?;
    writer.write_all(b"\n")?;
    Ok(())
}

/// Quotes a field if it contains a delimiter, quote or line break
fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

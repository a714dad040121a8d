/// Per-page status definitions
///
/// A page ends in exactly one of these states once its fetch (and retries)
/// and extraction are done.
use crate::crawler::{JobRecord, NetworkCause};
use std::fmt;

/// Final status of one result page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageStatus {
    /// Fetched and at least one record extracted
    Ok,

    /// Server answered with a non-200 status
    HttpError(u16),

    /// Timeout, DNS failure, reset connection or unreadable body
    NetworkError(NetworkCause),

    /// Fetched, but no recognizable listing was found
    Empty,
}

impl PageStatus {
    /// Returns true if the page contributed records
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Ok)
    }

    /// Returns true if the page could not be retrieved
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::HttpError(_) | Self::NetworkError(_))
    }

    /// Returns true if a later attempt might succeed
    ///
    /// Network failures, HTTP 429 and HTTP 5xx are transient.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::NetworkError(_) => true,
            Self::HttpError(code) => *code == 429 || (500..600).contains(code),
            Self::Ok | Self::Empty => false,
        }
    }

    /// Converts the status to its database string representation
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::HttpError(_) => "http_error",
            Self::NetworkError(_) => "network_error",
            Self::Empty => "empty",
        }
    }

    /// Returns the HTTP status code, if the page failed with one
    pub fn http_code(&self) -> Option<u16> {
        match self {
            Self::HttpError(code) => Some(*code),
            _ => None,
        }
    }
}

impl fmt::Display for PageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ok => write!(f, "ok"),
            Self::HttpError(code) => write!(f, "HTTP {}", code),
            Self::NetworkError(cause) => write!(f, "network error: {}", cause),
            Self::Empty => write!(f, "empty"),
        }
    }
}

/// Result of processing one page
///
/// Lives only until the coordinator folds it into the outcome.
#[derive(Debug, Clone)]
pub struct PageResult {
    /// 1-based page number
    pub page_number: u32,

    /// Final status after all attempts
    pub status: PageStatus,

    /// Extracted records in page order (empty unless `status` is Ok)
    pub records: Vec<JobRecord>,

    /// Number of fetch attempts made for this page
    pub attempts: u32,
}

impl PageResult {
    /// Creates a result for a page that could not be retrieved
    pub fn failed(page_number: u32, status: PageStatus, attempts: u32) -> Self {
        Self {
            page_number,
            status,
            records: Vec::new(),
            attempts,
        }
    }

    /// Creates a result from the records extracted from a fetched page
    pub fn extracted(page_number: u32, records: Vec<JobRecord>, attempts: u32) -> Self {
        let status = if records.is_empty() {
            PageStatus::Empty
        } else {
            PageStatus::Ok
        };

        Self {
            page_number,
            status,
            records,
            attempts,
        }
    }
}

/// What remains of a page after its records move into the outcome
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageReport {
    pub page_number: u32,
    pub status: PageStatus,
    pub record_count: usize,
    pub attempts: u32,
}

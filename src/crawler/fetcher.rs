//! HTTP fetcher implementation
//!
//! This module handles the single outbound request made per page attempt:
//! - Building the HTTP client with the fixed User-Agent
//! - One GET per attempt, bounded by the per-fetch timeout
//! - Classifying the outcome into a `FetchResult`
//!
//! No retries happen here; the coordinator owns retry policy.

use crate::config::SourceConfig;
use reqwest::{Client, StatusCode};
use std::fmt;
use std::future::Future;
use std::time::Duration;
use url::Url;

/// Connect timeout applied to every request, independent of the fetch timeout
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Why a request did not produce a response body
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetworkCause {
    /// The request exceeded the per-fetch timeout
    Timeout,

    /// The connection could not be established (refused, DNS, TLS)
    Connect,

    /// The response arrived but its body could not be read
    Body(String),

    /// Any other transport failure
    Other(String),
}

impl fmt::Display for NetworkCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout => write!(f, "request timed out"),
            Self::Connect => write!(f, "connection failed"),
            Self::Body(e) => write!(f, "failed to read body: {}", e),
            Self::Other(e) => write!(f, "{}", e),
        }
    }
}

/// Result of a single fetch attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchResult {
    /// HTTP 200 with the page body
    Success(String),

    /// Any status other than 200
    HttpFailure(u16),

    /// No usable response
    NetworkFailure(NetworkCause),
}

/// Retrieves one page per call
///
/// Implementations never fail with an error: ordinary network and HTTP
/// conditions are returned as `FetchResult` variants.
pub trait PageFetcher {
    /// Issues one GET for `url`, giving up after `timeout`
    fn fetch(&self, url: &Url, timeout: Duration) -> impl Future<Output = FetchResult>;
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `source` - The source configuration carrying the User-Agent
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use job_harvest::config::SourceConfig;
/// use job_harvest::crawler::build_http_client;
///
/// let client = build_http_client(&SourceConfig::default()).unwrap();
/// ```
pub fn build_http_client(source: &SourceConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(source.user_agent.clone())
        .connect_timeout(CONNECT_TIMEOUT)
        .gzip(true)
        .brotli(true)
        .build()
}

/// `PageFetcher` backed by a shared `reqwest::Client`
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Creates a fetcher for the given source
    pub fn new(source: &SourceConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(source)?,
        })
    }

    /// Wraps an already configured client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &Url, timeout: Duration) -> FetchResult {
        fetch_url(&self.client, url, timeout).await
    }
}

/// Fetches a URL and classifies the outcome
///
/// | Condition | Result |
/// |-----------|--------|
/// | HTTP 200 | `Success(body)` |
/// | Any other status | `HttpFailure(code)` |
/// | Timeout | `NetworkFailure(Timeout)` |
/// | Connection refused, DNS, TLS | `NetworkFailure(Connect)` |
/// | Body read failure | `NetworkFailure(Body)` |
pub async fn fetch_url(client: &Client, url: &Url, timeout: Duration) -> FetchResult {
    let response = match client.get(url.clone()).timeout(timeout).send().await {
        Ok(response) => response,
        Err(e) => return FetchResult::NetworkFailure(classify_error(&e)),
    };

    let status = response.status();
    if status != StatusCode::OK {
        return FetchResult::HttpFailure(status.as_u16());
    }

    match response.text().await {
        Ok(body) => FetchResult::Success(body),
        Err(e) if e.is_timeout() => FetchResult::NetworkFailure(NetworkCause::Timeout),
        Err(e) => FetchResult::NetworkFailure(NetworkCause::Body(e.to_string())),
    }
}

/// Maps a transport error to its cause
fn classify_error(error: &reqwest::Error) -> NetworkCause {
    if error.is_timeout() {
        NetworkCause::Timeout
    } else if error.is_connect() {
        NetworkCause::Connect
    } else {
        NetworkCause::Other(error.to_string())
    }
}

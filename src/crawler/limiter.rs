//! Politeness delays between requests
//!
//! This module handles:
//! - Drawing a uniformly random delay from the configured window
//! - Gating dispatches so that, across all in-flight pages, consecutive
//!   requests are separated by one delay each

use crate::config::CrawlConfig;
use std::future::Future;
use std::time::Duration;
use tokio::sync::Mutex;

/// Spaces consecutive requests apart
pub trait RateLimiter {
    /// Blocks the calling flow for one politeness delay
    fn wait(&self) -> impl Future<Output = ()>;
}

/// Sleeps for a duration drawn uniformly from `[min, max]` seconds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RandomDelay {
    min_seconds: f64,
    max_seconds: f64,
}

impl RandomDelay {
    /// Creates a limiter for the given window
    ///
    /// The bounds are expected to be validated (finite, `0 <= min <= max`);
    /// out-of-order bounds are swapped rather than rejected here.
    pub fn new(min_seconds: f64, max_seconds: f64) -> Self {
        let min_seconds = min_seconds.max(0.0);
        let max_seconds = max_seconds.max(0.0);
        if min_seconds <= max_seconds {
            Self {
                min_seconds,
                max_seconds,
            }
        } else {
            Self {
                min_seconds: max_seconds,
                max_seconds: min_seconds,
            }
        }
    }

    /// Creates a limiter from the crawl configuration's delay window
    pub fn from_config(config: &CrawlConfig) -> Self {
        Self::new(config.min_delay_seconds, config.max_delay_seconds)
    }

    /// Draws one delay
    ///
    /// Values beyond what `Duration` can hold saturate at `Duration::MAX`.
    pub fn sample(&self) -> Duration {
        let seconds = if self.min_seconds == self.max_seconds {
            self.min_seconds
        } else {
            rand::random_range(self.min_seconds..=self.max_seconds)
        };
        Duration::try_from_secs_f64(seconds).unwrap_or(Duration::MAX)
    }

    /// Returns the configured window in seconds
    pub fn bounds(&self) -> (f64, f64) {
        (self.min_seconds, self.max_seconds)
    }
}

impl RateLimiter for RandomDelay {
    async fn wait(&self) {
        let delay = self.sample();
        tracing::debug!("Waiting {:.2}s before next request", delay.as_secs_f64());
        tokio::time::sleep(delay).await;
    }
}

/// Shared gate every page dispatch passes through
///
/// The first dispatch goes straight through; every later one first waits out
/// one limiter delay. Dispatchers queue on the gate in FIFO order, so with
/// several workers the aggregate request rate is still one per delay. The
/// gate is held for the delay only, never during a request.
pub struct DispatchGate<'a, L> {
    limiter: &'a L,
    dispatched: Mutex<bool>,
}

impl<'a, L: RateLimiter> DispatchGate<'a, L> {
    /// Creates a gate that has not dispatched anything yet
    pub fn new(limiter: &'a L) -> Self {
        Self {
            limiter,
            dispatched: Mutex::new(false),
        }
    }

    /// Waits until the caller may issue its request
    pub async fn admit(&self) {
        let mut dispatched = self.dispatched.lock().await;
        if *dispatched {
            tracing::trace!("Dispatch gated behind politeness delay");
            self.limiter.wait().await;
        } else {
            *dispatched = true;
        }
    }
}

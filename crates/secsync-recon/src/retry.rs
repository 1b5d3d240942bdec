//! Explicit retry policy with bounded exponential backoff.
//!
//! Every remote call in a reconciliation pass is retried under a
//! [`RetryPolicy`] value rather than ad-hoc retry loops at each call site.
//! The policy is plain data, so callers can tune budgets per deployment
//! and tests can shrink delays to keep runs fast.

use log::warn;
use std::fmt;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

/// Classifies errors as transient or permanent.
///
/// Only transient errors are retried; a permanent failure is surfaced
/// immediately regardless of remaining attempts.
pub trait Retryable {
    /// Returns true if the operation may succeed on retry.
    fn is_retryable(&self) -> bool;
}

/// Retry budget with bounded exponential backoff.
///
/// The delay before attempt `n + 1` is
/// `initial_backoff * multiplier^(n - 1)`, capped at `max_backoff`. No
/// jitter is applied; delays are deterministic.
///
/// # Examples
///
/// ```
/// use secsync_recon::RetryPolicy;
/// use std::time::Duration;
///
/// let policy = RetryPolicy::new(5, Duration::from_millis(200));
/// assert_eq!(policy.delay_for(1), Duration::from_millis(200));
/// assert_eq!(policy.delay_for(3), Duration::from_millis(800));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of attempts, including the first. Values below 1 are
    /// treated as 1: an operation always runs at least once.
    pub max_attempts: u32,
    /// Delay after the first failed attempt.
    pub initial_backoff: Duration,
    /// Backoff growth factor between consecutive attempts.
    pub multiplier: u32,
    /// Upper bound on any single delay.
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_backoff: Duration::from_millis(200),
            multiplier: 2,
            max_backoff: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    /// Creates a policy with the default multiplier and cap.
    pub fn new(max_attempts: u32, initial_backoff: Duration) -> Self {
        Self {
            max_attempts,
            initial_backoff,
            ..Self::default()
        }
    }

    /// Sets the backoff cap.
    pub fn with_max_backoff(mut self, max_backoff: Duration) -> Self {
        self.max_backoff = max_backoff;
        self
    }

    /// Sets the backoff growth factor.
    pub fn with_multiplier(mut self, multiplier: u32) -> Self {
        self.multiplier = multiplier;
        self
    }

    /// Returns the effective attempt budget (at least 1).
    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Returns the delay to wait after the given failed attempt (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let mut delay = self.initial_backoff;
        for _ in 1..attempt {
            delay = delay
                .checked_mul(self.multiplier)
                .unwrap_or(self.max_backoff)
                .min(self.max_backoff);
        }
        delay.min(self.max_backoff)
    }

    /// Runs a fallible async operation under this policy.
    ///
    /// Permanent errors (per [`Retryable`]) and the final attempt's error
    /// are returned as-is; transient failures in between are logged and
    /// retried after the scheduled backoff.
    pub async fn run<T, E, F, Fut>(&self, operation: &str, mut op: F) -> Result<T, E>
    where
        E: Retryable + fmt::Display,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let attempts = self.attempts();
        let mut attempt = 1;

        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_retryable() && attempt < attempts => {
                    let delay = self.delay_for(attempt);
                    warn!(
                        "{} failed (attempt {}/{}), retrying in {:?}: {}",
                        operation, attempt, attempts, delay, err
                    );
                    sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

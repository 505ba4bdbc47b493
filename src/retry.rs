//! Bounded fixed-delay retry policy and the sleep abstraction behind it.
//!
//! The policy is a pure function of the attempt number, so retry behavior is
//! tested without real time passing. Anything that waits (search retries, the
//! polite delay between downloads) goes through a [`Sleeper`], which tests
//! replace with a recording implementation.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use sitefetch_core::{RetryDecision, RetryPolicy};
//!
//! let policy = RetryPolicy::new(2, Duration::from_secs(1));
//! assert_eq!(
//!     policy.decide(1),
//!     RetryDecision::Retry { delay: Duration::from_secs(1), attempt: 2 }
//! );
//! assert!(matches!(policy.decide(3), RetryDecision::DoNotRetry { .. }));
//! ```

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

/// Default number of retries after the first failed attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 2;

/// Default fixed delay between attempts (1 second).
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Decision on whether to try a failed request again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryDecision {
    /// Retry after the specified delay.
    Retry {
        /// How long to wait before retrying.
        delay: Duration,
        /// Which attempt this will be (1-indexed, so the first retry is attempt 2).
        attempt: u32,
    },

    /// Give up.
    DoNotRetry {
        /// Human-readable reason why retry is not attempted.
        reason: String,
    },
}

/// Retry configuration: a small number of retries with a constant delay.
///
/// Quota errors are never retried; this policy only applies to failures the
/// caller has already classified as transient.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_retries: u32,
    delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_RETRIES, DEFAULT_RETRY_DELAY)
    }
}

impl RetryPolicy {
    /// Creates a policy allowing `max_retries` retries spaced by `delay`.
    #[must_use]
    pub const fn new(max_retries: u32, delay: Duration) -> Self {
        Self { max_retries, delay }
    }

    /// A policy that never retries.
    #[must_use]
    pub const fn no_retry() -> Self {
        Self::new(0, Duration::ZERO)
    }

    /// Maximum retries after the first attempt.
    #[must_use]
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Total attempts allowed, including the first.
    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Decides what to do after `failed_attempt` (1-indexed) failed.
    #[must_use]
    pub fn decide(&self, failed_attempt: u32) -> RetryDecision {
        if failed_attempt >= self.max_attempts() {
            debug!(
                failed_attempt,
                max_attempts = self.max_attempts(),
                "retries exhausted"
            );
            return RetryDecision::DoNotRetry {
                reason: format!("max attempts ({}) exhausted", self.max_attempts()),
            };
        }

        RetryDecision::Retry {
            delay: self.delay,
            attempt: failed_attempt + 1,
        }
    }
}

/// Abstraction over waiting, so retry and pacing logic can run without real delays.
#[async_trait]
pub trait Sleeper: Send + Sync + fmt::Debug {
    /// Waits for `duration`.
    async fn sleep(&self, duration: Duration);
}

/// [`Sleeper`] backed by `tokio::time::sleep`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        if !duration.is_zero() {
            tokio::time::sleep(duration).await;
        }
    }
}

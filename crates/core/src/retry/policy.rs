//! Backoff policy
//!
//! Only transient kinds (`Network`, `Server`) are retried, only for requests
//! that are safe to repeat, and only while the retry budget lasts. `Auth`
//! failures go through the refresh flow instead; `Validation` and `Unknown`
//! are final.

use std::time::Duration;

use conduit_domain::constants::MAX_BACKOFF_EXPONENT;
use conduit_domain::{ErrorKind, RetryConfig};
use rand::Rng;

/// Outcome of a retry consultation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryDecision {
    pub retry: bool,
    /// Wait before the next attempt; zero when `retry` is false
    pub delay: Duration,
}

impl RetryDecision {
    pub const STOP: Self = Self { retry: false, delay: Duration::ZERO };

    pub fn after(delay: Duration) -> Self {
        Self { retry: true, delay }
    }
}

/// Exponential backoff with additive jitter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    base_delay: Duration,
    max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}

impl RetryPolicy {
    pub fn new(base_delay: Duration, max_delay: Duration) -> Self {
        Self { base_delay, max_delay: max_delay.max(base_delay) }
    }

    pub fn from_config(config: &RetryConfig) -> Self {
        Self::new(config.base_delay(), config.max_delay())
    }

    pub fn base_delay(&self) -> Duration {
        self.base_delay
    }

    /// Decide whether a failed attempt should be retried.
    ///
    /// # Arguments
    /// * `kind` - classification of the failure
    /// * `attempt` - retries already performed for this call (0 after the
    ///   first failure)
    /// * `max_attempts` - retries allowed beyond the first attempt
    /// * `is_idempotent` - whether the request is safe to send again
    pub fn should_retry(
        &self,
        kind: ErrorKind,
        attempt: u32,
        max_attempts: u32,
        is_idempotent: bool,
    ) -> RetryDecision {
        if attempt >= max_attempts || !kind.is_transient() || !is_idempotent {
            return RetryDecision::STOP;
        }
        RetryDecision::after(self.delay_for(attempt + 1))
    }

    /// Delay before the `retry_number`-th retry (1-based):
    /// `min(base * 2^(n-1), max) + jitter`, jitter uniform in `[0, base)`.
    pub fn delay_for(&self, retry_number: u32) -> Duration {
        self.exponential_delay(retry_number) + self.jitter()
    }

    /// Delay without jitter
    pub fn exponential_delay(&self, retry_number: u32) -> Duration {
        let exponent = retry_number.saturating_sub(1).min(MAX_BACKOFF_EXPONENT);
        self.base_delay.saturating_mul(2_u32.saturating_pow(exponent)).min(self.max_delay)
    }

    fn jitter(&self) -> Duration {
        let base_millis = self.base_delay.as_millis() as u64;
        if base_millis == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(rand::thread_rng().gen_range(0..base_millis))
    }
}

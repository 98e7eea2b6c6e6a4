//! Attempt bookkeeping for one logical call

use std::time::Duration;

/// Immutable attempt state threaded through the retries of one call
///
/// Each transition returns a new value; a state is never updated in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AttemptState {
    /// Retries spent on the backoff path
    pub retries: u32,
    /// Sum of backoff delays waited so far
    pub total_delay: Duration,
    /// Whether the single post-refresh retry has been used
    pub refreshed: bool,
}

impl AttemptState {
    pub fn initial() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn after_backoff(self, delay: Duration) -> Self {
        Self {
            retries: self.retries.saturating_add(1),
            total_delay: self.total_delay.saturating_add(delay),
            ..self
        }
    }

    #[must_use]
    pub fn after_refresh(self) -> Self {
        Self { refreshed: true, ..self }
    }

    /// Transport attempts made once the next one is sent
    pub fn attempt_number(&self) -> u32 {
        1 + self.retries + u32::from(self.refreshed)
    }
}

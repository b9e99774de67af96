//! Bounded retry policy for parameter writes.

use std::time::Duration;

use crate::config::SyncConfig;
use crate::error::StoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Wait this long, then try again.
    Retry(Duration),
    GiveUp,
}

/// Decides whether a failed write is retried.
///
/// Only rate-limit failures are retried, with a linear backoff of
/// `pause * (attempt + 1)`, until `max_attempts` attempts have been made.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    pause: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, pause: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            pause,
        }
    }

    pub fn from_config(config: &SyncConfig) -> Self {
        Self::new(config.max_save_attempts, config.pause_time())
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// `attempt` is the zero-based index of the attempt that just failed.
    pub fn decide(&self, attempt: u32, error: &StoreError) -> RetryDecision {
        if !error.is_rate_limited() || attempt + 1 >= self.max_attempts {
            return RetryDecision::GiveUp;
        }
        RetryDecision::Retry(self.pause * (attempt + 1))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&SyncConfig::default())
    }
}

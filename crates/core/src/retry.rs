// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bounded retry policy for activity calls.
//!
//! Semantics follow the durable-task convention: `max_attempts` counts the
//! first call, the interval is fixed, and `retry_timeout` is measured from the
//! start of the first attempt. A failure observed at or after
//! `first_attempt + retry_timeout` is not retried.

use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    #[serde(with = "crate::duration_serde")]
    pub first_interval: Duration,
    pub max_attempts: u32,
    #[serde(with = "crate::duration_serde")]
    pub retry_timeout: Duration,
}

impl RetryPolicy {
    pub fn new(first_interval: Duration, max_attempts: u32, retry_timeout: Duration) -> Self {
        Self { first_interval, max_attempts, retry_timeout }
    }

    /// The status-check policy: every 30s, at most 3 attempts, 30s overall.
    pub fn status_check() -> Self {
        Self::new(Duration::from_secs(30), 3, Duration::from_secs(30))
    }

    /// Delay before the next attempt, or `None` when the budget is spent.
    ///
    /// `attempts` is the number of attempts already made (>= 1) and `elapsed`
    /// is the time since the first attempt started.
    pub fn next_delay(&self, attempts: u32, elapsed: Duration) -> Option<Duration> {
        if attempts >= self.max_attempts || elapsed >= self.retry_timeout {
            return None;
        }
        if self.first_interval.is_zero() {
            return None;
        }
        Some(self.first_interval)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::status_check()
    }
}

#[cfg(test)]
#[path = "retry_tests.rs"]
mod tests;

// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Polling cadence.

use std::time::Duration;

/// How many times to sample state and how long to wait between samples.
///
/// There is no separate timeout: the worst case is
/// [`worst_case`](Self::worst_case).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct WaitConfig {
    /// Total number of attempts. Zero is treated as one.
    pub retry_limit: u32,
    /// Delay between consecutive attempts.
    pub retry_interval: Duration,
}

impl WaitConfig {
    /// 10 attempts, 500 ms apart.
    #[must_use]
    pub const fn standard() -> Self {
        Self {
            retry_limit: 10,
            retry_interval: Duration::from_millis(500),
        }
    }

    /// 50 attempts, 100 ms apart, for waiting out animations.
    #[must_use]
    pub const fn animation() -> Self {
        Self {
            retry_limit: 50,
            retry_interval: Duration::from_millis(100),
        }
    }

    /// `retry_limit` attempts with no delay, for pre-recorded state.
    #[must_use]
    pub const fn immediate(retry_limit: u32) -> Self {
        Self {
            retry_limit,
            retry_interval: Duration::ZERO,
        }
    }

    /// Returns a copy with a different attempt count.
    #[must_use]
    pub const fn with_retry_limit(mut self, retry_limit: u32) -> Self {
        self.retry_limit = retry_limit;
        self
    }

    /// Returns a copy with a different delay.
    #[must_use]
    pub const fn with_retry_interval(mut self, retry_interval: Duration) -> Self {
        self.retry_interval = retry_interval;
        self
    }

    /// Number of attempts actually made: at least one.
    #[must_use]
    pub const fn attempts(&self) -> u32 {
        if self.retry_limit == 0 {
            1
        } else {
            self.retry_limit
        }
    }

    /// Total sleep time if every attempt fails.
    #[must_use]
    pub const fn worst_case(&self) -> Duration {
        self.retry_interval.saturating_mul(self.attempts() - 1)
    }
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets() {
        assert_eq!(WaitConfig::default(), WaitConfig::standard());
        assert_eq!(WaitConfig::animation().attempts(), 50);
        assert_eq!(WaitConfig::immediate(3).retry_interval, Duration::ZERO);
    }

    #[test]
    fn zero_attempts_clamps_to_one() {
        let config = WaitConfig::standard().with_retry_limit(0);
        assert_eq!(config.attempts(), 1);
        assert_eq!(config.worst_case(), Duration::ZERO);
    }

    #[test]
    fn worst_case_excludes_final_sleep() {
        let config = WaitConfig::immediate(4).with_retry_interval(Duration::from_millis(10));
        assert_eq!(config.worst_case(), Duration::from_millis(30));
    }
}

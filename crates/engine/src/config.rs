// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Engine configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

use roster_core::DEFAULT_SUBSCRIBER_BUFFER;

/// Tunables for the registration engine
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EngineConfig {
    /// How long one operation may wait for its row locks
    #[serde(with = "humantime_serde")]
    pub lock_timeout: Duration,
    /// Undelivered deltas each subscriber may buffer before disconnect
    pub subscriber_buffer: usize,
}

impl EngineConfig {
    pub fn new() -> Self {
        Self {
            lock_timeout: Duration::from_secs(5),
            subscriber_buffer: DEFAULT_SUBSCRIBER_BUFFER,
        }
    }

    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }

    pub fn with_subscriber_buffer(mut self, buffer: usize) -> Self {
        self.subscriber_buffer = buffer;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Bounded retry policy for lock timeouts
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total attempts, including the first
    pub max_attempts: u32,
    /// Delay before the first retry; doubles per attempt
    #[serde(with = "humantime_serde")]
    pub base_delay: Duration,
}

impl RetryConfig {
    pub fn new() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(50),
        }
    }

    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    pub fn with_base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::new()
    }
}

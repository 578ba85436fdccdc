// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Semaphore manager settings

use super::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Whether lock operations reach the backend
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Delegate to the lock adapter
    #[default]
    Live,
    /// Bypass the adapter; every operation succeeds
    Demo,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Live => f.write_str("live"),
            Mode::Demo => f.write_str("demo"),
        }
    }
}

/// Static configuration of one manager instance
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManagerConfig {
    pub mode: Mode,
    /// Total acquisition attempts before giving up
    pub try_count: u32,
    /// Pause between acquisition attempts
    #[serde(with = "humantime_serde")]
    pub sleep_time: Duration,
    /// TTL used when the caller does not supply one
    #[serde(with = "humantime_serde")]
    pub max_lock_time: Duration,
    /// Reject reentrant acquisition of a key this process already holds
    pub block_on_reacquire: bool,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            mode: Mode::Live,
            try_count: 10,
            sleep_time: Duration::from_millis(100),
            max_lock_time: Duration::from_secs(60),
            block_on_reacquire: true,
        }
    }
}

impl ManagerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_try_count(mut self, try_count: u32) -> Self {
        self.try_count = try_count;
        self
    }

    pub fn with_sleep_time(mut self, sleep_time: Duration) -> Self {
        self.sleep_time = sleep_time;
        self
    }

    pub fn with_max_lock_time(mut self, max_lock_time: Duration) -> Self {
        self.max_lock_time = max_lock_time;
        self
    }

    pub fn with_block_on_reacquire(mut self, block: bool) -> Self {
        self.block_on_reacquire = block;
        self
    }

    pub fn is_demo(&self) -> bool {
        self.mode == Mode::Demo
    }

    /// TTL for one acquisition: the caller's value when non-zero, else the default
    pub fn effective_ttl(&self, requested: Option<Duration>) -> Duration {
        match requested {
            Some(ttl) if !ttl.is_zero() => ttl,
            _ => self.max_lock_time,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.try_count == 0 {
            return Err(ConfigError::Invalid {
                field: "try_count",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.max_lock_time.is_zero() {
            return Err(ConfigError::Invalid {
                field: "max_lock_time",
                reason: "must be non-zero".to_string(),
            });
        }
        Ok(())
    }
}

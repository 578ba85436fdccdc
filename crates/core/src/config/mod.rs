// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Configuration
//!
//! A keylock config file is TOML with three optional tables:
//!
//! ```toml
//! [manager]
//! mode = "live"
//! try_count = 10
//! sleep_time = "100ms"
//! max_lock_time = "60s"
//! block_on_reacquire = true
//!
//! [keys]
//! prefix = "keylock:"
//! strategy = "plain"
//!
//! [backend]
//! kind = "file"
//! dir = "/tmp/keylock"
//! ```

mod keys;
mod manager;

pub use keys::{KeyConfig, KeyStrategy};
pub use manager::{ManagerConfig, Mode};

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors loading or validating configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Which lock store backs live mode
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Lock files in a shared directory
    #[default]
    File,
    /// In-process store; only coordinates within one process
    Memory,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub kind: BackendKind,
    /// Lock directory for the file backend
    pub dir: PathBuf,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            kind: BackendKind::File,
            dir: std::env::temp_dir().join("keylock"),
        }
    }
}

/// Complete contents of a keylock config file
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeylockConfig {
    pub manager: ManagerConfig,
    pub keys: KeyConfig,
    pub backend: BackendConfig,
}

impl KeylockConfig {
    /// Parse and validate TOML content
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.manager.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a config file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Key resolution settings

use crate::key::{HashedKeyResolver, KeyResolver, PlainKeyResolver};
use serde::{Deserialize, Serialize};

/// How source keys become lock keys
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyStrategy {
    #[default]
    Plain,
    Hashed,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyConfig {
    /// Prepended to every lock key
    pub prefix: String,
    pub strategy: KeyStrategy,
}

impl Default for KeyConfig {
    fn default() -> Self {
        Self {
            prefix: "keylock:".to_string(),
            strategy: KeyStrategy::Plain,
        }
    }
}

impl KeyConfig {
    pub fn resolver(&self) -> Box<dyn KeyResolver> {
        match self.strategy {
            KeyStrategy::Plain => Box::new(PlainKeyResolver::new(self.prefix.clone())),
            KeyStrategy::Hashed => Box::new(HashedKeyResolver::new(self.prefix.clone())),
        }
    }
}

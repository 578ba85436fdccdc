// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lock keys and key resolution
//!
//! Callers name resources with arbitrary serializable values ([`SourceKey`]).
//! A [`KeyResolver`] turns those into the canonical [`LockKey`] strings that
//! adapters and the ledger work with.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fmt;

/// Canonical identifier for a guarded resource
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LockKey(String);

impl LockKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LockKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for LockKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Application-level key, as supplied by the caller
///
/// Strings render as themselves; any other value renders as compact JSON.
/// Object keys are ordered, so equal values always render identically.
#[derive(Clone, Debug, PartialEq)]
pub struct SourceKey(Value);

impl SourceKey {
    /// Build a source key from any serializable value
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> Result<Self, serde_json::Error> {
        serde_json::to_value(value).map(Self)
    }

    pub fn value(&self) -> &Value {
        &self.0
    }

    /// Textual rendering used in logs and ownership context descriptors
    pub fn render(&self) -> String {
        match &self.0 {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for SourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Value::String(s) => f.write_str(s),
            other => write!(f, "{}", other),
        }
    }
}

impl From<&str> for SourceKey {
    fn from(s: &str) -> Self {
        Self(Value::String(s.to_string()))
    }
}

impl From<String> for SourceKey {
    fn from(s: String) -> Self {
        Self(Value::String(s))
    }
}

impl From<u64> for SourceKey {
    fn from(n: u64) -> Self {
        Self(Value::from(n))
    }
}

impl From<i64> for SourceKey {
    fn from(n: i64) -> Self {
        Self(Value::from(n))
    }
}

impl From<Value> for SourceKey {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

/// Maps a source key to its canonical lock key. Must be pure and deterministic.
pub trait KeyResolver: Send + Sync {
    fn resolve(&self, src: &SourceKey) -> LockKey;
}

impl<R: KeyResolver + ?Sized> KeyResolver for Box<R> {
    fn resolve(&self, src: &SourceKey) -> LockKey {
        (**self).resolve(src)
    }
}

/// Uses the rendered source key verbatim, behind an optional prefix
#[derive(Clone, Debug, Default)]
pub struct PlainKeyResolver {
    prefix: String,
}

impl PlainKeyResolver {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl KeyResolver for PlainKeyResolver {
    fn resolve(&self, src: &SourceKey) -> LockKey {
        LockKey(format!("{}{}", self.prefix, src.render()))
    }
}

/// Hashes the rendered source key so arbitrarily large or structured keys
/// produce short, backend-safe identifiers
#[derive(Clone, Debug, Default)]
pub struct HashedKeyResolver {
    prefix: String,
}

impl HashedKeyResolver {
    /// Hex digits kept from the SHA-256 digest
    pub const DIGEST_LEN: usize = 32;

    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl KeyResolver for HashedKeyResolver {
    fn resolve(&self, src: &SourceKey) -> LockKey {
        let digest = Sha256::digest(src.render().as_bytes());
        let hex: String = digest
            .iter()
            .take(Self::DIGEST_LEN / 2)
            .map(|b| format!("{:02x}", b))
            .collect();
        LockKey(format!("{}{}", self.prefix, hex))
    }
}

#[cfg(test)]
#[path = "key_tests.rs"]
mod tests;

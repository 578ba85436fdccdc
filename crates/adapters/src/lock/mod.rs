// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lock storage adapters
//!
//! An adapter owns the real cross-process coordination: it must guarantee a
//! single holder per key, honor TTLs, and only release a key for its owner.

mod file;
mod memory;

pub use file::FileLockAdapter;
pub use memory::{MemoryLockAdapter, MemoryLockStore};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeLockAdapter, LockCall};

use keylock_core::{LockKey, OwnerId};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Errors from lock backends
#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("corrupt lock record {path}: {reason}")]
    Corrupt { path: PathBuf, reason: String },
    #[error("backend unavailable: {0}")]
    Unavailable(String),
}

/// Atomic lock operations against a shared store
pub trait LockAdapter: Send + Sync {
    /// Take `key` for `ttl` if nobody else holds it. Returns `false` when the
    /// key is held by another owner.
    fn try_acquire(&self, key: &LockKey, ttl: Duration) -> Result<bool, AdapterError>;

    /// Push the expiry of a key this owner holds to `ttl` from now
    fn extend_ttl(&self, key: &LockKey, ttl: Duration) -> Result<(), AdapterError>;

    /// Release `key` on behalf of `owner`. Returns `false` when that owner does
    /// not currently hold the key.
    fn release(&self, key: &LockKey, owner: &OwnerId) -> Result<bool, AdapterError>;
}

impl<A: LockAdapter + ?Sized> LockAdapter for Box<A> {
    fn try_acquire(&self, key: &LockKey, ttl: Duration) -> Result<bool, AdapterError> {
        (**self).try_acquire(key, ttl)
    }

    fn extend_ttl(&self, key: &LockKey, ttl: Duration) -> Result<(), AdapterError> {
        (**self).extend_ttl(key, ttl)
    }

    fn release(&self, key: &LockKey, owner: &OwnerId) -> Result<bool, AdapterError> {
        (**self).release(key, owner)
    }
}

impl<A: LockAdapter + ?Sized> LockAdapter for Arc<A> {
    fn try_acquire(&self, key: &LockKey, ttl: Duration) -> Result<bool, AdapterError> {
        (**self).try_acquire(key, ttl)
    }

    fn extend_ttl(&self, key: &LockKey, ttl: Duration) -> Result<(), AdapterError> {
        (**self).extend_ttl(key, ttl)
    }

    fn release(&self, key: &LockKey, owner: &OwnerId) -> Result<bool, AdapterError> {
        (**self).release(key, owner)
    }
}

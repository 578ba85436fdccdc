// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the semaphore manager

use keylock_adapters::AdapterError;
use thiserror::Error;

/// Why an acquisition was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AcquireFailure {
    /// The key is already held by this process and reentry is blocked
    #[error("retrying to acquire key-lock")]
    Reentrant,
    /// Every attempt found the key held elsewhere
    #[error("key lock time expired after {attempts} attempts")]
    TimedOut { attempts: u32 },
}

/// Why a release was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ReleaseFailure {
    /// The key was never acquired through this manager
    #[error("call acquire first")]
    NotAcquired,
    /// The backend did not hold the key for this owner
    #[error("trying to release a non existent key")]
    NotHeld,
}

/// Errors surfaced by [`crate::SemaphoreManager`]
///
/// `key` is the rendered source key and `path` the caller-supplied call site.
#[derive(Debug, Error)]
pub enum ManagerError {
    #[error("cannot acquire {key} ({path}): {reason}")]
    Acquire {
        key: String,
        path: String,
        reason: AcquireFailure,
    },
    #[error("cannot release {key} ({path}): {reason}")]
    Release {
        key: String,
        path: String,
        reason: ReleaseFailure,
    },
    #[error("cannot extend {key} ({path}): not held by this process")]
    NotHeld { key: String, path: String },
    #[error(transparent)]
    Adapter(#[from] AdapterError),
}

impl ManagerError {
    pub fn is_acquire(&self) -> bool {
        matches!(self, ManagerError::Acquire { .. })
    }

    pub fn is_release(&self) -> bool {
        matches!(self, ManagerError::Release { .. })
    }

    /// Acquire failure reason, if this is an acquire error
    pub fn acquire_failure(&self) -> Option<AcquireFailure> {
        match self {
            ManagerError::Acquire { reason, .. } => Some(*reason),
            _ => None,
        }
    }

    /// Release failure reason, if this is a release error
    pub fn release_failure(&self) -> Option<ReleaseFailure> {
        match self {
            ManagerError::Release { reason, .. } => Some(*reason),
            _ => None,
        }
    }
}

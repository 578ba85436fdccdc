// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced adapter wrapper for consistent observability

use crate::lock::{AdapterError, LockAdapter};
use keylock_core::{duration_ms, LockKey, OwnerId};
use std::time::{Duration, Instant};

/// Wrapper that adds tracing to any LockAdapter
#[derive(Clone, Debug)]
pub struct TracedLockAdapter<A> {
    inner: A,
}

impl<A> TracedLockAdapter<A> {
    pub fn new(inner: A) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &A {
        &self.inner
    }
}

impl<A: LockAdapter> LockAdapter for TracedLockAdapter<A> {
    fn try_acquire(&self, key: &LockKey, ttl: Duration) -> Result<bool, AdapterError> {
        let span = tracing::info_span!("lock.try_acquire", %key, ttl_ms = duration_ms(ttl));
        let _guard = span.enter();

        let start = Instant::now();
        let result = self.inner.try_acquire(key, ttl);
        let elapsed_ms = duration_ms(start.elapsed());

        match &result {
            Ok(true) => tracing::debug!(elapsed_ms, "acquired"),
            Ok(false) => tracing::trace!(elapsed_ms, "held elsewhere"),
            Err(e) => tracing::error!(elapsed_ms, error = %e, "try_acquire failed"),
        }

        result
    }

    fn extend_ttl(&self, key: &LockKey, ttl: Duration) -> Result<(), AdapterError> {
        let span = tracing::info_span!("lock.extend_ttl", %key, ttl_ms = duration_ms(ttl));
        let _guard = span.enter();

        let result = self.inner.extend_ttl(key, ttl);
        match &result {
            Ok(()) => tracing::debug!("extended"),
            Err(e) => tracing::error!(error = %e, "extend failed"),
        }

        result
    }

    fn release(&self, key: &LockKey, owner: &OwnerId) -> Result<bool, AdapterError> {
        let span = tracing::info_span!("lock.release", %key, %owner);
        let _guard = span.enter();

        let result = self.inner.release(key, owner);
        // false is often acceptable (lock already expired at the backend)
        match &result {
            Ok(true) => tracing::debug!("released"),
            Ok(false) => tracing::warn!("release refused: not held by this owner"),
            Err(e) => tracing::error!(error = %e, "release failed"),
        }

        result
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;

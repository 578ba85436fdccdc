// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Semaphore manager: acquisition retries, reentrancy bookkeeping, release
//!
//! The manager is synchronous and owned by one caller at a time: `acquire`
//! blocks for the whole retry loop. Mutual exclusion comes from the adapter;
//! the ledger only records what this process believes it holds.

use crate::error::{AcquireFailure, ManagerError, ReleaseFailure};
use keylock_adapters::{AdapterError, LockAdapter};
use keylock_core::{
    context_descriptor, duration_ms, ConfigError, KeyResolver, Ledger, LedgerRelease, LockKey,
    ManagerConfig, OwnerId, Sleeper, SourceKey, ThreadSleeper,
};
use std::time::Duration;
use tracing::{debug, error, info_span, warn};

/// Builds a [`SemaphoreManager`], validating its configuration
pub struct ManagerBuilder<A, R, S = ThreadSleeper> {
    config: ManagerConfig,
    adapter: A,
    resolver: R,
    sleeper: S,
    owner: OwnerId,
}

impl<A, R> ManagerBuilder<A, R, ThreadSleeper> {
    pub fn new(config: ManagerConfig, adapter: A, resolver: R) -> Self {
        Self {
            config,
            adapter,
            resolver,
            sleeper: ThreadSleeper,
            owner: OwnerId::current_process(),
        }
    }
}

impl<A, R, S> ManagerBuilder<A, R, S> {
    /// Replace the sleeper used between acquisition attempts
    pub fn sleeper<S2: Sleeper>(self, sleeper: S2) -> ManagerBuilder<A, R, S2> {
        ManagerBuilder {
            config: self.config,
            adapter: self.adapter,
            resolver: self.resolver,
            sleeper,
            owner: self.owner,
        }
    }

    /// Owner id passed to the adapter on release
    pub fn owner(mut self, owner: OwnerId) -> Self {
        self.owner = owner;
        self
    }

    pub fn build(self) -> Result<SemaphoreManager<A, R, S>, ConfigError>
    where
        A: LockAdapter,
        R: KeyResolver,
        S: Sleeper,
    {
        self.config.validate()?;
        Ok(SemaphoreManager {
            config: self.config,
            adapter: self.adapter,
            resolver: self.resolver,
            sleeper: self.sleeper,
            owner: self.owner,
            pid: std::process::id(),
            ledger: Ledger::new(),
        })
    }
}

/// Client-side manager for named distributed locks
pub struct SemaphoreManager<A, R, S = ThreadSleeper> {
    config: ManagerConfig,
    adapter: A,
    resolver: R,
    sleeper: S,
    owner: OwnerId,
    pid: u32,
    ledger: Ledger,
}

impl<A: LockAdapter, R: KeyResolver> SemaphoreManager<A, R, ThreadSleeper> {
    /// Manager owned by the current process, sleeping on the real thread
    pub fn new(config: ManagerConfig, adapter: A, resolver: R) -> Result<Self, ConfigError> {
        ManagerBuilder::new(config, adapter, resolver).build()
    }

    pub fn builder(config: ManagerConfig, adapter: A, resolver: R) -> ManagerBuilder<A, R> {
        ManagerBuilder::new(config, adapter, resolver)
    }
}

impl<A: LockAdapter, R: KeyResolver, S: Sleeper> SemaphoreManager<A, R, S> {
    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    pub fn owner(&self) -> &OwnerId {
        &self.owner
    }

    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    pub fn key_resolver(&self) -> &R {
        &self.resolver
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Canonical lock key for a source key
    pub fn resolve(&self, src: &SourceKey) -> LockKey {
        self.resolver.resolve(src)
    }

    /// Whether this process believes it holds `src`
    pub fn is_held(&self, src: &SourceKey) -> bool {
        self.ledger.contains(&self.resolver.resolve(src))
    }

    pub fn held_keys(&self) -> Vec<LockKey> {
        self.ledger.keys().cloned().collect()
    }

    /// Acquire the lock for `src`, retrying up to the configured budget.
    ///
    /// `path` names the call site for diagnostics. `max_lock_time` overrides the
    /// configured TTL when non-zero.
    pub fn acquire(
        &mut self,
        src: impl Into<SourceKey>,
        path: &str,
        max_lock_time: Option<Duration>,
    ) -> Result<LockKey, ManagerError> {
        let src = src.into();
        let key = self.resolver.resolve(&src);
        let ttl = self.config.effective_ttl(max_lock_time);
        let ttl_ms = duration_ms(ttl);

        let span = info_span!("semaphore", pid = self.pid, path, op = "acquire", key = %src);
        let _guard = span.enter();

        if self.config.is_demo() {
            debug!(mode = %self.config.mode, ttl_ms, "success");
            return Ok(key);
        }

        if self.ledger.contains(&key) {
            if self.config.block_on_reacquire {
                error!(lock_key = %key, "retrying to acquire key-lock");
                return Err(acquire_error(&src, path, AcquireFailure::Reentrant));
            }
            warn!(lock_key = %key, "retrying to acquire key-lock");
            if let Err(e) = self.adapter.extend_ttl(&key, ttl) {
                error!(lock_key = %key, error = %e, "extend before reacquire failed");
                return Err(e.into());
            }
        }

        debug!(lock_key = %key, ttl_ms, "start");
        let attempts = match self.poll(&key, ttl) {
            Ok(Some(attempts)) => attempts,
            Ok(None) => {
                let attempts = self.config.try_count;
                error!(lock_key = %key, attempts, "can't acquire lock");
                return Err(acquire_error(&src, path, AcquireFailure::TimedOut { attempts }));
            }
            Err(e) => {
                error!(lock_key = %key, error = %e, "lock backend failed");
                return Err(e.into());
            }
        };

        self.ledger.record(key.clone(), context_descriptor(path, &src));
        debug!(lock_key = %key, attempts, ttl_ms, "success");
        Ok(key)
    }

    /// Fixed-interval polling: `try_count` attempts with a sleep between each.
    /// Returns the attempt that succeeded, or `None` when the budget ran out.
    fn poll(&self, key: &LockKey, ttl: Duration) -> Result<Option<u32>, AdapterError> {
        let tries = self.config.try_count;
        for attempt in 1..=tries {
            if self.adapter.try_acquire(key, ttl)? {
                return Ok(Some(attempt));
            }
            if attempt < tries {
                self.sleeper.sleep(self.config.sleep_time);
            }
        }
        Ok(None)
    }

    /// Release the lock for `src`.
    ///
    /// The ledger entry is dropped before the adapter is asked, so a refused
    /// backend release still leaves the key out of the ledger.
    pub fn release(&mut self, src: impl Into<SourceKey>, path: &str) -> Result<(), ManagerError> {
        let src = src.into();

        let span = info_span!("semaphore", pid = self.pid, path, op = "release", key = %src);
        let _guard = span.enter();

        debug!("start");
        if self.config.is_demo() {
            debug!(mode = %self.config.mode, "success");
            return Ok(());
        }

        let key = self.resolver.resolve(&src);
        match self.ledger.release(&key, self.config.block_on_reacquire) {
            None => {
                error!(lock_key = %key, "call acquire first");
                return Err(release_error(&src, path, ReleaseFailure::NotAcquired));
            }
            Some(LedgerRelease::Popped { remaining }) => {
                debug!(lock_key = %key, remaining, "popped reentrant context");
            }
            Some(LedgerRelease::Removed(_)) => {}
        }

        match self.adapter.release(&key, &self.owner) {
            Ok(true) => {
                debug!(lock_key = %key, "success");
                Ok(())
            }
            Ok(false) => {
                error!(lock_key = %key, "trying to release a non existent key");
                Err(release_error(&src, path, ReleaseFailure::NotHeld))
            }
            Err(e) => {
                error!(lock_key = %key, error = %e, "lock backend failed");
                Err(e.into())
            }
        }
    }

    /// Push the backend expiry of a held key to `ttl` (or the default) from now
    pub fn extend(
        &self,
        src: impl Into<SourceKey>,
        path: &str,
        ttl: Option<Duration>,
    ) -> Result<(), ManagerError> {
        let src = src.into();
        let ttl = self.config.effective_ttl(ttl);

        let span = info_span!("semaphore", pid = self.pid, path, op = "extend", key = %src);
        let _guard = span.enter();

        if self.config.is_demo() {
            return Ok(());
        }

        let key = self.resolver.resolve(&src);
        if !self.ledger.contains(&key) {
            error!(lock_key = %key, "extend of a key this process does not hold");
            return Err(ManagerError::NotHeld {
                key: src.render(),
                path: path.to_string(),
            });
        }

        self.adapter.extend_ttl(&key, ttl).map_err(|e| {
            error!(lock_key = %key, error = %e, "lock backend failed");
            ManagerError::from(e)
        })?;
        debug!(lock_key = %key, ttl_ms = duration_ms(ttl), "extended");
        Ok(())
    }
}

impl<A, R, S> Drop for SemaphoreManager<A, R, S> {
    fn drop(&mut self) {
        if !self.ledger.is_empty() {
            // The backend TTL is what eventually frees these; nothing is released here
            error!(
                pid = self.pid,
                held = self.ledger.len(),
                keys = %self.ledger.summary(),
                "handlers not empty at shutdown"
            );
        }
    }
}

fn acquire_error(src: &SourceKey, path: &str, reason: AcquireFailure) -> ManagerError {
    ManagerError::Acquire {
        key: src.render(),
        path: path.to_string(),
        reason,
    }
}

fn release_error(src: &SourceKey, path: &str, reason: ReleaseFailure) -> ManagerError {
    ManagerError::Release {
        key: src.render(),
        path: path.to_string(),
        reason,
    }
}

#[cfg(test)]
#[path = "manager_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-process lock store
//!
//! Several adapters (each with its own owner id) can share one store, which
//! makes it a stand-in for a shared backend within a single process.

use super::{AdapterError, LockAdapter};
use keylock_core::{Clock, LockKey, OwnerId, SystemClock};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

#[derive(Clone, Debug)]
struct Entry {
    owner: OwnerId,
    expires_at: Instant,
}

/// Shared table of held keys
#[derive(Clone, Debug, Default)]
pub struct MemoryLockStore {
    entries: Arc<Mutex<HashMap<LockKey, Entry>>>,
}

impl MemoryLockStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current holder of `key`, ignoring expiry
    pub fn holder(&self, key: &LockKey) -> Option<OwnerId> {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .map(|entry| entry.owner.clone())
    }

    /// Instant at which `key` expires, if present
    pub fn expires_at(&self, key: &LockKey) -> Option<Instant> {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .map(|entry| entry.expires_at)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Lock adapter over a [`MemoryLockStore`], acting for one owner
#[derive(Clone, Debug)]
pub struct MemoryLockAdapter<C: Clock = SystemClock> {
    store: MemoryLockStore,
    owner: OwnerId,
    clock: C,
}

impl MemoryLockAdapter<SystemClock> {
    /// Adapter with a private store, owned by the current process
    pub fn new() -> Self {
        Self::with_store(MemoryLockStore::new(), OwnerId::current_process(), SystemClock)
    }
}

impl Default for MemoryLockAdapter<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> MemoryLockAdapter<C> {
    pub fn with_store(store: MemoryLockStore, owner: OwnerId, clock: C) -> Self {
        Self {
            store,
            owner,
            clock,
        }
    }

    pub fn store(&self) -> &MemoryLockStore {
        &self.store
    }

    pub fn owner(&self) -> &OwnerId {
        &self.owner
    }
}

impl<C: Clock> LockAdapter for MemoryLockAdapter<C> {
    fn try_acquire(&self, key: &LockKey, ttl: Duration) -> Result<bool, AdapterError> {
        let now = self.clock.now();
        let mut entries = self.store.entries.lock().unwrap_or_else(|e| e.into_inner());

        match entries.get_mut(key) {
            Some(entry) if entry.expires_at > now && entry.owner != self.owner => Ok(false),
            Some(entry) => {
                // Expired, or already ours: take it with a fresh expiry
                entry.owner = self.owner.clone();
                entry.expires_at = now + ttl;
                Ok(true)
            }
            None => {
                entries.insert(
                    key.clone(),
                    Entry {
                        owner: self.owner.clone(),
                        expires_at: now + ttl,
                    },
                );
                Ok(true)
            }
        }
    }

    fn extend_ttl(&self, key: &LockKey, ttl: Duration) -> Result<(), AdapterError> {
        let now = self.clock.now();
        let mut entries = self.store.entries.lock().unwrap_or_else(|e| e.into_inner());

        if let Some(entry) = entries.get_mut(key) {
            if entry.owner == self.owner && entry.expires_at > now {
                entry.expires_at = now + ttl;
            }
        }
        Ok(())
    }

    fn release(&self, key: &LockKey, owner: &OwnerId) -> Result<bool, AdapterError> {
        let now = self.clock.now();
        let mut entries = self.store.entries.lock().unwrap_or_else(|e| e.into_inner());

        let Some(entry) = entries.get(key) else {
            return Ok(false);
        };
        if entry.expires_at <= now {
            entries.remove(key);
            return Ok(false);
        }
        if &entry.owner != owner {
            return Ok(false);
        }
        entries.remove(key);
        Ok(true)
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reentrancy ledger: the locks this process believes it holds
//!
//! The ledger is a local cache, never a source of mutual exclusion. Entries are
//! only created by a successful acquisition and only removed by a release.

use crate::key::{LockKey, SourceKey};
use serde::Serialize;
use std::collections::BTreeMap;

/// Build the context descriptor recorded for an acquisition: `"<path> <key>"`,
/// keeping the separator even when `path` is empty
pub fn context_descriptor(path: &str, src: &SourceKey) -> String {
    format!("{} {}", path, src.render())
}

/// Who holds a key, as far as this process knows
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum OwnershipRecord {
    /// Normal case: one context descriptor
    Single(String),
    /// Reentrant accounting: one descriptor per nested acquisition
    Stacked(Vec<String>),
}

impl OwnershipRecord {
    /// Context descriptors, oldest first
    pub fn contexts(&self) -> Vec<&str> {
        match self {
            OwnershipRecord::Single(ctx) => vec![ctx.as_str()],
            OwnershipRecord::Stacked(stack) => stack.iter().map(String::as_str).collect(),
        }
    }

    pub fn depth(&self) -> usize {
        match self {
            OwnershipRecord::Single(_) => 1,
            OwnershipRecord::Stacked(stack) => stack.len(),
        }
    }

    pub fn is_stacked(&self) -> bool {
        matches!(self, OwnershipRecord::Stacked(_))
    }
}

/// Outcome of removing bookkeeping for a key
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LedgerRelease {
    /// One stacked context was popped; the key is still held
    Popped { remaining: usize },
    /// The whole record was removed
    Removed(OwnershipRecord),
}

/// Mapping from lock key to ownership record, owned by a single manager
#[derive(Clone, Debug, Default, Serialize)]
#[serde(transparent)]
pub struct Ledger {
    entries: BTreeMap<LockKey, OwnershipRecord>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &LockKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn get(&self, key: &LockKey) -> Option<&OwnershipRecord> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &LockKey> {
        self.entries.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&LockKey, &OwnershipRecord)> {
        self.entries.iter()
    }

    /// Record a successful acquisition.
    ///
    /// A vacant key gets a single record and an existing stack grows by one.
    /// An existing single record is overwritten, never promoted to a stack.
    pub fn record(&mut self, key: LockKey, context: String) -> &OwnershipRecord {
        let record = self
            .entries
            .entry(key)
            .or_insert_with(|| OwnershipRecord::Single(String::new()));
        match &mut *record {
            OwnershipRecord::Stacked(stack) => stack.push(context),
            OwnershipRecord::Single(current) => *current = context,
        }
        record
    }

    /// Insert a record as-is, replacing any existing one
    pub fn insert(&mut self, key: LockKey, record: OwnershipRecord) -> Option<OwnershipRecord> {
        self.entries.insert(key, record)
    }

    /// Drop bookkeeping for `key`.
    ///
    /// With `pop_stacked`, a stack of two or more contexts only loses its top
    /// entry. Returns `None` when the key is not in the ledger.
    pub fn release(&mut self, key: &LockKey, pop_stacked: bool) -> Option<LedgerRelease> {
        if pop_stacked {
            if let Some(OwnershipRecord::Stacked(stack)) = self.entries.get_mut(key) {
                if stack.len() >= 2 {
                    stack.pop();
                    return Some(LedgerRelease::Popped {
                        remaining: stack.len(),
                    });
                }
            }
        }
        self.entries.remove(key).map(LedgerRelease::Removed)
    }

    /// One-line rendering of every entry, for leak diagnostics
    pub fn summary(&self) -> String {
        self.entries
            .iter()
            .map(|(key, record)| format!("{} => [{}]", key, record.contexts().join(", ")))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[cfg(test)]
#[path = "ledger_tests.rs"]
mod tests;

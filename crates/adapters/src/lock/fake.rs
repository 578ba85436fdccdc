// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake lock adapter for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{AdapterError, LockAdapter};
use keylock_core::{LockKey, OwnerId};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Recorded adapter call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LockCall {
    TryAcquire { key: LockKey, ttl: Duration },
    ExtendTtl { key: LockKey, ttl: Duration },
    Release { key: LockKey, owner: OwnerId },
}

#[derive(Debug)]
struct FakeState {
    acquire_results: VecDeque<bool>,
    acquire_default: bool,
    release_result: bool,
    acquire_error: Option<String>,
    extend_error: Option<String>,
    release_error: Option<String>,
    calls: Vec<LockCall>,
}

impl Default for FakeState {
    fn default() -> Self {
        Self {
            acquire_results: VecDeque::new(),
            acquire_default: true,
            release_result: true,
            acquire_error: None,
            extend_error: None,
            release_error: None,
            calls: Vec::new(),
        }
    }
}

/// Scriptable lock adapter that records every call
///
/// `try_acquire` answers from the scripted queue first, then falls back to the
/// default (initially `true`). `release` answers `true` unless told otherwise.
#[derive(Clone, Default)]
pub struct FakeLockAdapter {
    state: Arc<Mutex<FakeState>>,
}

impl FakeLockAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> std::sync::MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Queue answers for upcoming `try_acquire` calls
    pub fn script_acquire(&self, results: impl IntoIterator<Item = bool>) {
        self.state().acquire_results.extend(results);
    }

    /// Answer for `try_acquire` once the script is exhausted
    pub fn set_acquire_default(&self, result: bool) {
        self.state().acquire_default = result;
    }

    pub fn set_release_result(&self, result: bool) {
        self.state().release_result = result;
    }

    /// Make the next `try_acquire` fail with a backend error
    pub fn fail_next_acquire(&self, message: impl Into<String>) {
        self.state().acquire_error = Some(message.into());
    }

    /// Make the next `extend_ttl` fail with a backend error
    pub fn fail_next_extend(&self, message: impl Into<String>) {
        self.state().extend_error = Some(message.into());
    }

    /// Make the next `release` fail with a backend error
    pub fn fail_next_release(&self, message: impl Into<String>) {
        self.state().release_error = Some(message.into());
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<LockCall> {
        self.state().calls.clone()
    }

    pub fn acquire_attempts(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, LockCall::TryAcquire { .. }))
            .count()
    }

    pub fn release_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, LockCall::Release { .. }))
            .count()
    }
}

impl LockAdapter for FakeLockAdapter {
    fn try_acquire(&self, key: &LockKey, ttl: Duration) -> Result<bool, AdapterError> {
        let mut state = self.state();
        state.calls.push(LockCall::TryAcquire {
            key: key.clone(),
            ttl,
        });
        if let Some(message) = state.acquire_error.take() {
            return Err(AdapterError::Unavailable(message));
        }
        let default = state.acquire_default;
        Ok(state.acquire_results.pop_front().unwrap_or(default))
    }

    fn extend_ttl(&self, key: &LockKey, ttl: Duration) -> Result<(), AdapterError> {
        let mut state = self.state();
        state.calls.push(LockCall::ExtendTtl {
            key: key.clone(),
            ttl,
        });
        match state.extend_error.take() {
            Some(message) => Err(AdapterError::Unavailable(message)),
            None => Ok(()),
        }
    }

    fn release(&self, key: &LockKey, owner: &OwnerId) -> Result<bool, AdapterError> {
        let mut state = self.state();
        state.calls.push(LockCall::Release {
            key: key.clone(),
            owner: owner.clone(),
        });
        if let Some(message) = state.release_error.take() {
            return Err(AdapterError::Unavailable(message));
        }
        Ok(state.release_result)
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;

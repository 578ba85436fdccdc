// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Manager factory for CLI commands

use crate::error::{KeylockError, EXIT_CONFIG};
use anyhow::Result;
use keylock_adapters::{FileLockAdapter, LockAdapter, MemoryLockAdapter, TracedLockAdapter};
use keylock_core::{BackendKind, KeyResolver, KeylockConfig, OwnerId};
use keylock_manager::SemaphoreManager;
use std::path::Path;

/// Manager used by the CLI, with the backend chosen at runtime
pub type CliManager =
    SemaphoreManager<TracedLockAdapter<Box<dyn LockAdapter>>, Box<dyn KeyResolver>>;

/// Create a manager for the configured backend, owned by this process
pub fn make_manager(config: &KeylockConfig) -> Result<CliManager> {
    let owner = OwnerId::current_process();
    let adapter: Box<dyn LockAdapter> = match config.backend.kind {
        BackendKind::File => Box::new(FileLockAdapter::new(
            config.backend.dir.clone(),
            owner.clone(),
        )),
        BackendKind::Memory => Box::new(MemoryLockAdapter::new()),
    };

    SemaphoreManager::builder(
        config.manager.clone(),
        TracedLockAdapter::new(adapter),
        config.keys.resolver(),
    )
    .owner(owner)
    .build()
    .map_err(|e| {
        KeylockError::new("invalid lock options")
            .with_context(e.to_string())
            .with_exit_code(EXIT_CONFIG)
            .with_source(e)
            .into()
    })
}

/// Directory holding lock files, when locks actually live on disk
pub fn lock_dir(config: &KeylockConfig) -> Option<&Path> {
    match config.backend.kind {
        BackendKind::File if !config.manager.is_demo() => Some(&config.backend.dir),
        _ => None,
    }
}

#[cfg(test)]
#[path = "backend_tests.rs"]
mod tests;

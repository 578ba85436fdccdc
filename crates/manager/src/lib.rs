// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! keylock-manager: client-side manager for named distributed locks
//!
//! [`SemaphoreManager`] resolves application keys, polls a [`LockAdapter`]
//! until the lock is granted, and keeps a ledger of what the process holds so
//! reentrant acquisitions and leaked locks can be detected.
//!
//! [`LockAdapter`]: keylock_adapters::LockAdapter

mod error;
mod manager;

pub use error::{AcquireFailure, ManagerError, ReleaseFailure};
pub use manager::{ManagerBuilder, SemaphoreManager};

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! keylock-core: building blocks for the keylock semaphore manager
//!
//! This crate provides:
//! - Lock keys and pluggable key resolution
//! - The reentrancy ledger a manager keeps of the locks it holds
//! - Manager, key and backend configuration
//! - Clock and sleeper abstractions for deterministic tests

pub mod clock;
pub mod config;
pub mod key;
pub mod ledger;
pub mod owner;

pub use clock::{
    duration_ms, Clock, FakeClock, FakeSleeper, Sleeper, SystemClock, ThreadSleeper,
};
pub use config::{
    BackendConfig, BackendKind, ConfigError, KeyConfig, KeyStrategy, KeylockConfig,
    ManagerConfig, Mode,
};
pub use key::{HashedKeyResolver, KeyResolver, LockKey, PlainKeyResolver, SourceKey};
pub use ledger::{context_descriptor, Ledger, LedgerRelease, OwnershipRecord};
pub use owner::OwnerId;

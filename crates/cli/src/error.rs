// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! User-friendly error display with context and suggestions.
//!
//! Each error carries:
//! - What went wrong (message)
//! - Why it might have happened (context)
//! - How to fix it (suggestions)
//! - The process exit code it maps to

use keylock_core::ConfigError;
use keylock_manager::{AcquireFailure, ManagerError};
use std::fmt;
use std::path::Path;

/// Generic failure
pub const EXIT_FAILURE: u8 = 1;
/// Lock could not be acquired (EX_TEMPFAIL)
pub const EXIT_LOCKED: u8 = 75;
/// Bad configuration (EX_CONFIG)
pub const EXIT_CONFIG: u8 = 78;
/// Wrapped command could not be started
pub const EXIT_SPAWN: u8 = 127;

/// Error with context and recovery suggestions for user-friendly display.
#[derive(Debug)]
pub struct KeylockError {
    /// What went wrong
    pub message: String,
    /// Why it might have happened
    pub context: Vec<String>,
    /// How to fix it
    pub suggestions: Vec<String>,
    pub exit_code: u8,
    /// Original error if any
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl KeylockError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            context: Vec::new(),
            suggestions: Vec::new(),
            exit_code: EXIT_FAILURE,
            source: None,
        }
    }

    pub fn with_context(mut self, ctx: impl Into<String>) -> Self {
        self.context.push(ctx.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    pub fn with_exit_code(mut self, code: u8) -> Self {
        self.exit_code = code;
        self
    }

    pub fn with_source<E: std::error::Error + Send + Sync + 'static>(mut self, source: E) -> Self {
        self.source = Some(Box::new(source));
        self
    }
}

impl fmt::Display for KeylockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "error: {}", self.message)?;

        if !self.context.is_empty() {
            writeln!(f)?;
            for ctx in &self.context {
                writeln!(f, "  -> {}", ctx)?;
            }
        }

        if !self.suggestions.is_empty() {
            writeln!(f)?;
            writeln!(f, "suggestions:")?;
            for (i, suggestion) in self.suggestions.iter().enumerate() {
                writeln!(f, "  {}. {}", i + 1, suggestion)?;
            }
        }

        Ok(())
    }
}

impl std::error::Error for KeylockError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Builders for the failures the CLI reports.
impl KeylockError {
    /// Config file missing, unreadable or invalid
    pub fn config(path: &Path, err: ConfigError) -> Self {
        KeylockError::new(format!("invalid config {}", path.display()))
            .with_context(err.to_string())
            .with_suggestion("Show the defaults: keylock config")
            .with_exit_code(EXIT_CONFIG)
            .with_source(err)
    }

    /// Manager refused or failed an operation
    pub fn lock(err: ManagerError, lock_dir: Option<&Path>) -> Self {
        let base = KeylockError::new(err.to_string());
        let described = match err.acquire_failure() {
            Some(AcquireFailure::TimedOut { attempts }) => {
                let mut e = base
                    .with_context(format!(
                        "The lock stayed held elsewhere for all {} attempts",
                        attempts
                    ))
                    .with_suggestion("Wait for the current holder to finish")
                    .with_suggestion("Raise manager.try_count or manager.sleep_time");
                if let Some(dir) = lock_dir {
                    e = e.with_suggestion(format!(
                        "Inspect lock files under {} (expired ones are reclaimed)",
                        dir.display()
                    ));
                }
                e.with_exit_code(EXIT_LOCKED)
            }
            Some(AcquireFailure::Reentrant) => base.with_exit_code(EXIT_LOCKED),
            None => base.with_context("The lock backend reported an error"),
        };
        described.with_source(err)
    }

    /// Wrapped command could not be started
    pub fn spawn(program: &str, err: std::io::Error) -> Self {
        KeylockError::new(format!("failed to start {}", program))
            .with_context(err.to_string())
            .with_suggestion("Check the command exists and is on PATH")
            .with_exit_code(EXIT_SPAWN)
            .with_source(err)
    }
}

/// Exit code for a top-level error
pub fn exit_code(err: &anyhow::Error) -> u8 {
    err.downcast_ref::<KeylockError>()
        .map_or(EXIT_FAILURE, |e| e.exit_code)
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;

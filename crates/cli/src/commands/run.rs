// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `keylock run <key> -- <command>` - Run a command while holding a lock
//!
//! The lock is acquired before the command starts and released after it
//! exits. While it runs, the lock TTL is extended on a heartbeat of a third
//! of the TTL, so a long command keeps its lease and a crashed one loses it.

use crate::backend::{self, CliManager};
use crate::error::KeylockError;
use anyhow::Result;
use clap::Args;
use keylock_core::{KeylockConfig, Mode, SourceKey};
use std::path::PathBuf;
use std::process::{ExitCode, ExitStatus};
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Shortest heartbeat between TTL extensions
const MIN_HEARTBEAT: Duration = Duration::from_millis(10);

#[derive(Args)]
pub struct RunArgs {
    /// Lock key (e.g., "deploy:prod")
    pub key: String,

    /// Call site recorded with the lock in logs
    #[arg(long, default_value = "keylock run")]
    pub path: String,

    /// Lock TTL (e.g., "30s"); defaults to manager.max_lock_time
    #[arg(long, value_parser = humantime::parse_duration)]
    pub ttl: Option<Duration>,

    /// Acquisition attempts before giving up
    #[arg(long)]
    pub try_count: Option<u32>,

    /// Pause between acquisition attempts (e.g., "250ms")
    #[arg(long, value_parser = humantime::parse_duration)]
    pub sleep_time: Option<Duration>,

    /// Lock file directory
    #[arg(long)]
    pub dir: Option<PathBuf>,

    /// Run without taking any lock
    #[arg(long)]
    pub demo: bool,

    /// Command to run, after `--`
    #[arg(last = true, required = true)]
    pub command: Vec<String>,
}

impl RunArgs {
    /// Layer command-line overrides on top of the loaded config
    fn apply(&self, config: &mut KeylockConfig) {
        if self.demo {
            config.manager.mode = Mode::Demo;
        }
        if let Some(try_count) = self.try_count {
            config.manager.try_count = try_count;
        }
        if let Some(sleep_time) = self.sleep_time {
            config.manager.sleep_time = sleep_time;
        }
        if let Some(dir) = &self.dir {
            config.backend.dir = dir.clone();
        }
    }
}

pub fn run(args: RunArgs, mut config: KeylockConfig) -> Result<ExitCode> {
    args.apply(&mut config);
    let mut manager = backend::make_manager(&config)?;
    let key = SourceKey::from(args.key.as_str());

    let lock_key = manager
        .acquire(key.clone(), &args.path, args.ttl)
        .map_err(|e| KeylockError::lock(e, backend::lock_dir(&config)))?;
    let ttl = manager.config().effective_ttl(args.ttl);
    info!(%lock_key, mode = %config.manager.mode, "lock held");

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let outcome = runtime.block_on(supervise(&manager, &key, &args.path, ttl, &args.command));

    // Release even when the command failed to start
    if let Err(e) = manager.release(key, &args.path) {
        warn!(%lock_key, error = %e, "release after command failed");
    }

    let status = outcome?;
    debug!(%status, "command finished");
    Ok(ExitCode::from(status_code(status)))
}

/// Spawn the command and extend the lock until it exits
async fn supervise(
    manager: &CliManager,
    key: &SourceKey,
    path: &str,
    ttl: Duration,
    command: &[String],
) -> Result<ExitStatus> {
    let (program, rest) = command
        .split_first()
        .ok_or_else(|| KeylockError::new("no command given"))?;

    let mut child = tokio::process::Command::new(program)
        .args(rest)
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| KeylockError::spawn(program, e))?;
    debug!(child_pid = child.id(), program, "command started");

    let mut heartbeat = tokio::time::interval(heartbeat_period(ttl));
    heartbeat.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately
    heartbeat.tick().await;

    loop {
        tokio::select! {
            status = child.wait() => return Ok(status?),
            _ = heartbeat.tick() => {
                if let Err(e) = manager.extend(key.clone(), path, Some(ttl)) {
                    warn!(error = %e, "failed to extend lock");
                }
            }
            _ = tokio::signal::ctrl_c() => {
                warn!(program, "interrupted, stopping command");
                child.kill().await?;
                return Ok(child.wait().await?);
            }
        }
    }
}

/// Extend three times per TTL
fn heartbeat_period(ttl: Duration) -> Duration {
    (ttl / 3).max(MIN_HEARTBEAT)
}

/// Exit code mirroring the child: its own code, or 128 + signal
fn status_code(status: ExitStatus) -> u8 {
    if let Some(code) = status.code() {
        return u8::try_from(code).unwrap_or(crate::error::EXIT_FAILURE);
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return u8::try_from(128 + signal).unwrap_or(crate::error::EXIT_FAILURE);
        }
    }
    crate::error::EXIT_FAILURE
}

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;

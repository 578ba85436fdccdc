// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::lock::FakeLockAdapter;
use std::sync::{Arc, Mutex};
use tracing_subscriber::fmt::MakeWriter;

/// A writer that captures log output for testing
#[derive(Clone, Default)]
struct CapturedLogs {
    logs: Arc<Mutex<Vec<u8>>>,
}

impl CapturedLogs {
    fn contents(&self) -> String {
        let logs = self.logs.lock().unwrap();
        String::from_utf8_lossy(&logs).to_string()
    }
}

impl std::io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.logs.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Run a closure with captured tracing output
fn with_tracing<T>(f: impl FnOnce() -> T) -> (String, T) {
    let logs = CapturedLogs::default();

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_writer(logs.clone())
        .with_ansi(false)
        .without_time()
        .finish();

    let result = tracing::subscriber::with_default(subscriber, f);
    (logs.contents(), result)
}

fn key() -> LockKey {
    LockKey::new("job:42")
}

#[test]
fn delegates_to_inner_adapter() {
    let fake = FakeLockAdapter::new();
    fake.script_acquire([false]);
    let traced = TracedLockAdapter::new(fake.clone());

    assert!(!traced.try_acquire(&key(), Duration::from_secs(1)).unwrap());
    assert!(traced.try_acquire(&key(), Duration::from_secs(1)).unwrap());
    assert_eq!(traced.inner().acquire_attempts(), 2);
}

#[test]
fn try_acquire_logs_span_and_timing() {
    let (logs, result) = with_tracing(|| {
        let traced = TracedLockAdapter::new(FakeLockAdapter::new());
        traced.try_acquire(&key(), Duration::from_secs(5))
    });

    assert!(result.unwrap());
    assert!(logs.contains("lock.try_acquire"), "Logs:\n{}", logs);
    assert!(logs.contains("job:42"), "Logs:\n{}", logs);
    assert!(logs.contains("ttl_ms=5000"), "Logs:\n{}", logs);
    assert!(logs.contains("elapsed_ms"), "Logs:\n{}", logs);
    assert!(logs.contains("acquired"), "Logs:\n{}", logs);
}

#[test]
fn backend_error_is_logged_and_returned() {
    let (logs, result) = with_tracing(|| {
        let fake = FakeLockAdapter::new();
        fake.fail_next_acquire("connection refused");
        TracedLockAdapter::new(fake).try_acquire(&key(), Duration::from_secs(5))
    });

    assert!(matches!(result, Err(AdapterError::Unavailable(_))));
    assert!(logs.contains("ERROR"), "Logs:\n{}", logs);
    assert!(logs.contains("connection refused"), "Logs:\n{}", logs);
}

#[test]
fn refused_release_logs_warning() {
    let (logs, result) = with_tracing(|| {
        let fake = FakeLockAdapter::new();
        fake.set_release_result(false);
        TracedLockAdapter::new(fake).release(&key(), &OwnerId::new("w1"))
    });

    assert!(!result.unwrap());
    assert!(logs.contains("WARN"), "Logs:\n{}", logs);
    assert!(logs.contains("lock.release"), "Logs:\n{}", logs);
    assert!(logs.contains("w1"), "Logs:\n{}", logs);
}

#[test]
fn extend_logs_operation() {
    let (logs, result) = with_tracing(|| {
        TracedLockAdapter::new(FakeLockAdapter::new()).extend_ttl(&key(), Duration::from_secs(9))
    });

    assert!(result.is_ok());
    assert!(logs.contains("lock.extend_ttl"), "Logs:\n{}", logs);
    assert!(logs.contains("extended"), "Logs:\n{}", logs);
}

#[test]
fn oversized_ttl_logs_saturated_millis() {
    let huge = Duration::from_secs(u64::MAX);
    let (logs, result) = with_tracing(|| {
        let traced = TracedLockAdapter::new(FakeLockAdapter::new());
        traced.try_acquire(&key(), huge)?;
        traced.extend_ttl(&key(), huge)
    });

    assert!(result.is_ok());
    assert!(
        logs.contains(&format!("ttl_ms={}", u64::MAX)),
        "Logs:\n{}",
        logs
    );
}

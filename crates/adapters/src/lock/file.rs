// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lock files in a shared directory
//!
//! Each key maps to `<dir>/<encoded key>.lock`, recording the owner and an
//! absolute expiry; an expired file is reclaimed by the next acquirer.
//!
//! Each read-then-write step on a lock file runs under an exclusive advisory
//! lock on `<dir>/.keylock.guard`, so two adapters (in any process) never act
//! on the same stale view.

use super::{AdapterError, LockAdapter};
use fs2::FileExt;
use keylock_core::{LockKey, OwnerId};
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::NamedTempFile;

/// Advisory lock file serializing access to a lock directory
const GUARD_FILE: &str = ".keylock.guard";

/// Parsed contents of a lock file
#[derive(Debug, Clone, PartialEq, Eq)]
struct LockRecord {
    owner: OwnerId,
    expires_at_ms: i64,
}

impl LockRecord {
    fn new(owner: &OwnerId, ttl: Duration) -> Self {
        let ttl_ms = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
        Self {
            owner: owner.clone(),
            expires_at_ms: now_ms().saturating_add(ttl_ms),
        }
    }

    fn is_expired(&self) -> bool {
        self.expires_at_ms <= now_ms()
    }

    fn render(&self) -> String {
        format!(
            "owner={}\npid={}\nexpires_at_ms={}\n",
            self.owner,
            std::process::id(),
            self.expires_at_ms
        )
    }

    fn parse(contents: &str) -> Option<Self> {
        let mut owner = None;
        let mut expires_at_ms = None;
        for line in contents.lines() {
            if let Some(rest) = line.strip_prefix("owner=") {
                owner = Some(OwnerId::new(rest));
            } else if let Some(rest) = line.strip_prefix("expires_at_ms=") {
                expires_at_ms = rest.parse().ok();
            }
        }
        Some(Self {
            owner: owner?,
            expires_at_ms: expires_at_ms?,
        })
    }
}

fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Lock adapter backed by files in one directory
#[derive(Clone, Debug)]
pub struct FileLockAdapter {
    dir: PathBuf,
    owner: OwnerId,
}

impl FileLockAdapter {
    pub fn new(dir: impl Into<PathBuf>, owner: OwnerId) -> Self {
        Self {
            dir: dir.into(),
            owner,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn owner(&self) -> &OwnerId {
        &self.owner
    }

    /// Path of the lock file for `key`
    pub fn lock_path(&self, key: &LockKey) -> PathBuf {
        self.dir.join(format!("{}.lock", encode_key(key.as_str())))
    }

    fn read_record(&self, path: &Path) -> Result<Option<LockRecord>, AdapterError> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(AdapterError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        LockRecord::parse(&contents)
            .map(Some)
            .ok_or_else(|| AdapterError::Corrupt {
                path: path.to_path_buf(),
                reason: "missing owner or expiry".to_string(),
            })
    }

    /// Replace the record atomically via a temp file in the same directory
    fn write_record(&self, path: &Path, record: &LockRecord) -> Result<(), AdapterError> {
        let mut tmp = NamedTempFile::new_in(&self.dir).map_err(|source| AdapterError::Io {
            path: self.dir.clone(),
            source,
        })?;
        tmp.write_all(record.render().as_bytes())
            .map_err(|source| AdapterError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        tmp.persist(path).map_err(|e| AdapterError::Io {
            path: path.to_path_buf(),
            source: e.error,
        })?;
        Ok(())
    }

    /// Take the directory guard, creating the directory if needed
    fn guard(&self) -> Result<DirGuard, AdapterError> {
        fs::create_dir_all(&self.dir).map_err(|source| AdapterError::Io {
            path: self.dir.clone(),
            source,
        })?;
        let path = self.dir.join(GUARD_FILE);
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&path)
            .map_err(|source| AdapterError::Io {
                path: path.clone(),
                source,
            })?;
        file.lock_exclusive()
            .map_err(|source| AdapterError::Io { path, source })?;
        Ok(DirGuard { file })
    }

    /// Whether an existing lock file may be reclaimed
    fn is_stale(&self, path: &Path, ttl: Duration) -> Result<bool, AdapterError> {
        match self.read_record(path) {
            Ok(Some(record)) => Ok(record.is_expired()),
            Ok(None) => Ok(true),
            // A half-written file from a crashed holder: fall back to its age
            Err(AdapterError::Corrupt { .. }) => {
                let age = fs::metadata(path)
                    .and_then(|meta| meta.modified())
                    .map(|modified| modified.elapsed().unwrap_or(Duration::ZERO));
                match age {
                    Ok(age) => Ok(age >= ttl),
                    Err(err) if err.kind() == ErrorKind::NotFound => Ok(true),
                    Err(source) => Err(AdapterError::Io {
                        path: path.to_path_buf(),
                        source,
                    }),
                }
            }
            Err(err) => Err(err),
        }
    }

    fn remove(&self, path: &Path) -> Result<(), AdapterError> {
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(AdapterError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }
}

/// Holds the directory guard until dropped
struct DirGuard {
    file: File,
}

impl Drop for DirGuard {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}

impl LockAdapter for FileLockAdapter {
    fn try_acquire(&self, key: &LockKey, ttl: Duration) -> Result<bool, AdapterError> {
        let _guard = self.guard()?;
        let path = self.lock_path(key);

        match self.read_record(&path) {
            Ok(None) => {}
            Ok(Some(record)) if record.owner == self.owner && !record.is_expired() => {}
            Ok(Some(record)) if !record.is_expired() => return Ok(false),
            Ok(Some(_)) | Err(AdapterError::Corrupt { .. }) => {
                if !self.is_stale(&path, ttl)? {
                    return Ok(false);
                }
                tracing::debug!(key = %key, path = %path.display(), "reclaiming stale lock file");
            }
            Err(err) => return Err(err),
        }

        self.write_record(&path, &LockRecord::new(&self.owner, ttl))?;
        tracing::trace!(key = %key, path = %path.display(), "lock file written");
        Ok(true)
    }

    fn extend_ttl(&self, key: &LockKey, ttl: Duration) -> Result<(), AdapterError> {
        let path = self.lock_path(key);
        if !path.exists() {
            tracing::debug!(key = %key, "not extending a lock file we do not hold");
            return Ok(());
        }

        let _guard = self.guard()?;
        match self.read_record(&path)? {
            Some(record) if record.owner == self.owner && !record.is_expired() => {
                self.write_record(&path, &LockRecord::new(&self.owner, ttl))
            }
            _ => {
                tracing::debug!(key = %key, "not extending a lock file we do not hold");
                Ok(())
            }
        }
    }

    fn release(&self, key: &LockKey, owner: &OwnerId) -> Result<bool, AdapterError> {
        let path = self.lock_path(key);
        if !path.exists() {
            return Ok(false);
        }

        let _guard = self.guard()?;
        let record = match self.read_record(&path) {
            Ok(Some(record)) => record,
            Ok(None) => return Ok(false),
            Err(AdapterError::Corrupt { .. }) => return Ok(false),
            Err(err) => return Err(err),
        };
        if record.is_expired() {
            self.remove(&path)?;
            return Ok(false);
        }
        if &record.owner != owner {
            return Ok(false);
        }
        self.remove(&path)?;
        Ok(true)
    }
}

/// Make a lock key safe to use as a file name
fn encode_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    for byte in key.bytes() {
        match byte {
            b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'-' | b'_' | b'.' => out.push(byte as char),
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}

#[cfg(test)]
#[path = "file_tests.rs"]
mod tests;

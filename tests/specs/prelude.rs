//! Shared harness for keylock CLI specs.
//!
//! `Project` owns a temp directory that also holds the lock directory, and
//! `keylock()` returns a builder that runs the binary inside it.

#![allow(dead_code)]

use assert_cmd::cargo::cargo_bin;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Output};
use std::time::{Duration, Instant};
use tempfile::TempDir;

/// A throwaway working directory with its own lock directory
pub struct Project {
    dir: TempDir,
}

impl Project {
    pub fn empty() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Directory handed to the file backend
    pub fn lock_dir(&self) -> PathBuf {
        self.path().join("locks")
    }

    pub fn file(&self, rel: &str, content: &str) -> PathBuf {
        let path = self.path().join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, content).unwrap();
        path
    }

    /// `*.lock` files currently present
    pub fn lock_files(&self) -> Vec<PathBuf> {
        match std::fs::read_dir(self.lock_dir()) {
            Ok(entries) => entries
                .filter_map(|e| e.ok())
                .map(|e| e.path())
                .filter(|p| p.extension().is_some_and(|ext| ext == "lock"))
                .collect(),
            Err(_) => Vec::new(),
        }
    }

    pub fn keylock(&self) -> CliBuilder {
        let mut cmd = Command::new(cargo_bin("keylock"));
        cmd.current_dir(self.path())
            .env_remove("KEYLOCK_CONFIG")
            .env("RUST_LOG", "warn");
        CliBuilder { cmd }
    }

    /// `keylock run <key> <flags> -- <command>` against this project's lock
    /// directory
    pub fn run(&self, key: &str, flags: &[&str], command: &[&str]) -> CliBuilder {
        self.keylock()
            .args(&["run", key, "--dir"])
            .arg(self.lock_dir())
            .args(flags)
            .arg("--")
            .args(command)
    }

    /// Hold `key` from a background `keylock run ... -- sleep <secs>` and
    /// wait until its lock file exists
    pub fn hold(&self, key: &str, secs: u32) -> Holder {
        let secs = secs.to_string();
        let child = self.run(key, &[], &["sleep", &secs]).cmd.spawn().unwrap();

        let deadline = Instant::now() + Duration::from_secs(10);
        while self.lock_files().is_empty() {
            assert!(Instant::now() < deadline, "holder never took the lock");
            std::thread::sleep(Duration::from_millis(20));
        }
        Holder { child }
    }
}

/// Background lock holder, killed on drop
pub struct Holder {
    child: Child,
}

impl Holder {
    pub fn wait(mut self) -> Option<i32> {
        self.child.wait().unwrap().code()
    }
}

impl Drop for Holder {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

pub struct CliBuilder {
    cmd: Command,
}

impl CliBuilder {
    pub fn args<S: AsRef<OsStr>>(mut self, args: &[S]) -> Self {
        self.cmd.args(args);
        self
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.cmd.arg(arg);
        self
    }

    pub fn env(mut self, key: &str, value: impl AsRef<OsStr>) -> Self {
        self.cmd.env(key, value);
        self
    }

    fn output(mut self) -> Output {
        self.cmd.output().unwrap()
    }

    #[track_caller]
    pub fn passes(self) -> RunAssert {
        let output = self.output();
        assert!(
            output.status.success(),
            "expected success, got {:?}\nstderr:\n{}",
            output.status.code(),
            String::from_utf8_lossy(&output.stderr)
        );
        RunAssert { output }
    }

    #[track_caller]
    pub fn fails(self) -> RunAssert {
        let output = self.output();
        assert!(!output.status.success(), "expected failure, but it passed");
        RunAssert { output }
    }

    #[track_caller]
    pub fn exits_with(self, code: i32) -> RunAssert {
        let output = self.output();
        assert_eq!(
            output.status.code(),
            Some(code),
            "stderr:\n{}",
            String::from_utf8_lossy(&output.stderr)
        );
        RunAssert { output }
    }
}

pub struct RunAssert {
    output: Output,
}

impl RunAssert {
    pub fn stdout(&self) -> String {
        String::from_utf8_lossy(&self.output.stdout).into_owned()
    }

    pub fn stderr(&self) -> String {
        String::from_utf8_lossy(&self.output.stderr).into_owned()
    }

    #[track_caller]
    pub fn stdout_eq(self, expected: &str) -> Self {
        similar_asserts::assert_eq!(self.stdout(), expected);
        self
    }

    #[track_caller]
    pub fn stdout_has(self, needle: &str) -> Self {
        let stdout = self.stdout();
        assert!(stdout.contains(needle), "stdout lacks {needle:?}:\n{stdout}");
        self
    }

    #[track_caller]
    pub fn stderr_has(self, needle: &str) -> Self {
        let stderr = self.stderr();
        assert!(stderr.contains(needle), "stderr lacks {needle:?}:\n{stderr}");
        self
    }

    #[track_caller]
    pub fn stderr_lacks(self, needle: &str) -> Self {
        let stderr = self.stderr();
        assert!(!stderr.contains(needle), "stderr has {needle:?}:\n{stderr}");
        self
    }

    /// Stdout parsed as JSON
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.stdout()).unwrap()
    }
}

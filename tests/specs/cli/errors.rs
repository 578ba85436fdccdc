//! Error reporting specs
//!
//! Verify failures print an explanation and map to distinct exit codes.

use crate::prelude::*;

#[test]
fn run_without_command_is_a_usage_error() {
    let temp = Project::empty();

    temp.keylock()
        .args(&["run", "deploy"])
        .exits_with(2)
        .stderr_has("required");
}

#[test]
fn missing_config_file_is_a_config_error() {
    let temp = Project::empty();

    temp.keylock()
        .args(&["--config", "missing.toml", "config"])
        .exits_with(78)
        .stderr_has("invalid config missing.toml");
}

#[test]
fn zero_try_count_is_rejected() {
    let temp = Project::empty();
    temp.file("keylock.toml", "[manager]\ntry_count = 0\n");

    temp.keylock()
        .args(&["--config", "keylock.toml", "config"])
        .exits_with(78)
        .stderr_has("try_count");
}

#[test]
fn zero_try_count_flag_is_rejected() {
    let temp = Project::empty();

    temp.run("deploy", &["--try-count", "0"], &["true"])
        .exits_with(78)
        .stderr_has("invalid lock options");
    assert!(temp.lock_files().is_empty());
}

#[test]
fn unknown_program_releases_lock_and_exits_127() {
    let temp = Project::empty();

    temp.run("deploy", &[], &["keylock-test-no-such-program"])
        .exits_with(127)
        .stderr_has("failed to start keylock-test-no-such-program")
        .stderr_has("suggestions:");
    assert!(temp.lock_files().is_empty());
}

//! `keylock run` specs
//!
//! Verify the wrapped command runs with the lock held and the lock is
//! gone once it exits.

use crate::prelude::*;

#[test]
fn command_output_passes_through() {
    let temp = Project::empty();

    temp.run("deploy", &[], &["echo", "hello"])
        .passes()
        .stdout_eq("hello\n");
}

#[test]
fn exit_code_of_command_is_returned() {
    let temp = Project::empty();

    temp.run("deploy", &[], &["sh", "-c", "exit 7"]).exits_with(7);
    assert!(temp.lock_files().is_empty());
}

#[test]
fn lock_file_exists_while_command_runs() {
    let temp = Project::empty();

    temp.run("deploy", &[], &["sh", "-c", "cat locks/*.lock"])
        .passes()
        .stdout_has("owner=")
        .stdout_has("expires_at_ms=");
    assert!(temp.lock_files().is_empty());
}

#[test]
fn lock_file_name_encodes_prefixed_key() {
    let temp = Project::empty();

    temp.run("deploy", &[], &["ls", "locks"])
        .passes()
        .stdout_eq("keylock%3Adeploy.lock\n");
}

#[test]
fn hashed_keys_hide_the_source_key() {
    let temp = Project::empty();
    temp.file("keylock.toml", "[keys]\nprefix = \"h-\"\nstrategy = \"hashed\"\n");

    let out = temp
        .keylock()
        .args(&["--config", "keylock.toml"])
        .args(&["run", "deploy", "--dir"])
        .arg(temp.lock_dir())
        .args(&["--", "ls", "locks"])
        .passes()
        .stdout();

    let name = out.trim();
    assert!(name.starts_with("h-"), "{name}");
    assert!(!name.contains("deploy"), "{name}");
    assert_eq!(name.len(), "h-".len() + 32 + ".lock".len());
}

#[test]
fn demo_mode_takes_no_lock() {
    let temp = Project::empty();

    temp.run("deploy", &["--demo"], &["sh", "-c", "ls locks 2>/dev/null | wc -l"])
        .passes()
        .stdout_has("0");
    assert!(!temp.lock_dir().exists());
}

#[test]
fn long_command_keeps_lock_alive_past_ttl() {
    let temp = Project::empty();

    // TTL of 300ms is extended every 100ms while the command sleeps 1s
    temp.run(
        "deploy",
        &["--ttl", "300ms"],
        &["sh", "-c", "sleep 1; cat locks/*.lock"],
    )
    .passes()
    .stdout_has("owner=");
}

//! Contention specs
//!
//! Verify two keylock processes exclude each other on the same key.

use crate::prelude::*;

const FAST_RETRY: &[&str] = &["--try-count", "2", "--sleep-time", "10ms"];

#[test]
fn second_run_times_out_while_key_is_held() {
    let temp = Project::empty();
    let _holder = temp.hold("deploy", 5);

    temp.run("deploy", FAST_RETRY, &["echo", "never"])
        .exits_with(75)
        .stderr_has("cannot acquire deploy")
        .stderr_has("after 2 attempts")
        .stderr_has("suggestions:");
}

#[test]
fn timed_out_run_does_not_start_command() {
    let temp = Project::empty();
    let _holder = temp.hold("deploy", 5);

    let out = temp.run("deploy", FAST_RETRY, &["echo", "ran"]).exits_with(75);
    assert!(!out.stdout().contains("ran"));
}

#[test]
fn different_keys_do_not_contend() {
    let temp = Project::empty();
    let _holder = temp.hold("deploy", 5);

    temp.run("backup", FAST_RETRY, &["echo", "ok"])
        .passes()
        .stdout_eq("ok\n");
}

#[test]
fn key_is_free_once_holder_finishes() {
    let temp = Project::empty();
    let holder = temp.hold("deploy", 1);

    assert_eq!(holder.wait(), Some(0));
    assert!(temp.lock_files().is_empty());

    temp.run("deploy", FAST_RETRY, &["true"]).passes();
}

#[test]
fn waiter_gets_the_key_when_holder_finishes_within_budget() {
    let temp = Project::empty();
    let _holder = temp.hold("deploy", 1);

    temp.run(
        "deploy",
        &["--try-count", "100", "--sleep-time", "50ms"],
        &["echo", "mine"],
    )
    .passes()
    .stdout_eq("mine\n");
}

#[test]
fn expired_lock_file_is_reclaimed() {
    let temp = Project::empty();
    temp.file(
        "locks/keylock%3Adeploy.lock",
        "owner=4242\npid=4242\nexpires_at_ms=0\n",
    );

    temp.run("deploy", FAST_RETRY, &["true"]).passes();
    assert!(temp.lock_files().is_empty());
}

#[test]
fn live_lock_file_from_another_owner_blocks() {
    let temp = Project::empty();
    temp.file(
        "locks/keylock%3Adeploy.lock",
        &format!("owner=4242\npid=4242\nexpires_at_ms={}\n", i64::MAX),
    );

    temp.run("deploy", FAST_RETRY, &["true"]).exits_with(75);
    assert_eq!(temp.lock_files().len(), 1);
}

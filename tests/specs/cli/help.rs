//! Help and version specs

use crate::prelude::*;

#[test]
fn help_lists_subcommands() {
    let temp = Project::empty();

    temp.keylock()
        .args(&["--help"])
        .passes()
        .stdout_has("run")
        .stdout_has("config");
}

#[test]
fn run_help_lists_lock_options() {
    let temp = Project::empty();

    temp.keylock()
        .args(&["run", "--help"])
        .passes()
        .stdout_has("--try-count")
        .stdout_has("--sleep-time")
        .stdout_has("--ttl")
        .stdout_has("--demo");
}

#[test]
fn version_names_the_binary() {
    let temp = Project::empty();

    temp.keylock()
        .args(&["--version"])
        .passes()
        .stdout_has("keylock");
}

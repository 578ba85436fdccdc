//! `keylock config` specs
//!
//! Verify the effective configuration is printed with defaults filled in.

use crate::prelude::*;

#[test]
fn defaults_print_as_json() {
    let temp = Project::empty();

    let json = temp.keylock().args(&["config"]).passes().json();

    assert_eq!(json["manager"]["mode"], "live");
    assert_eq!(json["manager"]["try_count"], 10);
    assert_eq!(json["manager"]["sleep_time"], "100ms");
    assert_eq!(json["manager"]["max_lock_time"], "1m");
    assert_eq!(json["manager"]["block_on_reacquire"], true);
    assert_eq!(json["keys"]["prefix"], "keylock:");
    assert_eq!(json["keys"]["strategy"], "plain");
    assert_eq!(json["backend"]["kind"], "file");
}

#[test]
fn file_values_override_defaults() {
    let temp = Project::empty();
    temp.file(
        "keylock.toml",
        r#"
[manager]
mode = "demo"
try_count = 3
sleep_time = "250ms"

[keys]
strategy = "hashed"
"#,
    );

    let json = temp
        .keylock()
        .args(&["--config", "keylock.toml", "config"])
        .passes()
        .json();

    assert_eq!(json["manager"]["mode"], "demo");
    assert_eq!(json["manager"]["try_count"], 3);
    assert_eq!(json["manager"]["sleep_time"], "250ms");
    // Untouched fields keep their defaults
    assert_eq!(json["manager"]["max_lock_time"], "1m");
    assert_eq!(json["keys"]["strategy"], "hashed");
    assert_eq!(json["keys"]["prefix"], "keylock:");
}

#[test]
fn config_path_can_come_from_environment() {
    let temp = Project::empty();
    let path = temp.file("conf/keylock.toml", "[manager]\ntry_count = 4\n");

    let json = temp
        .keylock()
        .env("KEYLOCK_CONFIG", &path)
        .args(&["config"])
        .passes()
        .json();

    assert_eq!(json["manager"]["try_count"], 4);
}

#[test]
fn toml_format_round_trips_through_config_flag() {
    let temp = Project::empty();

    let toml = temp
        .keylock()
        .args(&["config", "--format", "toml"])
        .passes()
        .stdout_has("[manager]")
        .stdout_has("try_count = 10")
        .stdout();
    temp.file("dumped.toml", &toml);

    temp.keylock()
        .args(&["--config", "dumped.toml", "config"])
        .passes()
        .stdout_has("\"try_count\": 10");
}

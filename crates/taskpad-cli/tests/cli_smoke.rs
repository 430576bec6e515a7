//! End-to-end checks for the non-interactive CLI surface.

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn help_lists_config_subcommand() {
    let mut cmd = Command::cargo_bin("taskpad").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("config"));
}

#[test]
fn config_path_respects_home_override() {
    let home = tempfile::tempdir().unwrap();
    let mut cmd = Command::cargo_bin("taskpad").unwrap();
    cmd.env("TASKPAD_HOME", home.path())
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"))
        .stdout(predicate::str::contains(home.path().to_str().unwrap()));
}

#[test]
fn unknown_subcommand_fails() {
    let mut cmd = Command::cargo_bin("taskpad").unwrap();
    cmd.arg("bogus").assert().failure();
}

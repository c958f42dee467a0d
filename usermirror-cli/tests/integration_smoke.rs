//! Smoke tests to verify command wiring

use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn test_serve_help() {
    let mut cmd = Command::cargo_bin("usermirror").unwrap();
    cmd.arg("serve").arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Dual-write policy"));
}

#[test]
fn test_check_help() {
    let mut cmd = Command::cargo_bin("usermirror").unwrap();
    cmd.arg("check").arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Config file"));
}

#[test]
fn test_config_example() {
    let mut cmd = Command::cargo_bin("usermirror").unwrap();
    cmd.arg("config").arg("example");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("[peer]"))
        .stdout(predicate::str::contains("policy = \"attempt_both\""));
}

#[test]
fn test_config_validate_reports_stores() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
[local]
host = "127.0.0.1"
user = "rudy"

[peer]
host = "10.0.0.2"
user = "rodolfo"
"#
    )
    .unwrap();

    let mut cmd = Command::cargo_bin("usermirror").unwrap();
    cmd.arg("config").arg("validate").arg("--config").arg(file.path());

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("peer 10.0.0.2:3306"));
}

#[test]
fn test_serve_missing_config_fails() {
    let dir = tempfile::tempdir().unwrap();
    let mut cmd = Command::cargo_bin("usermirror").unwrap();
    cmd.arg("serve")
        .arg("--config")
        .arg(dir.path().join("missing.toml"));

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Config not found"));
}

#[test]
fn test_unknown_policy_rejected() {
    let mut cmd = Command::cargo_bin("usermirror").unwrap();
    cmd.arg("serve").arg("--policy").arg("two_phase");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("unknown policy"));
}

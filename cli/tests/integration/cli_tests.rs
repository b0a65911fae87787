//! Integration tests for the pitunnel command surface.

#![allow(clippy::expect_used)]

use assert_cmd::Command;
use predicates::prelude::*;

pub fn pitunnel() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("pitunnel"));
    cmd.env("NO_COLOR", "1").env_remove("PITUNNEL_CONFIG");
    cmd
}

// --- Help and version tests ---

#[test]
fn test_cli_no_args_shows_help_and_exits_two() {
    pitunnel().assert().code(2).stderr(predicate::str::contains(
        "Publish a Raspberry Pi sensor server through a Cloudflare Tunnel",
    ));
}

#[test]
fn test_cli_help_lists_commands() {
    pitunnel()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("provision"))
        .stdout(predicate::str::contains("render"))
        .stdout(predicate::str::contains("status"));
}

#[test]
fn test_version_command_shows_version() {
    pitunnel()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(format!(
            "pitunnel {}",
            env!("CARGO_PKG_VERSION")
        )));
}

#[test]
fn test_version_flag_shows_version() {
    pitunnel()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("pitunnel"));
}

#[test]
fn test_provision_help_lists_overrides() {
    pitunnel()
        .args(["provision", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--domain"))
        .stdout(predicate::str::contains("--skip-verify"))
        .stdout(predicate::str::contains("--yes"));
}

#[test]
fn test_unknown_command_fails() {
    pitunnel()
        .arg("deploy")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("unrecognized subcommand"));
}

// --- Configuration errors surface before any host action ---

#[test]
fn test_provision_rejects_invalid_override() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = dir.path().join("config.yaml");
    std::fs::write(&config, "").expect("write config");

    pitunnel()
        .args(["provision", "--config"])
        .arg(&config)
        .args(["--subdomain", "Sensors"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Error: invalid configuration"))
        .stderr(predicate::str::contains("subdomain"));
}

#[test]
fn test_provision_rejects_zero_port() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = dir.path().join("config.yaml");
    std::fs::write(&config, "server_port: 0\n").expect("write config");

    pitunnel()
        .args(["provision", "--config"])
        .arg(&config)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("server_port"));
}

#[test]
fn test_missing_explicit_config_is_an_error() {
    let dir = tempfile::tempdir().expect("tempdir");

    pitunnel()
        .args(["status", "--config"])
        .arg(dir.path().join("absent.yaml"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("config file not found"));
}

#[test]
fn test_malformed_config_is_an_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = dir.path().join("config.yaml");
    std::fs::write(&config, "server_port: [not, a, port]\n").expect("write config");

    pitunnel()
        .args(["render", "--config"])
        .arg(&config)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("cannot parse"));
}

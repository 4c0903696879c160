//! CLI end-to-end tests
//!
//! Tests for the ladderd command-line interface.

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::process::Command;
use tempfile::tempdir;

/// Get a command for the ladderd binary
#[allow(deprecated)]
fn ladderd_cmd() -> Command {
    Command::cargo_bin("ladderd").unwrap()
}

#[test]
fn test_cli_no_args_shows_help() {
    let mut cmd = ladderd_cmd();
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_cli_help_lists_commands() {
    let mut cmd = ladderd_cmd();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("ladderd"))
        .stdout(predicate::str::contains("plan"))
        .stdout(predicate::str::contains("check-tools"));
}

#[test]
fn test_cli_version_command() {
    let mut cmd = ladderd_cmd();
    cmd.arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(format!(
            "ladderd {}",
            env!("CARGO_PKG_VERSION")
        )));
}

#[test]
fn test_cli_check_tools_command() {
    let mut cmd = ladderd_cmd();
    cmd.arg("check-tools")
        .assert()
        .success()
        .stdout(predicate::str::contains("ffmpeg"))
        .stdout(predicate::str::contains("ffprobe"));
}

#[test]
fn test_cli_validate_valid_config() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("ladderd.toml");
    fs::write(
        &config_path,
        r#"
[server]
port = 9001

[dispatch]
concurrent = 4

[[ladder.modes]]
resolution = "1280x720"
args = ["-crf", "23"]
"#,
    )
    .unwrap();

    let mut cmd = ladderd_cmd();
    cmd.arg("validate")
        .arg(&config_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration is valid"))
        .stdout(predicate::str::contains("9001"))
        .stdout(predicate::str::contains("1280x720"));
}

#[test]
fn test_cli_validate_rejects_zero_concurrency() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("ladderd.toml");
    fs::write(&config_path, "[dispatch]\nconcurrent = 0\n").unwrap();

    let mut cmd = ladderd_cmd();
    cmd.arg("validate")
        .arg(&config_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("concurrent"));
}

#[test]
fn test_cli_validate_uses_global_config_flag() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("bad.toml");
    fs::write(&config_path, "[policy]\nmin_resolution = \"big\"\n").unwrap();

    let mut cmd = ladderd_cmd();
    cmd.arg("--config")
        .arg(&config_path)
        .arg("validate")
        .assert()
        .failure();
}

#[test]
fn test_cli_probe_missing_file() {
    let mut cmd = ladderd_cmd();
    cmd.args(["probe", "/nonexistent/upload.mov"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"));
}

#[test]
fn test_cli_plan_missing_file() {
    let mut cmd = ladderd_cmd();
    cmd.args(["plan", "/nonexistent/upload.mov"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"));
}

//! Integration tests for `keel config` command.
//!
//! All filesystem-touching tests set `KEEL_CONFIG` to a temp path so they
//! never read or write `~/.keel/config.yaml`.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn keel() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("keel"));
    cmd.env("NO_COLOR", "1");
    cmd
}

/// Returns a `TempDir` and the path string for a config file inside it.
fn temp_config_path() -> (TempDir, String) {
    let dir = TempDir::new().expect("temp dir");
    let path = dir
        .path()
        .join("config.yaml")
        .to_string_lossy()
        .into_owned();
    (dir, path)
}

fn state_arg(dir: &TempDir) -> String {
    dir.path().join("deployment.json").to_string_lossy().into_owned()
}

// ---------------------------------------------------------------------------
// `keel config show`
// ---------------------------------------------------------------------------

#[test]
fn test_config_show_no_config_file_uses_defaults() {
    let (dir, path) = temp_config_path();
    keel()
        .args(["config", "show", "--state", &state_arg(&dir)])
        .env("KEEL_CONFIG", &path)
        .assert()
        .success()
        .stdout(predicate::str::contains("cpi.command"))
        .stdout(predicate::str::contains("keel-cpi"))
        .stdout(predicate::str::contains("hosts.enabled"));
}

#[test]
fn test_config_show_does_not_create_file() {
    let (dir, path) = temp_config_path();
    keel()
        .args(["config", "show", "--state", &state_arg(&dir)])
        .env("KEEL_CONFIG", &path)
        .assert()
        .success();
    assert!(
        !std::path::Path::new(&path).exists(),
        "show must not create the config file"
    );
}

#[test]
fn test_config_show_json_reports_path_and_values() {
    let (dir, path) = temp_config_path();
    let out = keel()
        .args(["--json", "config", "show", "--state", &state_arg(&dir)])
        .env("KEEL_CONFIG", &path)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let v: serde_json::Value = serde_json::from_slice(&out).expect("valid json");
    assert_eq!(v["path"], path.as_str());
    assert_eq!(v["config"]["cpi"]["timeout_secs"], 600);
    assert_eq!(v["config"]["hosts"]["enabled"], false);
}

// ---------------------------------------------------------------------------
// `keel config set`
// ---------------------------------------------------------------------------

#[test]
fn test_config_set_persists_value_readable_by_show() {
    let (dir, path) = temp_config_path();
    keel()
        .args(["config", "set", "cpi.command", "/opt/cpi/bin/cpi", "--state", &state_arg(&dir)])
        .env("KEEL_CONFIG", &path)
        .assert()
        .success()
        .stdout(predicate::str::contains("cpi.command"));
    keel()
        .args(["config", "show", "--state", &state_arg(&dir)])
        .env("KEEL_CONFIG", &path)
        .assert()
        .success()
        .stdout(predicate::str::contains("/opt/cpi/bin/cpi"));
}

#[test]
fn test_config_set_unknown_key_returns_error_with_valid_keys() {
    let (dir, path) = temp_config_path();
    keel()
        .args(["config", "set", "unknown.key", "value", "--state", &state_arg(&dir)])
        .env("KEEL_CONFIG", &path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("hosts.enabled"));
    assert!(!std::path::Path::new(&path).exists());
}

#[test]
fn test_config_set_invalid_bool_returns_error_with_valid_values() {
    let (dir, path) = temp_config_path();
    keel()
        .args(["config", "set", "hosts.enabled", "yes", "--state", &state_arg(&dir)])
        .env("KEEL_CONFIG", &path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("true, false"));
}

#[test]
fn test_config_set_zero_timeout_is_rejected() {
    let (dir, path) = temp_config_path();
    keel()
        .args(["config", "set", "cpi.timeout_secs", "0", "--state", &state_arg(&dir)])
        .env("KEEL_CONFIG", &path)
        .assert()
        .failure();
}

#[test]
#[cfg(unix)]
fn test_config_set_creates_file_with_0o600_permissions() {
    use std::os::unix::fs::PermissionsExt;
    let (dir, path) = temp_config_path();
    keel()
        .args(["config", "set", "hosts.enabled", "true", "--state", &state_arg(&dir)])
        .env("KEEL_CONFIG", &path)
        .assert()
        .success();
    let mode = std::fs::metadata(&path)
        .expect("file should exist")
        .permissions()
        .mode();
    assert_eq!(mode & 0o777, 0o600, "expected 0o600, got {mode:o}");
}

#[test]
fn test_config_show_corrupt_yaml_returns_error() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("config.yaml");
    std::fs::write(&path, b"{ not: valid: yaml: [[[").expect("write");
    keel()
        .args(["config", "show", "--state", &state_arg(&dir)])
        .env("KEEL_CONFIG", path.to_str().expect("path"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"));
}

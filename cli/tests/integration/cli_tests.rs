//! Integration tests for the keel CLI surface: help, version, global flags.

#![allow(clippy::expect_used)]

use assert_cmd::Command;
use predicates::prelude::*;

fn keel() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("keel"));
    cmd.env("NO_COLOR", "1");
    cmd
}

// --- Help and version tests ---

#[test]
fn test_cli_no_args_shows_help_and_exits_two() {
    // clap with arg_required_else_help shows help on stderr and exits 2.
    // Env-provided flags count as arguments, so both env vars must be unset.
    Command::new(assert_cmd::cargo::cargo_bin!("keel"))
        .env_remove("NO_COLOR")
        .env_remove("KEEL_STATE")
        .assert()
        .code(2)
        .stderr(predicate::str::contains(
            "Create and track the VM of a single-VM deployment",
        ));
}

#[test]
fn test_cli_help_lists_commands() {
    keel()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("create-vm"))
        .stdout(predicate::str::contains("current"))
        .stdout(predicate::str::contains("forget"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn test_cli_version_flag_shows_version() {
    keel()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("keel"));
}

#[test]
fn test_version_command_shows_version() {
    keel()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(format!(
            "keel {}",
            env!("CARGO_PKG_VERSION")
        )));
}

#[test]
fn test_version_command_json_outputs_valid_json() {
    let out = keel()
        .args(["--json", "version"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let v: serde_json::Value = serde_json::from_slice(&out).expect("valid json");
    assert_eq!(v["version"], env!("CARGO_PKG_VERSION"));
}

// --- Global flags tests ---

#[test]
fn test_global_quiet_flag_accepted() {
    keel().args(["--quiet", "version"]).assert().success();
}

#[test]
fn test_no_color_env_var_accepts_any_value() {
    for value in ["1", "true", "yes", "0", ""] {
        keel().env("NO_COLOR", value).arg("version").assert().success();
    }
}

#[test]
fn test_no_color_env_var_with_numeric_value_runs_commands() {
    let dir = tempfile::TempDir::new().expect("tempdir");
    keel()
        .env("NO_COLOR", "1")
        .env("KEEL_CONFIG", dir.path().join("config.yaml"))
        .arg("--state")
        .arg(dir.path().join("deployment.json"))
        .arg("current")
        .assert()
        .success()
        .stdout(predicate::str::contains("No current VM"));
}

#[test]
fn test_create_vm_requires_manifest_and_stemcell() {
    keel()
        .arg("create-vm")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--manifest"))
        .stderr(predicate::str::contains("--stemcell-cid"));
}

#[test]
fn test_unknown_subcommand_fails() {
    keel().arg("deploy").assert().code(2);
}

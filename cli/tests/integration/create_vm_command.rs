//! End-to-end tests for `keel create-vm` against a shell-script CPI.
//!
//! The fake CPI answers each JSON request based on its `method` and appends
//! the raw request to `requests.log` next to it.

#![cfg(unix)]
#![allow(clippy::expect_used)]

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const MANIFEST: &str = r"
name: demo
networks:
- name: private
  type: manual
  subnets:
  - range: 10.0.0.0/24
    gateway: 10.0.0.1
    netmask: 255.255.255.0
resource_pools:
- name: default
  network: private
  cloud_properties: {instance_type: m1.small}
jobs:
- name: web
  instances: 1
  resource_pool: default
  networks:
  - name: private
    static_ips: [10.0.0.10]
";

const CREATE_OK: &str = r#"{"result":"vm-123","error":null,"log":""}"#;
const CREATE_FAILS: &str =
    r#"{"result":null,"error":{"type":"Bosh::Clouds::CloudError","message":"quota exceeded","ok_to_retry":false},"log":""}"#;
const METADATA_UNSUPPORTED: &str = r#"{"result":null,"error":{"type":"Bosh::Clouds::NotImplemented","message":"tags unsupported","ok_to_retry":false},"log":""}"#;
const METADATA_FAILS: &str =
    r#"{"result":null,"error":{"type":"Bosh::Clouds::CloudError","message":"tagging broke","ok_to_retry":true},"log":""}"#;
const FIND_OK: &str =
    r#"{"result":{"hostname":"vm-123.internal","private_ip":"10.0.0.10"},"error":null,"log":""}"#;

struct Fixture {
    dir: TempDir,
}

impl Fixture {
    fn new(create_reply: &str, metadata_reply: &str, hosts_enabled: bool) -> Self {
        let dir = TempDir::new().expect("tempdir");
        let fixture = Self { dir };

        let script = format!(
            "#!/bin/sh\n\
             req=$(cat)\n\
             printf '%s\\n' \"$req\" >> '{log}'\n\
             case \"$req\" in\n\
             *'\"method\":\"create_vm\"'*) printf '%s' '{create_reply}' ;;\n\
             *'\"method\":\"set_vm_metadata\"'*) printf '%s' '{metadata_reply}' ;;\n\
             *'\"method\":\"find_vm\"'*) printf '%s' '{FIND_OK}' ;;\n\
             *) echo \"unexpected request\" >&2; exit 1 ;;\n\
             esac\n",
            log = fixture.path("requests.log").display(),
        );
        let cpi = fixture.path("cpi");
        std::fs::write(&cpi, script).expect("write cpi");
        std::fs::set_permissions(&cpi, std::fs::Permissions::from_mode(0o755)).expect("chmod");

        let config = format!(
            "cpi:\n  command: {}\n  timeout_secs: 30\nhosts:\n  enabled: {hosts_enabled}\n  path: {}\n",
            cpi.display(),
            fixture.path("hosts").display(),
        );
        std::fs::write(fixture.path("config.yaml"), config).expect("write config");
        std::fs::write(fixture.path("manifest.yml"), MANIFEST).expect("write manifest");
        fixture
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn keel(&self) -> Command {
        let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("keel"));
        cmd.env("NO_COLOR", "1")
            .env("KEEL_CONFIG", self.path("config.yaml"))
            .arg("--state")
            .arg(self.path("deployment.json"));
        cmd
    }

    fn create_vm(&self) -> Command {
        let mut cmd = self.keel();
        cmd.arg("create-vm")
            .arg("--manifest")
            .arg(self.path("manifest.yml"))
            .args(["--stemcell-cid", "stemcell-1"]);
        cmd
    }

    fn state(&self) -> serde_json::Value {
        read_json(&self.path("deployment.json"))
    }

    fn requests(&self) -> Vec<serde_json::Value> {
        std::fs::read_to_string(self.path("requests.log"))
            .unwrap_or_default()
            .lines()
            .map(|l| serde_json::from_str(l).expect("request is JSON"))
            .collect()
    }
}

fn read_json(path: &Path) -> serde_json::Value {
    let raw = std::fs::read(path).expect("read");
    serde_json::from_slice(&raw).expect("valid json")
}

#[test]
fn test_create_vm_records_cid_and_agent_id() {
    let fx = Fixture::new(CREATE_OK, METADATA_UNSUPPORTED, false);
    let out = fx
        .create_vm()
        .arg("--json")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let reply: serde_json::Value = serde_json::from_slice(&out).expect("valid json");
    assert_eq!(reply["vm_cid"], "vm-123");
    let agent_id = reply["agent_id"].as_str().expect("agent id");
    assert_eq!(agent_id.len(), 36, "agent id should be a UUID: {agent_id}");

    let state = fx.state();
    assert_eq!(state["current_vm_cid"], "vm-123");
    assert_eq!(state["current_agent_id"], agent_id);
}

#[test]
fn test_create_vm_sends_cpi_requests_in_order() {
    let fx = Fixture::new(CREATE_OK, METADATA_UNSUPPORTED, false);
    fx.create_vm().assert().success();

    let requests = fx.requests();
    let methods: Vec<&str> = requests
        .iter()
        .map(|r| r["method"].as_str().expect("method"))
        .collect();
    assert_eq!(methods, ["create_vm", "set_vm_metadata"]);

    let create = &requests[0];
    assert_eq!(create["arguments"][1], "stemcell-1");
    assert_eq!(create["arguments"][2]["instance_type"], "m1.small");
    assert_eq!(create["arguments"][3]["private"]["ip"], "10.0.0.10");
    assert_eq!(create["context"]["director_uuid"], "keel");
    assert_eq!(requests[1]["arguments"][0], "vm-123");
    assert_eq!(requests[1]["arguments"][1]["job"], "web");
}

#[test]
fn test_create_vm_writes_hosts_file_when_enabled() {
    let fx = Fixture::new(CREATE_OK, METADATA_UNSUPPORTED, true);
    fx.create_vm().assert().success();

    let hosts = std::fs::read_to_string(fx.path("hosts")).expect("hosts written");
    assert_eq!(hosts, "127.0.0.1 localhost\n10.0.0.10 vm-123.internal\n");
    let methods: Vec<String> = fx
        .requests()
        .iter()
        .map(|r| r["method"].as_str().expect("method").to_string())
        .collect();
    assert_eq!(methods, ["create_vm", "set_vm_metadata", "find_vm"]);
}

#[test]
fn test_create_vm_cloud_failure_leaves_no_record() {
    let fx = Fixture::new(CREATE_FAILS, METADATA_UNSUPPORTED, false);
    fx.create_vm()
        .assert()
        .failure()
        .stderr(predicate::str::contains("creating vm with stemcell cid 'stemcell-1'"))
        .stderr(predicate::str::contains("quota exceeded"));
    assert!(!fx.path("deployment.json").exists());
}

#[test]
fn test_create_vm_metadata_failure_keeps_vm_current() {
    let fx = Fixture::new(CREATE_OK, METADATA_FAILS, false);
    fx.create_vm()
        .assert()
        .failure()
        .stderr(predicate::str::contains("setting VM metadata"))
        .stderr(predicate::str::contains("tagging broke"));

    assert_eq!(fx.state()["current_vm_cid"], "vm-123");
    fx.keel()
        .arg("current")
        .assert()
        .success()
        .stdout(predicate::str::contains("vm-123"));
}

#[test]
fn test_create_vm_json_failure_prints_error_object() {
    let fx = Fixture::new(CREATE_FAILS, METADATA_UNSUPPORTED, false);
    let out = fx
        .create_vm()
        .arg("--json")
        .assert()
        .failure()
        .get_output()
        .stdout
        .clone();
    let v: serde_json::Value = serde_json::from_slice(&out).expect("valid json");
    assert_eq!(v["error"], true);
    assert!(
        v["message"].as_str().expect("message").contains("quota exceeded"),
        "{v}"
    );
}

#[test]
fn test_create_vm_missing_manifest_fails_before_cloud_call() {
    let fx = Fixture::new(CREATE_OK, METADATA_UNSUPPORTED, false);
    fx.keel()
        .args(["create-vm", "--manifest", "/nonexistent/manifest.yml"])
        .args(["--stemcell-cid", "stemcell-1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("reading manifest"));
    assert!(fx.requests().is_empty());
}

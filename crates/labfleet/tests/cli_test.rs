//! Integration tests for the `labfleet` CLI binary.
//!
//! Argument parsing, help output, shell completions, offline generators and
//! exit codes. Commands that need a controller run against wiremock.
#![allow(clippy::unwrap_used)]

use std::path::{Path, PathBuf};

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `labfleet` binary with env isolation.
///
/// Clears the `LABFLEET_*` overrides and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn labfleet_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("labfleet");
    cmd.env("HOME", "/tmp/labfleet-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/labfleet-cli-test-nonexistent")
        .env_remove("LABFLEET_CONFIG")
        .env_remove("LABFLEET_CONTROLLER__URL")
        .env_remove("LABFLEET_CONTROLLER__PROJECT_ID")
        .env_remove("LABFLEET_CONTROLLER__TEMPLATE_ID")
        .env_remove("ALWAYS_UPDATE_ROUTER_CFG")
        .env_remove("RUST_LOG");
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

/// Write a config file for a three-device fleet against `url`.
fn write_config(dir: &Path, url: &str) -> PathBuf {
    let file = dir.join("labfleet.toml");
    std::fs::write(
        &file,
        format!(
            r#"
[controller]
url = "{url}"
project_id = "lab"
template_id = "c7200"
retry_attempts = 1

[fleet]
first_device = 1
last_device = 3
"#
        ),
    )
    .unwrap();
    file
}

async fn mount_topology(server: &MockServer, nodes: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/v2/projects/lab/nodes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(nodes))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v2/projects/lab/links"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(server)
        .await;
}

fn node_json(id: &str, name: &str) -> serde_json::Value {
    json!({
        "node_id": id,
        "node_type": "dynamips",
        "name": name,
        "x": 0,
        "y": 0,
        "z": 1,
        "status": "stopped"
    })
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = labfleet_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    labfleet_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("build")
            .and(predicate::str::contains("start"))
            .and(predicate::str::contains("delete-routers"))
            .and(predicate::str::contains("inventory")),
    );
}

#[test]
fn test_version_flag() {
    labfleet_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("labfleet"));
}

#[test]
fn test_start_bulk_conflicts_with_pool() {
    labfleet_cmd()
        .args(["start", "--bulk", "--pool", "3"])
        .assert()
        .code(2);
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    labfleet_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("labfleet"));
}

#[test]
fn test_completions_zsh() {
    labfleet_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn test_config_path_honours_flag() {
    labfleet_cmd()
        .args(["--config", "/tmp/somewhere/labfleet.toml", "config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("/tmp/somewhere/labfleet.toml"));
}

#[test]
fn test_config_show_without_file_uses_defaults() {
    labfleet_cmd()
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("[controller]")
                .and(predicate::str::contains("devices_per_switch = 50")),
        );
}

#[test]
fn test_missing_project_is_a_config_error() {
    labfleet_cmd()
        .args(["nodes"])
        .assert()
        .code(8)
        .stderr(predicate::str::contains("project_id"));
}

// ── Offline generators ──────────────────────────────────────────────

#[test]
fn test_inventory_writes_both_layouts() {
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path(), "http://127.0.0.1:1/v2");
    let ansible = dir.path().join("ansible");
    let nornir = dir.path().join("nornir");

    labfleet_cmd()
        .arg("--config")
        .arg(&config)
        .arg("inventory")
        .arg("--ansible-dir")
        .arg(&ansible)
        .arg("--nornir-dir")
        .arg(&nornir)
        .assert()
        .success();

    let hosts = std::fs::read_to_string(ansible.join("hosts.yaml")).unwrap();
    assert!(hosts.contains("Switch1"));
    assert!(hosts.contains("10.15.1.3"));
    assert!(nornir.join("groups.yaml").exists());
    assert!(nornir.join("defaults.yaml").exists());
}

#[test]
fn test_dhcp_prints_fixed_addresses() {
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path(), "http://127.0.0.1:1/v2");

    labfleet_cmd()
        .arg("--config")
        .arg(&config)
        .arg("dhcp")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("fixed-address 10.15.1.1;")
                .and(predicate::str::contains("fixed-address 10.15.1.3;")),
        );
}

// ── Against a controller ────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_nodes_plain_lists_names() {
    let server = MockServer::start().await;
    mount_topology(&server, json!([node_json("s1", "Switch1"), node_json("r1", "1")])).await;
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path(), &format!("{}/v2", server.uri()));

    labfleet_cmd()
        .arg("--config")
        .arg(&config)
        .args(["-o", "plain", "nodes"])
        .assert()
        .success()
        .stdout("1\nSwitch1\n");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_output_default_comes_from_config_file() {
    let server = MockServer::start().await;
    mount_topology(&server, json!([node_json("s1", "Switch1"), node_json("r1", "1")])).await;
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path(), &format!("{}/v2", server.uri()));
    let mut text = std::fs::read_to_string(&config).unwrap();
    text.push_str("\n[defaults]\noutput = \"plain\"\n");
    std::fs::write(&config, text).unwrap();

    labfleet_cmd()
        .arg("--config")
        .arg(&config)
        .arg("nodes")
        .assert()
        .success()
        .stdout("1\nSwitch1\n");

    labfleet_cmd()
        .arg("--config")
        .arg(&config)
        .args(["-o", "json-compact", "links"])
        .assert()
        .success()
        .stdout("[]\n");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_build_without_switch_exits_with_partial_failure() {
    let server = MockServer::start().await;
    mount_topology(&server, json!([])).await;
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path(), &format!("{}/v2", server.uri()));

    labfleet_cmd()
        .arg("--config")
        .arg(&config)
        .arg("build")
        .assert()
        .code(6)
        .stderr(predicate::str::contains("Switch1"))
        .stdout(predicate::str::contains("0 succeeded, 3 failed"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_sweep_requires_yes_without_terminal() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/projects/lab/nodes"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([node_json("s1", "Switch1"), node_json("r1", "1")])),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v2/projects/lab/links"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "link_id": "l1",
            "link_type": "ethernet",
            "nodes": [
                { "node_id": "r1", "adapter_number": 0, "port_number": 0 },
                { "node_id": "s1", "adapter_number": 0, "port_number": 1 }
            ]
        }])))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path(), &format!("{}/v2", server.uri()));

    labfleet_cmd()
        .arg("--config")
        .arg(&config)
        .arg("delete-routers")
        .write_stdin("")
        .assert()
        .code(2);
}

#[test]
fn test_unreachable_controller_exits_with_connection_code() {
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path(), "http://127.0.0.1:1/v2");

    labfleet_cmd()
        .arg("--config")
        .arg(&config)
        .arg("nodes")
        .assert()
        .code(7);
}

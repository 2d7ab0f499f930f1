//! Integration tests for the `plugsync` CLI binary.
//!
//! Every test runs against a temporary config of simulated plugs, so no
//! network devices are needed.
#![allow(clippy::unwrap_used)]

use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `plugsync` binary with env isolation.
///
/// Clears `PLUGSYNC_*` overrides and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn plugsync_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("plugsync");
    cmd.env("HOME", "/tmp/plugsync-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/plugsync-cli-test-nonexistent")
        .env("NO_COLOR", "1")
        .env_remove("PLUGSYNC_CONFIG")
        .env_remove("PLUGSYNC_DEFAULTS__OUTPUT")
        .env_remove("PLUGSYNC_DEFAULTS__MAX_ATTEMPTS")
        .env_remove("RUST_LOG");
    cmd
}

/// Daily history covering every day of the month, so "today" always resolves.
fn full_month(kwh: f64) -> String {
    let entries: Vec<String> = (1..=31).map(|day| format!("\"{day}\" = {kwh}")).collect();
    format!("{{ {} }}", entries.join(", "))
}

fn fleet_toml() -> String {
    format!(
        r#"
[defaults]
max_attempts = 2
retry_delay_secs = 0
output = "table"

[plugs.kitchen]
host = "192.168.1.20"
mac = "50:C7:BF:12:34:56"
alias = "Kitchen"
on = true
meter = {{ power = 12.34, total = 1.234, voltage = 120.1, current = 0.12 }}
daily = {daily}

[plugs.lamp]
host = "192.168.1.30"
mac = "50:C7:BF:AA:BB:CC"
outlet = "80"
children = [
    {{ id = "79", alias = "Monitor" }},
    {{ id = "80", alias = "Lamp", on = true }},
    {{ id = "81", alias = "Speaker" }},
]

[plugs.attic]
host = "192.168.1.99"
offline = true

[plugs.flaky]
host = "192.168.1.40"
fail_first = 1
"#,
        daily = full_month(0.456)
    )
}

fn write_config(dir: &TempDir, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join("plugsync.toml");
    std::fs::write(&path, contents).unwrap();
    path
}

fn with_config(path: &Path) -> assert_cmd::Command {
    let mut cmd = plugsync_cmd();
    cmd.arg("--config").arg(path);
    cmd
}

fn json_stdout(output: &std::process::Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).unwrap()
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = plugsync_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Usage"));
}

#[test]
fn test_help_lists_commands() {
    plugsync_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("status")
            .and(predicate::str::contains("watch"))
            .and(predicate::str::contains("on"))
            .and(predicate::str::contains("off")),
    );
}

#[test]
fn test_version_flag() {
    plugsync_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("plugsync"));
}

#[test]
fn test_completions_bash() {
    plugsync_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("plugsync"));
}

#[test]
fn test_invalid_output_format() {
    plugsync_cmd()
        .args(["--output", "xml", "status"])
        .assert()
        .code(2);
}

// ── Config commands ─────────────────────────────────────────────────

#[test]
fn test_config_path_default() {
    plugsync_cmd()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("plugsync").and(predicate::str::contains("config.toml")));
}

#[test]
fn test_config_path_honours_flag() {
    plugsync_cmd()
        .args(["--config", "/etc/plugsync/fleet.toml", "config", "path"])
        .assert()
        .success()
        .stdout("/etc/plugsync/fleet.toml\n");
}

#[test]
fn test_config_show_renders_toml() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, &fleet_toml());
    with_config(&path)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("[plugs.kitchen]")
                .and(predicate::str::contains("max_attempts = 2")),
        );
}

#[test]
fn test_missing_config_file() {
    plugsync_cmd()
        .args(["--config", "/tmp/plugsync-cli-test-nonexistent/none.toml", "status"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_empty_config_has_no_plugs() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "");
    with_config(&path)
        .arg("status")
        .assert()
        .code(3)
        .stderr(predicate::str::contains("No plugs configured"));
}

#[test]
fn test_unknown_backend_rejected() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"
[plugs.kettle]
host = "10.0.0.5"
backend = "zigbee"
"#,
    );
    with_config(&path)
        .arg("status")
        .assert()
        .code(3)
        .stderr(predicate::str::contains("backend"));
}

// ── Status ──────────────────────────────────────────────────────────

#[test]
fn test_status_table() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, &fleet_toml());
    with_config(&path)
        .args(["status", "kitchen"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("kitchen")
                .and(predicate::str::contains("12.34"))
                .and(predicate::str::contains("0.456"))
                .and(predicate::str::contains("on")),
        );
}

#[test]
fn test_status_json_reports_meter_attributes() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, &fleet_toml());
    let output = with_config(&path)
        .args(["--output", "json", "status", "kitchen"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json = json_stdout(&output);
    let kitchen = &json[0];
    assert_eq!(kitchen["name"], "kitchen");
    assert_eq!(kitchen["alias"], "Kitchen");
    assert_eq!(kitchen["unique_id"], "50:c7:bf:12:34:56");
    assert_eq!(kitchen["on"], true);
    assert_eq!(kitchen["available"], true);
    assert_eq!(kitchen["meter"]["current_power_w"], "12.34");
    assert_eq!(kitchen["meter"]["total_energy_kwh"], "1.234");
    assert_eq!(kitchen["meter"]["voltage"], "120.1");
    assert_eq!(kitchen["meter"]["current_a"], "0.12");
    assert_eq!(kitchen["meter"]["today_energy_kwh"], "0.456");
}

#[test]
fn test_status_strip_outlet() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, &fleet_toml());
    let output = with_config(&path)
        .args(["-o", "json-compact", "status", "lamp"])
        .output()
        .unwrap();

    let json = json_stdout(&output);
    assert_eq!(json[0]["on"], true);
    assert_eq!(json[0]["unique_id"], "80");
    assert_eq!(json[0]["alias"], "Lamp");
    assert!(json[0].get("meter").is_none());
}

#[test]
fn test_status_all_plugs_plain() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, &fleet_toml());
    let output = with_config(&path)
        .args(["-o", "plain", "status"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(
        lines,
        vec![
            "attic unavailable",
            "flaky off",
            "kitchen on 12.34 W 0.456 kWh today",
            "lamp on",
        ]
    );

    // The dead plug exhausts its two attempts and says so on stderr.
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert_eq!(stderr.matches("Retrying in").count(), 3);
}

#[test]
fn test_status_unknown_plug() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, &fleet_toml());
    with_config(&path)
        .args(["status", "garage"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("garage"));
}

#[test]
fn test_output_default_from_env() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, &fleet_toml());
    let output = with_config(&path)
        .env("PLUGSYNC_DEFAULTS__OUTPUT", "json")
        .args(["status", "kitchen"])
        .output()
        .unwrap();
    assert_eq!(json_stdout(&output)[0]["name"], "kitchen");
}

// ── Control ─────────────────────────────────────────────────────────

#[test]
fn test_off_updates_state() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, &fleet_toml());
    let output = with_config(&path)
        .args(["-o", "json", "off", "kitchen"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json = json_stdout(&output);
    assert_eq!(json["on"], false);
    assert_eq!(json["available"], true);
}

#[test]
fn test_on_recovers_from_flaky_plug() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, &fleet_toml());
    with_config(&path)
        .args(["-o", "plain", "on", "flaky"])
        .assert()
        .success()
        .stdout("flaky on\n");
}

#[test]
fn test_switching_unreachable_plug_fails() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, &fleet_toml());
    with_config(&path)
        .args(["off", "attic"])
        .assert()
        .code(7)
        .stderr(predicate::str::contains("Could not reach attic"));
}

#[test]
fn test_quiet_suppresses_output() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, &fleet_toml());
    with_config(&path)
        .args(["--quiet", "on", "kitchen"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

// ── Watch ───────────────────────────────────────────────────────────

#[test]
fn test_watch_prints_first_state_of_each_plug() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, &fleet_toml());
    let output = with_config(&path)
        .args(["-o", "json-compact", "watch", "kitchen", "lamp", "--count", "2"])
        .timeout(std::time::Duration::from_secs(30))
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let mut names: Vec<String> = stdout
        .lines()
        .map(|l| {
            let v: serde_json::Value = serde_json::from_str(l).unwrap();
            assert_eq!(v["available"], true);
            v["name"].as_str().unwrap().to_owned()
        })
        .collect();
    names.sort();
    assert_eq!(names, vec!["kitchen", "lamp"]);
}

#[test]
fn test_watch_prints_plug_offline_from_start() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, &fleet_toml());
    let output = with_config(&path)
        .args(["-o", "json-compact", "watch", "attic", "--count", "1"])
        .timeout(std::time::Duration::from_secs(30))
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].contains(r#""available":false"#));
    let v: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(v["name"], "attic");
}

//! Error scenario integration tests

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn rollcap_bin(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("rollcap").unwrap();
    cmd.env("XDG_CONFIG_HOME", dir.path())
        .env("XDG_RUNTIME_DIR", dir.path())
        .env("HOME", dir.path())
        .env_remove("ROLLCAP_OUTPUT_DIR");
    cmd
}

#[test]
fn missing_capture_device_fails_fast() {
    let dir = TempDir::new().unwrap();
    rollcap_bin(&dir)
        .args(["-d", "/dev/video-does-not-exist", "-o"])
        .arg(dir.path())
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("video-does-not-exist"));
}

#[test]
fn invalid_segment_size_is_usage_error() {
    let dir = TempDir::new().unwrap();
    rollcap_bin(&dir)
        .args(["-s", "huge"])
        .assert()
        .failure()
        .code(2);
}

#[test]
fn invalid_quality_rejected_by_parser() {
    let dir = TempDir::new().unwrap();
    rollcap_bin(&dir)
        .args(["-q", "ultra"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("ultra"));
}

#[test]
fn config_get_unknown_key() {
    let dir = TempDir::new().unwrap();
    rollcap_bin(&dir)
        .args(["config", "get", "unknown_key"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown_key").or(predicate::str::contains("Unknown")));
}

#[test]
fn config_set_rejects_bad_size() {
    let dir = TempDir::new().unwrap();
    rollcap_bin(&dir)
        .args(["config", "set", "segment_size", "lots"])
        .assert()
        .failure();
}

#[test]
fn config_set_rejects_missing_volume() {
    let dir = TempDir::new().unwrap();
    rollcap_bin(&dir)
        .args(["config", "set", "volume", "/no/such/mount/point"])
        .assert()
        .failure();
}

#[test]
fn daemon_command_without_daemon() {
    let dir = TempDir::new().unwrap();
    rollcap_bin(&dir)
        .args(["daemon", "status"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No daemon running"));
}

//! Basic CLI tests for the onusim command-line interface.

use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;

/// Command with the environment cleared of onusim overrides.
fn onusim() -> Command {
    let mut cmd = Command::cargo_bin("onusim").unwrap();
    cmd.env_remove("ONUSIM_MIB_UPLOAD_STEPS")
        .env_remove("ONUSIM_RESET_POLICY")
        .env_remove("ONUSIM_STRICT_CATALOGUE");
    cmd
}

#[test]
fn test_cli_help() {
    onusim()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("upload"))
        .stdout(predicate::str::contains("catalogue"))
        .stdout(predicate::str::contains("frame"));
}

#[test]
fn test_no_subcommand_shows_error() {
    // Clap's error code for a missing required subcommand
    onusim().assert().failure().code(2);
}

#[test]
fn test_catalogue_lists_every_entry() {
    onusim()
        .arg("catalogue")
        .assert()
        .success()
        .stdout(predicate::str::contains("ONU data"))
        .stdout(predicate::str::contains("traffic scheduler"))
        .stdout(predicate::str::contains(" 66  ONU2-G"));
}

#[test]
fn test_catalogue_json() {
    let output = onusim().args(["catalogue", "--json"]).output().unwrap();
    assert!(output.status.success());

    let rows: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let rows = rows.as_array().unwrap();
    assert_eq!(rows.len(), 67);
    assert_eq!(rows[21]["name"], "ANI-G");
    assert_eq!(rows[21]["class"], 263);
}

#[test]
fn test_frame_hex_dump() {
    // PPTP instance 0x0101 on a fresh ONU.
    onusim()
        .args(["frame", "--index", "9"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("0000000000020000000b0101"));
}

#[test]
fn test_frame_past_catalogue_fails() {
    onusim().args(["frame", "--index", "67"]).assert().failure();
}

#[test]
fn test_upload_json_summary() {
    let output = onusim()
        .args(["upload", "--pon-ports", "2", "--onus", "2", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let summaries: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let summaries = summaries.as_array().unwrap();
    assert_eq!(summaries.len(), 4);
    for (i, summary) in summaries.iter().enumerate() {
        assert_eq!(summary["uploads"], 67);
        assert_eq!(summary["overflow"], 0);
        assert_eq!(summary["lifecycle"], "DONE");
        assert_eq!(summary["gem_port_id"], 1024 + i as u64);
    }
}

#[test]
fn test_upload_with_config_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "mib_upload_steps = 69").unwrap();

    let output = onusim()
        .args(["upload", "--onus", "1", "--json", "--config"])
        .arg(file.path())
        .output()
        .unwrap();
    assert!(output.status.success());

    let summaries: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(summaries[0]["uploads"], 67);
    assert_eq!(summaries[0]["overflow"], 2);
}

#[test]
fn test_strict_catalogue_rejects_drift() {
    onusim()
        .env("ONUSIM_MIB_UPLOAD_STEPS", "10")
        .env("ONUSIM_STRICT_CATALOGUE", "true")
        .args(["upload", "--onus", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("catalogue"));
}

//! CLI integration tests for `scil`.

use assert_cmd::Command;
use predicates::prelude::*;
use std::time::Duration;
use tempfile::TempDir;

fn scil() -> Command {
    let mut cmd = Command::cargo_bin("scil").unwrap();
    cmd.timeout(Duration::from_secs(30));
    cmd
}

#[test]
fn test_help_flag() {
    scil()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("payroll incompatibility auditor"));
}

#[test]
fn test_version_flag() {
    scil().arg("--version").assert().success();
}

#[test]
fn test_show_rfc_on_empty_store_prints_null() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("scil.db");

    scil()
        .arg("--db")
        .arg(&db_path)
        .arg("show-rfc")
        .arg("CUPU800825569")
        .assert()
        .success()
        .stdout(predicate::str::contains("null"));
}

#[test]
fn test_solventar_then_show_rfc_round_trips_estado() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("scil.db");

    scil()
        .arg("--db")
        .arg(&db_path)
        .arg("solventar")
        .arg("CUPU800825569")
        .arg("Solventado")
        .arg("ok")
        .arg("--ente")
        .arg("ENTE_00002")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"rows_affected\": 1"));
}

#[test]
fn test_grouped_on_empty_store_prints_empty_object() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("scil.db");

    scil()
        .arg("--db")
        .arg(&db_path)
        .arg("grouped")
        .assert()
        .success()
        .stdout(predicate::str::contains("{}"));
}

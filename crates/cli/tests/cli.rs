//! End-to-end tests of the `clipflow` binary.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn clipflow(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("clipflow").expect("binary should build");
    cmd.arg("-C").arg(dir.path()).env("NO_COLOR", "1");
    cmd
}

/// Scaffold and import the full sample project.
fn imported_project() -> TempDir {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    clipflow(&dir).arg("init").assert().success();
    clipflow(&dir)
        .arg("import")
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported 2 processes"));
    dir
}

#[test]
fn test_init_twice_requires_force() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");

    clipflow(&dir)
        .args(["init", "--minimal"])
        .assert()
        .success()
        .stdout(predicate::str::contains("processes/login.yaml"));

    clipflow(&dir)
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already a clipflow project"));

    clipflow(&dir).args(["init", "--force"]).assert().success();
}

#[test]
fn test_import_is_idempotent_and_listed() {
    let dir = imported_project();

    clipflow(&dir)
        .arg("import")
        .assert()
        .success()
        .stdout(predicate::str::contains("skipped 2"));

    let output = clipflow(&dir)
        .args(["list", "--json"])
        .output()
        .expect("list should run");
    assert!(output.status.success());
    let processes: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("list --json should print JSON");
    let names: Vec<&str> = processes
        .as_array()
        .expect("array")
        .iter()
        .filter_map(|p| p["name"].as_str())
        .collect();
    assert_eq!(names.len(), 2);
    assert!(names.contains(&"login"));
    assert!(names.contains(&"staging-login"));
}

#[test]
fn test_show_masks_sensitive_content() {
    let dir = imported_project();

    clipflow(&dir)
        .args(["show", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("alice@example.com"))
        .stdout(predicate::str::contains("change-me").not());
}

#[test]
fn test_run_to_stdout_then_history_and_stats() {
    let dir = imported_project();

    clipflow(&dir)
        .args(["run", "1", "--stdout"])
        .assert()
        .success()
        .stdout(predicate::str::contains("alice@example.com\nchange-me"))
        .stderr(predicate::str::contains("Completed successfully"));

    clipflow(&dir)
        .args(["history", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("completed"));

    clipflow(&dir)
        .args(["stats", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("100.0%"));
}

#[test]
fn test_search_and_delete() {
    let dir = imported_project();

    clipflow(&dir)
        .args(["search", "staging"])
        .assert()
        .success()
        .stdout(predicate::str::contains("staging-login"))
        .stdout(predicate::str::contains(" login ").not());

    clipflow(&dir).args(["delete", "2"]).assert().success();
    clipflow(&dir)
        .args(["show", "2"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Process 2 not found"));
}

#[test]
fn test_run_unknown_process_fails() {
    let dir = imported_project();

    clipflow(&dir)
        .args(["run", "42", "--stdout"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Process 42 not found"));
}

//! CLI integration tests for Taskbridge.
//!
//! These tests exercise the binary end to end: provider listing, reference
//! resolution against a temp project, and the error surface.

use std::fs;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use tempfile::TempDir;

/// Get the taskbridge binary command.
fn taskbridge() -> Command {
    Command::cargo_bin("taskbridge").unwrap()
}

/// Create a temporary directory for test projects.
fn temp_dir() -> TempDir {
    TempDir::new().unwrap()
}

// ============================================================================
// taskbridge providers
// ============================================================================

#[test]
fn test_providers_lists_builtins() {
    taskbridge()
        .arg("providers")
        .assert()
        .success()
        .stdout(predicate::str::contains("gitlab"))
        .stdout(predicate::str::contains("jira"))
        .stdout(predicate::str::contains("linear"))
        .stdout(predicate::str::contains("clickup"))
        .stdout(predicate::str::contains("youtrack"))
        .stdout(predicate::str::contains("azuredevops"))
        .stdout(predicate::str::contains("file"))
        .stdout(predicate::str::contains("dir"));
}

#[test]
fn test_providers_shows_capabilities() {
    taskbridge()
        .args(["providers", "--capabilities"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Supports:"))
        .stdout(predicate::str::contains("read"));
}

#[test]
fn test_providers_orders_remote_trackers_before_local() {
    let output = taskbridge().arg("providers").output().unwrap();
    let stdout = String::from_utf8(output.stdout).unwrap();

    let gitlab_pos = stdout.find("gitlab - ").unwrap();
    let file_pos = stdout.find("file - ").unwrap();
    assert!(gitlab_pos < file_pos, "remote trackers list first");
}

// ============================================================================
// taskbridge resolve
// ============================================================================

#[test]
fn test_resolve_file_reference() {
    let tmp = temp_dir();
    fs::write(
        tmp.path().join("todo.md"),
        "# Fix the flaky login test\n\nDetails here.\n",
    )
    .unwrap();

    taskbridge()
        .args(["resolve", "file:todo.md"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Provider:     file"))
        .stdout(predicate::str::contains("todo.md"));
}

#[test]
fn test_resolve_gitlab_reference() {
    let tmp = temp_dir();

    taskbridge()
        .args(["resolve", "gitlab:group/project#42"])
        .env("GITLAB_TOKEN", "glpat-test")
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Provider:     gitlab"))
        .stdout(predicate::str::contains("group/project#42"));
}

#[test]
fn test_resolve_gitlab_without_token_fails() {
    let tmp = temp_dir();

    taskbridge()
        .args(["resolve", "gitlab:group/project#42"])
        .env_remove("GITLAB_TOKEN")
        .env_remove("TASKBRIDGE_GITLAB_TOKEN")
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to initialize"));
}

#[test]
fn test_resolve_json_output() {
    let tmp = temp_dir();
    fs::write(tmp.path().join("task.md"), "# A task\n").unwrap();

    let output = taskbridge()
        .args(["resolve", "file:task.md", "--json"])
        .current_dir(tmp.path())
        .output()
        .unwrap();

    assert!(output.status.success());
    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(parsed["provider"], "file");
    assert_eq!(parsed["scheme"], "file");
    assert!(parsed["capabilities"]
        .as_array()
        .unwrap()
        .iter()
        .any(|c| c == "read"));
}

#[test]
fn test_resolve_unknown_scheme_fails_with_guidance() {
    taskbridge()
        .args(["resolve", "bogus:123"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown scheme `bogus`"))
        .stderr(predicate::str::contains("registered schemes"));
}

#[test]
fn test_resolve_bare_reference_without_default_lists_schemes() {
    let tmp = temp_dir();

    taskbridge()
        .args(["resolve", "42"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("no scheme"))
        .stderr(predicate::str::contains("gitlab"))
        .stderr(predicate::str::contains("file"));
}

#[test]
fn test_resolve_bare_reference_with_provider_flag() {
    let tmp = temp_dir();
    fs::write(tmp.path().join("notes.md"), "# Notes\n").unwrap();

    taskbridge()
        .args(["resolve", "notes.md", "--provider", "file"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Provider:     file"));
}

#[test]
fn test_resolve_default_provider_from_project_config() {
    let tmp = temp_dir();
    fs::create_dir(tmp.path().join(".taskbridge")).unwrap();
    fs::write(
        tmp.path().join(".taskbridge/config.toml"),
        "[providers]\ndefault = \"file\"\n",
    )
    .unwrap();
    fs::write(tmp.path().join("plan.md"), "# Plan\n").unwrap();

    taskbridge()
        .args(["resolve", "plan.md"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Provider:     file"));
}

#[test]
fn test_resolve_provider_config_reaches_factory() {
    let tmp = temp_dir();
    fs::create_dir(tmp.path().join(".taskbridge")).unwrap();
    fs::write(
        tmp.path().join(".taskbridge/config.toml"),
        "[providers.gitlab]\ntoken = \"glpat-from-config\"\nhost = \"gitlab.example.com\"\n",
    )
    .unwrap();

    taskbridge()
        .args(["resolve", "gl:#7"])
        .env_remove("GITLAB_TOKEN")
        .env_remove("TASKBRIDGE_GITLAB_TOKEN")
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("#7"));
}

#[test]
fn test_resolve_windows_path_is_not_a_scheme() {
    taskbridge()
        .args(["resolve", r"C:\work\task.md"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no scheme"));
}

// ============================================================================
// taskbridge completions
// ============================================================================

#[test]
fn test_completions_bash() {
    taskbridge()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("taskbridge"));
}

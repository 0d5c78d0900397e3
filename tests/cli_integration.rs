// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Integration tests for the sources CLI commands

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;
use tempfile::TempDir;

const SOURCES: &str = r#"[
    {
        "id": "1",
        "name": "Pepa",
        "source_type_id": "2",
        "created_at": "2024-03-01T10:00:00Z",
        "availability_status": "available",
        "applications": [
            {"id": "10", "application_type_id": "5", "availability_status": "available"}
        ]
    },
    {
        "id": "2",
        "name": "Karel",
        "source_type_id": "1",
        "created_at": "2024-04-01T10:00:00Z",
        "availability_status": "unavailable",
        "availability_status_error": "cluster unreachable",
        "endpoints": [
            {"id": "20", "scheme": "https", "host": "ocp.example.com", "port": 8443}
        ]
    },
    {
        "id": "3",
        "name": "Franta",
        "source_type_id": "2",
        "created_at": "2024-05-01T10:00:00Z",
        "imported": "cfme"
    }
]"#;

const SOURCE_TYPES: &str = r#"[
    {"id": "1", "name": "openshift", "product_name": "OpenShift Container Platform", "vendor": "Red Hat"},
    {"id": "2", "name": "amazon", "product_name": "Amazon Web Services", "vendor": "Amazon"}
]"#;

const APP_TYPES: &str = r#"[
    {"id": "5", "name": "/insights/platform/cost-management", "display_name": "Cost Management"}
]"#;

// =============================================================================
// Helpers
// =============================================================================

fn make_data_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("sources.json"), SOURCES).unwrap();
    std::fs::write(dir.path().join("source_types.json"), SOURCE_TYPES).unwrap();
    std::fs::write(dir.path().join("application_types.json"), APP_TYPES).unwrap();
    dir
}

/// `sources` with an isolated data directory and config file
fn sources(data_dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("sources").unwrap();
    cmd.env("SOURCES_CONSOLE_DATA_DIR", data_dir)
        .env("SOURCES_CONSOLE_CONFIG", data_dir.join("config.toml"))
        .env_remove("NO_COLOR")
        .arg("--no-color");
    cmd
}

// =============================================================================
// list
// =============================================================================

#[test]
fn test_list_shows_table_newest_first() {
    let data = make_data_dir();

    let output = sources(data.path()).arg("list").assert().success();
    let stdout = String::from_utf8(output.get_output().stdout.clone()).unwrap();

    let franta = stdout.find("Franta").unwrap();
    let karel = stdout.find("Karel").unwrap();
    let pepa = stdout.find("Pepa").unwrap();
    assert!(franta < karel && karel < pepa);
    assert!(stdout.contains("Connected applications"));
    assert!(stdout.contains("https://ocp.example.com:8443"));
    assert!(stdout.contains("1-3 of 3 (page 1 of 1)"));
}

#[test]
fn test_list_name_filter() {
    let data = make_data_dir();

    sources(data.path())
        .args(["list", "--name", "pep"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Pepa"))
        .stdout(predicate::str::contains("Karel").not())
        .stdout(predicate::str::contains("1-1 of 1"));
}

#[test]
fn test_list_status_and_vendor_filters() {
    let data = make_data_dir();

    sources(data.path())
        .args(["list", "--status", "unavailable"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Karel"))
        .stdout(predicate::str::contains("Pepa").not());

    sources(data.path())
        .args(["list", "--vendor", "cloud", "--sort-by", "name", "--direction", "asc"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Franta"))
        .stdout(predicate::str::contains("Karel").not());
}

#[test]
fn test_list_no_results() {
    let data = make_data_dir();

    sources(data.path())
        .args(["list", "--name", "nobody"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No sources match"));
}

#[test]
fn test_list_empty_data_dir() {
    let data = TempDir::new().unwrap();

    sources(data.path())
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No sources found"));
}

#[test]
fn test_list_clamps_page_past_the_end() {
    let data = make_data_dir();

    sources(data.path())
        .args(["list", "--page", "9", "--page-size", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("3-3 of 3 (page 3 of 3)"));
}

#[test]
fn test_list_live_applies_settled_name_filter() {
    let data = make_data_dir();

    let output = sources(data.path())
        .args(["list", "--live"])
        .write_stdin("zzz\npep\n")
        .assert()
        .success();
    let stdout = String::from_utf8(output.get_output().stdout.clone()).unwrap();

    assert!(stdout.contains("1-3 of 3 (page 1 of 1)"));
    assert!(stdout.contains("1-1 of 1 (page 1 of 1)"));
    assert!(!stdout.contains("No sources match"));
}

#[test]
fn test_list_json() {
    let data = make_data_dir();

    let output = sources(data.path())
        .args(["--json", "list", "--sort-by", "name", "--direction", "asc"])
        .assert()
        .success();
    let value: serde_json::Value = serde_json::from_slice(&output.get_output().stdout).unwrap();

    assert_eq!(value["total_filtered"], 3);
    assert_eq!(value["page_count"], 1);
    assert_eq!(value["rows"][0]["id"], "3");
    assert_eq!(value["rows"][1]["cells"][4]["status"], "unavailable");
    assert_eq!(value["columns"][2]["sortable"], false);
}

#[test]
fn test_list_malformed_snapshot_fails() {
    let data = make_data_dir();
    std::fs::write(data.path().join("sources.json"), "[{").unwrap();

    sources(data.path())
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load sources"));
}

// =============================================================================
// show / types
// =============================================================================

#[test]
fn test_show_source() {
    let data = make_data_dir();

    sources(data.path())
        .args(["show", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Karel (2)"))
        .stdout(predicate::str::contains("OpenShift Container Platform"))
        .stdout(predicate::str::contains("Unavailable"))
        .stdout(predicate::str::contains("cluster unreachable"));
}

#[test]
fn test_show_missing_source() {
    let data = make_data_dir();

    sources(data.path())
        .args(["show", "404"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Requested source was not found"))
        .stderr(predicate::str::contains("Source with 404 was not found"));
}

#[test]
fn test_types() {
    let data = make_data_dir();

    sources(data.path())
        .arg("types")
        .assert()
        .success()
        .stdout(predicate::str::contains("Amazon Web Services"))
        .stdout(predicate::str::contains("Cost Management"));
}

// =============================================================================
// config / completions
// =============================================================================

#[test]
fn test_config_set_then_get() {
    let data = TempDir::new().unwrap();

    sources(data.path())
        .args(["config", "page_size", "2"])
        .assert()
        .success();

    sources(data.path())
        .args(["config", "page_size"])
        .assert()
        .success()
        .stdout(predicate::str::diff("2\n"));
}

#[test]
fn test_config_rejects_bad_value() {
    let data = TempDir::new().unwrap();

    sources(data.path())
        .args(["config", "filter_debounce_ms", "50"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("filter_debounce_ms"));
}

#[test]
fn test_verbose_logs_configuration_source() {
    let data = make_data_dir();

    sources(data.path())
        .args(["-v", "types"])
        .assert()
        .success()
        .stderr(predicate::str::contains("configuration loaded"))
        .stderr(predicate::str::contains("config.toml"));
}

#[test]
fn test_completions() {
    let data = TempDir::new().unwrap();

    sources(data.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("sources"));
}

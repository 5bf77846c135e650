//! End-to-end tests for the razor binary

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

#[allow(deprecated)]
fn cli() -> Command {
    let mut cmd = Command::cargo_bin("razor").unwrap();
    cmd.arg("--no-color");
    cmd
}

fn write(dir: &Path, name: &str, content: &str) {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

/// Project with an empty config so discovery stops inside the temp dir
fn project() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    write(temp_dir.path(), "razor.toml", "");
    temp_dir
}

#[test]
fn test_help_lists_commands() {
    cli()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("tokens"))
        .stdout(predicate::str::contains("check"));
}

#[test]
fn test_tokens_prints_transition() {
    let dir = project();
    write(dir.path(), "Index.cshtml", "<p>@Name</p>");
    cli()
        .arg("tokens")
        .arg(dir.path().join("Index.cshtml"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Transition;[@];"));
}

#[test]
fn test_parse_prints_document_tree() {
    let dir = project();
    write(dir.path(), "Index.cshtml", "<p>@Name</p>");
    cli()
        .arg("parse")
        .arg(dir.path().join("Index.cshtml"))
        .assert()
        .success()
        .stdout(predicate::str::starts_with("RazorDocument"));
}

#[test]
fn test_lower_prints_document_node() {
    let dir = project();
    write(dir.path(), "Index.cshtml", "<p>@Name</p>");
    cli()
        .arg("lower")
        .arg(dir.path().join("Index.cshtml"))
        .assert()
        .success()
        .stdout(predicate::str::starts_with("DocumentIntermediateNode"));
}

#[test]
fn test_check_clean_project_succeeds() {
    let dir = project();
    write(dir.path(), "Views/Index.cshtml", "<p>@Name</p>\n");
    write(dir.path(), "Views/About.cshtml", "@{ var x = 1; }\n<h1>@x</h1>\n");
    cli()
        .arg("check")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("No issues found"))
        .stdout(predicate::str::contains("Files checked: 2"));
}

#[test]
fn test_check_reports_unterminated_block() {
    let dir = project();
    write(dir.path(), "Broken.cshtml", "@{ var x = 1;");
    cli()
        .arg("check")
        .arg(dir.path())
        .assert()
        .failure()
        .stdout(predicate::str::contains("RZ1006"));
}

#[test]
fn test_check_json_format() {
    let dir = project();
    write(dir.path(), "Broken.cshtml", "@{ var x = 1;");
    let output = cli()
        .args(["check", "--format", "json"])
        .arg(dir.path())
        .assert()
        .failure()
        .get_output()
        .stdout
        .clone();

    let reports: serde_json::Value = serde_json::from_slice(&output).unwrap();
    let reports = reports.as_array().unwrap();
    assert_eq!(reports.len(), 1);
    assert!(reports[0]["path"].as_str().unwrap().ends_with("Broken.cshtml"));
    let ids: Vec<_> = reports[0]["diagnostics"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["id"].as_str().unwrap().to_string())
        .collect();
    assert!(ids.contains(&"RZ1006".to_string()));
}

#[test]
fn test_missing_file_fails() {
    let dir = project();
    cli()
        .arg("parse")
        .arg(dir.path().join("Missing.cshtml"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read"));
}

#[test]
fn test_config_schema() {
    cli()
        .args(["config", "schema"])
        .assert()
        .success()
        .stdout(predicate::str::contains("languageVersion"));
}

#[test]
fn test_config_show_with_explicit_file() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "custom.toml", "languageVersion = \"2.1\"\n");
    cli()
        .arg("--config")
        .arg(dir.path().join("custom.toml"))
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"languageVersion\": \"2.1\""));
}

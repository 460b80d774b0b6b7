use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

const REPORT: &str = "---\ntitle: Report\ncreated: 2024-03-01\ntags:\n  - x\n  - y\n---\n# Heading\n\nBody text\n";

fn vault() -> TempDir {
    let temp_dir = tempfile::tempdir().unwrap();
    fs::write(temp_dir.path().join("report.md"), REPORT).unwrap();
    fs::create_dir(temp_dir.path().join("notes")).unwrap();
    fs::write(temp_dir.path().join("notes/plain.md"), "# Plain\n").unwrap();
    temp_dir
}

fn propsheet(vault: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("propsheet").unwrap();
    cmd.env_remove("PROPSHEET_VAULT")
        .env_remove("RUST_LOG")
        .env("NO_COLOR", "1")
        .arg("--vault")
        .arg(vault.path());
    cmd
}

#[test]
fn test_preview_to_stdout() {
    let vault = vault();
    propsheet(&vault)
        .args(["preview", "report.md"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#"data-property="title""#))
        .stdout(predicate::str::contains(r#"data-property="tags""#));
}

#[test]
fn test_print_source_mode_to_file_leaves_document_untouched() {
    let vault = vault();
    let out = vault.path().join("report.html");

    propsheet(&vault)
        .args(["print", "report.md", "--source-mode", "-o"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Printed report.md"));

    let html = fs::read_to_string(&out).unwrap();
    assert!(html.contains("<strong>title</strong>"));
    assert!(html.contains("<th>Property</th>"));
    assert_eq!(fs::read_to_string(vault.path().join("report.md")).unwrap(), REPORT);
}

#[test]
fn test_export_from_preview() {
    let vault = vault();
    propsheet(&vault)
        .args(["export", "report.md"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#"class="propsheet-properties""#))
        .stdout(predicate::str::contains("markdown-rendered print"))
        .stderr(predicate::str::contains("Exported report.md"));
}

#[test]
fn test_config_roundtrip_changes_output() {
    let vault = vault();

    propsheet(&vault)
        .args(["config", "excluded-properties", "tags, created"])
        .assert()
        .success()
        .stdout(predicate::str::contains("excluded-properties set to tags, created"));

    let saved = fs::read_to_string(vault.path().join(".propsheet/settings.json")).unwrap();
    assert!(saved.contains(r#""excludedProperties": "tags, created""#));

    propsheet(&vault)
        .args(["props", "report.md", "--markdown"])
        .assert()
        .success()
        .stdout("| Property | Value |\n| --- | --- |\n| **title** | Report |\n");

    propsheet(&vault)
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("display-properties = true"))
        .stdout(predicate::str::contains("date-format = yyyy-MM-dd"));
}

#[test]
fn test_config_rejects_unknown_key() {
    let vault = vault();
    propsheet(&vault)
        .args(["config", "colour", "blue"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Unknown setting 'colour'"));
    assert!(!vault.path().join(".propsheet").exists());
}

#[test]
fn test_list_documents() {
    let vault = vault();
    propsheet(&vault)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("notes/plain.md  0 properties"))
        .stdout(predicate::str::contains("report.md  3 properties"));
}

#[test]
fn test_missing_document_fails() {
    let vault = vault();
    propsheet(&vault)
        .args(["print", "nope.md"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Document not found: nope.md"));
}

#[test]
fn test_version() {
    Command::cargo_bin("propsheet")
        .unwrap()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("propsheet ").and(predicate::str::contains(env!("CARGO_PKG_VERSION"))));
}

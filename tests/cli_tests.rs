//! Integration tests for the symshrink CLI

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

/// Test helper to get the CLI binary
fn symshrink_cmd() -> Command {
    Command::cargo_bin("symshrink").unwrap()
}

const MAIN_SOURCE: &str = "int myFunction() { return myVariable; }";

/// Writes a source file and its occurrence dump into `dir`
fn write_unit(dir: &Path) -> std::path::PathBuf {
    fs::write(dir.join("main.cpp"), MAIN_SOURCE).unwrap();
    let dump = dir.join("main.json");
    fs::write(
        &dump,
        r#"{
  "file": "main.cpp",
  "occurrences": [
    { "kind": "declaration", "decl_id": 1, "qualified_name": "myFunction",
      "spelling": "myFunction", "span": { "offset": 4, "len": 10 },
      "flags": { "in_main_file": true } },
    { "kind": "reference", "qualified_name": "myVariable",
      "spelling": "myVariable", "span": { "offset": 26, "len": 10 },
      "flags": { "in_main_file": true } },
    { "kind": "declaration", "decl_id": 2, "qualified_name": "size_t",
      "spelling": "size_t", "span": { "offset": 0, "len": 3 },
      "flags": { "in_system_header": true } }
  ]
}"#,
    )
    .unwrap();
    dump
}

#[test]
fn test_cli_help() {
    symshrink_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("show-mapping"));
}

#[test]
fn test_cli_version() {
    symshrink_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_name_and_rank() {
    symshrink_cmd()
        .args(["name", "701"])
        .assert()
        .success()
        .stdout("zz\n");

    symshrink_cmd()
        .args(["rank", "aaa"])
        .assert()
        .success()
        .stdout("702\n");

    symshrink_cmd().args(["rank", "Not-A-Name"]).assert().failure();
}

#[test]
fn test_rename_writes_sources_and_mapping() {
    let dir = tempdir().unwrap();
    let dump = write_unit(dir.path());
    let mapping = dir.path().join("names.json");

    // Seed the mapping so the reference resolves.
    fs::write(&mapping, r#"{ "myVariable": "b" }"#).unwrap();

    symshrink_cmd()
        .arg("rename")
        .arg("--mapping")
        .arg(&mapping)
        .arg("--write")
        .arg("--no-progress")
        .arg(&dump)
        .assert()
        .success();

    assert_eq!(
        fs::read_to_string(dir.path().join("main.cpp")).unwrap(),
        "int c() { return b; }"
    );

    let saved: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&mapping).unwrap()).unwrap();
    assert_eq!(saved["myFunction"], "c");
    assert_eq!(saved["myVariable"], "b");
    assert!(saved.get("size_t").is_none());
}

#[test]
fn test_rename_json_report_and_combined_output() {
    let dir = tempdir().unwrap();
    let dump = write_unit(dir.path());
    let combined = dir.path().join("all.cpp");

    symshrink_cmd()
        .arg("rename")
        .arg("--combined-output")
        .arg(&combined)
        .args(["--format", "json"])
        .arg(&dump)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"not_configured\""));

    let output = fs::read_to_string(&combined).unwrap();
    assert!(output.starts_with("// ======== "));
    // Without a mapping the reference has nothing to resolve to.
    assert!(output.contains("int a() { return myVariable; }"));
    assert_eq!(
        fs::read_to_string(dir.path().join("main.cpp")).unwrap(),
        MAIN_SOURCE
    );
}

#[test]
fn test_rename_missing_dump_fails() {
    let dir = tempdir().unwrap();
    symshrink_cmd()
        .arg("rename")
        .arg(dir.path().join("absent.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("absent.json"));
}

#[test]
fn test_show_mapping_lists_entries_and_rejections() {
    let dir = tempdir().unwrap();
    let mapping = dir.path().join("names.json");
    fs::write(&mapping, r#"{ "alpha": "a", "broken": "do" }"#).unwrap();

    symshrink_cmd()
        .arg("show-mapping")
        .arg(&mapping)
        .args(["--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"alpha\": \"a\""))
        .stdout(predicate::str::contains("\"reserved\""));
}

#[test]
fn test_show_mapping_missing_file_fails() {
    let dir = tempdir().unwrap();
    symshrink_cmd()
        .arg("show-mapping")
        .arg(dir.path().join("absent.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_print_default_config() {
    symshrink_cmd()
        .arg("print-default-config")
        .assert()
        .success()
        .stdout(predicate::str::contains("foreign_prefixes"))
        .stdout(predicate::str::contains("std::"));
}

#[test]
fn test_validate_config() {
    let dir = tempdir().unwrap();
    let good = dir.path().join("good.yml");
    fs::write(&good, "persist_macros: true\nworkers: 2\n").unwrap();

    symshrink_cmd()
        .arg("validate-config")
        .arg(&good)
        .assert()
        .success()
        .stdout(predicate::str::contains("valid"));

    let bad = dir.path().join("bad.yml");
    fs::write(&bad, "workers: 0\n").unwrap();

    symshrink_cmd()
        .arg("validate-config")
        .arg(&bad)
        .assert()
        .failure()
        .stderr(predicate::str::contains("workers"));
}

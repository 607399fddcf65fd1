//! End-to-end tests for the `sorteo` binary

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;

fn sorteo(config_dir: &Path) -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("sorteo").unwrap();
    cmd.arg("--config-dir").arg(config_dir);
    cmd
}

#[test]
fn test_dry_run_prints_plan_and_touches_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let origin = dir.path().join("in");
    let dest = dir.path().join("out");
    fs::create_dir_all(origin.join("nested")).unwrap();
    fs::write(origin.join("report.PDF"), b"pdf").unwrap();
    fs::write(origin.join("nested/notes.txt"), b"txt").unwrap();
    fs::write(origin.join("song.mp3"), b"mp3").unwrap();

    sorteo(&dir.path().join("config"))
        .arg("sort")
        .arg(&origin)
        .arg(&dest)
        .args(["--types", "pdf, txt", "--structure", "file-type", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--- Starting Dry Run ---"))
        .stdout(predicate::str::contains("Include subfolders: Yes"))
        .stdout(predicate::str::contains("[DRY RUN] Would move: report.PDF -> "))
        .stdout(predicate::str::contains("[DRY RUN] Would move: notes.txt -> "))
        .stdout(predicate::str::contains("song.mp3").not())
        .stdout(predicate::str::contains("Dry run complete! Processed 2 files."));

    assert!(origin.join("report.PDF").exists());
    assert!(!dest.exists());
}

#[test]
fn test_copy_run_with_json_report() {
    let dir = tempfile::tempdir().unwrap();
    let origin = dir.path().join("in");
    let dest = dir.path().join("out");
    fs::create_dir_all(&origin).unwrap();
    fs::write(origin.join("a.txt"), b"a").unwrap();

    let output = sorteo(&dir.path().join("config"))
        .arg("sort")
        .arg(&origin)
        .arg(&dest)
        .args(["--types", "txt", "--structure", "file-type", "--copy", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("--- Starting Copy Operation ---"));
    assert!(stdout.contains("Copied: a.txt -> "));
    let json_start = stdout.find("\n{").unwrap();
    let report: serde_json::Value = serde_json::from_str(&stdout[json_start..]).unwrap();
    assert_eq!(report["status"], "completed");
    assert_eq!(report["filesProcessed"], 1);

    assert!(origin.join("a.txt").exists());
    assert_eq!(fs::read(dest.join("txt/a.txt")).unwrap(), b"a");
}

#[test]
fn test_missing_origin_fails() {
    let dir = tempfile::tempdir().unwrap();
    sorteo(&dir.path().join("config"))
        .arg("sort")
        .arg(dir.path().join("nope"))
        .arg(dir.path().join("out"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("ERROR: Origin folder does not exist."));
}

#[test]
fn test_topic_structure_requires_topic() {
    let dir = tempfile::tempdir().unwrap();
    sorteo(&dir.path().join("config"))
        .arg("sort")
        .arg(dir.path())
        .arg(dir.path().join("out"))
        .args(["--structure", "topic-year-month"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "ERROR: Please enter a Topic Name for this structure.",
        ));
}

#[test]
fn test_empty_origin_still_succeeds() {
    let dir = tempfile::tempdir().unwrap();
    let origin = dir.path().join("in");
    fs::create_dir_all(&origin).unwrap();

    sorteo(&dir.path().join("config"))
        .arg("sort")
        .arg(&origin)
        .arg(dir.path().join("out"))
        .assert()
        .success()
        .stdout(predicate::str::contains("No matching files found to process."))
        .stdout(predicate::str::contains("Operation complete! Processed 0 files."));
}

#[test]
fn test_config_set_changes_sort_default() {
    let dir = tempfile::tempdir().unwrap();
    let config_dir = dir.path().join("config");

    sorteo(&config_dir)
        .args(["config", "set", "--default-operation", "copy", "--file-types", "md"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"default_operation\": \"Copy\""));

    let origin = dir.path().join("in");
    fs::create_dir_all(&origin).unwrap();
    fs::write(origin.join("readme.md"), b"#").unwrap();

    sorteo(&config_dir)
        .arg("sort")
        .arg(&origin)
        .arg(dir.path().join("out"))
        .args(["--structure", "file-type", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("File types: md"))
        .stdout(predicate::str::contains("[DRY RUN] Would copy: readme.md -> "));
}

#[test]
fn test_config_show_defaults() {
    let dir = tempfile::tempdir().unwrap();
    sorteo(dir.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"file_types\": \"pdf, docx, xlsx, jpg, png, txt\""))
        .stdout(predicate::str::contains("\"maxSizeMb\": 5"));
}

#[test]
fn test_types_lists_catalog() {
    let dir = tempfile::tempdir().unwrap();
    sorteo(dir.path())
        .arg("types")
        .assert()
        .success()
        .stdout(predicate::str::contains("Audio"))
        .stdout(predicate::str::contains("mp3, wav, aac, flac, m4a"));
}

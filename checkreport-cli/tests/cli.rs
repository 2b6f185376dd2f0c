use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::str::contains;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn cmd() -> Command {
    let mut cmd = cargo_bin_cmd!("checkreport");
    cmd.env_remove("RUST_LOG");
    cmd
}

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Temp data directory holding copies of the JSON fixtures
fn data_dir(files: &[&str]) -> TempDir {
    let dir = TempDir::new().expect("create temp dir");
    for name in files {
        fs::copy(fixture_path(name), dir.path().join(name)).expect("copy fixture");
    }
    dir
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap_or_else(|e| panic!("read {}: {}", path.display(), e))
}

#[test]
fn render_writes_both_pages() {
    let dir = data_dir(&["checks.json", "errors.json"]);

    cmd()
        .arg("render")
        .arg(dir.path())
        .assert()
        .success()
        .stderr(contains("changelog page written"))
        .stderr(contains("error page written"));

    let index = read(&dir.path().join("index.html"));
    assert!(index.starts_with("<!DOCTYPE html>"));
    assert!(index.contains("New errors (1):"));
    let errors = read(&dir.path().join("errors.html"));
    assert!(errors.contains("<th>Current Errors (3)</th>"));
    assert!(!dir.path().join("index.html.tmp").exists());
}

#[test]
fn render_to_separate_output_dir() {
    let dir = data_dir(&["checks.json", "errors.json"]);
    let out = dir.path().join("site").join("l10n");

    cmd()
        .arg("render")
        .arg(dir.path())
        .arg("--output")
        .arg(&out)
        .assert()
        .success();

    assert!(out.join("index.html").exists());
    assert!(out.join("errors.html").exists());
    assert!(!dir.path().join("index.html").exists());
}

#[test]
fn render_missing_input_fails() {
    let dir = data_dir(&["errors.json"]);

    cmd()
        .arg("render")
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(contains("File checks.json does not exist."));

    assert!(!dir.path().join("index.html").exists());
}

#[test]
fn render_missing_data_dir_fails() {
    let dir = TempDir::new().unwrap();
    cmd()
        .arg("render")
        .arg(dir.path().join("nope"))
        .assert()
        .failure()
        .stderr(contains("Data directory does not exist"));
}

#[test]
fn render_with_explicit_config() {
    let dir = data_dir(&["checks.json", "errors.json"]);
    let config = dir.path().join("report-config.json");
    fs::write(
        &config,
        r#"{"repo": "comm_strings", "index_output": "changes.html"}"#,
    )
    .unwrap();

    cmd()
        .arg("render")
        .arg(dir.path())
        .arg("--config")
        .arg(&config)
        .assert()
        .success();

    let index = read(&dir.path().join("changes.html"));
    assert!(index.contains("repo=comm_strings"));
    let errors = read(&dir.path().join("errors.html"));
    assert!(errors.contains(r#"<a href="changes.html">Back to main index</a>"#));
}

#[test]
fn annotate_text_output() {
    cmd()
        .args(["annotate", "fr - empty: string-id"])
        .assert()
        .success()
        .stdout(contains("shape:  keyword"))
        .stdout(contains("locale: fr"))
        .stdout(contains("key:    string-id"))
        .stdout(contains("locale=fr&recherche=string-id"));
}

#[test]
fn annotate_json_output() {
    let output = cmd()
        .args([
            "annotate",
            "--format",
            "json",
            "de - Some message (some.key)",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["shape"], "parenthesized");
    assert_eq!(json["locale"], "de");
    assert_eq!(json["key"], "some.key");
    assert!(json["html"].as_str().unwrap().contains(">some.key</a>)"));
}

#[test]
fn annotate_unrecognized_message() {
    cmd()
        .args(["annotate", "random text"])
        .assert()
        .success()
        .stdout(contains("shape:  unrecognized"))
        .stdout(contains("html:   random text"));
}

#[test]
fn config_validate_reports_errors() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join(".checkreportrc.json"),
        r#"{"base_url": "ftp://example.org/"}"#,
    )
    .unwrap();

    cmd()
        .current_dir(dir.path())
        .args(["config", "validate"])
        .assert()
        .failure()
        .stderr(contains("Config validation failed"));
}

#[test]
fn config_show_defaults() {
    let dir = TempDir::new().unwrap();
    cmd()
        .current_dir(dir.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(contains("defaults (no config file found)"))
        .stdout(contains("base_url: https://transvision.flod.org/"))
        .stdout(contains("checks_file: checks.json"));
}

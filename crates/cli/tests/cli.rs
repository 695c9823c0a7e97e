// ABOUTME: Integration tests for the docsearch CLI binary.
// ABOUTME: Tests extraction from files and stdin, URL-based set selection, and config failures.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

const CONFIG: &str = r#"{
  "start_urls": [{ "url": "/docs/", "selectors_key": "docs" }],
  "selectors": {
    "default": { "lvl0": ".title", "content": "p" },
    "docs": { "lvl0": "h1", "content": "article", "exclude": [".ad"] }
  },
  "min_indexed_level": { "docs": 1 }
}"#;

const PAGE: &str = r#"<!DOCTYPE html>
<html>
<body>
<div class="title">Intro</div>
<h1>Guide</h1>
<article>Read me<span class="ad">BUY NOW</span></article>
<p>Hello</p>
<p>   </p>
</body>
</html>"#;

fn docsearch_cmd() -> Command {
    Command::cargo_bin("docsearch-cli").unwrap()
}

fn write_fixture(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn extract_html_from_file() {
    let temp_dir = TempDir::new().unwrap();
    let config = write_fixture(&temp_dir, "config.json", CONFIG);
    let html = write_fixture(&temp_dir, "page.html", PAGE);

    docsearch_cmd()
        .arg("--config")
        .arg(&config)
        .arg("--html")
        .arg(&html)
        .arg("--compact")
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""selectors_key":"default""#))
        .stdout(predicate::str::contains(
            r#"{"level":"lvl0","text":"Intro","weight":100}"#,
        ))
        .stdout(predicate::str::contains(
            r#"{"level":"content","text":"Hello","weight":0}"#,
        ));
}

#[test]
fn url_selects_named_set() {
    let temp_dir = TempDir::new().unwrap();
    let config = write_fixture(&temp_dir, "config.json", CONFIG);
    let html = write_fixture(&temp_dir, "page.html", PAGE);

    docsearch_cmd()
        .arg("--config")
        .arg(&config)
        .arg("--html")
        .arg(&html)
        .arg("--url")
        .arg("https://example.com/docs/guide")
        .arg("--compact")
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""selectors_key":"docs""#))
        .stdout(predicate::str::contains(r#""min_indexed_level":"lvl1""#))
        .stdout(predicate::str::contains(r#""text":"Read me""#))
        .stdout(predicate::str::contains("BUY NOW").not());
}

#[test]
fn extract_html_from_stdin() {
    let temp_dir = TempDir::new().unwrap();
    let config = write_fixture(&temp_dir, "config.json", CONFIG);

    docsearch_cmd()
        .arg("--config")
        .arg(&config)
        .arg("--html")
        .arg("-")
        .write_stdin(PAGE)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"text\": \"Intro\""));
}

#[test]
fn invalid_config_fails() {
    let temp_dir = TempDir::new().unwrap();
    let config = write_fixture(
        &temp_dir,
        "config.json",
        r#"{ "selectors": { "lvl0": "h1" } }"#,
    );
    let html = write_fixture(&temp_dir, "page.html", PAGE);

    docsearch_cmd()
        .arg("--config")
        .arg(&config)
        .arg("--html")
        .arg(&html)
        .assert()
        .failure()
        .stderr(predicate::str::contains("configuration error"));
}

#[test]
fn malformed_selector_fails() {
    let temp_dir = TempDir::new().unwrap();
    let config = write_fixture(
        &temp_dir,
        "config.json",
        r#"{ "selectors": { "content": "p[" } }"#,
    );
    let html = write_fixture(&temp_dir, "page.html", PAGE);

    docsearch_cmd()
        .arg("--config")
        .arg(&config)
        .arg("--html")
        .arg(&html)
        .assert()
        .failure()
        .stderr(predicate::str::contains("selector syntax error"));
}

#[test]
fn missing_html_file_fails() {
    let temp_dir = TempDir::new().unwrap();
    let config = write_fixture(&temp_dir, "config.json", CONFIG);

    docsearch_cmd()
        .arg("--config")
        .arg(&config)
        .arg("--html")
        .arg(temp_dir.path().join("absent.html"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("file not found"));
}

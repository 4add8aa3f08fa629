//! The `mark-down` binary end to end.

use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

use crate::common::{mark_down, write_sample_site};

#[test]
fn test_build_writes_manifest() {
    let temp = TempDir::new().unwrap();
    let site = temp.path().join("content/snippets");
    write_sample_site(&site);

    mark_down(temp.path())
        .arg("build")
        .assert()
        .success()
        .stdout(predicate::str::contains("3 snippets"));

    let manifest: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(site.join("snippets-index.json")).unwrap()).unwrap();
    let slugs: Vec<&str> = manifest.as_array().unwrap().iter().map(|e| e["slug"].as_str().unwrap()).collect();
    assert_eq!(slugs, vec!["components-card", "components-button", "intro"]);
}

#[test]
fn test_build_custom_output() {
    let temp = TempDir::new().unwrap();
    write_sample_site(&temp.path().join("docs"));

    mark_down(temp.path()).args(["build", "docs", "-o", "public/index.json"]).assert().success();

    assert!(temp.path().join("public/index.json").exists());
    assert!(!temp.path().join("docs/snippets-index.json").exists());
}

#[test]
fn test_build_duplicate_slugs_exit_code() {
    let temp = TempDir::new().unwrap();
    let site = temp.path().join("content/snippets");
    fs::create_dir_all(&site).unwrap();
    fs::write(site.join("one.md"), "---\nslug: Same\n---\n").unwrap();
    fs::write(site.join("two.md"), "---\nslug: same\n---\n").unwrap();

    mark_down(temp.path())
        .arg("build")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Duplicate slugs detected: same"));
}

#[test]
fn test_list_filters_and_formats() {
    let temp = TempDir::new().unwrap();
    write_sample_site(&temp.path().join("content/snippets"));
    mark_down(temp.path()).arg("build").assert().success();

    mark_down(temp.path())
        .args(["list", "--group", "components"])
        .assert()
        .success()
        .stdout(predicate::str::contains("components-button"))
        .stdout(predicate::str::contains("intro").not());

    let output = mark_down(temp.path())
        .args(["list", "--tag", "ui", "--tag", "layout", "--all-tags", "--format", "json"])
        .assert()
        .success();
    let items: serde_json::Value = serde_json::from_slice(&output.get_output().stdout).unwrap();
    assert_eq!(items.as_array().unwrap().len(), 1);
    assert_eq!(items[0]["slug"], "components-card");
}

#[test]
fn test_list_pagination() {
    let temp = TempDir::new().unwrap();
    write_sample_site(&temp.path().join("content/snippets"));
    mark_down(temp.path()).arg("build").assert().success();

    let output = mark_down(temp.path())
        .args(["list", "--offset", "1", "--limit", "1", "--format", "json"])
        .assert()
        .success();
    let items: serde_json::Value = serde_json::from_slice(&output.get_output().stdout).unwrap();
    assert_eq!(items.as_array().unwrap().len(), 1);
    assert_eq!(items[0]["slug"], "components-button");
}

#[test]
fn test_show_renders_html_and_raw() {
    let temp = TempDir::new().unwrap();
    write_sample_site(&temp.path().join("content/snippets"));
    mark_down(temp.path()).arg("build").assert().success();

    mark_down(temp.path())
        .args(["show", "intro"])
        .assert()
        .success()
        .stdout(predicate::str::contains("<h1>Introduction</h1>"));

    mark_down(temp.path())
        .args(["show", "intro", "--raw"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("# Introduction"));
}

#[test]
fn test_show_unknown_slug_suggests_list() {
    let temp = TempDir::new().unwrap();
    write_sample_site(&temp.path().join("content/snippets"));
    mark_down(temp.path()).arg("build").assert().success();

    mark_down(temp.path())
        .args(["show", "nope"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("was not found"))
        .stderr(predicate::str::contains("mark-down list"));
}

#[test]
fn test_config_file_supplies_manifest() {
    let temp = TempDir::new().unwrap();
    write_sample_site(&temp.path().join("site"));
    mark_down(temp.path()).args(["build", "site"]).assert().success();
    fs::write(temp.path().join("mark-down.toml"), "manifest = \"site/snippets-index.json\"\n").unwrap();

    mark_down(temp.path())
        .args(["show", "components-card", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"slug\": \"components-card\""));
}

#[test]
fn test_missing_explicit_config_fails() {
    let temp = TempDir::new().unwrap();

    mark_down(temp.path())
        .args(["--config", "absent.toml", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration error"));
}

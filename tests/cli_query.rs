// SPDX-License-Identifier: MIT OR Apache-2.0

use std::fs;
use std::path::Path;
use tempfile::TempDir;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::Value;

fn write_corpus(root: &Path) {
    let docs = root.join("documents");
    fs::create_dir_all(&docs).unwrap();
    fs::write(docs.join("ml.txt"), "Machine learning is a subset of AI.").unwrap();
    fs::write(
        docs.join("cloud.txt"),
        "Cloud computing provides on-demand resources.",
    )
    .unwrap();
}

fn askdocs(root: &Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("askdocs");
    cmd.current_dir(root).env("HOME", root).env("NO_COLOR", "1");
    cmd
}

#[test]
fn index_then_query_json() {
    let dir = TempDir::new().unwrap();
    write_corpus(dir.path());

    askdocs(dir.path())
        .args(["--format", "json", "index"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"chunks\": 2"));
    assert!(dir.path().join(".askdocs").join("index.json").exists());

    let output = askdocs(dir.path())
        .args(["--format", "json", "--compact", "query", "What is machine learning?", "-k", "1"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: Value = serde_json::from_slice(&output.stdout).unwrap();
    let passages = json["passages"].as_array().unwrap();
    assert_eq!(passages.len(), 1);
    assert_eq!(passages[0]["source_id"], "ml.txt");
    assert_eq!(passages[0]["rank"], 1);
    assert_eq!(json["sources"], serde_json::json!(["ml.txt"]));
}

#[test]
fn query_builds_missing_index() {
    let dir = TempDir::new().unwrap();
    write_corpus(dir.path());

    askdocs(dir.path())
        .args(["query", "cloud resources", "--index", "custom/idx.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("cloud.txt"))
        .stdout(predicate::str::contains("Sources:"));
    assert!(dir.path().join("custom").join("idx.json").exists());
}

#[test]
fn blank_question_fails() {
    let dir = TempDir::new().unwrap();
    write_corpus(dir.path());

    askdocs(dir.path())
        .args(["query", "   "])
        .assert()
        .failure()
        .stderr(predicate::str::contains("query is empty"));
}

#[test]
fn verify_detects_stale_index() {
    let dir = TempDir::new().unwrap();
    write_corpus(dir.path());

    askdocs(dir.path()).arg("index").assert().success();
    askdocs(dir.path())
        .arg("verify")
        .assert()
        .success()
        .stdout(predicate::str::contains("matches current documents"));

    fs::write(
        dir.path().join("documents").join("rust.txt"),
        "Rust guarantees memory safety.",
    )
    .unwrap();
    askdocs(dir.path())
        .args(["--format", "json", "verify"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("\"status\": \"stale\""));
}

#[test]
fn docs_and_info_commands() {
    let dir = TempDir::new().unwrap();
    write_corpus(dir.path());

    askdocs(dir.path())
        .arg("docs")
        .assert()
        .success()
        .stdout("cloud.txt\nml.txt\n");

    askdocs(dir.path())
        .args(["--format", "json", "info"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"exists\": false"));

    askdocs(dir.path()).arg("index").assert().success();
    askdocs(dir.path())
        .args(["--format", "json", "info"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"format\": \"askdocs-index\""))
        .stdout(predicate::str::contains("\"exists\": true"))
        .stdout(predicate::str::contains("\"sources\": 2"));
}

#[test]
fn missing_documents_directory_fails() {
    let dir = TempDir::new().unwrap();
    askdocs(dir.path())
        .arg("index")
        .assert()
        .failure()
        .stderr(predicate::str::contains("documents"));
}

#[test]
fn role_hides_restricted_sources() {
    let dir = TempDir::new().unwrap();
    write_corpus(dir.path());
    fs::write(
        dir.path().join(".askdocsrc.toml"),
        r#"
[roles]
unrestricted = ["admin"]

[roles.restrictions]
"ml.txt" = ["analyst"]
"#,
    )
    .unwrap();

    let sources_for = |role: Option<&str>| -> Value {
        let mut cmd = askdocs(dir.path());
        cmd.args(["--format", "json", "query", "machine learning", "-k", "2"]);
        if let Some(role) = role {
            cmd.args(["--role", role]);
        }
        let output = cmd.output().unwrap();
        assert!(output.status.success());
        let json: Value = serde_json::from_slice(&output.stdout).unwrap();
        json["sources"].clone()
    };

    assert_eq!(sources_for(None), serde_json::json!(["cloud.txt"]));
    assert_eq!(sources_for(Some("stranger")), serde_json::json!(["cloud.txt"]));
    assert_eq!(
        sources_for(Some("analyst")),
        serde_json::json!(["ml.txt", "cloud.txt"])
    );
    assert_eq!(
        sources_for(Some("admin")),
        serde_json::json!(["ml.txt", "cloud.txt"])
    );

    askdocs(dir.path())
        .args(["query", "machine learning", "-k", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No passages accessible to role public"));
}

#[test]
fn query_warns_when_documents_are_newer_than_index() {
    let dir = TempDir::new().unwrap();
    write_corpus(dir.path());
    askdocs(dir.path()).arg("index").assert().success();

    askdocs(dir.path())
        .args(["query", "cloud"])
        .assert()
        .success()
        .stderr(predicate::str::contains("askdocs verify").not());

    let index = dir.path().join(".askdocs").join("index.json");
    fs::File::options()
        .write(true)
        .open(&index)
        .unwrap()
        .set_modified(std::time::SystemTime::UNIX_EPOCH + std::time::Duration::from_secs(1_000))
        .unwrap();

    askdocs(dir.path())
        .args(["query", "cloud"])
        .assert()
        .success()
        .stderr(predicate::str::contains("askdocs verify"))
        .stderr(predicate::str::contains("--rebuild"));
}

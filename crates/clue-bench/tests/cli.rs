use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

#[test]
fn validate_only_skips_simulation() {
    let dir = tempdir().expect("temp dir");
    let config_path = dir.path().join("bench.yaml");
    let jsonl = dir.path().join("out").join("games.jsonl");
    let yaml = format!(
        r#"
run_id: "cli_check"
games:
  seed: 1
  count: 3
players:
  automated: 3
outputs:
  jsonl: "{jsonl}"
  summary_md: "{summary}"
"#,
        jsonl = jsonl.display(),
        summary = dir.path().join("out").join("summary.md").display(),
    );
    fs::write(&config_path, yaml).expect("write config");

    Command::cargo_bin("clue-bench")
        .expect("binary built")
        .arg("--config")
        .arg(&config_path)
        .arg("--games")
        .arg("5")
        .arg("--validate-only")
        .assert()
        .success()
        .stdout(predicate::str::contains("'cli_check' with 3 automated players (5 games)"))
        .stdout(predicate::str::contains("Validation-only mode"));

    assert!(!jsonl.exists(), "validate-only must not write game rows");
}

#[test]
fn invalid_config_fails() {
    let dir = tempdir().expect("temp dir");
    let config_path = dir.path().join("bench.yaml");
    fs::write(
        &config_path,
        "run_id: \"bad id\"\ngames:\n  count: 1\nplayers:\n  automated: 3\noutputs:\n  jsonl: \"a.jsonl\"\n  summary_md: \"s.md\"\n",
    )
    .expect("write config");

    Command::cargo_bin("clue-bench")
        .expect("binary built")
        .arg("--config")
        .arg(&config_path)
        .arg("--validate-only")
        .assert()
        .failure()
        .stderr(predicate::str::contains("run_id"));
}

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

fn write_config(dir: &std::path::Path) -> std::path::PathBuf {
    let path = dir.join("analysis.yaml");
    let yaml = format!(
        r#"
run_id: "cli_smoke"
dataset:
  kind: "synthetic"
  seed: 7
  subjects: 3
  trials: 40
agent:
  strategy: "optimal"
outputs:
  jsonl: "{dir}/rows.jsonl"
  summary_md: "{dir}/summary.md"
  plots_dir: "{dir}/plots"
"#,
        dir = dir.display()
    );
    fs::write(&path, yaml).expect("config written");
    path
}

#[test]
fn validate_only_reports_strategy() {
    let dir = tempdir().expect("temp dir");
    let config = write_config(dir.path());
    Command::cargo_bin("igt-analysis")
        .expect("binary built")
        .args(["--config", config.to_str().unwrap(), "--validate-only"])
        .assert()
        .success()
        .stdout(predicate::str::contains("optimal"))
        .stdout(predicate::str::contains("igt-analyser"));
}

#[test]
fn list_prints_subjects() {
    let dir = tempdir().expect("temp dir");
    let config = write_config(dir.path());
    Command::cargo_bin("igt-analysis")
        .expect("binary built")
        .args(["--config", config.to_str().unwrap(), "--list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"total_subjects\": 3"));
}

#[test]
fn unknown_subject_fails() {
    let dir = tempdir().expect("temp dir");
    let config = write_config(dir.path());
    Command::cargo_bin("igt-analysis")
        .expect("binary built")
        .args(["--config", config.to_str().unwrap(), "--subject", "9"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn strategy_override_is_applied() {
    let dir = tempdir().expect("temp dir");
    let config = write_config(dir.path());
    Command::cargo_bin("igt-analysis")
        .expect("binary built")
        .args([
            "--config",
            config.to_str().unwrap(),
            "--subject",
            "0",
            "--strategy",
            "human-like",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"strategy\": \"human-like\""));
}

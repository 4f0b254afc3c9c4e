use std::fs;
use std::path::Path;
use std::sync::Arc;

use igt_analysis::analytics::{CohortOutcome, CohortRunner};
use igt_analysis::comparison::ComparisonEngine;
use igt_analysis::config::AnalysisConfig;
use igt_analysis::dataset::{DatasetStore, JsonFileSource};
use igt_analysis::service::{AnalysisError, AnalysisService};
use igt_core::AppInfo;
use igt_core::model::subject::Subject;
use sha2::{Digest, Sha256};
use tempfile::tempdir;

fn load_config(output_dir: &Path, plot_subject: Option<usize>) -> AnalysisConfig {
    let yaml = format!(
        r#"
run_id: "test_smoke"
dataset:
  kind: "synthetic"
  seed: 4242
  subjects: 5
  trials: 90
  width: 100
agent:
  strategy: "human-like"
outputs:
  jsonl: "{jsonl}"
  summary_md: "{summary}"
  plots_dir: "{plots}"
{plot_line}
logging:
  enable_structured: false
"#,
        jsonl = output_dir.join("comparisons.jsonl").display(),
        summary = output_dir.join("summary.md").display(),
        plots = output_dir.join("plots").display(),
        plot_line = plot_subject
            .map(|index| format!("  plot_subject: {index}"))
            .unwrap_or_default()
    );

    let mut cfg: AnalysisConfig = serde_yaml::from_str(&yaml).expect("valid yaml");
    cfg.validate().expect("config validates");
    cfg
}

fn run_with(config: &AnalysisConfig) -> CohortOutcome {
    let outputs = config.resolved_outputs();
    let store = Arc::new(DatasetStore::from_boxed(config.dataset.source()));
    let service = AnalysisService::from_config(store, &config.agent);
    CohortRunner::new(config, outputs, service)
        .run()
        .expect("cohort completes")
}

fn run_cohort(output_dir: &Path) -> String {
    let outcome = run_with(&load_config(output_dir, None));
    assert_eq!(outcome.subjects, 5);
    assert_eq!(outcome.rows_written, 5);
    assert!(outcome.summary_path.exists(), "summary markdown missing");
    assert!(outcome.plot_path.is_none());

    fs::read_to_string(&outcome.jsonl_path).expect("jsonl readable")
}

fn digest(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    hex::encode(hasher.finalize())
}

#[test]
fn cohort_rows_are_reproducible() {
    let first = tempdir().expect("temp dir");
    let second = tempdir().expect("temp dir");
    let rows_a = run_cohort(first.path());
    let rows_b = run_cohort(second.path());
    assert_eq!(digest(&rows_a), digest(&rows_b));

    let rows: Vec<serde_json::Value> = rows_a
        .lines()
        .map(|line| serde_json::from_str(line).expect("row decodes to JSON"))
        .collect();
    assert_eq!(rows.len(), 5);
    for (i, row) in rows.iter().enumerate() {
        assert_eq!(row["run_id"], "test_smoke");
        assert_eq!(row["subject_index"], i);
        assert_eq!(row["trials"], 90);
        let exact = row["exact_match_ratio"].as_f64().expect("ratio");
        assert!((0.0..=100.0).contains(&exact));
    }
}

#[test]
fn summary_lists_every_metric() {
    let dir = tempdir().expect("temp dir");
    run_cohort(dir.path());
    let summary = fs::read_to_string(dir.path().join("summary.md")).expect("summary readable");
    for name in [
        "exact_match_ratio",
        "good_bad_match_ratio",
        "capital_rmse",
        "human_entropy",
        "ai_entropy",
        "wsls_ratio",
        "cumulative_regret",
    ] {
        assert!(summary.contains(name), "missing {name}");
    }
    assert!(summary.contains(&AppInfo::banner()));
}

#[test]
fn plot_request_never_fails_the_run() {
    let dir = tempdir().expect("temp dir");
    let config = load_config(dir.path(), Some(1));
    assert_eq!(config.resolved_outputs().plot_subject, Some(1));

    let outcome = run_with(&config);
    assert_eq!(outcome.rows_written, 5);
    assert!(outcome.summary_path.exists());
    // Rendering needs font support; without it the plot is skipped.
    if let Some(plot) = outcome.plot_path {
        assert!(plot.exists(), "reported plot missing at {}", plot.display());
        assert!(plot.starts_with(dir.path().join("plots")));
    }
}

#[test]
fn json_dataset_round_trips_through_service() {
    let dir = tempdir().expect("temp dir");
    let path = dir.path().join("subjects.json");
    let subjects = vec![
        Subject::new(
            "Study_1",
            vec![Some(1), Some(1), Some(1), Some(1), Some(1), None],
            vec![Some(100); 5],
            vec![Some(0), Some(0), Some(150), Some(0), Some(0)],
        ),
        Subject::new("Study_2", vec![None, None], vec![], vec![]),
    ];
    fs::write(&path, serde_json::to_string(&subjects).unwrap()).unwrap();

    let store = Arc::new(DatasetStore::new(JsonFileSource::new(&path)));
    let service = AnalysisService::new(store, ComparisonEngine::default());

    let listing = service.list_subjects().expect("listing");
    assert_eq!(listing.total_subjects, 2);
    assert_eq!(listing.subjects_list[0].total_trials, 5);
    assert_eq!(listing.subjects_list[1].total_trials, 0);

    let report = service.compare(0).expect("comparison");
    let totals: Vec<i64> = report.human.iter().map(|r| r.total_score).collect();
    assert_eq!(totals, vec![2100, 2200, 2150, 2250, 2350]);
    assert_eq!(report.agent[0].deck, report.human[0].deck);

    let empty = service.compare(1).expect("empty comparison");
    assert_eq!(empty.metrics.exact_match_ratio, 0.0);
    assert_eq!(empty.metrics.cumulative_regret, 0);
    assert_eq!(empty.metrics.human_entropy, 0.0);
    assert_eq!(empty.metrics.ai_entropy, 0.0);

    assert!(matches!(
        service.compare(2),
        Err(AnalysisError::SubjectNotFound { index: 2, .. })
    ));
}

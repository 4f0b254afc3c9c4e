//! Cohort runs: every subject replayed, rows streamed, summary written.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use plotters::prelude::*;
use serde::Serialize;
use statrs::distribution::{ContinuousCDF, Normal};
use thiserror::Error;

use crate::comparison::{ComparisonMetrics, ComparisonReport};
use crate::config::{AnalysisConfig, ResolvedOutputs};
use crate::service::{AnalysisError, AnalysisService};
use igt_core::AppInfo;
use igt_core::model::trial::STARTING_CAPITAL;

const CONFIDENCE_Z: f64 = 1.96; // 95% CI

#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("{0}")]
    Analysis(#[from] AnalysisError),
    #[error("{context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize comparison row: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("failed to render plot: {0}")]
    Plot(String),
}

/// Replays every subject of the dataset and aggregates the results.
pub struct CohortRunner {
    run_id: String,
    outputs: ResolvedOutputs,
    service: AnalysisService,
}

/// Summary details returned after a run.
pub struct CohortOutcome {
    pub subjects: usize,
    pub rows_written: usize,
    pub jsonl_path: PathBuf,
    pub summary_path: PathBuf,
    pub plot_path: Option<PathBuf>,
    pub summary: CohortSummary,
}

impl CohortRunner {
    pub fn new(config: &AnalysisConfig, outputs: ResolvedOutputs, service: AnalysisService) -> Self {
        Self {
            run_id: config.run_id.clone(),
            outputs,
            service,
        }
    }

    pub fn run(&self) -> Result<CohortOutcome, AnalyticsError> {
        ensure_parent(self.outputs.jsonl.parent())?;
        ensure_parent(self.outputs.summary_md.parent())?;

        let listing = self.service.list_subjects()?;
        let file = File::create(&self.outputs.jsonl).map_err(|source| AnalyticsError::Io {
            context: "creating comparison rows",
            source,
        })?;
        let mut writer = BufWriter::new(file);
        let mut collector = CohortCollector::default();
        let mut plotted: Option<ComparisonReport> = None;

        for entry in &listing.subjects_list {
            let report = self.service.compare(entry.index)?;
            write_row(&mut writer, &self.run_id, &report)?;
            collector.record(&report);
            if self.outputs.plot_subject == Some(entry.index) {
                plotted = Some(report);
            }
        }

        writer.flush().map_err(|source| AnalyticsError::Io {
            context: "flushing comparison rows",
            source,
        })?;

        let summary = collector.finalize(&self.run_id, &self.service.engine().strategy().to_string());
        summary.write_markdown(&self.outputs.summary_md)?;

        let plot_path = match plotted {
            Some(report) => match render_capital_plot(&report, &self.outputs.plots_dir) {
                Ok(path) => Some(path),
                Err(err) => {
                    tracing::warn!(target: "igt_analysis::plot", error = %err, "plot skipped");
                    None
                }
            },
            None => None,
        };

        Ok(CohortOutcome {
            subjects: summary.subjects,
            rows_written: summary.subjects,
            jsonl_path: self.outputs.jsonl.clone(),
            summary_path: self.outputs.summary_md.clone(),
            plot_path,
            summary,
        })
    }
}

fn ensure_parent(path: Option<&Path>) -> Result<(), AnalyticsError> {
    if let Some(dir) = path.filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir).map_err(|source| AnalyticsError::Io {
            context: "creating output directory",
            source,
        })?;
    }
    Ok(())
}

#[derive(Serialize)]
struct ComparisonRow<'a> {
    run_id: &'a str,
    subject_index: usize,
    source_study: &'a str,
    strategy: String,
    trials: usize,
    human_final_capital: i64,
    agent_final_capital: i64,
    #[serde(flatten)]
    metrics: ComparisonMetrics,
}

fn write_row(
    writer: &mut BufWriter<File>,
    run_id: &str,
    report: &ComparisonReport,
) -> Result<(), AnalyticsError> {
    let row = ComparisonRow {
        run_id,
        subject_index: report.subject_index,
        source_study: &report.source_study,
        strategy: report.strategy.to_string(),
        trials: report.human.len(),
        human_final_capital: report.human_final_capital().unwrap_or(STARTING_CAPITAL),
        agent_final_capital: report.agent_final_capital().unwrap_or(STARTING_CAPITAL),
        metrics: report.metrics,
    };
    serde_json::to_writer(&mut *writer, &row)?;
    writer.write_all(b"\n").map_err(|source| AnalyticsError::Io {
        context: "writing comparison row",
        source,
    })?;
    Ok(())
}

#[derive(Default)]
struct CohortCollector {
    exact_match: Vec<f64>,
    good_bad_match: Vec<f64>,
    capital_rmse: Vec<f64>,
    human_entropy: Vec<f64>,
    ai_entropy: Vec<f64>,
    wsls: Vec<f64>,
    regret: Vec<f64>,
    capital_diffs: Vec<f64>,
}

impl CohortCollector {
    fn record(&mut self, report: &ComparisonReport) {
        let m = &report.metrics;
        self.exact_match.push(m.exact_match_ratio);
        self.good_bad_match.push(m.good_bad_match_ratio);
        self.capital_rmse.push(m.capital_rmse);
        self.human_entropy.push(m.human_entropy);
        self.ai_entropy.push(m.ai_entropy);
        self.wsls.push(m.wsls_ratio);
        self.regret.push(m.cumulative_regret as f64);

        let human = report.human_final_capital().unwrap_or(STARTING_CAPITAL);
        let agent = report.agent_final_capital().unwrap_or(STARTING_CAPITAL);
        self.capital_diffs.push((agent - human) as f64);
    }

    fn finalize(self, run_id: &str, strategy: &str) -> CohortSummary {
        let (p_value, sample_size) = wilcoxon_signed_rank(&self.capital_diffs);
        CohortSummary {
            run_id: run_id.to_string(),
            strategy: strategy.to_string(),
            subjects: self.exact_match.len(),
            metrics: vec![
                MetricSummary::from_values("exact_match_ratio", &self.exact_match),
                MetricSummary::from_values("good_bad_match_ratio", &self.good_bad_match),
                MetricSummary::from_values("capital_rmse", &self.capital_rmse),
                MetricSummary::from_values("human_entropy", &self.human_entropy),
                MetricSummary::from_values("ai_entropy", &self.ai_entropy),
                MetricSummary::from_values("wsls_ratio", &self.wsls),
                MetricSummary::from_values("cumulative_regret", &self.regret),
            ],
            final_capital: CapitalComparison {
                mean_difference: mean(&self.capital_diffs),
                p_value,
                sample_size,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CohortSummary {
    pub run_id: String,
    pub strategy: String,
    pub subjects: usize,
    pub metrics: Vec<MetricSummary>,
    pub final_capital: CapitalComparison,
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricSummary {
    pub name: &'static str,
    pub mean: f64,
    pub ci95: (f64, f64),
}

impl MetricSummary {
    fn from_values(name: &'static str, values: &[f64]) -> Self {
        Self {
            name,
            mean: mean(values),
            ci95: confidence_interval(values),
        }
    }
}

/// Agent-minus-human final capital across the cohort.
#[derive(Debug, Clone, Serialize)]
pub struct CapitalComparison {
    pub mean_difference: f64,
    pub p_value: f64,
    pub sample_size: usize,
}

impl CohortSummary {
    pub fn write_markdown(&self, path: impl AsRef<Path>) -> Result<(), AnalyticsError> {
        let mut rows = String::new();
        rows.push_str("# Cohort Comparison Summary\n\n");
        rows.push_str(&format!(
            "Run `{}`, strategy `{}`, {} subjects\n\n",
            self.run_id, self.strategy, self.subjects
        ));
        rows.push_str("| Metric | Mean | 95% CI |\n");
        rows.push_str("|--------|------|--------|\n");
        for metric in &self.metrics {
            rows.push_str(&format!(
                "| {name} | {mean:.2} | [{low:.2}, {high:.2}] |\n",
                name = metric.name,
                mean = metric.mean,
                low = metric.ci95.0,
                high = metric.ci95.1,
            ));
        }
        rows.push_str(&format!(
            "\nFinal capital, agent vs human: mean difference {:+.2}, Wilcoxon p = {:.3} (n = {})\n",
            self.final_capital.mean_difference,
            self.final_capital.p_value,
            self.final_capital.sample_size,
        ));
        rows.push_str(&format!("\n_Generated by {}_\n", AppInfo::banner()));

        fs::write(path.as_ref(), rows).map_err(|source| AnalyticsError::Io {
            context: "writing summary markdown",
            source,
        })
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

fn confidence_interval(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let centre = mean(values);
    if values.len() == 1 {
        return (centre, centre);
    }
    let variance = values
        .iter()
        .map(|value| (value - centre).powi(2))
        .sum::<f64>()
        / (values.len() as f64 - 1.0);
    let margin = CONFIDENCE_Z * (variance / values.len() as f64).sqrt();
    (centre - margin, centre + margin)
}

/// Two-sided Wilcoxon signed-rank test, normal approximation with tie and
/// continuity correction. Zero differences are dropped.
pub fn wilcoxon_signed_rank(diffs: &[f64]) -> (f64, usize) {
    let mut paired: Vec<(f64, f64)> = diffs
        .iter()
        .filter(|d| d.abs() > f64::EPSILON)
        .map(|d| (d.abs(), d.signum()))
        .collect();
    let n = paired.len();
    if n == 0 {
        return (1.0, 0);
    }
    paired.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut w_plus = 0.0;
    let mut w_minus = 0.0;
    let mut tie_adjustment = 0.0;
    let mut start = 0;
    while start < n {
        let mut end = start;
        while end + 1 < n && (paired[end + 1].0 - paired[start].0).abs() < 1e-12 {
            end += 1;
        }
        let rank = (start + end + 2) as f64 / 2.0;
        for &(_, sign) in &paired[start..=end] {
            if sign > 0.0 {
                w_plus += rank;
            } else {
                w_minus += rank;
            }
        }
        let ties = (end - start + 1) as f64;
        if ties > 1.0 {
            tie_adjustment += (ties.powi(3) - ties) / 48.0;
        }
        start = end + 1;
    }

    let n_f = n as f64;
    let mean_w = n_f * (n_f + 1.0) / 4.0;
    let variance_w = n_f * (n_f + 1.0) * (2.0 * n_f + 1.0) / 24.0 - tie_adjustment;
    if variance_w <= 0.0 {
        return (1.0, n);
    }

    let w = f64::min(w_plus, w_minus);
    let z = (((w - mean_w).abs() - 0.5) / variance_w.sqrt()).max(0.0);
    let p = match Normal::new(0.0, 1.0) {
        Ok(normal) => 2.0 * (1.0 - normal.cdf(z)),
        Err(_) => 1.0,
    };
    (p.clamp(0.0, 1.0), n)
}

/// Draws human and agent capital curves of one comparison.
pub fn render_capital_plot(
    report: &ComparisonReport,
    dir: impl AsRef<Path>,
) -> Result<PathBuf, AnalyticsError> {
    let dir = dir.as_ref();
    if !dir.as_os_str().is_empty() {
        fs::create_dir_all(dir).map_err(|source| AnalyticsError::Io {
            context: "creating plots directory",
            source,
        })?;
    }

    let output_path = dir.join(format!("capital_subject_{:04}.png", report.subject_index));
    let human: Vec<(usize, i64)> = report.human.iter().map(|r| (r.trial, r.total_score)).collect();
    let agent: Vec<(usize, i64)> = report.agent.iter().map(|r| (r.trial, r.total_score)).collect();
    let caption = format!(
        "Subject {} ({}): human vs {} agent",
        report.subject_index, report.source_study, report.strategy
    );

    let prev_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(|_| {}));

    let plot_attempt = std::panic::catch_unwind(move || {
        let root = BitMapBackend::new(&output_path, (800, 480)).into_drawing_area();
        root.fill(&WHITE)
            .map_err(|e| AnalyticsError::Plot(e.to_string()))?;

        let trials = human.len().max(1);
        let (low, high) = human
            .iter()
            .chain(agent.iter())
            .map(|(_, score)| *score)
            .fold((STARTING_CAPITAL, STARTING_CAPITAL), |(lo, hi), v| {
                (lo.min(v), hi.max(v))
            });
        let margin = ((high - low) / 10).max(100);

        let mut chart = ChartBuilder::on(&root)
            .margin(20)
            .caption(caption, ("sans-serif", 20))
            .set_label_area_size(LabelAreaPosition::Left, 60)
            .set_label_area_size(LabelAreaPosition::Bottom, 40)
            .build_cartesian_2d(0..trials + 1, (low - margin)..(high + margin))
            .map_err(|e| AnalyticsError::Plot(e.to_string()))?;

        chart
            .configure_mesh()
            .x_desc("Trial")
            .y_desc("Capital")
            .draw()
            .map_err(|e| AnalyticsError::Plot(e.to_string()))?;

        chart
            .draw_series(LineSeries::new(human, &BLUE))
            .map_err(|e| AnalyticsError::Plot(e.to_string()))?;
        chart
            .draw_series(LineSeries::new(agent, &RED))
            .map_err(|e| AnalyticsError::Plot(e.to_string()))?;

        drop(chart);

        root.present()
            .map_err(|e| AnalyticsError::Plot(e.to_string()))?;

        drop(root);

        Ok(output_path)
    });

    std::panic::set_hook(prev_hook);

    match plot_attempt {
        Ok(result) => result,
        Err(_) => Err(AnalyticsError::Plot(
            "plotters panicked while rendering (missing font support?)".into(),
        )),
    }
}

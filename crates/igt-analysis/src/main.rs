use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;

use igt_agent::Strategy;
use igt_analysis::analytics::CohortRunner;
use igt_analysis::config::{AnalysisConfig, ResolvedOutputs};
use igt_analysis::dataset::DatasetStore;
use igt_analysis::logging::init_logging;
use igt_analysis::service::AnalysisService;
use igt_core::AppInfo;

/// Replays recorded Iowa Gambling Task subjects against a lookahead agent.
#[derive(Debug, Parser)]
#[command(
    name = "igt-analysis",
    author,
    version,
    about = "Human vs agent comparison for the Iowa Gambling Task"
)]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "config/analysis.yaml")]
    config: PathBuf,

    /// Override the run identifier (substitutes {run_id} templates).
    #[arg(long, value_name = "RUN_ID")]
    run_id: Option<String>,

    /// Override the agent strategy (optimal or human-like).
    #[arg(long, value_name = "STRATEGY")]
    strategy: Option<Strategy>,

    /// Override the seed of a synthetic dataset.
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,

    /// Print the subject listing as JSON and exit.
    #[arg(long, conflicts_with = "subject")]
    list: bool,

    /// Compare a single subject and print the report as JSON.
    #[arg(long, value_name = "INDEX")]
    subject: Option<usize>,

    /// Exit after validating the configuration (nothing is replayed).
    #[arg(long)]
    validate_only: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = AnalysisConfig::from_path(&cli.config)?;

    if let Some(run_id) = cli.run_id {
        config.run_id = run_id;
    }

    if let Some(strategy) = cli.strategy {
        config.agent.strategy = strategy;
    }

    if let Some(seed) = cli.seed {
        config.dataset.set_seed(seed);
    }

    config.validate()?;

    if cli.validate_only {
        println!(
            "{}: configuration '{}' is valid ({} agent).",
            AppInfo::banner(),
            config.run_id,
            config.agent.strategy
        );
        return Ok(());
    }

    let outputs: ResolvedOutputs = config.resolved_outputs();
    let logging_guard = init_logging(&config.logging, &outputs)?;

    let store = Arc::new(DatasetStore::from_boxed(config.dataset.source()));
    let mut service = AnalysisService::from_config(store, &config.agent);

    if cli.list {
        let listing = service.list_subjects()?;
        println!("{}", serde_json::to_string_pretty(&listing)?);
        return Ok(());
    }

    if let Some(index) = cli.subject {
        let report = service
            .compare(index)
            .with_context(|| format!("comparing subject {index}"))?;
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let outcome = CohortRunner::new(&config, outputs, service.clone()).run()?;
    if !service.teardown() {
        tracing::warn!(target: "igt_analysis::dataset", "dataset still shared at exit");
    }
    println!(
        "Cohort '{}' complete: {} subjects → {} rows at {}",
        config.run_id,
        outcome.subjects,
        outcome.rows_written,
        outcome.jsonl_path.display()
    );
    println!("Summary table: {}", outcome.summary_path.display());
    if let Some(plot_path) = outcome.plot_path.as_ref() {
        println!("Capital plot: {}", plot_path.display());
    }
    if let Some(guard) = logging_guard.as_ref() {
        println!("Telemetry log: {}", guard.telemetry_path.display());
    }
    for metric in &outcome.summary.metrics {
        println!("  {:<22} {:>10.2}", metric.name, metric.mean);
    }

    Ok(())
}

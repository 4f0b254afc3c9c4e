use std::fs::{self, File};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::Level;
use tracing_appender::non_blocking::{self, WorkerGuard};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::{LoggingConfig, ResolvedOutputs};

pub struct LoggingGuard {
    _guard: WorkerGuard,
    pub telemetry_path: PathBuf,
}

/// Routes structured JSON logs to `telemetry.jsonl` beside the summary.
pub fn init_logging(
    logging: &LoggingConfig,
    outputs: &ResolvedOutputs,
) -> Result<Option<LoggingGuard>> {
    if !logging.enable_structured {
        return Ok(None);
    }

    let telemetry_dir = outputs
        .summary_md
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    fs::create_dir_all(&telemetry_dir).with_context(|| {
        format!(
            "creating telemetry directory at {}",
            telemetry_dir.display()
        )
    })?;

    let telemetry_path = telemetry_dir.join("telemetry.jsonl");
    let file = File::create(&telemetry_path)
        .with_context(|| format!("creating telemetry file at {}", telemetry_path.display()))?;

    let (writer, guard) = non_blocking::NonBlockingBuilder::default()
        .lossy(false)
        .finish(file);

    let filter = build_filter(logging)?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .json()
        .with_current_span(false)
        .with_span_events(FmtSpan::NONE)
        .with_writer(writer)
        .finish();

    // A global subscriber may already be installed (tests)
    let _ = tracing::subscriber::set_global_default(subscriber);

    Ok(Some(LoggingGuard {
        _guard: guard,
        telemetry_path,
    }))
}

fn build_filter(logging: &LoggingConfig) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    let level = logging.level().unwrap_or(Level::INFO);
    let mut filter = EnvFilter::new(level.as_str());
    if !logging.decision_details {
        filter = filter.add_directive(
            "igt_agent=warn"
                .parse()
                .context("parsing agent log directive")?,
        );
    }
    Ok(filter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn disabled_logging_installs_nothing() {
        let dir = tempdir().unwrap();
        let outputs = ResolvedOutputs {
            jsonl: dir.path().join("rows.jsonl"),
            summary_md: dir.path().join("summary.md"),
            plots_dir: dir.path().join("plots"),
            plot_subject: None,
        };
        let guard = init_logging(&LoggingConfig::default(), &outputs).unwrap();
        assert!(guard.is_none());
        assert!(!dir.path().join("telemetry.jsonl").exists());
    }

    #[test]
    fn enabled_logging_creates_telemetry_file() {
        let dir = tempdir().unwrap();
        let outputs = ResolvedOutputs {
            jsonl: dir.path().join("rows.jsonl"),
            summary_md: dir.path().join("nested").join("summary.md"),
            plots_dir: dir.path().join("plots"),
            plot_subject: None,
        };
        let logging = LoggingConfig {
            enable_structured: true,
            ..LoggingConfig::default()
        };
        let guard = init_logging(&logging, &outputs).unwrap().expect("guard");
        assert_eq!(
            guard.telemetry_path,
            dir.path().join("nested").join("telemetry.jsonl")
        );
        assert!(guard.telemetry_path.exists());
    }
}

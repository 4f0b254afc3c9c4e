use igt_agent::{AgentParams, Strategy};
use serde::Deserialize;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::Level;

use crate::dataset::{DatasetSource, JsonFileSource, SyntheticSource};

const DEFAULT_SYNTHETIC_SUBJECTS: usize = 16;
const DEFAULT_TRIALS: usize = 100;
const RUN_ID_ALLOWED: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789._-";

/// Root analysis configuration loaded from YAML.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct AnalysisConfig {
    pub run_id: String,
    pub dataset: DatasetConfig,
    #[serde(default)]
    pub agent: AgentConfig,
    pub outputs: OutputsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AnalysisConfig {
    /// Load configuration from a YAML file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let path_buf = path.to_path_buf();
        let file = File::open(path).map_err(|source| ConfigError::Read {
            source,
            path: path_buf.clone(),
        })?;
        let reader = BufReader::new(file);
        let mut cfg: AnalysisConfig =
            serde_yaml::from_reader(reader).map_err(|source| ConfigError::Parse {
                source,
                path: path_buf.clone(),
            })?;
        cfg.validate().map_err(|source| ConfigError::Invalid {
            path: path_buf,
            source,
        })?;
        Ok(cfg)
    }

    /// Validate the configuration without performing I/O.
    pub fn validate(&mut self) -> Result<(), ValidationError> {
        validate_run_id(&self.run_id)?;
        self.dataset.validate()?;
        self.agent.validate()?;
        self.outputs.validate(&self.run_id)?;
        self.logging.normalize();
        Ok(())
    }

    /// Resolve output templates (e.g., `{run_id}` placeholders) into concrete paths.
    pub fn resolved_outputs(&self) -> ResolvedOutputs {
        ResolvedOutputs {
            jsonl: resolve_template(&self.run_id, &self.outputs.jsonl),
            summary_md: resolve_template(&self.run_id, &self.outputs.summary_md),
            plots_dir: resolve_template(&self.run_id, &self.outputs.plots_dir),
            plot_subject: self.outputs.plot_subject,
        }
    }
}

/// Where subjects come from.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DatasetConfig {
    Json {
        path: String,
    },
    Synthetic {
        #[serde(default)]
        seed: u64,
        #[serde(default = "default_synthetic_subjects")]
        subjects: usize,
        #[serde(default = "default_trials")]
        trials: usize,
        #[serde(default)]
        width: Option<usize>,
    },
}

impl DatasetConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        match self {
            DatasetConfig::Json { path } => {
                if path.trim().is_empty() {
                    return Err(ValidationError::InvalidField {
                        field: "dataset.path".to_string(),
                        message: "path must not be empty".to_string(),
                    });
                }
            }
            DatasetConfig::Synthetic {
                subjects,
                trials,
                width,
                ..
            } => {
                if *subjects == 0 {
                    return Err(ValidationError::InvalidField {
                        field: "dataset.subjects".to_string(),
                        message: "number of subjects must be greater than zero".to_string(),
                    });
                }
                if let Some(width) = width
                    && width < trials
                {
                    return Err(ValidationError::InvalidField {
                        field: "dataset.width".to_string(),
                        message: format!("width {width} is smaller than trials {trials}"),
                    });
                }
            }
        }
        Ok(())
    }

    /// Override the seed of a synthetic dataset; no effect on file datasets.
    pub fn set_seed(&mut self, value: u64) {
        if let DatasetConfig::Synthetic { seed, .. } = self {
            *seed = value;
        }
    }

    pub fn source(&self) -> Box<dyn DatasetSource> {
        match self {
            DatasetConfig::Json { path } => Box::new(JsonFileSource::new(path)),
            DatasetConfig::Synthetic {
                seed,
                subjects,
                trials,
                width,
            } => Box::new(SyntheticSource {
                seed: *seed,
                subjects: *subjects,
                trials: *trials,
                width: width.unwrap_or(*trials),
            }),
        }
    }
}

fn default_synthetic_subjects() -> usize {
    DEFAULT_SYNTHETIC_SUBJECTS
}

fn default_trials() -> usize {
    DEFAULT_TRIALS
}

/// Agent strategy plus optional overrides of its constants.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct AgentConfig {
    #[serde(default)]
    pub strategy: Strategy,
    #[serde(default)]
    pub planning_horizon: Option<usize>,
    #[serde(default)]
    pub exploration_weight: Option<f64>,
    #[serde(default)]
    pub loss_aversion: Option<f64>,
    #[serde(default)]
    pub learning_rate: Option<f64>,
    #[serde(default)]
    pub recency_window: Option<usize>,
}

impl AgentConfig {
    pub fn params(&self) -> AgentParams {
        self.params_for(self.strategy)
    }

    /// Defaults of `strategy` with this config's overrides applied on top.
    pub fn params_for(&self, strategy: Strategy) -> AgentParams {
        let base = AgentParams::for_strategy(strategy);
        AgentParams {
            planning_horizon: self.planning_horizon.unwrap_or(base.planning_horizon),
            exploration_weight: self.exploration_weight.unwrap_or(base.exploration_weight),
            loss_aversion: self.loss_aversion.unwrap_or(base.loss_aversion),
            learning_rate: self.learning_rate.unwrap_or(base.learning_rate),
            recency_window: self.recency_window.unwrap_or(base.recency_window),
            prior_variance: base.prior_variance,
        }
    }

    fn validate(&self) -> Result<(), ValidationError> {
        self.params()
            .validate()
            .map_err(|message| ValidationError::InvalidField {
                field: "agent".to_string(),
                message,
            })
    }
}

/// Output artifact configuration.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct OutputsConfig {
    pub jsonl: String,
    pub summary_md: String,
    pub plots_dir: String,
    #[serde(default)]
    pub plot_subject: Option<usize>,
}

impl OutputsConfig {
    fn validate(&self, run_id: &str) -> Result<(), ValidationError> {
        for (label, value) in [
            ("outputs.jsonl", &self.jsonl),
            ("outputs.summary_md", &self.summary_md),
            ("outputs.plots_dir", &self.plots_dir),
        ] {
            if value.trim().is_empty() {
                return Err(ValidationError::InvalidField {
                    field: label.to_string(),
                    message: "path must not be empty".to_string(),
                });
            }

            let resolved = resolve_template(run_id, value);
            if resolved.components().count() == 0 {
                return Err(ValidationError::InvalidField {
                    field: label.to_string(),
                    message: "resolved path is invalid".to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Logging configuration defaults to disabled structured logs.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LoggingConfig {
    #[serde(default)]
    pub enable_structured: bool,
    #[serde(default = "default_tracing_level")]
    pub tracing_level: String,
    /// Keep one event per agent decision in the log.
    #[serde(default)]
    pub decision_details: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enable_structured: false,
            tracing_level: default_tracing_level(),
            decision_details: false,
        }
    }
}

impl LoggingConfig {
    fn normalize(&mut self) {
        if self.tracing_level.trim().is_empty() {
            self.tracing_level = default_tracing_level();
        }
    }

    pub fn level(&self) -> Option<Level> {
        match self.tracing_level.to_ascii_lowercase().as_str() {
            "trace" => Some(Level::TRACE),
            "debug" => Some(Level::DEBUG),
            "info" => Some(Level::INFO),
            "warn" | "warning" => Some(Level::WARN),
            "error" => Some(Level::ERROR),
            _ => None,
        }
    }
}

fn default_tracing_level() -> String {
    "info".to_string()
}

fn validate_run_id(run_id: &str) -> Result<(), ValidationError> {
    if run_id.trim().is_empty() {
        return Err(ValidationError::InvalidField {
            field: "run_id".to_string(),
            message: "run_id must not be empty".to_string(),
        });
    }

    if !run_id.chars().all(|c| RUN_ID_ALLOWED.contains(c)) {
        return Err(ValidationError::InvalidField {
            field: "run_id".to_string(),
            message: "run_id may only contain alphanumeric characters, '.', '_' or '-'".to_string(),
        });
    }

    Ok(())
}

fn resolve_template(run_id: &str, template: &str) -> PathBuf {
    PathBuf::from(template.replace("{run_id}", run_id))
}

/// Fully resolved output paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOutputs {
    pub jsonl: PathBuf,
    pub summary_md: PathBuf,
    pub plots_dir: PathBuf,
    pub plot_subject: Option<usize>,
}

/// Errors surfaced when loading configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },
    #[error("failed to parse config {path:?}: {source}")]
    Parse {
        #[source]
        source: serde_yaml::Error,
        path: PathBuf,
    },
    #[error("invalid configuration in {path:?}: {source}")]
    Invalid {
        path: PathBuf,
        source: ValidationError,
    },
}

/// Validation failures captured with contextual metadata.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{field}: {message}")]
    InvalidField { field: String, message: String },
}

//! Handler surface over the shared dataset.

use std::sync::Arc;

use igt_agent::Strategy;
use serde::Serialize;
use thiserror::Error;

use crate::comparison::{ComparisonEngine, ComparisonReport};
use crate::config::AgentConfig;
use crate::dataset::{DatasetError, DatasetStore};

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("subject {index} not found ({total} subjects loaded)")]
    SubjectNotFound { index: usize, total: usize },
    #[error("dataset unavailable: {0}")]
    Dataset(#[from] DatasetError),
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SubjectSummary {
    pub index: usize,
    pub source_study: String,
    pub total_trials: usize,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SubjectListing {
    pub total_subjects: usize,
    pub subjects_list: Vec<SubjectSummary>,
}

/// Lists subjects and runs comparisons against an injected dataset store.
///
/// Clones share the store. The dataset lives until [`AnalysisService::teardown`]
/// succeeds or the last clone is dropped.
#[derive(Clone)]
pub struct AnalysisService {
    store: Arc<DatasetStore>,
    agent: AgentConfig,
    engine: ComparisonEngine,
}

impl AnalysisService {
    pub fn new(store: Arc<DatasetStore>, engine: ComparisonEngine) -> Self {
        let agent = AgentConfig {
            strategy: engine.strategy(),
            ..AgentConfig::default()
        };
        Self {
            store,
            agent,
            engine,
        }
    }

    /// Service whose engines carry the overrides of `agent`.
    pub fn from_config(store: Arc<DatasetStore>, agent: &AgentConfig) -> Self {
        Self {
            store,
            agent: agent.clone(),
            engine: ComparisonEngine::with_params(agent.strategy, agent.params()),
        }
    }

    pub fn engine(&self) -> &ComparisonEngine {
        &self.engine
    }

    pub fn store(&self) -> &Arc<DatasetStore> {
        &self.store
    }

    pub fn list_subjects(&self) -> Result<SubjectListing, AnalysisError> {
        let dataset = self.store.get()?;
        let subjects_list = dataset
            .subjects()
            .iter()
            .enumerate()
            .map(|(index, subject)| SubjectSummary {
                index,
                source_study: subject.source_study.clone(),
                total_trials: subject.valid_trial_count(),
            })
            .collect();
        Ok(SubjectListing {
            total_subjects: dataset.len(),
            subjects_list,
        })
    }

    pub fn compare(&self, index: usize) -> Result<ComparisonReport, AnalysisError> {
        self.compare_using(index, &self.engine)
    }

    /// Compares with a different strategy than the service default.
    pub fn compare_with(
        &self,
        index: usize,
        strategy: Strategy,
    ) -> Result<ComparisonReport, AnalysisError> {
        let engine = self.engine_for(strategy);
        self.compare_using(index, &engine)
    }

    /// Engine for `strategy`; configured overrides still apply.
    pub fn engine_for(&self, strategy: Strategy) -> ComparisonEngine {
        if strategy == self.engine.strategy() {
            self.engine
        } else {
            ComparisonEngine::with_params(strategy, self.agent.params_for(strategy))
        }
    }

    /// Drops the loaded dataset. Returns false while another clone still
    /// holds the store.
    pub fn teardown(&mut self) -> bool {
        match Arc::get_mut(&mut self.store) {
            Some(store) => {
                store.teardown();
                true
            }
            None => false,
        }
    }

    fn compare_using(
        &self,
        index: usize,
        engine: &ComparisonEngine,
    ) -> Result<ComparisonReport, AnalysisError> {
        let dataset = self.store.get()?;
        let subject = dataset.get(index).ok_or(AnalysisError::SubjectNotFound {
            index,
            total: dataset.len(),
        })?;
        Ok(engine.compare(index, subject))
    }
}

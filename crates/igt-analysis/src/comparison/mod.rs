//! Synchronised replay of a recorded subject against the lookahead agent.

mod metrics;

pub use metrics::{ComparisonMetrics, choice_entropy, followed_wsls};

use igt_agent::policy::{DecisionContext, LookaheadPolicy, Policy};
use igt_agent::{AgentParams, Strategy};
use igt_core::model::subject::Subject;
use igt_core::model::trial::{TrialLedger, TrialRecord};
use igt_core::replay::{ReplayEnvironment, reconstruct};
use serde::Serialize;
use tracing::{Level, event};

#[derive(Debug, Clone, Serialize)]
pub struct ComparisonReport {
    pub subject_index: usize,
    pub source_study: String,
    pub strategy: Strategy,
    pub human: Vec<TrialRecord>,
    pub agent: Vec<TrialRecord>,
    pub metrics: ComparisonMetrics,
}

impl ComparisonReport {
    pub fn human_final_capital(&self) -> Option<i64> {
        self.human.last().map(|record| record.total_score)
    }

    pub fn agent_final_capital(&self) -> Option<i64> {
        self.agent.last().map(|record| record.total_score)
    }
}

/// Replays subjects against a fresh agent per comparison.
#[derive(Debug, Clone, Copy)]
pub struct ComparisonEngine {
    strategy: Strategy,
    params: AgentParams,
}

impl ComparisonEngine {
    pub fn new(strategy: Strategy) -> Self {
        Self::with_params(strategy, AgentParams::for_strategy(strategy))
    }

    pub fn with_params(strategy: Strategy, params: AgentParams) -> Self {
        Self { strategy, params }
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn params(&self) -> &AgentParams {
        &self.params
    }

    pub fn compare(&self, subject_index: usize, subject: &Subject) -> ComparisonReport {
        let mut policy = LookaheadPolicy::with_params(self.strategy, self.params);
        self.compare_with_policy(subject_index, subject, &mut policy)
    }

    /// Replays `subject` with any policy standing in for the agent.
    ///
    /// The agent plays exactly as many trials as the subject has valid ones,
    /// and its first draw copies the subject's first deck.
    pub fn compare_with_policy(
        &self,
        subject_index: usize,
        subject: &Subject,
        policy: &mut dyn Policy,
    ) -> ComparisonReport {
        let human = subject.history();
        let mut env = ReplayEnvironment::new(reconstruct(subject));
        let mut ledger = TrialLedger::with_capacity(human.len());

        for (step, human_trial) in human.iter().enumerate() {
            let deck = if step == 0 {
                human_trial.deck
            } else {
                let ctx = DecisionContext {
                    trial: step + 1,
                    capital: ledger.capital(),
                };
                policy.choose_deck(&ctx)
            };
            let outcome = env.step(deck);
            policy.observe(deck, outcome);
            ledger.record(deck, outcome.card());
        }

        let agent = ledger.into_records();
        let metrics = ComparisonMetrics::compute(&human, &agent);

        if tracing::enabled!(target: "igt_analysis::compare", Level::INFO) {
            event!(
                target: "igt_analysis::compare",
                Level::INFO,
                subject_index = subject_index as u32,
                source_study = %subject.source_study,
                strategy = %self.strategy,
                trials = human.len() as u32,
                exact_match_ratio = metrics.exact_match_ratio,
                cumulative_regret = metrics.cumulative_regret,
                wsls_ratio = metrics.wsls_ratio,
            );
        }

        ComparisonReport {
            subject_index,
            source_study: subject.source_study.clone(),
            strategy: self.strategy,
            human,
            agent,
            metrics,
        }
    }
}

impl Default for ComparisonEngine {
    fn default() -> Self {
        Self::new(Strategy::default())
    }
}

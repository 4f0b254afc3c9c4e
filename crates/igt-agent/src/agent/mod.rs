mod belief;
mod params;
mod planner;

pub use belief::{BeliefState, DeckBelief, DeckEstimate, sample_variance, utility};
pub use params::{
    AgentParams, DEFAULT_EXPLORATION_WEIGHT, DEFAULT_LEARNING_RATE, DEFAULT_PLANNING_HORIZON,
    DEFAULT_RECENCY_WINDOW, HUMAN_LOSS_AVERSION, MAX_PLANNING_HORIZON, NEUTRAL_LOSS_AVERSION,
    PRIOR_VARIANCE,
};
pub use planner::{PathEnumerator, Plan, path_value, plan};

use core::fmt;
use core::str::FromStr;
use igt_core::model::deck::Deck;
use serde::{Deserialize, Serialize};

/// Learning regime of the agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// Risk-neutral, full-history averages.
    Optimal,
    /// Loss-averse, recency-weighted.
    #[default]
    HumanLike,
}

impl Strategy {
    pub const fn as_str(self) -> &'static str {
        match self {
            Strategy::Optimal => "optimal",
            Strategy::HumanLike => "human-like",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "optimal" | "rational" => Ok(Strategy::Optimal),
            "human-like" | "human_like" | "humanlike" | "human" => Ok(Strategy::HumanLike),
            other => Err(format!("unknown strategy '{other}'")),
        }
    }
}

/// Lookahead decision-maker with a private belief over the four decks.
///
/// One instance plays exactly one replay; it is never shared.
#[derive(Debug, Clone)]
pub struct DecisionAgent {
    strategy: Strategy,
    params: AgentParams,
    belief: BeliefState,
}

impl DecisionAgent {
    pub fn new(strategy: Strategy) -> Self {
        Self::with_params(strategy, AgentParams::for_strategy(strategy))
    }

    pub fn with_params(strategy: Strategy, params: AgentParams) -> Self {
        Self {
            strategy,
            params,
            belief: BeliefState::new(params.prior_variance),
        }
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn params(&self) -> &AgentParams {
        &self.params
    }

    pub fn belief(&self) -> &BeliefState {
        &self.belief
    }

    /// Full search result over the current belief.
    pub fn plan(&self) -> Plan {
        plan(
            &self.belief.snapshot(),
            self.params.planning_horizon,
            self.params.exploration_weight,
        )
    }

    /// First deck of the best lookahead path.
    pub fn select_action(&self) -> Deck {
        self.plan().first()
    }

    /// Folds one observed net result into the belief; returns its utility.
    pub fn update_model(&mut self, deck: Deck, net_result: i64) -> f64 {
        let value = utility(deck, net_result, self.params.loss_aversion);
        self.belief.observe(deck, value, self.strategy, &self.params);
        value
    }
}

use crate::agent::Strategy;
use serde::{Deserialize, Serialize};

pub const DEFAULT_PLANNING_HORIZON: usize = 2;
pub const DEFAULT_EXPLORATION_WEIGHT: f64 = 0.8;
pub const HUMAN_LOSS_AVERSION: f64 = 4.9;
pub const NEUTRAL_LOSS_AVERSION: f64 = 1.0;
pub const DEFAULT_LEARNING_RATE: f64 = 0.3;
pub const DEFAULT_RECENCY_WINDOW: usize = 20;
/// Variance assumed for a deck with fewer than two observations.
pub const PRIOR_VARIANCE: f64 = 1000.0;

/// Deepest lookahead accepted; 4^4 paths per decision.
pub const MAX_PLANNING_HORIZON: usize = 4;

/// Tunable parameters of the lookahead agent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AgentParams {
    /// Length of every simulated deck sequence (default: 2)
    pub planning_horizon: usize,

    /// Weight of the standard-deviation bonus (default: 0.8)
    pub exploration_weight: f64,

    /// Multiplier on realised losses (default: 4.9 human-like, 1.0 optimal)
    pub loss_aversion: f64,

    /// Recency learning rate, human-like only (default: 0.3)
    pub learning_rate: f64,

    /// Utilities kept for the human-like variance estimate (default: 20)
    pub recency_window: usize,

    /// Variance before two observations exist (default: 1000)
    pub prior_variance: f64,
}

impl AgentParams {
    pub const fn for_strategy(strategy: Strategy) -> Self {
        let loss_aversion = match strategy {
            Strategy::Optimal => NEUTRAL_LOSS_AVERSION,
            Strategy::HumanLike => HUMAN_LOSS_AVERSION,
        };
        Self {
            planning_horizon: DEFAULT_PLANNING_HORIZON,
            exploration_weight: DEFAULT_EXPLORATION_WEIGHT,
            loss_aversion,
            learning_rate: DEFAULT_LEARNING_RATE,
            recency_window: DEFAULT_RECENCY_WINDOW,
            prior_variance: PRIOR_VARIANCE,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.planning_horizon == 0 || self.planning_horizon > MAX_PLANNING_HORIZON {
            return Err(format!(
                "planning_horizon must be between 1 and {MAX_PLANNING_HORIZON}"
            ));
        }
        if !self.exploration_weight.is_finite() || self.exploration_weight < 0.0 {
            return Err("exploration_weight must be a non-negative number".to_string());
        }
        if !self.loss_aversion.is_finite() || self.loss_aversion < 0.0 {
            return Err("loss_aversion must be a non-negative number".to_string());
        }
        if !(self.learning_rate > 0.0 && self.learning_rate <= 1.0) {
            return Err("learning_rate must lie in (0, 1]".to_string());
        }
        if self.recency_window < 2 {
            return Err("recency_window must keep at least two observations".to_string());
        }
        if !self.prior_variance.is_finite() || self.prior_variance < 0.0 {
            return Err("prior_variance must be a non-negative number".to_string());
        }
        Ok(())
    }
}

impl Default for AgentParams {
    fn default() -> Self {
        Self::for_strategy(Strategy::default())
    }
}

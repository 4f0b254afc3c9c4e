use crate::agent::Strategy;
use crate::agent::params::AgentParams;
use igt_core::model::deck::Deck;

/// Running estimate of one deck's utility.
#[derive(Debug, Clone, PartialEq)]
pub struct DeckBelief {
    pub mean: f64,
    pub variance: f64,
    pub count: u32,
    utilities: Vec<f64>,
}

/// The part of a deck belief a rollout is allowed to touch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeckEstimate {
    pub mean: f64,
    pub variance: f64,
    pub count: u32,
}

impl DeckBelief {
    pub fn new(prior_variance: f64) -> Self {
        Self {
            mean: 0.0,
            variance: prior_variance,
            count: 0,
            utilities: Vec::new(),
        }
    }

    pub fn utilities(&self) -> &[f64] {
        &self.utilities
    }

    pub fn estimate(&self) -> DeckEstimate {
        DeckEstimate {
            mean: self.mean,
            variance: self.variance,
            count: self.count,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BeliefState {
    decks: [DeckBelief; Deck::COUNT],
}

impl BeliefState {
    pub fn new(prior_variance: f64) -> Self {
        Self {
            decks: std::array::from_fn(|_| DeckBelief::new(prior_variance)),
        }
    }

    pub fn deck(&self, deck: Deck) -> &DeckBelief {
        &self.decks[deck.index()]
    }

    /// Copy of the per-deck estimates for hypothetical rollouts.
    pub fn snapshot(&self) -> [DeckEstimate; Deck::COUNT] {
        std::array::from_fn(|i| self.decks[i].estimate())
    }

    /// Records the utility of one observed draw and re-estimates the deck.
    pub fn observe(&mut self, deck: Deck, utility: f64, strategy: Strategy, params: &AgentParams) {
        let belief = &mut self.decks[deck.index()];
        belief.utilities.push(utility);
        belief.count += 1;

        match strategy {
            Strategy::Optimal => {
                let history = &belief.utilities;
                belief.mean = history.iter().sum::<f64>() / history.len() as f64;
                belief.variance = sample_variance(history, params.prior_variance);
            }
            Strategy::HumanLike => {
                belief.mean += params.learning_rate * (utility - belief.mean);
                let start = belief.utilities.len().saturating_sub(params.recency_window);
                belief.variance = sample_variance(&belief.utilities[start..], params.prior_variance);
            }
        }
    }
}

/// Loss-averse utility of a net result drawn from `deck`.
///
/// Anything below the deck's constant gain counts as a loss and is scaled by
/// `loss_aversion`.
pub fn utility(deck: Deck, net: i64, loss_aversion: f64) -> f64 {
    let gain = deck.gain() as f64;
    let loss_magnitude = gain - net as f64;
    gain - loss_aversion * loss_magnitude
}

/// Bessel-corrected variance, or `prior` below two observations.
pub fn sample_variance(values: &[f64], prior: f64) -> f64 {
    if values.len() < 2 {
        return prior;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let squares: f64 = values.iter().map(|value| (value - mean).powi(2)).sum();
    squares / (n - 1.0)
}

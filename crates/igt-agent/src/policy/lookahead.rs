use super::{DecisionContext, Policy};
use crate::agent::{AgentParams, DecisionAgent, Strategy};
use igt_core::model::deck::Deck;
use igt_core::replay::Outcome;
use tracing::{Level, event};

/// Adapter exposing [`DecisionAgent`] through the [`Policy`] trait.
pub struct LookaheadPolicy {
    agent: DecisionAgent,
}

impl LookaheadPolicy {
    pub fn new(strategy: Strategy) -> Self {
        Self {
            agent: DecisionAgent::new(strategy),
        }
    }

    pub fn with_params(strategy: Strategy, params: AgentParams) -> Self {
        Self {
            agent: DecisionAgent::with_params(strategy, params),
        }
    }

    pub fn optimal() -> Self {
        Self::new(Strategy::Optimal)
    }

    pub fn human_like() -> Self {
        Self::new(Strategy::HumanLike)
    }

    pub fn agent(&self) -> &DecisionAgent {
        &self.agent
    }
}

impl Policy for LookaheadPolicy {
    fn choose_deck(&mut self, ctx: &DecisionContext) -> Deck {
        let plan = self.agent.plan();
        log_decision(ctx, &self.agent, &plan.path, plan.value);
        plan.first()
    }

    fn observe(&mut self, deck: Deck, outcome: Outcome) {
        let utility = self.agent.update_model(deck, outcome.net);
        if tracing::enabled!(target: "igt_agent::update", Level::DEBUG) {
            let belief = self.agent.belief().deck(deck);
            event!(
                target: "igt_agent::update",
                Level::DEBUG,
                strategy = %self.agent.strategy(),
                deck = %deck,
                net = outcome.net,
                utility,
                mean = belief.mean,
                variance = belief.variance,
                count = belief.count,
            );
        }
    }
}

fn log_decision(ctx: &DecisionContext, agent: &DecisionAgent, path: &[Deck], value: f64) {
    if !tracing::enabled!(target: "igt_agent::decision", Level::INFO) {
        return;
    }

    let path_str = path
        .iter()
        .map(|deck| deck.to_string())
        .collect::<Vec<_>>()
        .join("");

    event!(
        target: "igt_agent::decision",
        Level::INFO,
        trial = ctx.trial as u32,
        capital = ctx.capital,
        strategy = %agent.strategy(),
        horizon = agent.params().planning_horizon as u32,
        path = %path_str,
        value,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(trial: usize) -> DecisionContext {
        DecisionContext {
            trial,
            capital: 2000,
        }
    }

    #[test]
    fn policy_matches_agent_choice() {
        let mut policy = LookaheadPolicy::optimal();
        let expected = policy.agent().select_action();
        assert_eq!(policy.choose_deck(&ctx(1)), expected);
    }

    #[test]
    fn observe_feeds_the_agent() {
        let mut policy = LookaheadPolicy::human_like();
        policy.observe(
            Deck::D,
            Outcome {
                gain: 50,
                loss: 0,
                net: 50,
            },
        );
        assert_eq!(policy.agent().belief().deck(Deck::D).count, 1);
    }

    #[test]
    fn policies_are_deterministic() {
        let mut a = LookaheadPolicy::human_like();
        let mut b = LookaheadPolicy::human_like();
        for trial in 1..=30 {
            let deck_a = a.choose_deck(&ctx(trial));
            let deck_b = b.choose_deck(&ctx(trial));
            assert_eq!(deck_a, deck_b);
            let outcome = Outcome {
                gain: deck_a.gain(),
                loss: if trial % 3 == 0 { -150 } else { 0 },
                net: deck_a.gain() - if trial % 3 == 0 { 150 } else { 0 },
            };
            a.observe(deck_a, outcome);
            b.observe(deck_b, outcome);
        }
    }
}

pub mod agent;
pub mod policy;

pub use agent::{AgentParams, BeliefState, DecisionAgent, DeckBelief, Strategy};
pub use policy::{DecisionContext, LookaheadPolicy, Policy};

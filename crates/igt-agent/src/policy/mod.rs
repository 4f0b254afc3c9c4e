mod lookahead;

pub use lookahead::LookaheadPolicy;

use igt_core::model::deck::Deck;
use igt_core::replay::Outcome;

/// Context provided to policies for each decision
#[derive(Debug, Clone, Copy)]
pub struct DecisionContext {
    /// One-based index of the trial about to be played.
    pub trial: usize,
    /// Capital before the draw.
    pub capital: i64,
}

/// Unified interface for simulated players
pub trait Policy: Send {
    /// Choose the deck to draw from next
    fn choose_deck(&mut self, ctx: &DecisionContext) -> Deck;

    /// Learn from the card a chosen deck dealt
    fn observe(&mut self, deck: Deck, outcome: Outcome);
}

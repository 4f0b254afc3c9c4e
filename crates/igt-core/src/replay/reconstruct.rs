use crate::model::card::Card;
use crate::model::deck::Deck;
use crate::model::scheme;
use crate::model::subject::Subject;

/// Cards available per deck; larger than any realistic trial count.
pub const ENVIRONMENT_HORIZON: usize = 150;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconstructedEnvironment {
    decks: [Vec<Card>; Deck::COUNT],
    real_draws: [usize; Deck::COUNT],
}

impl ReconstructedEnvironment {
    pub fn sequence(&self, deck: Deck) -> &[Card] {
        &self.decks[deck.index()]
    }

    /// How many leading cards of `deck` were actually drawn by the subject.
    pub fn real_draws(&self, deck: Deck) -> usize {
        self.real_draws[deck.index()]
    }
}

/// Rebuilds the card sequences a subject faced.
///
/// The first `k` cards of a deck are the `k` cards the subject drew from it,
/// in draw order. The remaining positions continue the schedule at position
/// `k`. Sequences are cut to [`ENVIRONMENT_HORIZON`].
pub fn reconstruct(subject: &Subject) -> ReconstructedEnvironment {
    let mut decks: [Vec<Card>; Deck::COUNT] =
        std::array::from_fn(|_| Vec::with_capacity(ENVIRONMENT_HORIZON));

    for trial in subject.observed_trials() {
        decks[trial.deck.index()].push(trial.card);
    }

    let mut real_draws = [0usize; Deck::COUNT];
    for deck in Deck::ALL {
        let cards = &mut decks[deck.index()];
        cards.truncate(ENVIRONMENT_HORIZON);
        let drawn = cards.len();
        real_draws[deck.index()] = drawn;
        cards.extend((drawn..ENVIRONMENT_HORIZON).map(|position| scheme::card(deck, position)));
    }

    ReconstructedEnvironment { decks, real_draws }
}

use crate::model::card::Card;
use crate::model::deck::Deck;
use crate::replay::reconstruct::ReconstructedEnvironment;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Outcome {
    pub gain: i64,
    pub loss: i64,
    pub net: i64,
}

impl From<Card> for Outcome {
    fn from(card: Card) -> Self {
        Self {
            gain: card.gain,
            loss: card.loss,
            net: card.net(),
        }
    }
}

impl Outcome {
    pub const fn card(self) -> Card {
        Card::new(self.gain, self.loss)
    }
}

/// Steps through a reconstructed environment one draw at a time.
///
/// An exhausted deck starts over from its first card. This is not the
/// schedule's modulo cycle: the replayed sequence includes the subject's real
/// draws, so the two differ once a deck runs out.
#[derive(Debug, Clone)]
pub struct ReplayEnvironment {
    env: ReconstructedEnvironment,
    cursors: [usize; Deck::COUNT],
    draws: [usize; Deck::COUNT],
}

impl ReplayEnvironment {
    pub fn new(env: ReconstructedEnvironment) -> Self {
        Self {
            env,
            cursors: [0; Deck::COUNT],
            draws: [0; Deck::COUNT],
        }
    }

    pub fn step(&mut self, deck: Deck) -> Outcome {
        let sequence = self.env.sequence(deck);
        let cursor = &mut self.cursors[deck.index()];
        if *cursor >= sequence.len() {
            *cursor = 0;
        }
        let card = sequence[*cursor];
        *cursor += 1;
        self.draws[deck.index()] += 1;
        Outcome::from(card)
    }

    /// Position of the next card `deck` will deal.
    pub fn cursor(&self, deck: Deck) -> usize {
        self.cursors[deck.index()]
    }

    /// Total draws from `deck`, counting past any wrap.
    pub fn draws(&self, deck: Deck) -> usize {
        self.draws[deck.index()]
    }
}

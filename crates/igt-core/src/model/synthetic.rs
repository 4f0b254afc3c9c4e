use crate::model::deck::Deck;
use crate::model::scheme;
use crate::model::subject::Subject;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;

impl Subject {
    /// Subject choosing decks uniformly at random, paid from the canonical
    /// schedule. Slots past `trials` up to `width` are left absent.
    pub fn synthetic<R: Rng + ?Sized>(
        rng: &mut R,
        label: impl Into<String>,
        trials: usize,
        width: usize,
    ) -> Self {
        let width = width.max(trials);
        let mut draws = [0usize; Deck::COUNT];
        let mut choices = Vec::with_capacity(width);
        let mut gains = Vec::with_capacity(width);
        let mut losses = Vec::with_capacity(width);

        for _ in 0..trials {
            let deck = Deck::ALL[rng.gen_range(0..Deck::COUNT)];
            let card = scheme::card(deck, draws[deck.index()]);
            draws[deck.index()] += 1;
            choices.push(Some(deck.code()));
            gains.push(Some(card.gain));
            losses.push(Some(card.loss));
        }
        choices.resize(width, None);
        gains.resize(width, None);
        losses.resize(width, None);

        Subject::new(label, choices, gains, losses)
    }

    pub fn synthetic_with_seed(
        seed: u64,
        label: impl Into<String>,
        trials: usize,
        width: usize,
    ) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        Self::synthetic(&mut rng, label, trials, width)
    }
}

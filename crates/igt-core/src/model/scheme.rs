//! Canonical payoff schedule of the task (Bechara et al., 1994).
//!
//! Every deck pays a constant gain per card and a loss taken from a fixed
//! 40-entry table. Positions beyond the table cycle with period 40.

use crate::model::card::Card;
use crate::model::deck::Deck;

pub const SCHEME_PERIOD: usize = 40;

const DECK_A_LOSSES: [i64; SCHEME_PERIOD] = [
    0, 0, -150, 0, -300, 0, -200, 0, -250, -350, //
    0, -350, 0, -250, -200, 0, -300, -150, 0, 0, //
    0, -300, 0, -350, 0, -200, -250, -150, 0, 0, //
    -350, -200, -250, 0, 0, 0, -150, -300, 0, 0,
];

const DECK_B_LOSSES: [i64; SCHEME_PERIOD] = [
    0, 0, 0, 0, 0, 0, 0, 0, -1250, 0, //
    0, 0, 0, -1250, 0, 0, 0, 0, 0, 0, //
    -1250, 0, 0, 0, 0, 0, 0, 0, 0, 0, //
    0, -1250, 0, 0, 0, 0, 0, 0, 0, 0,
];

const DECK_C_LOSSES: [i64; SCHEME_PERIOD] = [
    0, 0, -50, 0, -50, 0, -50, 0, -50, -50, //
    0, -25, -75, 0, 0, 0, -25, -75, 0, -50, //
    0, 0, 0, -50, -25, -50, 0, 0, -75, -50, //
    0, 0, 0, -25, -25, 0, -75, 0, -50, -75,
];

const DECK_D_LOSSES: [i64; SCHEME_PERIOD] = [
    0, 0, 0, 0, 0, 0, 0, 0, 0, -250, //
    0, 0, 0, 0, 0, 0, 0, 0, 0, -250, //
    0, 0, 0, 0, 0, 0, 0, 0, -250, 0, //
    0, 0, 0, 0, -250, 0, 0, 0, 0, 0,
];

/// Loss table of `deck`, positions 0..40.
pub const fn loss_table(deck: Deck) -> &'static [i64; SCHEME_PERIOD] {
    match deck {
        Deck::A => &DECK_A_LOSSES,
        Deck::B => &DECK_B_LOSSES,
        Deck::C => &DECK_C_LOSSES,
        Deck::D => &DECK_D_LOSSES,
    }
}

/// Card dealt by `deck` at zero-based draw `position`.
pub const fn card(deck: Deck, position: usize) -> Card {
    Card::new(deck.gain(), loss_table(deck)[position % SCHEME_PERIOD])
}

/// Net result of one full 40-card cycle divided into four 10-card blocks.
pub fn expected_net_per_block(deck: Deck) -> i64 {
    let cycle: i64 = (0..SCHEME_PERIOD).map(|p| card(deck, p).net()).sum();
    cycle / 4
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positions_cycle_with_period_forty() {
        for deck in Deck::ALL {
            for position in 0..200 {
                assert_eq!(card(deck, position), card(deck, position % SCHEME_PERIOD));
            }
        }
    }

    #[test]
    fn gains_are_constant_per_deck() {
        for position in 0..SCHEME_PERIOD {
            assert_eq!(card(Deck::A, position).gain, 100);
            assert_eq!(card(Deck::B, position).gain, 100);
            assert_eq!(card(Deck::C, position).gain, 50);
            assert_eq!(card(Deck::D, position).gain, 50);
        }
    }

    #[test]
    fn literal_positions_match_schedule() {
        // one-based positions 3, 10, 12 and 40 of deck A
        assert_eq!(card(Deck::A, 2), Card::new(100, -150));
        assert_eq!(card(Deck::A, 9), Card::new(100, -350));
        assert_eq!(card(Deck::A, 11), Card::new(100, -350));
        assert_eq!(card(Deck::A, 39), Card::new(100, 0));
        assert_eq!(card(Deck::B, 8), Card::new(100, -1250));
        assert_eq!(card(Deck::B, 13), Card::new(100, -1250));
        assert_eq!(card(Deck::B, 20), Card::new(100, -1250));
        assert_eq!(card(Deck::B, 31), Card::new(100, -1250));
        assert_eq!(card(Deck::C, 12), Card::new(50, -75));
        assert_eq!(card(Deck::C, 39), Card::new(50, -75));
        assert_eq!(card(Deck::D, 9), Card::new(50, -250));
        assert_eq!(card(Deck::D, 28), Card::new(50, -250));
        assert_eq!(card(Deck::D, 34), Card::new(50, -250));
    }

    #[test]
    fn every_block_of_ten_loses_the_same_amount() {
        for deck in Deck::ALL {
            let expected = if deck.is_disadvantageous() { -1250 } else { -250 };
            for block in loss_table(deck).chunks(10) {
                assert_eq!(block.iter().sum::<i64>(), expected, "deck {deck}");
            }
        }
    }

    #[test]
    fn block_expectation_separates_good_and_bad_decks() {
        assert_eq!(expected_net_per_block(Deck::A), -250);
        assert_eq!(expected_net_per_block(Deck::B), -250);
        assert_eq!(expected_net_per_block(Deck::C), 250);
        assert_eq!(expected_net_per_block(Deck::D), 250);
    }

    #[test]
    fn losses_are_never_positive() {
        for deck in Deck::ALL {
            assert!(loss_table(deck).iter().all(|loss| *loss <= 0));
        }
    }
}

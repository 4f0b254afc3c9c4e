use core::fmt;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Deck {
    A = 0,
    B = 1,
    C = 2,
    D = 3,
}

impl Deck {
    pub const ALL: [Deck; 4] = [Deck::A, Deck::B, Deck::C, Deck::D];

    pub const COUNT: usize = 4;

    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Deck::A),
            1 => Some(Deck::B),
            2 => Some(Deck::C),
            3 => Some(Deck::D),
            _ => None,
        }
    }

    /// Maps the dataset choice codes `1..=4` onto decks.
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Deck::A),
            2 => Some(Deck::B),
            3 => Some(Deck::C),
            4 => Some(Deck::D),
            _ => None,
        }
    }

    pub const fn code(self) -> u8 {
        self as u8 + 1
    }

    pub const fn index(self) -> usize {
        self as usize
    }

    /// Decks A and B pay more per card but lose money over every 10-card block.
    pub const fn is_disadvantageous(self) -> bool {
        matches!(self, Deck::A | Deck::B)
    }

    pub const fn gain(self) -> i64 {
        match self {
            Deck::A | Deck::B => 100,
            Deck::C | Deck::D => 50,
        }
    }
}

impl fmt::Display for Deck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Deck::A => "A",
            Deck::B => "B",
            Deck::C => "C",
            Deck::D => "D",
        };
        f.write_str(label)
    }
}

#[cfg(test)]
mod tests {
    use super::Deck;

    #[test]
    fn display_returns_letters() {
        assert_eq!(Deck::A.to_string(), "A");
        assert_eq!(Deck::D.to_string(), "D");
    }

    #[test]
    fn code_roundtrip() {
        for deck in Deck::ALL {
            assert_eq!(Deck::from_code(deck.code()), Some(deck));
        }
        assert_eq!(Deck::from_code(0), None);
        assert_eq!(Deck::from_code(5), None);
    }

    #[test]
    fn index_roundtrip() {
        for (i, deck) in Deck::ALL.iter().enumerate() {
            assert_eq!(Deck::from_index(i), Some(*deck));
            assert_eq!(deck.index(), i);
        }
        assert_eq!(Deck::from_index(4), None);
    }

    #[test]
    fn high_gain_decks_are_disadvantageous() {
        assert!(Deck::A.is_disadvantageous());
        assert!(Deck::B.is_disadvantageous());
        assert!(!Deck::C.is_disadvantageous());
        assert!(!Deck::D.is_disadvantageous());
        assert_eq!(Deck::B.gain(), 100);
        assert_eq!(Deck::C.gain(), 50);
    }

    #[test]
    fn serializes_as_letter() {
        assert_eq!(serde_json::to_string(&Deck::C).unwrap(), "\"C\"");
    }
}

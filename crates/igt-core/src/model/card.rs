use core::fmt;
use serde::{Deserialize, Serialize};

/// A single draw: a non-negative gain paired with a non-positive loss.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Card {
    pub gain: i64,
    pub loss: i64,
}

impl Card {
    pub const fn new(gain: i64, loss: i64) -> Self {
        Self { gain, loss }
    }

    pub const fn net(self) -> i64 {
        self.gain + self.loss
    }

    pub const fn is_penalty(self) -> bool {
        self.loss < 0
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "+{}/{}", self.gain, self.loss)
    }
}

use crate::agent::belief::DeckEstimate;
use igt_core::model::deck::Deck;

/// Best deck sequence found by the exhaustive lookahead.
#[derive(Debug, Clone, PartialEq)]
pub struct Plan {
    pub path: Vec<Deck>,
    pub value: f64,
    pub evaluated: usize,
}

impl Plan {
    pub fn first(&self) -> Deck {
        self.path[0]
    }
}

/// Iterates every deck sequence of a fixed length in lexicographic order
/// (`AA, AB, .., DD` for length two).
#[derive(Debug, Clone)]
pub struct PathEnumerator {
    depth: usize,
    next: usize,
    total: usize,
}

impl PathEnumerator {
    pub fn new(depth: usize) -> Self {
        Self {
            depth,
            next: 0,
            total: Deck::COUNT.pow(depth as u32),
        }
    }

    fn decode(&self, mut code: usize, path: &mut [Deck]) {
        for slot in path.iter_mut().rev() {
            *slot = Deck::ALL[code % Deck::COUNT];
            code /= Deck::COUNT;
        }
    }

    /// Writes the next path into `path`; returns false once exhausted.
    pub fn next_into(&mut self, path: &mut [Deck]) -> bool {
        if self.next >= self.total {
            return false;
        }
        self.decode(self.next, path);
        self.next += 1;
        true
    }

    pub fn total(&self) -> usize {
        self.total
    }
}

/// Value of following `path` from `estimates`.
///
/// Each step earns the deck's mean plus an exploration bonus on its standard
/// deviation. Visiting a deck shrinks its simulated variance by `n / (n + 1)`;
/// simulated means never move.
pub fn path_value(
    mut estimates: [DeckEstimate; Deck::COUNT],
    path: &[Deck],
    exploration_weight: f64,
) -> f64 {
    let mut value = 0.0;
    for deck in path {
        let estimate = &mut estimates[deck.index()];
        value += estimate.mean + exploration_weight * estimate.variance.sqrt();
        let n = f64::from(estimate.count);
        estimate.variance *= n / (n + 1.0);
        estimate.count += 1;
    }
    value
}

/// Exhaustive search over all `4^depth` sequences; the first maximal one wins.
pub fn plan(estimates: &[DeckEstimate; Deck::COUNT], depth: usize, exploration_weight: f64) -> Plan {
    let depth = depth.max(1);
    let mut enumerator = PathEnumerator::new(depth);
    let mut candidate = vec![Deck::A; depth];
    let mut best = Plan {
        path: candidate.clone(),
        value: f64::NEG_INFINITY,
        evaluated: 0,
    };

    while enumerator.next_into(&mut candidate) {
        let value = path_value(*estimates, &candidate, exploration_weight);
        best.evaluated += 1;
        if value > best.value {
            best.value = value;
            best.path.copy_from_slice(&candidate);
        }
    }

    best
}

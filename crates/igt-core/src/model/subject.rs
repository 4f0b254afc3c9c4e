use crate::model::card::Card;
use crate::model::deck::Deck;
use crate::model::trial::{TrialLedger, TrialRecord};
use serde::{Deserialize, Serialize};

/// Raw per-trial arrays of one recorded subject.
///
/// The arrays are parallel; `None` marks a trial the subject never reached.
/// Gains and losses may be shorter than `choices`, in which case the missing
/// values read as zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subject {
    pub source_study: String,
    pub choices: Vec<Option<u8>>,
    #[serde(default)]
    pub gains: Vec<Option<i64>>,
    #[serde(default)]
    pub losses: Vec<Option<i64>>,
}

/// A trial slot holding a recognised deck choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObservedTrial {
    /// Zero-based slot in the raw arrays.
    pub slot: usize,
    pub deck: Deck,
    pub card: Card,
}

impl Subject {
    pub fn new(
        source_study: impl Into<String>,
        choices: Vec<Option<u8>>,
        gains: Vec<Option<i64>>,
        losses: Vec<Option<i64>>,
    ) -> Self {
        Self {
            source_study: source_study.into(),
            choices,
            gains,
            losses,
        }
    }

    /// Number of slots in the raw table, reached or not.
    pub fn width(&self) -> usize {
        self.choices.len()
    }

    /// Forces every loss to be non-positive; datasets disagree on the sign.
    pub fn normalize_losses(&mut self) {
        for loss in self.losses.iter_mut().flatten() {
            *loss = -loss.abs();
        }
    }

    /// Valid trials in slot order. Unknown deck codes count as absent.
    pub fn observed_trials(&self) -> impl Iterator<Item = ObservedTrial> + '_ {
        self.choices
            .iter()
            .enumerate()
            .filter_map(move |(slot, code)| {
                let deck = (*code).and_then(Deck::from_code)?;
                let gain = self.gains.get(slot).copied().flatten().unwrap_or(0);
                let loss = self.losses.get(slot).copied().flatten().unwrap_or(0);
                Some(ObservedTrial {
                    slot,
                    deck,
                    card: Card::new(gain, loss),
                })
            })
    }

    pub fn valid_trial_count(&self) -> usize {
        self.observed_trials().count()
    }

    pub fn first_choice(&self) -> Option<Deck> {
        self.observed_trials().next().map(|trial| trial.deck)
    }

    /// The subject's own trial stream with cumulative capital.
    pub fn history(&self) -> Vec<TrialRecord> {
        let mut ledger = TrialLedger::with_capacity(self.width());
        for trial in self.observed_trials() {
            ledger.record(trial.deck, trial.card);
        }
        ledger.into_records()
    }
}

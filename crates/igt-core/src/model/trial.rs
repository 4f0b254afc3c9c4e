use crate::model::card::Card;
use crate::model::deck::Deck;
use serde::{Deserialize, Serialize};

/// Capital every player starts the task with.
pub const STARTING_CAPITAL: i64 = 2000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialRecord {
    /// One-based position within the stream of valid trials.
    pub trial: usize,
    pub deck: Deck,
    #[serde(rename = "win")]
    pub gain: i64,
    pub loss: i64,
    pub net: i64,
    pub total_score: i64,
}

/// Running record of draws that keeps the cumulative capital in step.
#[derive(Debug, Clone)]
pub struct TrialLedger {
    records: Vec<TrialRecord>,
    capital: i64,
}

impl TrialLedger {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: Vec::with_capacity(capacity),
            capital: STARTING_CAPITAL,
        }
    }

    pub fn record(&mut self, deck: Deck, card: Card) -> &TrialRecord {
        let net = card.net();
        self.capital += net;
        self.records.push(TrialRecord {
            trial: self.records.len() + 1,
            deck,
            gain: card.gain,
            loss: card.loss,
            net,
            total_score: self.capital,
        });
        &self.records[self.records.len() - 1]
    }

    pub fn capital(&self) -> i64 {
        self.capital
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[TrialRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<TrialRecord> {
        self.records
    }
}

impl Default for TrialLedger {
    fn default() -> Self {
        Self::new()
    }
}

use igt_core::model::deck::Deck;
use igt_core::model::trial::TrialRecord;
use serde::{Deserialize, Serialize};

/// Similarity between a human trial stream and an agent trial stream.
///
/// Ratios are percentages. Every ratio is zero when its denominator is zero.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ComparisonMetrics {
    pub exact_match_ratio: f64,
    pub good_bad_match_ratio: f64,
    pub capital_rmse: f64,
    pub human_entropy: f64,
    pub ai_entropy: f64,
    /// Sum of agent net minus human net; positive when the agent earned more.
    pub cumulative_regret: i64,
    pub wsls_ratio: f64,
}

impl ComparisonMetrics {
    pub fn compute(human: &[TrialRecord], agent: &[TrialRecord]) -> Self {
        let n = human.len().min(agent.len());

        let mut exact_matches = 0usize;
        let mut valence_matches = 0usize;
        let mut squared_error = 0.0f64;
        let mut regret = 0i64;
        for (h, a) in human.iter().zip(agent.iter()) {
            if h.deck == a.deck {
                exact_matches += 1;
            }
            if h.deck.is_disadvantageous() == a.deck.is_disadvantageous() {
                valence_matches += 1;
            }
            let diff = (h.total_score - a.total_score) as f64;
            squared_error += diff * diff;
            regret += a.net - h.net;
        }

        let capital_rmse = if n == 0 {
            0.0
        } else {
            (squared_error / n as f64).sqrt()
        };

        let wsls_agreements = (1..n)
            .filter(|&i| {
                followed_wsls(&human[i - 1], &human[i]) == followed_wsls(&agent[i - 1], &agent[i])
            })
            .count();
        let wsls_ratio = if n <= 1 {
            0.0
        } else {
            percentage(wsls_agreements, n - 1)
        };

        Self {
            exact_match_ratio: percentage(exact_matches, n),
            good_bad_match_ratio: percentage(valence_matches, n),
            capital_rmse: round2(capital_rmse),
            human_entropy: round2(choice_entropy(human)),
            ai_entropy: round2(choice_entropy(agent)),
            cumulative_regret: regret,
            wsls_ratio,
        }
    }
}

/// Win-stay after a non-negative net, lose-shift after a negative one.
pub fn followed_wsls(previous: &TrialRecord, current: &TrialRecord) -> bool {
    let stayed = previous.deck == current.deck;
    if previous.net >= 0 { stayed } else { !stayed }
}

/// Shannon entropy in bits of the deck-choice distribution.
pub fn choice_entropy(stream: &[TrialRecord]) -> f64 {
    if stream.is_empty() {
        return 0.0;
    }
    let mut counts = [0usize; Deck::COUNT];
    for record in stream {
        counts[record.deck.index()] += 1;
    }
    let total = stream.len() as f64;
    counts
        .iter()
        .filter(|&&count| count > 0)
        .map(|&count| {
            let p = count as f64 / total;
            -p * p.log2()
        })
        .sum()
}

fn percentage(hits: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round2(hits as f64 / total as f64 * 100.0)
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use igt_core::model::card::Card;
    use igt_core::model::trial::TrialLedger;

    fn stream(draws: &[(Deck, i64, i64)]) -> Vec<TrialRecord> {
        let mut ledger = TrialLedger::new();
        for &(deck, gain, loss) in draws {
            ledger.record(deck, Card::new(gain, loss));
        }
        ledger.into_records()
    }

    #[test]
    fn empty_streams_yield_zero_metrics() {
        let metrics = ComparisonMetrics::compute(&[], &[]);
        assert_eq!(metrics, ComparisonMetrics::default());
    }

    #[test]
    fn identical_streams_match_fully() {
        let human = stream(&[(Deck::A, 100, 0), (Deck::A, 100, -150), (Deck::C, 50, 0)]);
        let metrics = ComparisonMetrics::compute(&human, &human);
        assert_eq!(metrics.exact_match_ratio, 100.0);
        assert_eq!(metrics.good_bad_match_ratio, 100.0);
        assert_eq!(metrics.capital_rmse, 0.0);
        assert_eq!(metrics.cumulative_regret, 0);
        assert_eq!(metrics.wsls_ratio, 100.0);
        assert_eq!(metrics.human_entropy, metrics.ai_entropy);
    }

    #[test]
    fn valence_match_groups_bad_decks() {
        let human = stream(&[(Deck::A, 100, 0), (Deck::C, 50, 0)]);
        let agent = stream(&[(Deck::B, 100, 0), (Deck::D, 50, 0)]);
        let metrics = ComparisonMetrics::compute(&human, &agent);
        assert_eq!(metrics.exact_match_ratio, 0.0);
        assert_eq!(metrics.good_bad_match_ratio, 100.0);
    }

    #[test]
    fn regret_is_signed_agent_minus_human() {
        let human = stream(&[(Deck::B, 100, -1250), (Deck::A, 100, 0)]);
        let agent = stream(&[(Deck::C, 50, 0), (Deck::D, 50, 0)]);
        let metrics = ComparisonMetrics::compute(&human, &agent);
        // (50 - -1150) + (50 - 100)
        assert_eq!(metrics.cumulative_regret, 1150);
    }

    #[test]
    fn rmse_uses_cumulative_scores() {
        let human = stream(&[(Deck::A, 100, 0), (Deck::A, 100, 0)]);
        let agent = stream(&[(Deck::C, 50, 0), (Deck::C, 50, 0)]);
        // differences 50 and 100
        let expected = ((50.0f64.powi(2) + 100.0f64.powi(2)) / 2.0).sqrt();
        let metrics = ComparisonMetrics::compute(&human, &agent);
        assert!((metrics.capital_rmse - round2(expected)).abs() < 1e-9);
    }

    #[test]
    fn wsls_follows_previous_outcome() {
        let win_stay = stream(&[(Deck::A, 100, 0), (Deck::A, 100, 0)]);
        assert!(followed_wsls(&win_stay[0], &win_stay[1]));
        let win_shift = stream(&[(Deck::A, 100, 0), (Deck::B, 100, 0)]);
        assert!(!followed_wsls(&win_shift[0], &win_shift[1]));
        let lose_shift = stream(&[(Deck::A, 100, -150), (Deck::C, 50, 0)]);
        assert!(followed_wsls(&lose_shift[0], &lose_shift[1]));
        let lose_stay = stream(&[(Deck::A, 100, -150), (Deck::A, 100, 0)]);
        assert!(!followed_wsls(&lose_stay[0], &lose_stay[1]));
    }

    #[test]
    fn break_even_counts_as_win() {
        let even = stream(&[(Deck::C, 50, -50), (Deck::C, 50, 0)]);
        assert!(followed_wsls(&even[0], &even[1]));
    }

    #[test]
    fn wsls_ratio_counts_agreement() {
        let human = stream(&[(Deck::A, 100, 0), (Deck::A, 100, 0), (Deck::A, 100, 0)]);
        let agent = stream(&[(Deck::A, 100, 0), (Deck::A, 100, 0), (Deck::B, 100, 0)]);
        let metrics = ComparisonMetrics::compute(&human, &agent);
        assert_eq!(metrics.wsls_ratio, 50.0);
    }

    #[test]
    fn single_trial_has_no_wsls_ratio() {
        let human = stream(&[(Deck::A, 100, 0)]);
        assert_eq!(ComparisonMetrics::compute(&human, &human).wsls_ratio, 0.0);
    }

    #[test]
    fn entropy_bounds() {
        let single = stream(&[(Deck::A, 100, 0); 4]);
        assert_eq!(choice_entropy(&single), 0.0);
        let uniform = stream(&[
            (Deck::A, 100, 0),
            (Deck::B, 100, 0),
            (Deck::C, 50, 0),
            (Deck::D, 50, 0),
        ]);
        assert!((choice_entropy(&uniform) - 2.0).abs() < 1e-12);
        assert_eq!(choice_entropy(&[]), 0.0);
    }

    #[test]
    fn ratios_round_to_two_decimals() {
        let human = stream(&[(Deck::A, 100, 0), (Deck::B, 100, 0), (Deck::C, 50, 0)]);
        let agent = stream(&[(Deck::A, 100, 0), (Deck::C, 50, 0), (Deck::D, 50, 0)]);
        let metrics = ComparisonMetrics::compute(&human, &agent);
        assert_eq!(metrics.exact_match_ratio, 33.33);
        assert_eq!(metrics.good_bad_match_ratio, 66.67);
    }
}

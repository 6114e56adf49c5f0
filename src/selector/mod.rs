//! Selector: error-weighted choice of the next sentence
//!
//! weight = (failures + 1) / (successes + 1)
//!
//! The +1 on both sides keeps unseen and always-correct sentences in play.
//! Weights are normalized and sampled by binary search over their running
//! sum, so a seeded rng gives a reproducible sequence.

use crate::catalog::Catalog;
use crate::error::{Result, TrainerError};
use crate::ledger::Ledger;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

/// Weighted random picker over catalog positions
pub struct Selector<R = StdRng> {
    rng: R,
}

impl Selector<StdRng> {
    /// Reproducible picker
    pub fn seeded(seed: u64) -> Self {
        Selector {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Selector {
            rng: StdRng::from_entropy(),
        }
    }
}

impl<R: Rng> Selector<R> {
    #[allow(dead_code)]
    pub fn with_rng(rng: R) -> Self {
        Selector { rng }
    }

    /// Draw a catalog position, favouring sentences answered wrongly
    pub fn pick(&mut self, catalog: &Catalog, ledger: &Ledger) -> Result<usize> {
        let weights = normalized_weights(catalog, ledger);
        if weights.is_empty() {
            return Err(TrainerError::EmptyCatalog);
        }
        if weights.len() == 1 {
            return Ok(0);
        }

        let index = sample(&cumulative(&weights), self.rng.gen::<f64>());
        debug!(index, weight = weights[index], "picked sentence");
        Ok(index)
    }
}

/// Raw weight for one sentence
pub fn weight(successes: u32, failures: u32) -> f64 {
    (failures as f64 + 1.0) / (successes as f64 + 1.0)
}

/// Per-catalog-position probabilities summing to 1.
///
/// A sentence without a ledger entry counts as never attempted.
pub fn normalized_weights(catalog: &Catalog, ledger: &Ledger) -> Vec<f64> {
    let raw: Vec<f64> = catalog
        .pairs()
        .iter()
        .map(|pair| {
            ledger
                .lookup(&pair.source_text)
                .map(|e| weight(e.successes, e.failures))
                .unwrap_or(1.0)
        })
        .collect();

    let total: f64 = raw.iter().sum();
    raw.into_iter().map(|w| w / total).collect()
}

fn cumulative(weights: &[f64]) -> Vec<f64> {
    weights
        .iter()
        .scan(0.0, |acc, w| {
            *acc += w;
            Some(*acc)
        })
        .collect()
}

/// First position whose running sum exceeds `u` (u in [0, 1))
fn sample(cumulative: &[f64], u: f64) -> usize {
    let index = cumulative.partition_point(|&c| c <= u);
    // Rounding can leave the last running sum just under u
    index.min(cumulative.len() - 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::SentencePair;
    use crate::ledger::LedgerEntry;

    fn catalog(n: usize) -> Catalog {
        Catalog::new(
            (0..n)
                .map(|i| SentencePair::new(format!("pt{i}"), format!("en{i}")))
                .collect(),
        )
    }

    fn ledger(counts: &[(u32, u32)]) -> Ledger {
        Ledger::from_entries(
            counts
                .iter()
                .enumerate()
                .map(|(i, &(successes, failures))| LedgerEntry {
                    source_text: format!("pt{i}"),
                    target_text: format!("en{i}"),
                    successes,
                    failures,
                    accuracy: 0.0,
                })
                .collect(),
        )
    }

    #[test]
    fn test_weight_smoothing() {
        assert_eq!(weight(0, 0), 1.0);
        assert_eq!(weight(0, 10), 11.0);
        assert_eq!(weight(3, 1), 0.5);
    }

    #[test]
    fn test_normalized_weights_sum_to_one() {
        let weights = normalized_weights(&catalog(3), &ledger(&[(0, 0), (1, 0), (0, 3)]));
        assert!((weights.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        assert!(weights[2] > weights[0] && weights[0] > weights[1]);
    }

    #[test]
    fn test_empty_catalog() {
        let mut selector = Selector::seeded(1);
        let err = selector.pick(&catalog(0), &Ledger::default()).unwrap_err();
        assert!(matches!(err, TrainerError::EmptyCatalog));
    }

    #[test]
    fn test_single_entry_always_zero() {
        let mut selector = Selector::seeded(7);
        let cat = catalog(1);
        let led = ledger(&[(50, 0)]);
        for _ in 0..100 {
            assert_eq!(selector.pick(&cat, &led).unwrap(), 0);
        }
    }

    #[test]
    fn test_weak_sentence_drawn_more_often() {
        let mut selector = Selector::seeded(42);
        let cat = catalog(2);
        let led = ledger(&[(0, 0), (0, 10)]);

        let draws = 10_000;
        let weak = (0..draws)
            .filter(|_| selector.pick(&cat, &led).unwrap() == 1)
            .count();
        let share = weak as f64 / draws as f64;
        // Expected 11/12
        assert!(share > 0.85 && share < 0.97, "share was {share}");
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let cat = catalog(5);
        let led = ledger(&[(1, 0), (0, 1), (2, 2), (0, 0), (5, 1)]);
        let mut a = Selector::seeded(9);
        let mut b = Selector::seeded(9);
        let run_a: Vec<usize> = (0..50).map(|_| a.pick(&cat, &led).unwrap()).collect();
        let run_b: Vec<usize> = (0..50).map(|_| b.pick(&cat, &led).unwrap()).collect();
        assert_eq!(run_a, run_b);
    }

    #[test]
    fn test_sample_boundaries() {
        let cum = cumulative(&[0.25, 0.25, 0.5]);
        assert_eq!(sample(&cum, 0.0), 0);
        assert_eq!(sample(&cum, 0.25), 1);
        assert_eq!(sample(&cum, 0.74), 2);
        assert_eq!(sample(&cum, 0.999_999), 2);
        assert_eq!(sample(&[0.3, 0.6, 0.999_999_9], 0.999_999_95), 2);
    }

    #[test]
    fn test_injected_rng_drives_choice() {
        // A zero draw always lands on the first position
        let mut selector = Selector::with_rng(rand::rngs::mock::StepRng::new(0, 0));
        let cat = catalog(3);
        let led = ledger(&[(9, 0), (0, 9), (0, 0)]);
        assert_eq!(selector.pick(&cat, &led).unwrap(), 0);
    }

    #[test]
    fn test_missing_ledger_entry_counts_as_unseen() {
        let weights = normalized_weights(&catalog(2), &ledger(&[(0, 1)]));
        assert!((weights[0] - 2.0 / 3.0).abs() < 1e-12);
    }
}

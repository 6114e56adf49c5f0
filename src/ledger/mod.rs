//! Ledger: per-sentence performance counters
//!
//! # Components
//! - `mod.rs`: `LedgerEntry`, `Ledger`, reconciliation against the catalog
//! - `store.rs`: durable `;`-delimited storage with atomic replace
//!
//! `accuracy` is a persisted field. It is refreshed by
//! `Ledger::recompute_accuracy` (called from `LedgerStore::persist`) and is
//! stale in memory between saves. `LedgerRow::percentage` is always live.

pub mod store;

pub use store::{LedgerColumns, LedgerStore};

use crate::catalog::{Catalog, SentencePair};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;

/// Counters for one sentence
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LedgerEntry {
    pub source_text: String,
    pub target_text: String,
    pub successes: u32,
    pub failures: u32,
    pub accuracy: f64,
}

impl LedgerEntry {
    /// Zeroed entry for a sentence never practiced
    pub fn new(pair: &SentencePair) -> Self {
        LedgerEntry {
            source_text: pair.source_text.clone(),
            target_text: pair.target_text.clone(),
            successes: 0,
            failures: 0,
            accuracy: 0.0,
        }
    }

    pub fn attempts(&self) -> u64 {
        u64::from(self.successes) + u64::from(self.failures)
    }

    /// successes / attempts, 0 when never attempted
    pub fn computed_accuracy(&self) -> f64 {
        match self.attempts() {
            0 => 0.0,
            total => self.successes as f64 / total as f64,
        }
    }
}

/// What `Ledger::reconcile` changed
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ReconcileReport {
    pub added: usize,
    pub pruned: usize,
}

/// One line of the on-demand performance table
#[derive(Clone, Debug, PartialEq)]
pub struct LedgerRow<'a> {
    pub source_text: &'a str,
    pub target_text: &'a str,
    pub successes: u32,
    pub failures: u32,
    /// Live accuracy in percent, rounded to one decimal
    pub percentage: f64,
}

/// Ordered ledger entries with a lookup by source text
#[derive(Clone, Debug, Default, Serialize)]
#[serde(transparent)]
pub struct Ledger {
    entries: Vec<LedgerEntry>,
    #[serde(skip)]
    index: FxHashMap<String, usize>,
}

impl PartialEq for Ledger {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl Ledger {
    /// Build from stored entries. Later duplicates of a source text are dropped.
    pub fn from_entries(entries: Vec<LedgerEntry>) -> Self {
        let mut seen = FxHashSet::default();
        let entries = entries
            .into_iter()
            .filter(|e| seen.insert(e.source_text.clone()))
            .collect();

        let mut ledger = Ledger {
            entries,
            index: FxHashMap::default(),
        };
        ledger.rebuild_index();
        ledger
    }

    /// Fresh ledger with one zeroed entry per catalog sentence
    pub fn fresh(catalog: &Catalog) -> Self {
        let mut ledger = Ledger::default();
        ledger.reconcile(catalog);
        ledger
    }

    fn rebuild_index(&mut self) {
        self.index = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, e)| (e.source_text.clone(), i))
            .collect();
    }

    /// Bring the ledger in line with the catalog.
    ///
    /// Entries for sentences no longer in the catalog are removed, missing
    /// sentences are appended zeroed in catalog order, and surviving entries
    /// take the catalog's current translation. Existing order is kept.
    pub fn reconcile(&mut self, catalog: &Catalog) -> ReconcileReport {
        let targets: FxHashMap<&str, &str> = catalog
            .pairs()
            .iter()
            .map(|p| (p.source_text.as_str(), p.target_text.as_str()))
            .collect();

        let before = self.entries.len();
        self.entries
            .retain(|e| targets.contains_key(e.source_text.as_str()));
        let pruned = before - self.entries.len();

        for entry in &mut self.entries {
            if let Some(&target) = targets.get(entry.source_text.as_str()) {
                if entry.target_text != target {
                    entry.target_text = target.to_string();
                }
            }
        }
        self.rebuild_index();

        let mut added = 0;
        for pair in catalog.pairs() {
            if !self.index.contains_key(&pair.source_text) {
                self.index
                    .insert(pair.source_text.clone(), self.entries.len());
                self.entries.push(LedgerEntry::new(pair));
                added += 1;
            }
        }

        ReconcileReport { added, pruned }
    }

    /// Count one answer for the entry at `index`
    pub fn record_result(&mut self, index: usize, correct: bool) {
        if let Some(entry) = self.entries.get_mut(index) {
            // Counters stop at u32::MAX
            if correct {
                entry.successes = entry.successes.saturating_add(1);
            } else {
                entry.failures = entry.failures.saturating_add(1);
            }
        }
    }

    /// Refresh every entry's persisted accuracy from its counters
    pub fn recompute_accuracy(&mut self) {
        for entry in &mut self.entries {
            entry.accuracy = entry.computed_accuracy();
        }
    }

    /// Position of the entry for `source_text`
    pub fn position(&self, source_text: &str) -> Option<usize> {
        self.index.get(source_text).copied()
    }

    /// Entry for `source_text`
    pub fn lookup(&self, source_text: &str) -> Option<&LedgerEntry> {
        self.position(source_text).map(|i| &self.entries[i])
    }

    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Table rows with a freshly computed percentage
    pub fn rows(&self) -> Vec<LedgerRow<'_>> {
        self.entries
            .iter()
            .map(|e| LedgerRow {
                source_text: &e.source_text,
                target_text: &e.target_text,
                successes: e.successes,
                failures: e.failures,
                percentage: (e.computed_accuracy() * 1000.0).round() / 10.0,
            })
            .collect()
    }
}

//! Run-scoped pattern usage tracking.
//!
//! Every variation choice (opening style, transition phrase, synonym,
//! restructure transform) is recorded here so future selections can be
//! biased away from overused variants. The history is shared by every
//! concurrent task in a batch; select-and-record is a single atomic
//! operation under the lock so two racing tasks cannot both observe the
//! same variant as least-used and pile onto it.
//!
//! Lifecycle: created at batch start (constructor-injected into the guard),
//! optionally merged into a longer-lived history at batch end.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// The variation slot a usage count belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum VariationSlot {
    /// Opening paragraph style.
    Opening,
    /// Closing paragraph style.
    Closing,
    /// Transition phrase.
    Transition,
    /// Synonym replacement word.
    Synonym,
    /// Sentence restructuring transform.
    Restructure,
    /// Fronting adverb within a restructured sentence.
    Adverb,
}

impl fmt::Display for VariationSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Opening => write!(f, "opening"),
            Self::Closing => write!(f, "closing"),
            Self::Transition => write!(f, "transition"),
            Self::Synonym => write!(f, "synonym"),
            Self::Restructure => write!(f, "restructure"),
            Self::Adverb => write!(f, "adverb"),
        }
    }
}

/// Serializable snapshot of usage counts, for persistence at batch end.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UsageSnapshot {
    /// Slot → variant → usage count.
    pub counts: BTreeMap<VariationSlot, BTreeMap<String, u64>>,
}

/// Process-wide, run-scoped usage counters for variation slots.
///
/// Thread-safe; all methods take `&self`. BTreeMaps keep iteration
/// deterministic for snapshots and tests.
#[derive(Debug, Default)]
pub struct PatternUsageHistory {
    counts: Mutex<BTreeMap<VariationSlot, BTreeMap<String, u64>>>,
}

impl PatternUsageHistory {
    /// Create an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one use of a variant.
    pub fn record(&self, slot: VariationSlot, variant: &str) {
        let mut counts = self.counts.lock();
        *counts
            .entry(slot)
            .or_default()
            .entry(variant.to_string())
            .or_insert(0) += 1;
    }

    /// Current usage count for a variant.
    pub fn count(&self, slot: VariationSlot, variant: &str) -> u64 {
        self.counts
            .lock()
            .get(&slot)
            .and_then(|m| m.get(variant))
            .copied()
            .unwrap_or(0)
    }

    /// Pick the least-used candidate and record its use, atomically.
    ///
    /// Ties break toward the earliest candidate, so selection is
    /// deterministic given the same history state. Returns the index into
    /// `candidates`.
    ///
    /// # Panics
    ///
    /// Panics if `candidates` is empty; catalogs in this crate are
    /// compile-time non-empty.
    pub fn select_and_record(&self, slot: VariationSlot, candidates: &[&str]) -> usize {
        assert!(!candidates.is_empty(), "candidate catalog must be non-empty");
        let mut counts = self.counts.lock();
        let slot_counts = counts.entry(slot).or_default();

        let mut best = 0usize;
        let mut best_count = u64::MAX;
        for (i, candidate) in candidates.iter().enumerate() {
            let count = slot_counts.get(*candidate).copied().unwrap_or(0);
            if count < best_count {
                best = i;
                best_count = count;
            }
        }

        *slot_counts.entry(candidates[best].to_string()).or_insert(0) += 1;
        best
    }

    /// Merge another history's counts into this one (batch-end persistence).
    pub fn merge(&self, other: &PatternUsageHistory) {
        let other_counts = other.counts.lock().clone();
        let mut counts = self.counts.lock();
        for (slot, variants) in other_counts {
            let slot_counts = counts.entry(slot).or_default();
            for (variant, n) in variants {
                *slot_counts.entry(variant).or_insert(0) += n;
            }
        }
    }

    /// Snapshot the counters for persistence.
    pub fn snapshot(&self) -> UsageSnapshot {
        UsageSnapshot {
            counts: self.counts.lock().clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_and_count() {
        let history = PatternUsageHistory::new();
        history.record(VariationSlot::Opening, "question");
        history.record(VariationSlot::Opening, "question");
        assert_eq!(history.count(VariationSlot::Opening, "question"), 2);
        assert_eq!(history.count(VariationSlot::Opening, "statement"), 0);
    }

    #[test]
    fn test_select_rotates_through_least_used() {
        let history = PatternUsageHistory::new();
        let candidates = ["a", "b", "c"];

        // Fresh history: first selection is the first candidate, and three
        // selections cover all three variants before any repeats.
        let first = history.select_and_record(VariationSlot::Transition, &candidates);
        let second = history.select_and_record(VariationSlot::Transition, &candidates);
        let third = history.select_and_record(VariationSlot::Transition, &candidates);
        assert_eq!((first, second, third), (0, 1, 2));

        // Fourth wraps around.
        let fourth = history.select_and_record(VariationSlot::Transition, &candidates);
        assert_eq!(fourth, 0);
    }

    #[test]
    fn test_slots_are_independent() {
        let history = PatternUsageHistory::new();
        history.record(VariationSlot::Opening, "x");
        assert_eq!(history.count(VariationSlot::Closing, "x"), 0);
    }

    #[test]
    fn test_merge() {
        let a = PatternUsageHistory::new();
        let b = PatternUsageHistory::new();
        a.record(VariationSlot::Synonym, "top");
        b.record(VariationSlot::Synonym, "top");
        b.record(VariationSlot::Synonym, "leading");

        a.merge(&b);
        assert_eq!(a.count(VariationSlot::Synonym, "top"), 2);
        assert_eq!(a.count(VariationSlot::Synonym, "leading"), 1);
    }

    #[test]
    fn test_snapshot_round_trip() {
        let history = PatternUsageHistory::new();
        history.record(VariationSlot::Restructure, "clause_swap");
        let snapshot = history.snapshot();
        assert_eq!(
            snapshot.counts[&VariationSlot::Restructure]["clause_swap"],
            1
        );
    }

    #[test]
    fn test_concurrent_select_no_lost_updates() {
        use std::sync::Arc;
        let history = Arc::new(PatternUsageHistory::new());
        let candidates = ["a", "b"];

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let history = Arc::clone(&history);
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        history.select_and_record(VariationSlot::Synonym, &candidates);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        let total = history.count(VariationSlot::Synonym, "a")
            + history.count(VariationSlot::Synonym, "b");
        assert_eq!(total, 800);
    }
}

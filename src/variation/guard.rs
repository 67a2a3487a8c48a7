//! # Uniqueness Guard
//!
//! Runs synthesized content through the full variation pipeline and
//! screens the result against everything the guard has already passed:
//!
//! 1. opening/closing style rotation
//! 2. transition-phrase injection
//! 3. synonym substitution at the position-scaled rate
//! 4. sentence restructuring
//! 5. masked fingerprint, rejected on collision
//! 6. Jaccard uniqueness score against a bounded corpus sample
//!
//! The fingerprint set and the word-set corpus live behind a single lock,
//! so a check-then-insert cannot race between concurrent batch workers.

use lru::LruCache;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::seq::IteratorRandom;
use rand::SeedableRng;
use std::collections::{BTreeSet, HashSet};
use std::num::NonZeroUsize;
use std::sync::Arc;
use thiserror::Error;

use crate::fingerprint::compute_fingerprint;
use crate::policy::GenerationPolicyV1;
use crate::similarity::{max_similarity, uniqueness_score, word_set};
use crate::types::{SynthesizedContent, VariedContent};

use super::history::PatternUsageHistory;
use super::restructure::restructure_sentences;
use super::style::apply_opening_and_closing;
use super::synonyms::substitute;
use super::transitions::inject_transitions;

/// Word-set corpus entries retained for similarity sampling.
const CORPUS_CAPACITY: usize = 512;

/// Errors raised when varied content is still too close to prior output.
#[derive(Debug, Error)]
pub enum VariationError {
    /// The varied body collided with prior output, by fingerprint or by
    /// Jaccard similarity above the policy threshold.
    #[error("near-duplicate content (fingerprint {fingerprint})")]
    NearDuplicate {
        /// Masked fingerprint of the rejected body.
        fingerprint: String,
    },
}

struct GuardState {
    seen: HashSet<String>,
    corpus: LruCache<String, BTreeSet<String>>,
}

/// Thread-safe variation pipeline with duplicate screening.
pub struct UniquenessGuard {
    policy: GenerationPolicyV1,
    history: Arc<PatternUsageHistory>,
    state: Mutex<GuardState>,
}

impl UniquenessGuard {
    /// Construct a guard with an empty corpus.
    pub fn new(policy: GenerationPolicyV1) -> Self {
        Self::with_history(policy, Arc::new(PatternUsageHistory::new()))
    }

    /// Construct a guard sharing an existing usage history, e.g. one
    /// merged from a previous run.
    pub fn with_history(policy: GenerationPolicyV1, history: Arc<PatternUsageHistory>) -> Self {
        let capacity = NonZeroUsize::new(CORPUS_CAPACITY).unwrap_or(NonZeroUsize::MIN);
        Self {
            policy,
            history,
            state: Mutex::new(GuardState {
                seen: HashSet::new(),
                corpus: LruCache::new(capacity),
            }),
        }
    }

    /// The usage history backing rotation decisions.
    pub fn history(&self) -> &Arc<PatternUsageHistory> {
        &self.history
    }

    fn vary_body(
        &self,
        content: &SynthesizedContent,
        keyword: &str,
        position: usize,
        batch_size: usize,
        seed: u64,
    ) -> String {
        let mut rng = StdRng::seed_from_u64(seed);
        let rate = self.policy.substitution_rate(position, batch_size);

        let body = apply_opening_and_closing(
            &content.body,
            &content.title,
            keyword,
            &self.history,
        );
        let body = inject_transitions(&body, self.policy.transition_interval, &self.history);
        let body = substitute(&body, rate, keyword, &mut rng, &self.history);
        restructure_sentences(&body, self.policy.restructure_interval, &self.history)
    }

    /// Vary a synthesized body and admit it if it is not a near-duplicate.
    ///
    /// On success the body's fingerprint and word set are recorded, so a
    /// later identical submission is rejected. The returned score is the
    /// uniqueness against a sample of the corpus taken *before* insertion.
    pub fn apply(
        &self,
        content: &SynthesizedContent,
        keyword: &str,
        position: usize,
        batch_size: usize,
        seed: u64,
    ) -> Result<VariedContent, VariationError> {
        self.screen(content, keyword, position, batch_size, seed, false)
    }

    /// Vary a body and admit it even if it is a near-duplicate.
    ///
    /// Used by the accept-and-flag path after a retry has already failed;
    /// the caller is expected to mark the resulting page as flagged.
    pub fn apply_flagged(
        &self,
        content: &SynthesizedContent,
        keyword: &str,
        position: usize,
        batch_size: usize,
        seed: u64,
    ) -> Result<VariedContent, VariationError> {
        self.screen(content, keyword, position, batch_size, seed, true)
    }

    fn screen(
        &self,
        content: &SynthesizedContent,
        keyword: &str,
        position: usize,
        batch_size: usize,
        seed: u64,
        admit_duplicates: bool,
    ) -> Result<VariedContent, VariationError> {
        let body = self.vary_body(content, keyword, position, batch_size, seed);
        let fingerprint = compute_fingerprint(&body);
        let words = word_set(&body);

        let mut rng = StdRng::seed_from_u64(seed ^ 0x9e37_79b9_7f4a_7c15);
        let mut state = self.state.lock();

        if !admit_duplicates && state.seen.contains(&fingerprint) {
            return Err(VariationError::NearDuplicate { fingerprint });
        }

        let sample: Vec<&BTreeSet<String>> = state
            .corpus
            .iter()
            .map(|(_, set)| set)
            .choose_multiple(&mut rng, self.policy.similarity_sample_size);
        let max_sim = max_similarity(&words, sample);
        let score = uniqueness_score(max_sim);

        if !admit_duplicates && max_sim >= self.policy.near_duplicate_jaccard {
            return Err(VariationError::NearDuplicate { fingerprint });
        }

        state.seen.insert(fingerprint.clone());
        state.corpus.put(fingerprint.clone(), words);
        drop(state);

        Ok(VariedContent {
            title: content.title.clone(),
            body,
            fingerprint,
            uniqueness_score: score,
            variation_seed: seed,
        })
    }
}

//! Generation policy v1: every heuristic constant as configuration.
//!
//! The thresholds in this module (quality weights, density band, Jaccard
//! near-duplicate threshold, substitution rate curve) are empirically chosen
//! defaults with no derivation behind them. They live here as configuration
//! rather than hard-coded constants so runs can be calibrated without code
//! changes, and so any tuning is visible in provenance via `params_hash`.
//!
//! ## Float Normalization for Deterministic Hashing
//!
//! Floats are quantized to integers before hashing to avoid cross-platform
//! serialization differences. The quantization factor is 1e6 (multiply by
//! 1,000,000 and round to i64).

use serde::{Deserialize, Serialize};

use crate::fingerprint::canonical_hash_hex;
use crate::DEFAULT_POLICY_VERSION;

/// Quantization factor for float normalization.
const FLOAT_QUANTIZATION_FACTOR: f64 = 1_000_000.0;

fn quantize_float(value: f32) -> i64 {
    ((value as f64) * FLOAT_QUANTIZATION_FACTOR).round() as i64
}

/// Weights for the composite quality score.
///
/// Each weight is awarded when its structural check passes; the composite
/// is capped at 100.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityWeights {
    /// Awarded when the minimum word count is met.
    pub word_count: f32,
    /// Awarded when the body contains at least one heading.
    pub headings: f32,
    /// Awarded when the body contains at least one list.
    pub lists: f32,
    /// Awarded when the minimum paragraph count is met.
    pub paragraphs: f32,
    /// Awarded when keyword density falls inside the target band.
    pub keyword_density: f32,
}

impl Default for QualityWeights {
    fn default() -> Self {
        Self {
            word_count: 25.0,
            headings: 20.0,
            lists: 15.0,
            paragraphs: 20.0,
            keyword_density: 20.0,
        }
    }
}

impl QualityWeights {
    fn to_quantized(&self) -> QuantizedQualityWeights {
        QuantizedQualityWeights {
            word_count: quantize_float(self.word_count),
            headings: quantize_float(self.headings),
            lists: quantize_float(self.lists),
            paragraphs: quantize_float(self.paragraphs),
            keyword_density: quantize_float(self.keyword_density),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct QuantizedQualityWeights {
    word_count: i64,
    headings: i64,
    lists: i64,
    paragraphs: i64,
    keyword_density: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct QuantizedPolicyParams {
    version: String,
    min_word_count: usize,
    min_paragraphs: usize,
    density_min: i64,
    density_max: i64,
    quality_weights: QuantizedQualityWeights,
    accept_threshold: i64,
    similarity_sample_size: usize,
    near_duplicate_jaccard: i64,
    substitution_base: i64,
    substitution_slope: i64,
    substitution_max: i64,
    transition_interval: usize,
    restructure_interval: usize,
    group_size: usize,
    provider_timeout_secs: u64,
    max_output_len: usize,
    slug_max_len: usize,
    flag_duplicates: bool,
    sample_dataset_size: usize,
}

/// Generation policy version 1.
///
/// Controls every tunable of a generation run: quality gating, uniqueness
/// guarding, variation aggressiveness, batch shape, and provider limits.
///
/// ## Parameters
///
/// - `min_word_count` / `min_paragraphs` / `density_min..density_max`:
///   structural quality checks
/// - `accept_threshold`: minimum composite quality score for acceptance
/// - `similarity_sample_size`: prior items sampled for uniqueness scoring
/// - `near_duplicate_jaccard`: pairwise similarity above which an item is
///   treated as a near-duplicate (values above 1.0 disable the check)
/// - `substitution_base/slope/max`: vocabulary substitution rate curve over
///   batch position; later items in a large batch diverge more
/// - `group_size`: combinations synthesized concurrently per group
/// - `flag_duplicates`: accept-and-flag (true) vs drop (false) after the one
///   fingerprint-collision retry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationPolicyV1 {
    /// Policy version identifier.
    pub version: String,
    /// Minimum body word count for the quality check.
    pub min_word_count: usize,
    /// Minimum paragraph count for the quality check.
    pub min_paragraphs: usize,
    /// Lower bound of the keyword density target band (percent).
    pub density_min: f32,
    /// Upper bound of the keyword density target band (percent).
    pub density_max: f32,
    /// Quality score weights.
    pub quality_weights: QualityWeights,
    /// Minimum quality score for acceptance.
    pub accept_threshold: f32,
    /// Number of prior items sampled for uniqueness scoring.
    pub similarity_sample_size: usize,
    /// Pairwise Jaccard similarity treated as a near-duplicate.
    pub near_duplicate_jaccard: f32,
    /// Base vocabulary substitution rate (fraction of synonymable words).
    pub substitution_base: f32,
    /// Substitution rate growth over relative batch position.
    pub substitution_slope: f32,
    /// Hard cap on the substitution rate.
    pub substitution_max: f32,
    /// Minimum sentences between injected transitions.
    pub transition_interval: usize,
    /// Restructure roughly every Nth sentence.
    pub restructure_interval: usize,
    /// Combinations processed concurrently per group.
    pub group_size: usize,
    /// Per-provider call timeout in seconds.
    pub provider_timeout_secs: u64,
    /// Maximum output size requested from providers (characters).
    pub max_output_len: usize,
    /// Maximum slug length in characters.
    pub slug_max_len: usize,
    /// Accept-and-flag fingerprint collisions instead of dropping them.
    pub flag_duplicates: bool,
    /// Values generated per variable by the sample-dataset fallback.
    pub sample_dataset_size: usize,
}

impl GenerationPolicyV1 {
    /// Get the policy ID.
    pub fn policy_id(&self) -> &str {
        &self.version
    }

    /// Compute a hash of the policy parameters.
    ///
    /// Uses quantized float representation (×1e6, rounded to i64) so the
    /// hash is stable across platforms and serializer versions.
    pub fn params_hash(&self) -> String {
        canonical_hash_hex(&self.to_quantized())
    }

    /// Vocabulary substitution rate for an item at `position` of `batch_size`.
    ///
    /// `rate = base + slope × (position / batch_size)`, capped at
    /// `substitution_max`. Early items in small batches stay close to the
    /// canonical voice; late items in large batches diverge more.
    pub fn substitution_rate(&self, position: usize, batch_size: usize) -> f32 {
        let relative = if batch_size == 0 {
            0.0
        } else {
            position as f32 / batch_size as f32
        };
        (self.substitution_base + self.substitution_slope * relative).min(self.substitution_max)
    }

    fn to_quantized(&self) -> QuantizedPolicyParams {
        QuantizedPolicyParams {
            version: self.version.clone(),
            min_word_count: self.min_word_count,
            min_paragraphs: self.min_paragraphs,
            density_min: quantize_float(self.density_min),
            density_max: quantize_float(self.density_max),
            quality_weights: self.quality_weights.to_quantized(),
            accept_threshold: quantize_float(self.accept_threshold),
            similarity_sample_size: self.similarity_sample_size,
            near_duplicate_jaccard: quantize_float(self.near_duplicate_jaccard),
            substitution_base: quantize_float(self.substitution_base),
            substitution_slope: quantize_float(self.substitution_slope),
            substitution_max: quantize_float(self.substitution_max),
            transition_interval: self.transition_interval,
            restructure_interval: self.restructure_interval,
            group_size: self.group_size,
            provider_timeout_secs: self.provider_timeout_secs,
            max_output_len: self.max_output_len,
            slug_max_len: self.slug_max_len,
            flag_duplicates: self.flag_duplicates,
            sample_dataset_size: self.sample_dataset_size,
        }
    }
}

impl Default for GenerationPolicyV1 {
    fn default() -> Self {
        Self {
            version: DEFAULT_POLICY_VERSION.to_string(),
            min_word_count: 300,
            min_paragraphs: 3,
            density_min: 1.5,
            density_max: 3.5,
            quality_weights: QualityWeights::default(),
            accept_threshold: 60.0,
            similarity_sample_size: 10,
            near_duplicate_jaccard: 0.9,
            substitution_base: 0.1,
            substitution_slope: 0.2,
            substitution_max: 0.35,
            transition_interval: 3,
            restructure_interval: 3,
            group_size: 5,
            provider_timeout_secs: 30,
            max_output_len: 8_000,
            slug_max_len: 100,
            flag_duplicates: true,
            sample_dataset_size: 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_hash_determinism() {
        let a = GenerationPolicyV1::default();
        let b = GenerationPolicyV1::default();
        assert_eq!(a.params_hash(), b.params_hash());
    }

    #[test]
    fn test_params_hash_changes_with_parameter() {
        let a = GenerationPolicyV1::default();
        let mut b = GenerationPolicyV1::default();
        b.similarity_sample_size = 25;
        assert_ne!(a.params_hash(), b.params_hash());
    }

    #[test]
    fn test_substitution_rate_curve() {
        let policy = GenerationPolicyV1::default();

        let early = policy.substitution_rate(0, 100);
        let late = policy.substitution_rate(99, 100);
        assert!(early < late, "later items substitute more aggressively");
        assert!((early - policy.substitution_base).abs() < 0.01);
        assert!(late <= policy.substitution_max);
    }

    #[test]
    fn test_substitution_rate_empty_batch() {
        let policy = GenerationPolicyV1::default();
        assert_eq!(policy.substitution_rate(0, 0), policy.substitution_base);
    }
}

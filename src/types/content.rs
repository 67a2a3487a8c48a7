//! Content payloads as they move through the generation pipeline.

use serde::{Deserialize, Serialize};

/// Raw content returned by the text-generation collaborator for one
/// combination, before any uniqueness transformation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynthesizedContent {
    /// Product-order index of the originating combination.
    pub combination_index: usize,
    /// Page title (from the combination, not the provider).
    pub title: String,
    /// Provider-generated body text.
    pub body: String,
    /// The prompt context the provider was called with.
    pub prompt_context: String,
    /// Name of the provider that produced the text.
    pub provider: String,
}

/// Content after the uniqueness guard has transformed it.
///
/// Carries the run-scoped near-duplicate fingerprint and the uniqueness
/// score computed against a sample of prior content from the same run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariedContent {
    /// Page title.
    pub title: String,
    /// Transformed body text.
    pub body: String,
    /// Normalized xxh64 fingerprint of the body (hex).
    pub fingerprint: String,
    /// Uniqueness score in `[0, 100]`; 100 against an empty prior corpus.
    pub uniqueness_score: f32,
    /// Seed the variation pipeline ran with (for reproducibility).
    pub variation_seed: u64,
}

//! # pagegen-kernel
//!
//! Deterministic combinatorial page generation with uniqueness screening.
//!
//! The kernel answers one question:
//!
//! > Given a template and its variable datasets, which pages get created,
//! > and how is each one guaranteed to be **distinct enough to keep**?
//!
//! ## Core Contract
//!
//! 1. Enumerate the variable cartesian product in a stable, resumable order
//! 2. Synthesize each page through a provider fallback chain
//! 3. Vary, fingerprint, and score each body before acceptance
//! 4. Persist accepted pages with a content hash that blocks duplicates
//!
//! ## Architecture
//!
//! ```text
//! Template → CombinationEnumerator → ProviderChain → UniquenessGuard
//!                     ↓                                     ↓
//!              GenerationPolicyV1 ──────────────→ QualityScorer → PageStore
//! ```
//!
//! ## Determinism Guarantees
//!
//! - Same template + same datasets → identical combination order and indexes
//! - Same body + same variation seed + same usage history → identical output
//! - Fingerprints and content hashes are stable across runs and platforms

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod batch;
pub mod enumerate;
pub mod fingerprint;
pub mod policy;
pub mod quality;
pub mod similarity;
pub mod store;
pub mod synth;
pub mod telemetry;
pub mod types;
pub mod variation;

// Re-exports
pub use types::{
    BodySection, Combination, DatasetError, GeneratedPage, PageId, PagePreview, PageStatus,
    QualityMetrics, SynthesizedContent, Template, TemplateError, TemplateId, TemplateSections,
    ValueRecord, VariableDataset, VariedContent,
};
pub use types::template::{extract_placeholders, fill_pattern};
pub use types::combination::slugify;
pub use enumerate::{CombinationEnumerator, EnumerateError, EnumerateOptions, sample_dataset};
pub use fingerprint::{
    canonical_hash_hex, compute_content_hash, compute_fingerprint, normalize_for_fingerprint,
    normalize_text, to_canonical_bytes, NORMALIZATION_VERSION,
};
pub use similarity::{jaccard, max_similarity, uniqueness_score, word_set};
pub use policy::{GenerationPolicyV1, QualityWeights};
pub use synth::{build_prompt, BusinessContext, GenerationError, ProviderChain, TextProvider};
pub use variation::{
    PatternUsageHistory, StyleClass, UniquenessGuard, VariationError, VariationSlot,
};
pub use quality::QualityScorer;
pub use store::{AcceptOutcome, InMemoryPageStore, PageStore};
pub use batch::{
    BatchDriver, BatchError, BatchProgress, BatchSummary, CancellationHandle, ItemOutcome,
    ItemReport, ProgressSnapshot,
};

/// Schema version for all page kernel types.
/// Increment on breaking changes to any schema type.
pub const PAGEGEN_SCHEMA_VERSION: &str = "1.0.0";

/// Default policy version identifier.
pub const DEFAULT_POLICY_VERSION: &str = "generation_policy_v1";

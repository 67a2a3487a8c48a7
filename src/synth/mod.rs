//! Content synthesis boundary.
//!
//! The kernel does no text generation itself. It depends on the
//! [`TextProvider`] capability: any object that can turn a prompt into
//! text. It also composes providers into a fallback chain ([`chain`]). New
//! providers are added by appending to the chain, never by branching on a
//! provider name, and the whole surface is mockable with zero network
//! dependency.

pub mod chain;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::types::Combination;

pub use chain::ProviderChain;

/// Error raised by a provider or the fallback chain.
///
/// All generation errors are per-item: the batch driver records them and
/// continues; they never abort a batch.
#[derive(Debug, Clone, thiserror::Error)]
pub enum GenerationError {
    /// A provider call failed.
    #[error("Provider {provider} failed: {message}")]
    ProviderFailed {
        /// Provider that failed.
        provider: String,
        /// Provider-reported failure detail.
        message: String,
    },
    /// A provider call exceeded its time bound.
    #[error("Provider {provider} timed out after {secs}s")]
    Timeout {
        /// Provider that timed out.
        provider: String,
        /// The timeout that was applied.
        secs: u64,
    },
    /// A provider returned an empty result.
    #[error("Provider {provider} returned empty output")]
    EmptyResult {
        /// Provider that returned nothing.
        provider: String,
    },
    /// Every provider in the chain failed for this item.
    #[error("All {attempts} providers exhausted")]
    AllProvidersExhausted {
        /// Number of providers tried.
        attempts: usize,
    },
}

/// Capability interface for text-generation providers.
///
/// Implementations wrap a concrete service; the kernel never depends on a
/// specific provider's wire format. Any implementor can participate in the
/// fallback chain, including in-process test doubles.
#[async_trait]
pub trait TextProvider: Send + Sync {
    /// Stable provider name, used for attribution and logging.
    fn name(&self) -> &str;

    /// Generate text for a prompt, bounded to `max_len` characters.
    async fn generate(&self, prompt: &str, max_len: usize) -> Result<String, GenerationError>;
}

/// Business context threaded into every synthesis prompt.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BusinessContext {
    /// One-line business description.
    pub description: String,
    /// The target keyword pages are optimized for.
    pub target_keyword: String,
    /// Optional extra prompt facts (label → text).
    pub extras: BTreeMap<String, String>,
}

impl BusinessContext {
    /// Create a context from description and keyword.
    pub fn new(description: impl Into<String>, target_keyword: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            target_keyword: target_keyword.into(),
            extras: BTreeMap::new(),
        }
    }
}

/// Build the prompt for one combination.
///
/// Deterministic: the same combination and context always produce the same
/// prompt, so retried items re-ask the same question.
pub fn build_prompt(combination: &Combination, context: &BusinessContext) -> String {
    let mut prompt = format!(
        "Write a detailed page titled \"{}\".\nBusiness: {}\nTarget keyword: {}\n",
        combination.title, context.description, context.target_keyword
    );
    for (variable, value) in combination.plain_values() {
        prompt.push_str(&format!("{}: {}\n", variable, value));
    }
    for (label, text) in &context.extras {
        prompt.push_str(&format!("{}: {}\n", label, text));
    }
    prompt.push_str("Use headings, lists, and several paragraphs. Mention the target keyword naturally.");
    prompt
}

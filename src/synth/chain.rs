//! Provider fallback chain.
//!
//! Providers are tried in priority order; any failure, timeout, or empty
//! result feeds the next provider. Exhaustion is a per-item failure
//! ([`GenerationError::AllProvidersExhausted`]); the batch continues.

use std::sync::Arc;
use std::time::Duration;

use crate::types::{Combination, SynthesizedContent};

use super::{build_prompt, BusinessContext, GenerationError, TextProvider};

/// Ordered fallback chain over interchangeable text providers.
///
/// Each provider call is bounded by a fixed timeout; a timeout is a failure
/// like any other. The chain is the only retry mechanism for generation
/// failures.
pub struct ProviderChain {
    providers: Vec<Arc<dyn TextProvider>>,
    timeout: Duration,
    max_output_len: usize,
}

impl ProviderChain {
    /// Create a chain from providers in priority order.
    pub fn new(providers: Vec<Arc<dyn TextProvider>>, timeout_secs: u64, max_output_len: usize) -> Self {
        Self {
            providers,
            timeout: Duration::from_secs(timeout_secs),
            max_output_len,
        }
    }

    /// Append a provider at the lowest priority.
    pub fn push(&mut self, provider: Arc<dyn TextProvider>) {
        self.providers.push(provider);
    }

    /// Number of providers in the chain.
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// Check if the chain has no providers.
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Synthesize content for one combination.
    ///
    /// Tries each provider in order until one returns non-empty text within
    /// the time bound. The returned [`SynthesizedContent`] records which
    /// provider produced it and the prompt it was asked.
    pub async fn synthesize(
        &self,
        combination: &Combination,
        context: &BusinessContext,
    ) -> Result<SynthesizedContent, GenerationError> {
        let prompt = build_prompt(combination, context);

        for provider in &self.providers {
            let attempt = tokio::time::timeout(
                self.timeout,
                provider.generate(&prompt, self.max_output_len),
            )
            .await;

            let outcome = match attempt {
                Err(_) => Err(GenerationError::Timeout {
                    provider: provider.name().to_string(),
                    secs: self.timeout.as_secs(),
                }),
                Ok(Err(e)) => Err(e),
                Ok(Ok(text)) if text.trim().is_empty() => Err(GenerationError::EmptyResult {
                    provider: provider.name().to_string(),
                }),
                Ok(Ok(text)) => Ok(text),
            };

            match outcome {
                Ok(body) => {
                    return Ok(SynthesizedContent {
                        combination_index: combination.index,
                        title: combination.title.clone(),
                        body,
                        prompt_context: prompt,
                        provider: provider.name().to_string(),
                    });
                }
                Err(error) => {
                    tracing::warn!(
                        provider = provider.name(),
                        combination_index = combination.index,
                        %error,
                        "provider attempt failed, falling back"
                    );
                }
            }
        }

        Err(GenerationError::AllProvidersExhausted {
            attempts: self.providers.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ValueRecord;
    use async_trait::async_trait;
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedProvider {
        name: String,
        output: Option<String>,
        calls: AtomicUsize,
    }

    impl FixedProvider {
        fn ok(name: &str, output: &str) -> Arc<Self> {
            Arc::new(Self {
                name: name.to_string(),
                output: Some(output.to_string()),
                calls: AtomicUsize::new(0),
            })
        }

        fn failing(name: &str) -> Arc<Self> {
            Arc::new(Self {
                name: name.to_string(),
                output: None,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl TextProvider for FixedProvider {
        fn name(&self) -> &str {
            &self.name
        }

        async fn generate(&self, _prompt: &str, _max_len: usize) -> Result<String, GenerationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.output {
                Some(text) => Ok(text.clone()),
                None => Err(GenerationError::ProviderFailed {
                    provider: self.name.clone(),
                    message: "simulated outage".to_string(),
                }),
            }
        }
    }

    fn combo() -> Combination {
        let mut values = BTreeMap::new();
        values.insert("City".to_string(), ValueRecord::new("Austin", "test"));
        Combination::new(0, values, "[City] Provider", 100)
    }

    #[tokio::test]
    async fn test_first_provider_wins() {
        let primary = FixedProvider::ok("primary", "primary text");
        let backup = FixedProvider::ok("backup", "backup text");
        let chain = ProviderChain::new(vec![primary.clone(), backup.clone()], 5, 1000);

        let content = chain
            .synthesize(&combo(), &BusinessContext::new("biz", "kw"))
            .await
            .unwrap();

        assert_eq!(content.provider, "primary");
        assert_eq!(content.body, "primary text");
        assert_eq!(backup.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_fallback_on_failure() {
        let primary = FixedProvider::failing("primary");
        let backup = FixedProvider::ok("backup", "backup text");
        let chain = ProviderChain::new(vec![primary, backup], 5, 1000);

        let content = chain
            .synthesize(&combo(), &BusinessContext::new("biz", "kw"))
            .await
            .unwrap();
        assert_eq!(content.provider, "backup");
    }

    #[tokio::test]
    async fn test_empty_output_feeds_fallback() {
        let empty = FixedProvider::ok("empty", "   ");
        let backup = FixedProvider::ok("backup", "real text");
        let chain = ProviderChain::new(vec![empty, backup], 5, 1000);

        let content = chain
            .synthesize(&combo(), &BusinessContext::new("biz", "kw"))
            .await
            .unwrap();
        assert_eq!(content.provider, "backup");
    }

    #[tokio::test]
    async fn test_exhaustion() {
        let chain = ProviderChain::new(
            vec![FixedProvider::failing("a"), FixedProvider::failing("b")],
            5,
            1000,
        );
        let result = chain
            .synthesize(&combo(), &BusinessContext::new("biz", "kw"))
            .await;
        assert!(matches!(
            result,
            Err(GenerationError::AllProvidersExhausted { attempts: 2 })
        ));
    }
}

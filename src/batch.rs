//! # Batch Orchestration
//!
//! Drives a whole generation run: enumerate combinations for a template,
//! synthesize each through the provider chain, push the result through the
//! uniqueness guard and quality gate, and persist accepted pages.
//!
//! ## Execution model
//!
//! Combinations are processed in groups of `policy.group_size`. Items
//! within a group run concurrently on spawned tasks; groups run strictly
//! in order, and cancellation is checked between groups. One item's
//! failure never aborts the batch: it is recorded in that item's report
//! and the run continues.
//!
//! ## Duplicate handling
//!
//! A near-duplicate from the guard earns one retry with a perturbed
//! variation seed. If the retry also collides, the page is either
//! accepted with [`PageStatus::FlaggedDuplicate`] (when the policy flags
//! duplicates) or counted as a duplicate rejection.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use thiserror::Error;

use crate::enumerate::{CombinationEnumerator, EnumerateError, EnumerateOptions};
use crate::fingerprint::compute_content_hash;
use crate::policy::GenerationPolicyV1;
use crate::quality::QualityScorer;
use crate::store::{AcceptOutcome, PageStore};
use crate::synth::{BusinessContext, ProviderChain};
use crate::types::{
    Combination, GeneratedPage, PageId, PageStatus, Template, VariableDataset,
};
use crate::variation::{UniquenessGuard, VariationError};

/// Errors that abort a whole batch (item-level failures do not).
#[derive(Debug, Error)]
pub enum BatchError {
    /// Enumeration failed before any item ran.
    #[error(transparent)]
    Enumerate(#[from] EnumerateError),
    /// The store failed while persisting a page.
    #[error("store error: {0}")]
    Store(String),
    /// A worker task panicked or was aborted.
    #[error("worker task failed: {0}")]
    Worker(String),
    /// Every attempted item was rejected or failed.
    #[error("no pages accepted out of {attempted} attempted")]
    NoPagesAccepted {
        /// Items attempted before the batch came up empty.
        attempted: usize,
    },
}

/// How a single batch item concluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemOutcome {
    /// Page accepted and stored.
    Accepted,
    /// Page stored but flagged as a near-duplicate.
    FlaggedDuplicate,
    /// Rejected by the guard or the store as a duplicate.
    DuplicateRejected,
    /// Rejected by the quality gate.
    QualityRejected,
    /// Synthesis failed after exhausting the provider chain.
    Failed,
}

/// Per-item record in a [`BatchSummary`].
#[derive(Debug, Clone)]
pub struct ItemReport {
    /// Product-order combination index.
    pub index: usize,
    /// Derived page title.
    pub title: String,
    /// Final outcome.
    pub outcome: ItemOutcome,
    /// Provider that produced the content, when synthesis succeeded.
    pub provider: Option<String>,
    /// Error text, when the item failed.
    pub error: Option<String>,
    /// Stored page ID, when a page was persisted.
    pub page_id: Option<PageId>,
}

/// Live counters for a running batch.
///
/// Shared between the driver and any observer thread; a consistent view
/// is obtained via [`BatchProgress::snapshot`].
#[derive(Debug, Default)]
pub struct BatchProgress {
    attempted: AtomicUsize,
    accepted: AtomicUsize,
    flagged: AtomicUsize,
    rejected_quality: AtomicUsize,
    rejected_duplicate: AtomicUsize,
    failed: AtomicUsize,
}

/// Point-in-time copy of batch counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProgressSnapshot {
    /// Items whose processing has started.
    pub attempted: usize,
    /// Pages accepted and stored.
    pub accepted: usize,
    /// Pages stored with a duplicate flag.
    pub flagged: usize,
    /// Items rejected by the quality gate.
    pub rejected_quality: usize,
    /// Items rejected as duplicates.
    pub rejected_duplicate: usize,
    /// Items that failed synthesis or persistence.
    pub failed: usize,
}

impl BatchProgress {
    /// Read all counters.
    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            attempted: self.attempted.load(Ordering::Relaxed),
            accepted: self.accepted.load(Ordering::Relaxed),
            flagged: self.flagged.load(Ordering::Relaxed),
            rejected_quality: self.rejected_quality.load(Ordering::Relaxed),
            rejected_duplicate: self.rejected_duplicate.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }
}

/// Handle for requesting cooperative cancellation of a batch.
#[derive(Debug, Clone, Default)]
pub struct CancellationHandle {
    flag: Arc<AtomicBool>,
}

impl CancellationHandle {
    /// Create a fresh, un-cancelled handle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Takes effect at the next group boundary.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// Final accounting for a completed (or cancelled) batch.
#[derive(Debug)]
pub struct BatchSummary {
    /// Counter totals.
    pub progress: ProgressSnapshot,
    /// One report per attempted item, in product order.
    pub reports: Vec<ItemReport>,
    /// Whether the batch stopped early on cancellation.
    pub cancelled: bool,
}

/// Orchestrates enumeration, synthesis, variation, scoring, and storage.
pub struct BatchDriver<S: PageStore + 'static> {
    chain: Arc<ProviderChain>,
    guard: Arc<UniquenessGuard>,
    scorer: Arc<QualityScorer>,
    store: Arc<S>,
    policy: GenerationPolicyV1,
    progress: Mutex<Arc<BatchProgress>>,
    base_seed: u64,
}

struct ItemContext {
    chain: Arc<ProviderChain>,
    guard: Arc<UniquenessGuard>,
    scorer: Arc<QualityScorer>,
    policy: GenerationPolicyV1,
    progress: Arc<BatchProgress>,
    context: BusinessContext,
}

impl<S: PageStore + 'static> BatchDriver<S> {
    /// Assemble a driver from its stages.
    pub fn new(
        chain: Arc<ProviderChain>,
        guard: Arc<UniquenessGuard>,
        store: Arc<S>,
        policy: GenerationPolicyV1,
        base_seed: u64,
    ) -> Self {
        let scorer = Arc::new(QualityScorer::new(policy.clone()));
        Self {
            chain,
            guard,
            scorer,
            store,
            policy,
            progress: Mutex::new(Arc::new(BatchProgress::default())),
            base_seed,
        }
    }

    /// Live counters for the current (or most recent) run.
    ///
    /// Each [`run`](Self::run) starts from zeroed counters; fetch the
    /// handle again after starting a new run to observe it.
    pub fn progress(&self) -> Arc<BatchProgress> {
        Arc::clone(&self.progress.lock())
    }

    fn item_seed(&self, index: usize) -> u64 {
        self.base_seed
            .wrapping_add((index as u64).wrapping_mul(0x9e37_79b9_7f4a_7c15))
    }

    /// Run a full batch for a template against bound datasets.
    ///
    /// Returns a summary with one report per attempted item. Fails with
    /// [`BatchError::NoPagesAccepted`] only when items were attempted and
    /// none was stored.
    pub async fn run(
        &self,
        template: &Template,
        datasets: &BTreeMap<String, VariableDataset>,
        context: &BusinessContext,
        options: &EnumerateOptions,
        cancel: &CancellationHandle,
    ) -> Result<BatchSummary, BatchError> {
        let enumerator =
            CombinationEnumerator::new(self.policy.slug_max_len, self.policy.sample_dataset_size);
        let combinations = enumerator.enumerate(template, datasets, options)?;
        let batch_size = combinations.len();

        // Counters are scoped to this run; the driver handle follows along
        // so observers always see the run in flight.
        let run_progress = Arc::new(BatchProgress::default());
        *self.progress.lock() = Arc::clone(&run_progress);

        tracing::info!(
            template_id = %template.id,
            combinations = batch_size,
            group_size = self.policy.group_size,
            "starting batch"
        );

        let group_size = self.policy.group_size.max(1);
        let mut reports: Vec<ItemReport> = Vec::with_capacity(batch_size);
        let mut cancelled = false;

        for (group_idx, group) in combinations.chunks(group_size).enumerate() {
            if cancel.is_cancelled() {
                tracing::warn!(group = group_idx, "batch cancelled");
                cancelled = true;
                break;
            }

            let mut handles = Vec::with_capacity(group.len());
            for (offset, combination) in group.iter().enumerate() {
                let position = group_idx * group_size + offset;
                let seed = self.item_seed(combination.index);
                let item = ItemContext {
                    chain: Arc::clone(&self.chain),
                    guard: Arc::clone(&self.guard),
                    scorer: Arc::clone(&self.scorer),
                    policy: self.policy.clone(),
                    progress: Arc::clone(&run_progress),
                    context: context.clone(),
                };
                let template_id = template.id;
                let combination = combination.clone();
                let store = Arc::clone(&self.store);
                handles.push(tokio::spawn(async move {
                    process_item(item, store, template_id, combination, position, batch_size, seed)
                        .await
                }));
            }

            for handle in handles {
                let report = handle
                    .await
                    .map_err(|e| BatchError::Worker(e.to_string()))??;
                reports.push(report);
            }
        }

        let progress = run_progress.snapshot();
        tracing::info!(
            template_id = %template.id,
            accepted = progress.accepted,
            flagged = progress.flagged,
            rejected_quality = progress.rejected_quality,
            rejected_duplicate = progress.rejected_duplicate,
            failed = progress.failed,
            cancelled,
            "batch finished"
        );

        if progress.attempted > 0 && progress.accepted == 0 && progress.flagged == 0 {
            return Err(BatchError::NoPagesAccepted {
                attempted: progress.attempted,
            });
        }

        Ok(BatchSummary {
            progress,
            reports,
            cancelled,
        })
    }
}

async fn process_item<S: PageStore>(
    item: ItemContext,
    store: Arc<S>,
    template_id: crate::types::TemplateId,
    combination: Combination,
    position: usize,
    batch_size: usize,
    seed: u64,
) -> Result<ItemReport, BatchError> {
    item.progress.attempted.fetch_add(1, Ordering::Relaxed);
    let keyword = item.context.target_keyword.clone();

    let content = match item.chain.synthesize(&combination, &item.context).await {
        Ok(content) => content,
        Err(e) => {
            item.progress.failed.fetch_add(1, Ordering::Relaxed);
            tracing::warn!(index = combination.index, error = %e, "synthesis failed");
            return Ok(ItemReport {
                index: combination.index,
                title: combination.title.clone(),
                outcome: ItemOutcome::Failed,
                provider: None,
                error: Some(e.to_string()),
                page_id: None,
            });
        }
    };
    let provider = content.provider.clone();

    // One retry on near-duplicate with a perturbed seed, then flag or drop.
    let (varied, status) =
        match item.guard.apply(&content, &keyword, position, batch_size, seed) {
            Ok(v) => (v, PageStatus::Accepted),
            Err(VariationError::NearDuplicate { .. }) => {
                let retry_seed = seed.wrapping_add(1);
                match item
                    .guard
                    .apply(&content, &keyword, position, batch_size, retry_seed)
                {
                    Ok(v) => (v, PageStatus::Accepted),
                    Err(VariationError::NearDuplicate { fingerprint }) => {
                        if item.policy.flag_duplicates {
                            tracing::warn!(
                                index = combination.index,
                                %fingerprint,
                                "near-duplicate after retry; accepting flagged"
                            );
                            let v = item
                                .guard
                                .apply_flagged(
                                    &content,
                                    &keyword,
                                    position,
                                    batch_size,
                                    retry_seed.wrapping_add(1),
                                )
                                .map_err(|e| BatchError::Worker(e.to_string()))?;
                            (v, PageStatus::FlaggedDuplicate)
                        } else {
                            item.progress
                                .rejected_duplicate
                                .fetch_add(1, Ordering::Relaxed);
                            return Ok(ItemReport {
                                index: combination.index,
                                title: combination.title.clone(),
                                outcome: ItemOutcome::DuplicateRejected,
                                provider: Some(provider),
                                error: None,
                                page_id: None,
                            });
                        }
                    }
                }
            }
        };

    let metrics = item.scorer.score(&varied.body, &keyword);
    if metrics.quality_score < item.policy.accept_threshold {
        item.progress.rejected_quality.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(
            index = combination.index,
            score = metrics.quality_score,
            "quality below threshold"
        );
        return Ok(ItemReport {
            index: combination.index,
            title: combination.title.clone(),
            outcome: ItemOutcome::QualityRejected,
            provider: Some(provider),
            error: None,
            page_id: None,
        });
    }

    let content_hash = compute_content_hash(&varied.title, &keyword, &[&varied.body]);
    let page = GeneratedPage::new(
        template_id,
        combination.clone(),
        varied,
        metrics,
        content_hash,
        status,
    );
    let page_id = page.id;

    match store
        .try_accept(page)
        .await
        .map_err(|e| BatchError::Store(e.to_string()))?
    {
        AcceptOutcome::Accepted => {
            let outcome = if status == PageStatus::FlaggedDuplicate {
                item.progress.flagged.fetch_add(1, Ordering::Relaxed);
                ItemOutcome::FlaggedDuplicate
            } else {
                item.progress.accepted.fetch_add(1, Ordering::Relaxed);
                ItemOutcome::Accepted
            };
            Ok(ItemReport {
                index: combination.index,
                title: combination.title,
                outcome,
                provider: Some(provider),
                error: None,
                page_id: Some(page_id),
            })
        }
        AcceptOutcome::DuplicateRejected => {
            item.progress
                .rejected_duplicate
                .fetch_add(1, Ordering::Relaxed);
            Ok(ItemReport {
                index: combination.index,
                title: combination.title,
                outcome: ItemOutcome::DuplicateRejected,
                provider: Some(provider),
                error: None,
                page_id: None,
            })
        }
    }
}

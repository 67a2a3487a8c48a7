//! Generated page records and quality metrics.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::combination::Combination;
use super::content::VariedContent;
use super::template::TemplateId;

/// Unique identifier for a generated page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PageId(Uuid);

impl PageId {
    /// Create a PageId from a UUID.
    pub fn new(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Generate a fresh random PageId.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Get the inner UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Final status of a generated page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PageStatus {
    /// Passed all gates and was persisted.
    Accepted,
    /// Failed the quality gate.
    Rejected,
    /// Synthesis failed (provider chain exhausted).
    Failed,
    /// Fingerprint collided after the one retry; accepted but flagged for
    /// caller review rather than silently dropped.
    FlaggedDuplicate,
}

impl fmt::Display for PageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Accepted => write!(f, "accepted"),
            Self::Rejected => write!(f, "rejected"),
            Self::Failed => write!(f, "failed"),
            Self::FlaggedDuplicate => write!(f, "flagged_duplicate"),
        }
    }
}

/// Structural quality signals for one piece of content.
///
/// `quality_score` is a bounded composite in `[0, 100]`, monotonically
/// non-decreasing as constituent checks pass. It is a gating signal, not a
/// hard reject: the acceptance threshold lives in policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityMetrics {
    /// Total word count of the body.
    pub word_count: usize,
    /// Whether the body contains at least one heading line.
    pub has_headings: bool,
    /// Whether the body contains at least one list item.
    pub has_lists: bool,
    /// Number of paragraphs (blank-line separated blocks).
    pub paragraph_count: usize,
    /// Target keyword density as a percentage of total words.
    pub keyword_density: f32,
    /// Composite score in `[0, 100]`.
    pub quality_score: f32,
}

/// An accepted (or flagged) page produced by a generation run.
///
/// ## Invariant
///
/// No two accepted pages for the same template share a `content_hash`;
/// the page record store enforces this at insert time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedPage {
    /// Unique page identifier.
    pub id: PageId,
    /// Template this page was generated from.
    pub template_id: TemplateId,
    /// The originating combination.
    pub combination: Combination,
    /// Uniqueness-guarded content.
    pub content: VariedContent,
    /// Structural quality metrics.
    pub metrics: QualityMetrics,
    /// SHA-256 hash over title + keyword + body (authoritative dedup key).
    pub content_hash: String,
    /// Final status.
    pub status: PageStatus,
    /// Unix timestamp of creation.
    pub created_at: i64,
}

impl GeneratedPage {
    /// Assemble a page record, stamping the creation time.
    pub fn new(
        template_id: TemplateId,
        combination: Combination,
        content: VariedContent,
        metrics: QualityMetrics,
        content_hash: String,
        status: PageStatus,
    ) -> Self {
        Self {
            id: PageId::generate(),
            template_id,
            combination,
            content,
            metrics,
            content_hash,
            status,
            created_at: chrono::Utc::now().timestamp(),
        }
    }
}

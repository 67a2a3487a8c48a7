//! Page storage backends.

pub mod memory;

use async_trait::async_trait;
use crate::types::{GeneratedPage, PageId, TemplateId};

/// Result of attempting to persist a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcceptOutcome {
    /// Page stored; its content hash was new for the template.
    Accepted,
    /// A page with the same content hash already exists for the template.
    DuplicateRejected,
}

/// Trait for page storage backends.
///
/// `try_accept` must be atomic: the content-hash check and the insert
/// happen under one critical section, so two workers submitting the same
/// hash concurrently cannot both be accepted. All methods are async to
/// support async database access.
#[async_trait]
pub trait PageStore: Send + Sync {
    /// Error type for store operations.
    type Error: std::error::Error + Send + Sync;

    /// Store a page unless its content hash already exists for the
    /// template. Returns which way the race went.
    async fn try_accept(&self, page: GeneratedPage) -> Result<AcceptOutcome, Self::Error>;

    /// Fetch a page by ID.
    async fn get_page(&self, id: &PageId) -> Result<Option<GeneratedPage>, Self::Error>;

    /// Fetch all pages for a template (ordered by combination index).
    async fn pages_for_template(
        &self,
        template_id: &TemplateId,
    ) -> Result<Vec<GeneratedPage>, Self::Error>;

    /// Number of stored pages.
    async fn count(&self) -> Result<usize, Self::Error>;
}

pub use memory::InMemoryPageStore;

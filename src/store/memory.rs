//! In-memory page store.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use super::{AcceptOutcome, PageStore};
use crate::types::{GeneratedPage, PageId, TemplateId};

/// Error type for in-memory store.
#[derive(Debug, Clone, thiserror::Error)]
pub enum InMemoryError {
    /// Page not found.
    #[error("Page not found: {0}")]
    PageNotFound(PageId),
}

#[derive(Debug, Default)]
struct Inner {
    /// Pages by ID.
    pages: BTreeMap<PageId, GeneratedPage>,
    /// Content hashes already accepted, per template.
    hashes: BTreeSet<(TemplateId, String)>,
}

/// In-memory page store.
///
/// Uses BTreeMap/BTreeSet for deterministic iteration order. Cloning is
/// cheap; clones share the same underlying storage.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPageStore {
    inner: Arc<Mutex<Inner>>,
}

impl InMemoryPageStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// All stored pages, ordered by ID.
    pub fn all_pages(&self) -> Vec<GeneratedPage> {
        self.inner.lock().pages.values().cloned().collect()
    }
}

#[async_trait]
impl PageStore for InMemoryPageStore {
    type Error = InMemoryError;

    async fn try_accept(&self, page: GeneratedPage) -> Result<AcceptOutcome, Self::Error> {
        let mut inner = self.inner.lock();
        let key = (page.template_id, page.content_hash.clone());
        if inner.hashes.contains(&key) {
            return Ok(AcceptOutcome::DuplicateRejected);
        }
        inner.hashes.insert(key);
        inner.pages.insert(page.id, page);
        Ok(AcceptOutcome::Accepted)
    }

    async fn get_page(&self, id: &PageId) -> Result<Option<GeneratedPage>, Self::Error> {
        Ok(self.inner.lock().pages.get(id).cloned())
    }

    async fn pages_for_template(
        &self,
        template_id: &TemplateId,
    ) -> Result<Vec<GeneratedPage>, Self::Error> {
        let inner = self.inner.lock();
        let mut pages: Vec<GeneratedPage> = inner
            .pages
            .values()
            .filter(|p| p.template_id == *template_id)
            .cloned()
            .collect();
        pages.sort_by_key(|p| p.combination.index);
        Ok(pages)
    }

    async fn count(&self) -> Result<usize, Self::Error> {
        Ok(self.inner.lock().pages.len())
    }
}

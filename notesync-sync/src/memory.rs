//! In-process [`PageStore`] implementations.
//!
//! - [`MemoryStore`] keeps pages in a `Vec`; used by tests and by dry runs
//!   without credentials.
//! - [`DryRunStore`] forwards queries to a real store and only logs writes.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use notesync_core::{CollectionId, PageProperties};
use notesync_renderer::Block;

use crate::error::RemoteError;
use crate::store::{PageHandle, PageStore};

// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

/// A page held by [`MemoryStore`].
#[derive(Debug, Clone, PartialEq)]
pub struct StoredPage {
    pub handle: PageHandle,
    pub collection: CollectionId,
    pub properties: PageProperties,
    pub blocks: Vec<Block>,
    pub archived: bool,
}

#[derive(Debug, Default)]
struct MemoryState {
    pages: Vec<StoredPage>,
    next_id: usize,
    create_failures: VecDeque<RemoteError>,
    query_failures: VecDeque<RemoteError>,
    archive_failures: VecDeque<RemoteError>,
    queries: usize,
    creates: usize,
    archives: usize,
}

/// Stateful in-memory page store.
///
/// Optionally rejects creates whose total text exceeds a character limit,
/// with the same message shape the remote API uses.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
    content_limit: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    /// Reject creates carrying more than `chars` characters of text.
    pub fn with_content_limit(mut self, chars: usize) -> Self {
        self.content_limit = Some(chars);
        self
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Insert a live page directly, bypassing create.
    pub fn seed(&self, collection: &CollectionId, title: &str) -> PageHandle {
        let mut state = self.state();
        let handle = next_handle(&mut state);
        state.pages.push(StoredPage {
            handle: handle.clone(),
            collection: collection.clone(),
            properties: PageProperties {
                name: title.to_string(),
                date: None,
                tags: vec![],
            },
            blocks: vec![],
            archived: false,
        });
        handle
    }

    /// Fail the next create call with `err`.
    pub fn fail_next_create(&self, err: RemoteError) {
        self.state().create_failures.push_back(err);
    }

    /// Fail the next query call with `err`.
    pub fn fail_next_query(&self, err: RemoteError) {
        self.state().query_failures.push_back(err);
    }

    /// Fail the next archive call with `err`.
    pub fn fail_next_archive(&self, err: RemoteError) {
        self.state().archive_failures.push_back(err);
    }

    /// Every page ever stored, archived ones included, in creation order.
    pub fn pages(&self) -> Vec<StoredPage> {
        self.state().pages.clone()
    }

    /// Live pages in `collection`.
    pub fn live_pages(&self, collection: &CollectionId) -> Vec<StoredPage> {
        self.state()
            .pages
            .iter()
            .filter(|p| !p.archived && &p.collection == collection)
            .cloned()
            .collect()
    }

    pub fn query_calls(&self) -> usize {
        self.state().queries
    }

    pub fn create_calls(&self) -> usize {
        self.state().creates
    }

    pub fn archive_calls(&self) -> usize {
        self.state().archives
    }
}

fn next_handle(state: &mut MemoryState) -> PageHandle {
    state.next_id += 1;
    PageHandle::new(format!("page-{}", state.next_id))
}

fn text_len(blocks: &[Block]) -> usize {
    blocks
        .iter()
        .map(|b| b.plain_text().chars().count() + text_len(b.children()))
        .sum()
}

#[async_trait]
impl PageStore for MemoryStore {
    async fn query_by_title(
        &self,
        collection: &CollectionId,
        title: &str,
    ) -> Result<Vec<PageHandle>, RemoteError> {
        let mut state = self.state();
        state.queries += 1;
        if let Some(err) = state.query_failures.pop_front() {
            return Err(err);
        }
        Ok(state
            .pages
            .iter()
            .filter(|p| !p.archived && &p.collection == collection && p.properties.name == title)
            .map(|p| p.handle.clone())
            .collect())
    }

    async fn create_page(
        &self,
        collection: &CollectionId,
        properties: &PageProperties,
        blocks: &[Block],
    ) -> Result<PageHandle, RemoteError> {
        let mut state = self.state();
        state.creates += 1;
        if let Some(err) = state.create_failures.pop_front() {
            return Err(err);
        }
        if let Some(limit) = self.content_limit {
            let len = text_len(blocks);
            if len > limit {
                return Err(RemoteError::from_api(
                    400,
                    "validation_error",
                    &format!("body.children text length should be ≤ `{limit}`, instead was `{len}`."),
                ));
            }
        }
        let handle = next_handle(&mut state);
        state.pages.push(StoredPage {
            handle: handle.clone(),
            collection: collection.clone(),
            properties: properties.clone(),
            blocks: blocks.to_vec(),
            archived: false,
        });
        Ok(handle)
    }

    async fn archive_page(&self, page: &PageHandle) -> Result<(), RemoteError> {
        let mut state = self.state();
        state.archives += 1;
        if let Some(err) = state.archive_failures.pop_front() {
            return Err(err);
        }
        match state.pages.iter_mut().find(|p| &p.handle == page) {
            Some(stored) => {
                stored.archived = true;
                Ok(())
            }
            None => Err(RemoteError::from_api(
                404,
                "object_not_found",
                &format!("Could not find page with ID: {page}."),
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// DryRunStore
// ---------------------------------------------------------------------------

/// Wraps a store so that queries are real and writes are only logged.
pub struct DryRunStore {
    inner: Arc<dyn PageStore>,
    created: AtomicUsize,
}

impl DryRunStore {
    pub fn new(inner: Arc<dyn PageStore>) -> Self {
        DryRunStore {
            inner,
            created: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl PageStore for DryRunStore {
    async fn query_by_title(
        &self,
        collection: &CollectionId,
        title: &str,
    ) -> Result<Vec<PageHandle>, RemoteError> {
        self.inner.query_by_title(collection, title).await
    }

    async fn create_page(
        &self,
        collection: &CollectionId,
        properties: &PageProperties,
        blocks: &[Block],
    ) -> Result<PageHandle, RemoteError> {
        let n = self.created.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::info!(
            "[dry-run] would create {:?} in {collection} with {} block(s)",
            properties.name,
            blocks.len()
        );
        Ok(PageHandle::new(format!("dry-run-{n}")))
    }

    async fn archive_page(&self, page: &PageHandle) -> Result<(), RemoteError> {
        tracing::info!("[dry-run] would archive page {page}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notesync_renderer::RichText;

    fn db() -> CollectionId {
        CollectionId::from("db")
    }

    fn props(name: &str) -> PageProperties {
        PageProperties {
            name: name.to_string(),
            date: None,
            tags: vec![],
        }
    }

    #[tokio::test]
    async fn query_is_exact_and_case_sensitive() {
        let store = MemoryStore::new();
        store.seed(&db(), "Dotfiles stuff");
        assert_eq!(store.query_by_title(&db(), "Dotfiles stuff").await.unwrap().len(), 1);
        assert!(store.query_by_title(&db(), "dotfiles stuff").await.unwrap().is_empty());
        assert!(store.query_by_title(&db(), "Dotfiles").await.unwrap().is_empty());
        let other = CollectionId::from("other");
        assert!(store.query_by_title(&other, "Dotfiles stuff").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn archived_pages_are_not_found() {
        let store = MemoryStore::new();
        let page = store.seed(&db(), "x");
        store.archive_page(&page).await.unwrap();
        assert!(store.query_by_title(&db(), "x").await.unwrap().is_empty());
        assert_eq!(store.pages().len(), 1);
    }

    #[tokio::test]
    async fn content_limit_rejects_as_too_large() {
        let store = MemoryStore::new().with_content_limit(3);
        let blocks = vec![Block::paragraph(vec![RichText::plain("four")])];
        let err = store.create_page(&db(), &props("x"), &blocks).await.unwrap_err();
        assert_eq!(err.kind, crate::error::RemoteErrorKind::ContentTooLarge);
        assert!(store.create_page(&db(), &props("x"), &[]).await.is_ok());
    }

    #[tokio::test]
    async fn dry_run_forwards_queries_only() {
        let inner = Arc::new(MemoryStore::new());
        inner.seed(&db(), "exists");
        let dry = DryRunStore::new(inner.clone());
        assert_eq!(dry.query_by_title(&db(), "exists").await.unwrap().len(), 1);
        let page = dry.create_page(&db(), &props("new"), &[]).await.unwrap();
        dry.archive_page(&page).await.unwrap();
        assert_eq!(inner.create_calls(), 0);
        assert_eq!(inner.archive_calls(), 0);
        assert_eq!(inner.live_pages(&db()).len(), 1);
    }
}

//! Title-keyed existence checks and archiving.
//!
//! Titles are the only key: two pages with the same `Name` in one collection
//! are indistinguishable here.

use std::sync::Arc;

use notesync_core::CollectionId;

use crate::error::RegistryError;
use crate::retry::RetryPolicy;
use crate::store::{PageHandle, PageStore};

/// Existence and archive operations over a [`PageStore`].
#[derive(Clone)]
pub struct PageRegistry {
    store: Arc<dyn PageStore>,
    retry: RetryPolicy,
}

impl PageRegistry {
    pub fn new(store: Arc<dyn PageStore>, retry: RetryPolicy) -> Self {
        PageRegistry { store, retry }
    }

    async fn matches(
        &self,
        title: &str,
        collection: &CollectionId,
    ) -> Result<Vec<PageHandle>, RegistryError> {
        self.retry
            .run("query by title", || self.store.query_by_title(collection, title))
            .await
            .map_err(|source| RegistryError::Query {
                title: title.to_string(),
                source,
            })
    }

    /// `true` iff at least one live page in `collection` is titled exactly `title`.
    pub async fn exists(
        &self,
        title: &str,
        collection: &CollectionId,
    ) -> Result<bool, RegistryError> {
        Ok(!self.matches(title, collection).await?.is_empty())
    }

    /// Archive every page titled `title`; returns how many matched.
    ///
    /// Archiving is per page and not atomic. The first failed archive stops
    /// the run and is returned; pages archived before it stay archived.
    pub async fn archive_by_title(
        &self,
        title: &str,
        collection: &CollectionId,
    ) -> Result<usize, RegistryError> {
        let pages = self.matches(title, collection).await?;
        for page in &pages {
            self.retry
                .run("archive page", || self.store.archive_page(page))
                .await
                .map_err(|source| RegistryError::Archive {
                    page: page.clone(),
                    title: title.to_string(),
                    source,
                })?;
            tracing::info!("archived page {page} ({title:?})");
        }
        Ok(pages.len())
    }
}

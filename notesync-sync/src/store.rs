//! The remote page store capability.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use notesync_core::{CollectionId, PageProperties};
use notesync_renderer::Block;

use crate::error::RemoteError;

/// Opaque reference to one remote page.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageHandle {
    pub id: String,
}

impl PageHandle {
    pub fn new(id: impl Into<String>) -> Self {
        PageHandle { id: id.into() }
    }
}

impl fmt::Display for PageHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

/// Primitive operations against a remote page collection.
///
/// Implementations are injected into the orchestrator as `Arc<dyn PageStore>`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PageStore: Send + Sync {
    /// Live (non-archived) pages in `collection` whose `Name` equals `title` exactly.
    async fn query_by_title(
        &self,
        collection: &CollectionId,
        title: &str,
    ) -> Result<Vec<PageHandle>, RemoteError>;

    /// Create one page holding `properties` and `blocks`.
    async fn create_page(
        &self,
        collection: &CollectionId,
        properties: &PageProperties,
        blocks: &[Block],
    ) -> Result<PageHandle, RemoteError>;

    /// Soft-delete one page.
    async fn archive_page(&self, page: &PageHandle) -> Result<(), RemoteError>;
}

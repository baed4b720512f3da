//! Per-file synchronization: existence check, tiered rendering, page creation.
//!
//! ## `sync_file` flow
//!
//! 1. Derive identity and properties from the file.
//! 2. `update_existing` → archive pages with the same title; otherwise skip
//!    the file if one exists.
//! 3. Render at `Rich` and create. A size-limit error moves one tier down
//!    (`Rich` → `PlainText` → `Empty`); so does a malformed body at `Rich`.
//!    Anything else fails the file.

use std::sync::Arc;

use notesync_core::{CollectionId, FileRecord, PageProperties, RenderTier, SyncOutcome};
use notesync_renderer::{Block, ContentRenderer, RenderErrorKind};

use crate::error::{RemoteErrorKind, SyncError};
use crate::registry::PageRegistry;
use crate::retry::RetryPolicy;
use crate::store::{PageHandle, PageStore};

/// Per-run switches for [`Orchestrator::sync_file`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SyncOptions {
    /// Archive same-titled pages and recreate instead of skipping.
    pub update_existing: bool,
    /// Retry policy for every remote call made on behalf of one file.
    pub retry: RetryPolicy,
}

/// Drives one file from [`FileRecord`] to [`SyncOutcome`].
#[derive(Clone)]
pub struct Orchestrator {
    store: Arc<dyn PageStore>,
    renderer: ContentRenderer,
    tag_key: String,
}

impl Orchestrator {
    pub fn new(store: Arc<dyn PageStore>, tag_key: impl Into<String>) -> Self {
        Orchestrator {
            store,
            renderer: ContentRenderer::default(),
            tag_key: tag_key.into(),
        }
    }

    pub fn with_renderer(mut self, renderer: ContentRenderer) -> Self {
        self.renderer = renderer;
        self
    }

    /// Properties `file` would be created with.
    pub fn properties(&self, file: &FileRecord) -> PageProperties {
        PageProperties::build(&file.identity(), &file.frontmatter, &self.tag_key)
    }

    /// Synchronize one file. Never fails; errors become [`SyncOutcome::Failed`].
    pub async fn sync_file(
        &self,
        file: &FileRecord,
        collection: &CollectionId,
        options: &SyncOptions,
    ) -> SyncOutcome {
        let outcome = match self.try_sync(file, collection, options).await {
            Ok(outcome) => outcome,
            Err(e) => SyncOutcome::Failed {
                reason: e.to_string(),
            },
        };
        if outcome.is_failed() {
            tracing::warn!("{}: {outcome}", file.path.display());
        } else {
            tracing::info!("{}: {outcome}", file.path.display());
        }
        outcome
    }

    async fn try_sync(
        &self,
        file: &FileRecord,
        collection: &CollectionId,
        options: &SyncOptions,
    ) -> Result<SyncOutcome, SyncError> {
        let properties = self.properties(file);
        let registry = PageRegistry::new(Arc::clone(&self.store), options.retry);

        let archived = if options.update_existing {
            registry
                .archive_by_title(&properties.name, collection)
                .await?
        } else {
            if registry.exists(&properties.name, collection).await? {
                return Ok(SyncOutcome::SkippedExists);
            }
            0
        };

        let (tier, page) = self
            .create_tiered(file, &properties, collection, &options.retry)
            .await?;
        tracing::debug!("created page {page} for {:?} at tier {tier}", properties.name);

        Ok(if archived > 0 {
            SyncOutcome::Replaced { tier, archived }
        } else {
            SyncOutcome::Created { tier }
        })
    }

    async fn create_tiered(
        &self,
        file: &FileRecord,
        properties: &PageProperties,
        collection: &CollectionId,
        retry: &RetryPolicy,
    ) -> Result<(RenderTier, PageHandle), SyncError> {
        let urls = file.frontmatter.urls();
        let mut tier = RenderTier::Rich;
        loop {
            let err = match self.renderer.render(&file.body, &urls, tier) {
                Ok(blocks) => match self.create(collection, properties, &blocks, retry).await {
                    Ok(page) => return Ok((tier, page)),
                    Err(source) => {
                        tracing::debug!(
                            "create failed at tier {tier}; blocks: {}",
                            serde_json::to_string(&blocks).unwrap_or_default()
                        );
                        let advance = source.kind == RemoteErrorKind::ContentTooLarge;
                        let err = SyncError::Create { tier, source };
                        if !advance {
                            return Err(err);
                        }
                        err
                    }
                },
                Err(source) => {
                    let advance = match source.kind() {
                        RenderErrorKind::TooLarge => true,
                        RenderErrorKind::Malformed => tier == RenderTier::Rich,
                    };
                    let err = SyncError::Render { tier, source };
                    if !advance {
                        return Err(err);
                    }
                    err
                }
            };

            match tier.next() {
                Some(next) => {
                    tracing::info!("{}: {err}; retrying at tier {next}", file.path.display());
                    tier = next;
                }
                None => return Err(err),
            }
        }
    }

    async fn create(
        &self,
        collection: &CollectionId,
        properties: &PageProperties,
        blocks: &[Block],
        retry: &RetryPolicy,
    ) -> Result<PageHandle, crate::error::RemoteError> {
        retry
            .run("create page", || {
                self.store.create_page(collection, properties, blocks)
            })
            .await
    }
}

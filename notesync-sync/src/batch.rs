//! Sequential, paced processing of many files into one collection.

use std::time::Duration;

use futures::stream::{self, Stream, StreamExt};
use serde::Serialize;

use notesync_core::{CollectionId, FileRecord, SyncOutcome};

use crate::orchestrator::{Orchestrator, SyncOptions};

const DEFAULT_PACING: Duration = Duration::from_millis(350);

/// Switches for [`run_batch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchOptions {
    /// Delay observed after a file that created a page, before the next file.
    pub pacing: Duration,
    /// End the stream after the first failed file.
    pub abort_on_failure: bool,
    pub sync: SyncOptions,
}

impl Default for BatchOptions {
    fn default() -> Self {
        BatchOptions {
            pacing: DEFAULT_PACING,
            abort_on_failure: false,
            sync: SyncOptions::default(),
        }
    }
}

/// One processed file and its outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchItem {
    pub file: FileRecord,
    pub outcome: SyncOutcome,
}

struct BatchState<'a, I> {
    files: I,
    orchestrator: &'a Orchestrator,
    collection: &'a CollectionId,
    options: &'a BatchOptions,
    pace_next: bool,
    done: bool,
}

/// Synchronize `files` one at a time, in order.
///
/// The returned stream is lazy: nothing is sent to the store until it is
/// polled, and file N+1 starts only after file N's outcome is yielded.
pub fn run_batch<'a, I>(
    orchestrator: &'a Orchestrator,
    files: I,
    collection: &'a CollectionId,
    options: &'a BatchOptions,
) -> impl Stream<Item = BatchItem> + 'a
where
    I: IntoIterator<Item = FileRecord>,
    I::IntoIter: 'a,
{
    let state = BatchState {
        files: files.into_iter(),
        orchestrator,
        collection,
        options,
        pace_next: false,
        done: false,
    };
    stream::unfold(state, |mut st| async move {
        if st.done {
            return None;
        }
        let file = st.files.next()?;
        if st.pace_next {
            tokio::time::sleep(st.options.pacing).await;
        }
        let outcome = st
            .orchestrator
            .sync_file(&file, st.collection, &st.options.sync)
            .await;
        st.pace_next = outcome.wrote_page() && !st.options.pacing.is_zero();
        if outcome.is_failed() && st.options.abort_on_failure {
            tracing::warn!("aborting batch after failure of {}", file.path.display());
            st.done = true;
        }
        Some((BatchItem { file, outcome }, st))
    })
}

// ---------------------------------------------------------------------------
// BatchReport
// ---------------------------------------------------------------------------

/// Outcome counts for a finished batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub created: usize,
    pub replaced: usize,
    pub skipped: usize,
    pub failed: usize,
    /// Pages archived while replacing.
    pub archived: usize,
}

impl BatchReport {
    pub fn record(&mut self, outcome: &SyncOutcome) {
        match outcome {
            SyncOutcome::Created { .. } => self.created += 1,
            SyncOutcome::Replaced { archived, .. } => {
                self.replaced += 1;
                self.archived += archived;
            }
            SyncOutcome::SkippedExists => self.skipped += 1,
            SyncOutcome::Failed { .. } => self.failed += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.created + self.replaced + self.skipped + self.failed
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }

    /// Drain `items`, returning them alongside their counts.
    pub async fn collect<S>(items: S) -> (Vec<BatchItem>, BatchReport)
    where
        S: Stream<Item = BatchItem>,
    {
        let items: Vec<BatchItem> = items.collect().await;
        let report = items.iter().map(|i| &i.outcome).collect();
        (items, report)
    }
}

impl<'a> FromIterator<&'a SyncOutcome> for BatchReport {
    fn from_iter<T: IntoIterator<Item = &'a SyncOutcome>>(iter: T) -> Self {
        let mut report = BatchReport::default();
        for outcome in iter {
            report.record(outcome);
        }
        report
    }
}

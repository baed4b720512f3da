//! # notesync-sync
//!
//! Per-file synchronization against a remote page store.
//!
//! - [`PageStore`] is the capability trait a remote client implements.
//! - [`PageRegistry`] answers "does a page with this title exist?" and
//!   archives by title.
//! - [`Orchestrator::sync_file`] turns one [`FileRecord`](notesync_core::FileRecord)
//!   into a [`SyncOutcome`](notesync_core::SyncOutcome), falling back through
//!   render tiers on size errors.
//! - [`run_batch`] streams outcomes for many files, sequentially and paced.

pub mod batch;
pub mod error;
pub mod memory;
pub mod orchestrator;
pub mod registry;
pub mod retry;
pub mod store;

pub use batch::{run_batch, BatchItem, BatchOptions, BatchReport};
pub use error::{RegistryError, RemoteError, RemoteErrorKind, SyncError};
pub use memory::{DryRunStore, MemoryStore, StoredPage};
pub use orchestrator::{Orchestrator, SyncOptions};
pub use registry::PageRegistry;
pub use retry::RetryPolicy;
pub use store::{PageHandle, PageStore};

//! notesync core library: domain types, filename identity, frontmatter,
//! configuration and vault scanning.
//!
//! Public API surface:
//! - [`types`]: newtypes, [`FileRecord`], [`PageIdentity`], [`PageProperties`],
//!   [`RenderTier`], [`SyncOutcome`]
//! - [`identity`]: filename → title/date parsing
//! - [`frontmatter`]: frontmatter splitting and typed accessors
//! - [`config`]: load / save / init of `~/.notesync/config.yaml`
//! - [`vault`]: candidate file discovery
//! - [`error`]: [`ConfigError`], [`ScanError`]

pub mod config;
pub mod error;
pub mod frontmatter;
pub mod identity;
pub mod types;
pub mod vault;

pub use config::{CollectionMapping, Config};
pub use error::{ConfigError, ScanError};
pub use frontmatter::Frontmatter;
pub use types::{
    CollectionId, FileRecord, FolderName, PageIdentity, PageProperties, RenderTier, SyncOutcome,
};

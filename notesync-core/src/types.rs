//! Domain types shared by every notesync crate.
//!
//! [`FileRecord`] and [`PageIdentity`] are built fresh for each file and
//! dropped once its [`SyncOutcome`] is recorded; nothing here is persisted.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ScanError;
use crate::frontmatter::{self, Frontmatter};
use crate::identity;

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// Opaque identifier of a remote collection (a Notion database id).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CollectionId(pub String);

impl fmt::Display for CollectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for CollectionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for CollectionId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Name of a vault sub-folder holding one category of notes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FolderName(pub String);

impl fmt::Display for FolderName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for FolderName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for FolderName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// FileRecord
// ---------------------------------------------------------------------------

/// One Markdown note, read and split but not yet interpreted.
#[derive(Debug, Clone, PartialEq)]
pub struct FileRecord {
    pub path: PathBuf,
    pub raw_text: String,
    pub frontmatter: Frontmatter,
    /// Markdown with the frontmatter block stripped.
    pub body: String,
    pub filename_stem: String,
    pub modified: Option<DateTime<Utc>>,
}

impl FileRecord {
    /// Split `raw_text` into frontmatter and body.
    ///
    /// Fails only when a frontmatter fence is present but its contents are not
    /// a YAML mapping.
    pub fn parse(
        path: impl Into<PathBuf>,
        raw_text: impl Into<String>,
        modified: Option<DateTime<Utc>>,
    ) -> Result<Self, ScanError> {
        let path = path.into();
        let raw_text = raw_text.into();
        let (frontmatter, body) =
            frontmatter::split(&raw_text).map_err(|message| ScanError::Frontmatter {
                path: path.clone(),
                message,
            })?;
        let body = body.to_string();
        let filename_stem = stem_of(&path);
        Ok(FileRecord {
            path,
            frontmatter,
            body,
            raw_text,
            filename_stem,
            modified,
        })
    }

    /// Page identity derived from the filename.
    pub fn identity(&self) -> PageIdentity {
        identity::parse(&self.filename_stem)
    }
}

fn stem_of(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// PageIdentity / PageProperties
// ---------------------------------------------------------------------------

/// Title and optional date derived from a filename stem.
///
/// `title` is never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageIdentity {
    pub title: String,
    pub date: Option<NaiveDate>,
}

/// Remote-facing property set: `Name`, `Date`, `Tags`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageProperties {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl PageProperties {
    /// Build properties from an identity plus the tag list found under
    /// `tag_key` in the frontmatter.
    pub fn build(identity: &PageIdentity, frontmatter: &Frontmatter, tag_key: &str) -> Self {
        let tags = frontmatter
            .string_list(tag_key)
            .iter()
            .map(|t| strip_link(t).to_string())
            .filter(|t| !t.is_empty())
            .collect();
        PageProperties {
            name: identity.title.clone(),
            date: identity.date,
            tags,
        }
    }
}

/// Strip a wiki-link wrapper: `[[vim]]` → `vim`.
///
/// Each bracket pair is removed independently, so `[[vim` → `vim`.
pub fn strip_link(text: &str) -> &str {
    let text = text.strip_prefix("[[").unwrap_or(text);
    text.strip_suffix("]]").unwrap_or(text)
}

// ---------------------------------------------------------------------------
// RenderTier
// ---------------------------------------------------------------------------

/// Body rendering strategies in decreasing fidelity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RenderTier {
    /// Full block conversion.
    Rich,
    /// Whole body as one Markdown code block.
    PlainText,
    /// No body; properties only.
    Empty,
}

impl RenderTier {
    /// The next lower-fidelity tier, or `None` from [`RenderTier::Empty`].
    pub fn next(self) -> Option<RenderTier> {
        match self {
            RenderTier::Rich => Some(RenderTier::PlainText),
            RenderTier::PlainText => Some(RenderTier::Empty),
            RenderTier::Empty => None,
        }
    }
}

impl fmt::Display for RenderTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderTier::Rich => write!(f, "rich"),
            RenderTier::PlainText => write!(f, "plain-text"),
            RenderTier::Empty => write!(f, "empty"),
        }
    }
}

// ---------------------------------------------------------------------------
// SyncOutcome
// ---------------------------------------------------------------------------

/// Result of synchronizing one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SyncOutcome {
    /// A new page was created; no page with the title existed.
    Created { tier: RenderTier },
    /// A page with the title already existed and nothing was written.
    SkippedExists,
    /// `archived` existing pages were archived and a new page was created.
    Replaced { tier: RenderTier, archived: usize },
    /// The file could not be synchronized.
    Failed { reason: String },
}

impl SyncOutcome {
    /// `true` when a page was created (fresh or as a replacement).
    pub fn wrote_page(&self) -> bool {
        matches!(self, SyncOutcome::Created { .. } | SyncOutcome::Replaced { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, SyncOutcome::Failed { .. })
    }
}

impl fmt::Display for SyncOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncOutcome::Created { tier } => write!(f, "created ({tier})"),
            SyncOutcome::SkippedExists => write!(f, "skipped (exists)"),
            SyncOutcome::Replaced { tier, archived } => {
                write!(f, "replaced {archived} page(s) ({tier})")
            }
            SyncOutcome::Failed { reason } => write!(f, "failed: {reason}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

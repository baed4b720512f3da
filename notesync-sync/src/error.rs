//! Error types for notesync-sync.

use std::fmt;

use thiserror::Error;

use notesync_core::RenderTier;
use notesync_renderer::RenderError;

use crate::store::PageHandle;

/// How the orchestrator should react to a failed remote call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteErrorKind {
    /// The request exceeded a content-length ceiling; try a smaller tier.
    ContentTooLarge,
    /// The request was rejected for any other reason; fatal for the file.
    Validation,
    /// Network failure, rate limit or server error; retried with backoff.
    Transient,
}

impl fmt::Display for RemoteErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemoteErrorKind::ContentTooLarge => write!(f, "content too large"),
            RemoteErrorKind::Validation => write!(f, "validation"),
            RemoteErrorKind::Transient => write!(f, "transient"),
        }
    }
}

/// A failed call against a [`PageStore`](crate::PageStore).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} error: {message}")]
pub struct RemoteError {
    pub kind: RemoteErrorKind,
    pub message: String,
}

/// Phrases the remote API uses when a text or array length limit is exceeded.
const LENGTH_MARKERS: &[&str] = &["should be ≤", "should be <=", "length should be", "too long"];

impl RemoteError {
    pub fn new(kind: RemoteErrorKind, message: impl Into<String>) -> Self {
        RemoteError {
            kind,
            message: message.into(),
        }
    }

    pub fn transient(message: impl Into<String>) -> Self {
        RemoteError::new(RemoteErrorKind::Transient, message)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        RemoteError::new(RemoteErrorKind::Validation, message)
    }

    pub fn content_too_large(message: impl Into<String>) -> Self {
        RemoteError::new(RemoteErrorKind::ContentTooLarge, message)
    }

    /// Classify an API error response.
    ///
    /// This is the only place remote messages are inspected as free text.
    pub fn from_api(status: u16, code: &str, message: &str) -> Self {
        let kind = if status == 429 || status >= 500 || code == "rate_limited" {
            RemoteErrorKind::Transient
        } else if LENGTH_MARKERS.iter().any(|m| message.contains(m)) {
            RemoteErrorKind::ContentTooLarge
        } else {
            RemoteErrorKind::Validation
        };
        let message = if code.is_empty() {
            format!("{status}: {message}")
        } else {
            format!("{status} {code}: {message}")
        };
        RemoteError { kind, message }
    }

    pub fn is_transient(&self) -> bool {
        self.kind == RemoteErrorKind::Transient
    }
}

/// The existence check or an archive call failed.
///
/// Creation is never attempted on top of this.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("could not query pages titled {title:?}: {source}")]
    Query {
        title: String,
        #[source]
        source: RemoteError,
    },

    #[error("could not archive page {page} ({title:?}): {source}")]
    Archive {
        page: PageHandle,
        title: String,
        #[source]
        source: RemoteError,
    },
}

/// Why one file could not be synchronized.
///
/// Never escapes the orchestrator; its message becomes the `Failed` reason.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("create failed at tier {tier}: {source}")]
    Create {
        tier: RenderTier,
        #[source]
        source: RemoteError,
    },

    #[error("render failed at tier {tier}: {source}")]
    Render {
        tier: RenderTier,
        #[source]
        source: RenderError,
    },
}

//! Error types for notesync-notion.

use thiserror::Error;

/// Failures constructing a [`NotionClient`](crate::NotionClient).
///
/// Failures of individual API calls are reported as
/// [`RemoteError`](notesync_sync::RemoteError) instead.
#[derive(Debug, Error)]
pub enum NotionError {
    #[error("environment variable {var} is not set")]
    MissingToken { var: &'static str },

    #[error("API token contains characters not allowed in an HTTP header")]
    InvalidToken,

    #[error("could not build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}

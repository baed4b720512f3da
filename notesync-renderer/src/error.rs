//! Error types for notesync-renderer.

use thiserror::Error;

/// Why a body could not be turned into blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderErrorKind {
    /// The structure cannot be represented as blocks.
    Malformed,
    /// The content exceeds a size ceiling of the remote API.
    TooLarge,
}

/// All errors that can arise from rendering a note body.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error("malformed markdown: {0}")]
    Malformed(String),

    #[error("content too large: {0}")]
    TooLarge(String),
}

impl RenderError {
    pub fn kind(&self) -> RenderErrorKind {
        match self {
            RenderError::Malformed(_) => RenderErrorKind::Malformed,
            RenderError::TooLarge(_) => RenderErrorKind::TooLarge,
        }
    }
}

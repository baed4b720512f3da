//! # notesync-renderer
//!
//! Turns Markdown note bodies into the block trees the remote page store
//! accepts, at one of three [`RenderTier`](notesync_core::RenderTier)s.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use notesync_core::RenderTier;
//! use notesync_renderer::ContentRenderer;
//!
//! let renderer = ContentRenderer::default();
//! let urls = vec!["https://example.com".to_string()];
//! if let Ok(blocks) = renderer.render("# Title\n\nSome *text*.", &urls, RenderTier::Rich) {
//!     println!("{} block(s)", blocks.len());
//! }
//! ```

pub mod block;
pub mod convert;
pub mod engine;
pub mod error;

pub use block::{Block, RichText};
pub use convert::{CmarkConverter, MarkdownConverter};
pub use engine::{normalize_language, remove_first_heading, ContentRenderer};
pub use error::{RenderError, RenderErrorKind};

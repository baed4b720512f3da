//! # notesync-notion
//!
//! [`NotionClient`] implements [`PageStore`](notesync_sync::PageStore) over
//! the Notion REST API.
//!
//! | Operation        | Request                                  |
//! |------------------|------------------------------------------|
//! | `query_by_title` | `POST /v1/databases/{id}/query` (paged)  |
//! | `create_page`    | `POST /v1/pages`                         |
//! | `archive_page`   | `PATCH /v1/pages/{id}`                   |

pub mod client;
pub mod error;
pub mod payload;

pub use client::{NotionClient, DEFAULT_BASE_URL, NOTION_VERSION};
pub use error::NotionError;

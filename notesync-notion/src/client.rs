//! HTTP client for the Notion API implementing [`PageStore`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use serde_json::Value;
use tracing::{debug, instrument};

use notesync_core::config::TOKEN_ENV;
use notesync_core::{CollectionId, PageProperties};
use notesync_renderer::Block;
use notesync_sync::{PageHandle, PageStore, RemoteError};

use crate::error::NotionError;
use crate::payload::{self, ApiErrorBody, QueryResponse};

/// Production API origin.
pub const DEFAULT_BASE_URL: &str = "https://api.notion.com";

/// API version sent with every request.
pub const NOTION_VERSION: &str = "2022-06-28";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Notion API client.
///
/// Holds one pooled `reqwest::Client`, reused for every call in a batch.
#[derive(Debug, Clone)]
pub struct NotionClient {
    http: reqwest::Client,
    base_url: String,
}

impl NotionClient {
    /// Client authenticating with `token` against [`DEFAULT_BASE_URL`].
    pub fn new(token: &str) -> Result<Self, NotionError> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|_| NotionError::InvalidToken)?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert("Notion-Version", HeaderValue::from_static(NOTION_VERSION));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(NotionClient {
            http,
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    /// Client using the token in [`TOKEN_ENV`].
    pub fn from_env() -> Result<Self, NotionError> {
        match std::env::var(TOKEN_ENV) {
            Ok(token) if !token.trim().is_empty() => NotionClient::new(token.trim()),
            _ => Err(NotionError::MissingToken { var: TOKEN_ENV }),
        }
    }

    /// Point the client at another origin, e.g. a local mock server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    async fn call(&self, method: Method, path: &str, body: &Value) -> Result<Value, RemoteError> {
        let url = format!("{}{path}", self.base_url);
        let response = self
            .http
            .request(method, &url)
            .json(body)
            .send()
            .await
            .map_err(|e| RemoteError::transient(format!("request to {path} failed: {e}")))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| RemoteError::transient(format!("reading response from {path}: {e}")))?;

        if status.is_success() {
            return serde_json::from_slice(&bytes).map_err(|e| {
                RemoteError::validation(format!("unexpected response from {path}: {e}"))
            });
        }
        Err(api_error(status, &bytes))
    }
}

fn api_error(status: StatusCode, bytes: &[u8]) -> RemoteError {
    let body: ApiErrorBody = serde_json::from_slice(bytes).unwrap_or_else(|_| ApiErrorBody {
        code: String::new(),
        message: String::from_utf8_lossy(bytes).trim().to_string(),
    });
    RemoteError::from_api(status.as_u16(), &body.code, &body.message)
}

#[async_trait]
impl PageStore for NotionClient {
    #[instrument(skip(self, collection), fields(collection = %collection))]
    async fn query_by_title(
        &self,
        collection: &CollectionId,
        title: &str,
    ) -> Result<Vec<PageHandle>, RemoteError> {
        let path = format!("/v1/databases/{collection}/query");
        let mut pages = Vec::new();
        let mut cursor: Option<String> = None;
        loop {
            let value = self
                .call(Method::POST, &path, &payload::title_query(title, cursor.as_deref()))
                .await?;
            let response: QueryResponse = serde_json::from_value(value)
                .map_err(|e| RemoteError::validation(format!("unexpected query response: {e}")))?;
            pages.extend(
                response
                    .results
                    .into_iter()
                    .filter(|p| !p.archived)
                    .map(|p| PageHandle::new(p.id)),
            );
            match response.next_cursor {
                Some(next) if response.has_more => cursor = Some(next),
                _ => break,
            }
        }
        debug!("{} page(s) titled {title:?}", pages.len());
        Ok(pages)
    }

    #[instrument(skip(self, properties, blocks), fields(title = %properties.name, blocks = blocks.len()))]
    async fn create_page(
        &self,
        collection: &CollectionId,
        properties: &PageProperties,
        blocks: &[Block],
    ) -> Result<PageHandle, RemoteError> {
        let body = payload::create_page(collection, properties, blocks);
        let value = self.call(Method::POST, "/v1/pages", &body).await?;
        let page: payload::PageObject = serde_json::from_value(value)
            .map_err(|e| RemoteError::validation(format!("unexpected create response: {e}")))?;
        Ok(PageHandle::new(page.id))
    }

    #[instrument(skip(self))]
    async fn archive_page(&self, page: &PageHandle) -> Result<(), RemoteError> {
        self.call(Method::PATCH, &format!("/v1/pages/{page}"), &payload::archive())
            .await?;
        Ok(())
    }
}

//! Remote backend client.
//!
//! One trait fronting the hosted document/file/function API, with a single
//! HTTP implementation. Callers receive raw JSON documents and run them
//! through [`crate::normalize`] themselves; no retries happen at this layer,
//! a failed call surfaces immediately.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

pub mod errors;
pub mod http;
#[cfg(any(test, feature = "test-mocks"))]
pub mod mock;

pub use errors::{BackendError, BackendResult};
pub use http::HttpBackend;

/// The remote collections this service works with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Collection {
    Clients,
    Cases,
    ServeAttempts,
    Documents,
}

/// Equality filters plus an optional result limit for a list call.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ListQuery {
    pub filters: Vec<(String, String)>,
    pub limit: Option<u32>,
}

impl ListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.push((field.into(), value.into()));
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Reference to a file held by the backend file store.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct StoredFile {
    #[serde(rename = "$id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "sizeOriginal")]
    pub size: i64,
}

/// Response envelope returned by the email relay function.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct FunctionEnvelope {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: String,
}

#[async_trait]
pub trait RemoteBackend: Send + Sync {
    /// Fetches raw documents from a collection. Callers normalize.
    async fn list_documents(
        &self,
        collection: Collection,
        query: ListQuery,
    ) -> BackendResult<Vec<Value>>;

    async fn get_document(&self, collection: Collection, id: &str) -> BackendResult<Value>;

    async fn create_document(
        &self,
        collection: Collection,
        id: &str,
        data: &Value,
    ) -> BackendResult<Value>;

    async fn update_document(
        &self,
        collection: Collection,
        id: &str,
        data: &Value,
    ) -> BackendResult<Value>;

    async fn delete_document(&self, collection: Collection, id: &str) -> BackendResult<()>;

    /// Stores binary content and returns the file reference.
    async fn upload_file(
        &self,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> BackendResult<StoredFile>;

    /// Public view URL for a stored file. Purely derived, no network call.
    fn file_view_url(&self, file_id: &str) -> String;

    async fn delete_file(&self, file_id: &str) -> BackendResult<()>;

    /// Invokes the server-side email relay with a JSON payload and parses the
    /// `{success, message}` envelope out of the execution response.
    async fn invoke_function(&self, payload: &Value) -> BackendResult<FunctionEnvelope>;
}

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{BackendError, Query};

/// An object stored in a storage bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredObject {
    pub name: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Capability surface of the managed backend: table rows and bucket files.
///
/// Rows travel as JSON values so that one implementation serves every
/// resource table; typed decoding happens in the services layer.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn select(&self, table: &str, query: &Query) -> Result<Vec<Value>, BackendError>;

    /// Insert one row and return the stored representation.
    async fn insert(&self, table: &str, row: Value) -> Result<Vec<Value>, BackendError>;

    /// Apply `patch` to every row matching `query`, returning the updated rows.
    async fn update(&self, table: &str, query: &Query, patch: Value)
        -> Result<Vec<Value>, BackendError>;

    /// Merge rows into the table by `id`.
    async fn upsert(&self, table: &str, rows: Vec<Value>) -> Result<(), BackendError>;

    /// Delete every row matching `query`. A query without filters is refused.
    async fn delete(&self, table: &str, query: &Query) -> Result<(), BackendError>;

    /// Store `bytes` at `path` inside `bucket`, returning the stored path.
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, BackendError>;

    fn public_url(&self, bucket: &str, path: &str) -> String;

    async fn remove(&self, bucket: &str, paths: &[String]) -> Result<(), BackendError>;

    /// List objects under `prefix`, newest first.
    async fn list(&self, bucket: &str, prefix: &str, limit: usize)
        -> Result<Vec<StoredObject>, BackendError>;
}

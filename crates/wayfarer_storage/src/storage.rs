//! Blob storage trait definition.

use async_trait::async_trait;
use serde::Serialize;
use wayfarer_core::{BlobHostPattern, MediaCategory};
use wayfarer_error::WayfarerResult;

/// Reference to an uploaded blob.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlobReference {
    /// Public URL of the blob
    pub url: String,
    /// Backend key, `{category}/{file}`
    pub key: String,
    /// Category the blob was filed under
    pub category: MediaCategory,
    /// Stored size in bytes
    pub size_bytes: u64,
    /// MIME type sniffed from the bytes
    pub content_type: String,
}

/// Trait for pluggable blob storage backends.
///
/// Implementations own uploaded bytes and decide which URLs count as
/// already migrated.
#[async_trait]
pub trait BlobStorage: Send + Sync {
    /// Upload raw bytes under a category.
    ///
    /// # Arguments
    ///
    /// * `data` - Image bytes to store
    /// * `category` - Category deciding the path prefix
    /// * `filename` - Optional filename stem; slugified, the backend appends
    ///   a timestamp or content hash and an extension sniffed from `data`
    async fn upload_from_bytes(
        &self,
        data: &[u8],
        category: MediaCategory,
        filename: Option<&str>,
    ) -> WayfarerResult<BlobReference>;

    /// Fetch `url` (http(s) or `data:`) and upload its bytes unchanged.
    async fn upload_from_url(
        &self,
        url: &str,
        category: MediaCategory,
        filename: Option<&str>,
    ) -> WayfarerResult<BlobReference>;

    /// Hosts that count as this blob store.
    fn host_pattern(&self) -> &BlobHostPattern;

    /// The idempotency predicate: is `url` already hosted here?
    fn is_blob_url(&self, url: &str) -> bool {
        self.host_pattern().matches(url)
    }

    /// URL an upload would most likely receive, for dry-run previews.
    fn planned_url(&self, category: MediaCategory, filename: Option<&str>, extension: &str) -> String;

    /// Check whether a blob URL resolves to a stored object.
    async fn exists(&self, url: &str) -> WayfarerResult<bool>;
}

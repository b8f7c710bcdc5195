//! In-memory blob storage, for tests and dry local runs.

use crate::fetch::abbreviate;
use crate::naming::{blob_file_name, slugify, BlobNaming};
use crate::{BlobReference, BlobStorage, SourceFetcher};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};
use tracing::{debug, instrument};
use wayfarer_core::{sniff_image_mime, BlobHostPattern, MediaCategory};
use wayfarer_error::{StorageError, StorageErrorKind, WayfarerResult};

/// Blob backend keeping objects in a map keyed by public URL.
///
/// Filenames use a monotonically increasing counter in place of the
/// timestamp so that several uploads within one millisecond stay distinct.
#[derive(Debug, Clone)]
pub struct InMemoryBlobStorage {
    base_url: String,
    host_pattern: BlobHostPattern,
    naming: BlobNaming,
    fetcher: SourceFetcher,
    blobs: Arc<RwLock<HashMap<String, Vec<u8>>>>,
    sequence: Arc<AtomicU64>,
    uploads: Arc<AtomicUsize>,
}

impl InMemoryBlobStorage {
    /// Create a backend serving blobs under `base_url` (e.g. `https://blob.store`).
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let host_pattern = url::Url::parse(&base_url)
            .ok()
            .and_then(|u| u.host_str().map(|h| BlobHostPattern::default().with_pattern(h)))
            .unwrap_or_default();
        Self {
            base_url,
            host_pattern,
            naming: BlobNaming::Timestamp,
            fetcher: SourceFetcher::default(),
            blobs: Arc::new(RwLock::new(HashMap::new())),
            sequence: Arc::new(AtomicU64::new(0)),
            uploads: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Use a different naming strategy.
    pub fn with_naming(mut self, naming: BlobNaming) -> Self {
        self.naming = naming;
        self
    }

    /// Use a different fetcher for `upload_from_url`.
    pub fn with_fetcher(mut self, fetcher: SourceFetcher) -> Self {
        self.fetcher = fetcher;
        self
    }

    /// Number of successful uploads so far.
    pub fn upload_count(&self) -> usize {
        self.uploads.load(Ordering::SeqCst)
    }

    /// Stored bytes for a blob URL.
    pub fn get(&self, url: &str) -> Option<Vec<u8>> {
        self.blobs.read().ok()?.get(url).cloned()
    }

    /// All stored blob URLs, sorted.
    pub fn urls(&self) -> Vec<String> {
        let mut urls: Vec<String> = self
            .blobs
            .read()
            .map(|blobs| blobs.keys().cloned().collect())
            .unwrap_or_default();
        urls.sort();
        urls
    }
}

#[async_trait]
impl BlobStorage for InMemoryBlobStorage {
    #[instrument(skip(self, data), fields(size = data.len(), %category))]
    async fn upload_from_bytes(
        &self,
        data: &[u8],
        category: MediaCategory,
        filename: Option<&str>,
    ) -> WayfarerResult<BlobReference> {
        let sequence = self.sequence.fetch_add(1, Ordering::SeqCst) as i64;
        let file_name = blob_file_name(filename, data, self.naming, sequence);
        let key = format!("{}/{}", category.path_prefix(), file_name);
        let url = format!("{}/{}", self.base_url, key);

        self.blobs
            .write()
            .map_err(|e| StorageError::new(StorageErrorKind::Unavailable(e.to_string())))?
            .insert(url.clone(), data.to_vec());
        self.uploads.fetch_add(1, Ordering::SeqCst);
        debug!(url = %url, "Stored blob in memory");

        Ok(BlobReference {
            url,
            key,
            category,
            size_bytes: data.len() as u64,
            content_type: sniff_image_mime(data)
                .unwrap_or("application/octet-stream")
                .to_string(),
        })
    }

    #[instrument(skip(self, url), fields(url = %abbreviate(url), %category))]
    async fn upload_from_url(
        &self,
        url: &str,
        category: MediaCategory,
        filename: Option<&str>,
    ) -> WayfarerResult<BlobReference> {
        let data = self.fetcher.fetch(url).await?;
        self.upload_from_bytes(&data, category, filename).await
    }

    fn host_pattern(&self) -> &BlobHostPattern {
        &self.host_pattern
    }

    fn planned_url(&self, category: MediaCategory, filename: Option<&str>, extension: &str) -> String {
        format!(
            "{}/{}/{}-{}.{}",
            self.base_url,
            category.path_prefix(),
            slugify(filename.unwrap_or("image")),
            self.sequence.load(Ordering::SeqCst),
            extension
        )
    }

    async fn exists(&self, url: &str) -> WayfarerResult<bool> {
        Ok(self
            .blobs
            .read()
            .map(|blobs| blobs.contains_key(url))
            .unwrap_or(false))
    }
}

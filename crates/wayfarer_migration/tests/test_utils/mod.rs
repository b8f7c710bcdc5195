//! Test utilities for orchestrator tests.
//!
//! Recording doubles for the store and blob backends: call counters,
//! forced failures and optional random latency.

#![allow(dead_code)]

use async_trait::async_trait;
use rand::Rng;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use wayfarer_core::{BlobHostPattern, Entity, EntityPatch, MediaCategory};
use wayfarer_error::{
    StoreError, StoreErrorKind, TransportError, TransportErrorKind, WayfarerResult,
};
use wayfarer_migration::{MigrationOrchestrator, OrchestratorConfig};
use wayfarer_storage::{extension_for, slugify, BlobReference, BlobStorage};
use wayfarer_store::{EntityFilter, EntityStore, InMemoryEntityStore};

pub const BLOB_BASE: &str = "https://blob.store";

/// Blob double that never touches the network.
#[derive(Default)]
pub struct RecordingBlob {
    host_pattern: BlobHostPattern,
    sequence: AtomicUsize,
    url_uploads: AtomicUsize,
    byte_uploads: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    failing_sources: Mutex<HashSet<String>>,
    uploaded_bytes: Mutex<Vec<Vec<u8>>>,
    max_latency_ms: u64,
}

impl RecordingBlob {
    pub fn new() -> Self {
        Self {
            host_pattern: BlobHostPattern::new(["blob.store"]),
            ..Default::default()
        }
    }

    /// Sleep a random 0..=max_latency_ms before every upload.
    pub fn with_latency(mut self, max_latency_ms: u64) -> Self {
        self.max_latency_ms = max_latency_ms;
        self
    }

    /// Uploads from this source URL fail with a transport error.
    pub fn fail_source(&self, url: &str) {
        self.failing_sources.lock().unwrap().insert(url.to_string());
    }

    pub fn upload_calls(&self) -> usize {
        self.url_uploads.load(Ordering::SeqCst) + self.byte_uploads.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn uploaded_bytes(&self) -> Vec<Vec<u8>> {
        self.uploaded_bytes.lock().unwrap().clone()
    }

    pub fn reset_counters(&self) {
        self.url_uploads.store(0, Ordering::SeqCst);
        self.byte_uploads.store(0, Ordering::SeqCst);
    }

    async fn enter(&self) {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if self.max_latency_ms > 0 {
            let delay = rand::thread_rng().gen_range(0..=self.max_latency_ms);
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
    }

    fn leave(&self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }

    fn reference(&self, category: MediaCategory, filename: Option<&str>, ext: &str) -> BlobReference {
        let sequence = self.sequence.fetch_add(1, Ordering::SeqCst);
        let key = format!(
            "{}/{}-{}.{}",
            category.path_prefix(),
            slugify(filename.unwrap_or("image")),
            sequence,
            ext
        );
        BlobReference {
            url: format!("{}/{}", BLOB_BASE, key),
            key,
            category,
            size_bytes: 0,
            content_type: "application/octet-stream".to_string(),
        }
    }
}

#[async_trait]
impl BlobStorage for RecordingBlob {
    async fn upload_from_bytes(
        &self,
        data: &[u8],
        category: MediaCategory,
        filename: Option<&str>,
    ) -> WayfarerResult<BlobReference> {
        self.enter().await;
        self.byte_uploads.fetch_add(1, Ordering::SeqCst);
        self.uploaded_bytes.lock().unwrap().push(data.to_vec());
        let reference = self.reference(category, filename, extension_for(data));
        self.leave();
        Ok(reference)
    }

    async fn upload_from_url(
        &self,
        url: &str,
        category: MediaCategory,
        filename: Option<&str>,
    ) -> WayfarerResult<BlobReference> {
        self.enter().await;
        self.url_uploads.fetch_add(1, Ordering::SeqCst);
        let failing = self.failing_sources.lock().unwrap().contains(url);
        self.leave();
        if failing {
            return Err(TransportError::new(TransportErrorKind::Status {
                status_code: 404,
                url: url.to_string(),
            })
            .into());
        }
        Ok(self.reference(category, filename, "jpg"))
    }

    fn host_pattern(&self) -> &BlobHostPattern {
        &self.host_pattern
    }

    fn planned_url(&self, category: MediaCategory, filename: Option<&str>, extension: &str) -> String {
        format!(
            "{}/{}/{}-planned.{}",
            BLOB_BASE,
            category.path_prefix(),
            slugify(filename.unwrap_or("image")),
            extension
        )
    }

    async fn exists(&self, url: &str) -> WayfarerResult<bool> {
        Ok(self.host_pattern.matches(url))
    }
}

/// Store double wrapping the in-memory store.
#[derive(Default)]
pub struct RecordingStore {
    inner: InMemoryEntityStore,
    gets: AtomicUsize,
    lists: AtomicUsize,
    patches: AtomicUsize,
    failing_patches: Mutex<HashSet<String>>,
    failing_gets: Mutex<HashSet<String>>,
}

impl RecordingStore {
    pub fn with_entities(entities: impl IntoIterator<Item = Entity>) -> Self {
        Self {
            inner: InMemoryEntityStore::with_entities(entities).unwrap(),
            ..Default::default()
        }
    }

    /// Writes to this entity fail.
    pub fn fail_patch(&self, id: &str) {
        self.failing_patches.lock().unwrap().insert(id.to_string());
    }

    /// Reads of this entity fail.
    pub fn fail_get(&self, id: &str) {
        self.failing_gets.lock().unwrap().insert(id.to_string());
    }

    pub fn patch_calls(&self) -> usize {
        self.patches.load(Ordering::SeqCst)
    }

    pub fn reset_counters(&self) {
        self.gets.store(0, Ordering::SeqCst);
        self.lists.store(0, Ordering::SeqCst);
        self.patches.store(0, Ordering::SeqCst);
    }

    pub async fn entity(&self, id: &str) -> Entity {
        self.inner.get(id).await.unwrap()
    }
}

#[async_trait]
impl EntityStore for RecordingStore {
    async fn get(&self, id: &str) -> WayfarerResult<Entity> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        if self.failing_gets.lock().unwrap().contains(id) {
            return Err(StoreError::new(StoreErrorKind::Read(format!("forced failure for {}", id))).into());
        }
        self.inner.get(id).await
    }

    async fn list_ids(&self, filter: &EntityFilter) -> WayfarerResult<Vec<String>> {
        self.lists.fetch_add(1, Ordering::SeqCst);
        self.inner.list_ids(filter).await
    }

    async fn list(&self, filter: &EntityFilter) -> WayfarerResult<Vec<Entity>> {
        self.lists.fetch_add(1, Ordering::SeqCst);
        self.inner.list(filter).await
    }

    async fn patch_fields(&self, id: &str, patch: &EntityPatch) -> WayfarerResult<Entity> {
        self.patches.fetch_add(1, Ordering::SeqCst);
        if self.failing_patches.lock().unwrap().contains(id) {
            return Err(StoreError::new(StoreErrorKind::Write(format!("forced failure for {}", id))).into());
        }
        self.inner.patch_fields(id, patch).await
    }
}

/// Config that uploads remote URLs as-is, so no test needs the network.
pub fn passthrough_config() -> OrchestratorConfig {
    OrchestratorConfig::default().with_compress_on_ingest(false)
}

pub fn orchestrator(
    config: OrchestratorConfig,
    store: &Arc<RecordingStore>,
    blob: &Arc<RecordingBlob>,
) -> MigrationOrchestrator {
    MigrationOrchestrator::new(
        config,
        Some(store.clone() as Arc<dyn EntityStore>),
        Some(blob.clone() as Arc<dyn BlobStorage>),
    )
    .unwrap()
}

pub fn remote(name: &str) -> String {
    format!("https://img.example/{}.jpg", name)
}

//! Entity store backed by a directory of JSON documents.

use crate::document::{decode, document_id, merge_patch};
use crate::{EntityFilter, EntityStore};
use async_trait::async_trait;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};
use uuid::Uuid;
use wayfarer_core::{Entity, EntityPatch};
use wayfarer_error::{NotFoundError, StoreError, StoreErrorKind, WayfarerResult};

/// Entity store keeping one `<id>.json` document per entity.
///
/// Writes go through a temp file and a rename, so a crashed patch never
/// leaves a truncated document behind.
///
/// # Example Structure
///
/// ```text
/// /var/wayfarer/entities/
/// ├── c1.json
/// ├── lisbon.json
/// └── porto.json
/// ```
#[derive(Debug, Clone)]
pub struct JsonDirectoryStore {
    dir: PathBuf,
}

impl JsonDirectoryStore {
    /// Open a store at `dir`, creating the directory if needed.
    pub fn new(dir: impl Into<PathBuf>) -> WayfarerResult<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|e| {
            StoreError::new(StoreErrorKind::Unavailable(format!("{}: {}", dir.display(), e)))
        })?;
        info!(path = %dir.display(), "Opened JSON directory store");
        Ok(Self { dir })
    }

    /// Directory holding the documents.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write a raw document; it must carry a string `id`.
    pub async fn insert_document(&self, document: Value) -> WayfarerResult<String> {
        let id = document_id(&document)?;
        decode(&id, &document)?;
        let path = self
            .path_for(&id)
            .ok_or_else(|| NotFoundError::new("entity", id.as_str()))?;
        self.write_document(&path, &document).await?;
        Ok(id)
    }

    /// Ids that cannot be mapped to a single file name have no document.
    fn path_for(&self, id: &str) -> Option<PathBuf> {
        let valid = !id.is_empty()
            && !id.starts_with('.')
            && !id.contains(['/', '\\'])
            && !id.contains('\0');
        valid.then(|| self.dir.join(format!("{}.json", id)))
    }

    async fn read_document(&self, id: &str) -> WayfarerResult<Value> {
        let path = self
            .path_for(id)
            .ok_or_else(|| NotFoundError::new("entity", id))?;
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(NotFoundError::new("entity", id).into());
            }
            Err(e) => {
                return Err(StoreError::new(StoreErrorKind::Read(format!(
                    "{}: {}",
                    path.display(),
                    e
                )))
                .into());
            }
        };
        serde_json::from_slice(&bytes).map_err(|e| {
            StoreError::new(StoreErrorKind::Malformed {
                id: id.to_string(),
                reason: e.to_string(),
            })
            .into()
        })
    }

    async fn write_document(&self, path: &Path, document: &Value) -> WayfarerResult<()> {
        let bytes = serde_json::to_vec_pretty(document).map_err(wayfarer_error::JsonError::from)?;
        let temp_path = path.with_extension(format!("tmp.{}", Uuid::new_v4().simple()));
        tokio::fs::write(&temp_path, &bytes).await.map_err(|e| {
            StoreError::new(StoreErrorKind::Write(format!("{}: {}", temp_path.display(), e)))
        })?;
        if let Err(e) = tokio::fs::rename(&temp_path, path).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(StoreError::new(StoreErrorKind::Write(format!(
                "rename to {}: {}",
                path.display(),
                e
            )))
            .into());
        }
        Ok(())
    }

    async fn document_ids(&self) -> WayfarerResult<Vec<String>> {
        let read_error = |e: std::io::Error| {
            StoreError::new(StoreErrorKind::Read(format!("{}: {}", self.dir.display(), e)))
        };
        let mut entries = tokio::fs::read_dir(&self.dir).await.map_err(read_error)?;
        let mut ids = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(read_error)? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                if self.path_for(stem).is_some() {
                    ids.push(stem.to_string());
                }
            }
        }
        ids.sort();
        Ok(ids)
    }
}

#[async_trait]
impl EntityStore for JsonDirectoryStore {
    #[instrument(skip(self))]
    async fn get(&self, id: &str) -> WayfarerResult<Entity> {
        let document = self.read_document(id).await?;
        decode(id, &document)
    }

    #[instrument(skip(self))]
    async fn list(&self, filter: &EntityFilter) -> WayfarerResult<Vec<Entity>> {
        let mut entities = Vec::new();
        for id in self.document_ids().await? {
            if !filter.admits(&id) {
                continue;
            }
            if filter.limit.is_some_and(|limit| entities.len() >= limit) {
                break;
            }
            let document = self.read_document(&id).await?;
            entities.push(decode(&id, &document)?);
        }
        debug!(count = entities.len(), "Listed entities");
        Ok(entities)
    }

    #[instrument(skip(self))]
    async fn list_ids(&self, filter: &EntityFilter) -> WayfarerResult<Vec<String>> {
        let ids = self
            .document_ids()
            .await?
            .into_iter()
            .filter(|id| filter.admits(id))
            .collect();
        Ok(filter.truncate(ids))
    }

    #[instrument(skip(self, patch), fields(fields = patch.len()))]
    async fn patch_fields(&self, id: &str, patch: &EntityPatch) -> WayfarerResult<Entity> {
        let mut document = self.read_document(id).await?;
        merge_patch(id, &mut document, patch)?;
        let path = self
            .path_for(id)
            .ok_or_else(|| NotFoundError::new("entity", id))?;
        self.write_document(&path, &document).await?;
        debug!("Patched entity document");
        decode(id, &document)
    }
}

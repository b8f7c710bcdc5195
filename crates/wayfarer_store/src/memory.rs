//! In-memory entity store.

use crate::document::{decode, document_id, merge_patch};
use crate::{EntityFilter, EntityStore};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, instrument};
use wayfarer_core::{Entity, EntityPatch};
use wayfarer_error::{NotFoundError, WayfarerResult};

/// Entity store holding raw JSON documents in a map.
///
/// Documents are listed in id order. All data is lost when the store is dropped.
#[derive(Debug, Clone, Default)]
pub struct InMemoryEntityStore {
    documents: Arc<RwLock<BTreeMap<String, Value>>>,
}

impl InMemoryEntityStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store seeded with typed entities.
    pub fn with_entities(entities: impl IntoIterator<Item = Entity>) -> WayfarerResult<Self> {
        let mut documents = BTreeMap::new();
        for entity in entities {
            let document = serde_json::to_value(&entity).map_err(wayfarer_error::JsonError::from)?;
            documents.insert(entity.id.clone(), document);
        }
        Ok(Self {
            documents: Arc::new(RwLock::new(documents)),
        })
    }

    /// Insert or replace a raw document; it must carry a string `id`.
    pub async fn insert_document(&self, document: Value) -> WayfarerResult<String> {
        let id = document_id(&document)?;
        decode(&id, &document)?;
        self.documents.write().await.insert(id.clone(), document);
        Ok(id)
    }

    /// The raw stored document, including keys the entity type ignores.
    pub async fn document(&self, id: &str) -> Option<Value> {
        self.documents.read().await.get(id).cloned()
    }

    /// Number of stored entities.
    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    /// Check if the store is empty.
    pub async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }
}

#[async_trait]
impl EntityStore for InMemoryEntityStore {
    async fn get(&self, id: &str) -> WayfarerResult<Entity> {
        let documents = self.documents.read().await;
        let document = documents
            .get(id)
            .ok_or_else(|| NotFoundError::new("entity", id))?;
        decode(id, document)
    }

    async fn list(&self, filter: &EntityFilter) -> WayfarerResult<Vec<Entity>> {
        let documents = self.documents.read().await;
        let entities = documents
            .iter()
            .filter(|(id, _)| filter.admits(id))
            .map(|(id, document)| decode(id, document))
            .collect::<WayfarerResult<Vec<_>>>()?;
        Ok(filter.truncate(entities))
    }

    async fn list_ids(&self, filter: &EntityFilter) -> WayfarerResult<Vec<String>> {
        let documents = self.documents.read().await;
        let ids = documents
            .keys()
            .filter(|id| filter.admits(id))
            .cloned()
            .collect();
        Ok(filter.truncate(ids))
    }

    #[instrument(skip(self, patch), fields(fields = patch.len()))]
    async fn patch_fields(&self, id: &str, patch: &EntityPatch) -> WayfarerResult<Entity> {
        let mut documents = self.documents.write().await;
        let document = documents
            .get_mut(id)
            .ok_or_else(|| NotFoundError::new("entity", id))?;
        merge_patch(id, document, patch)?;
        debug!("Patched entity document");
        decode(id, document)
    }
}

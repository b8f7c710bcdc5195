//! Entity store trait definition.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use wayfarer_core::{Entity, EntityPatch};
use wayfarer_error::WayfarerResult;

/// Trait for document stores holding image-bearing entities.
#[async_trait]
pub trait EntityStore: Send + Sync {
    /// Load one entity.
    ///
    /// Returns a `NotFoundError` when no entity has this id.
    async fn get(&self, id: &str) -> WayfarerResult<Entity>;

    /// List entities matching the filter, in a stable order.
    ///
    /// Fails as a whole if any matching document cannot be decoded; use
    /// [`list_ids`](Self::list_ids) plus [`get`](Self::get) to isolate bad documents.
    async fn list(&self, filter: &EntityFilter) -> WayfarerResult<Vec<Entity>>;

    /// Ids of the entities matching the filter, in the order `list` uses.
    ///
    /// Documents are not decoded, so a malformed document still yields its id.
    async fn list_ids(&self, filter: &EntityFilter) -> WayfarerResult<Vec<String>>;

    /// Replace exactly the fields present in `patch` and return the updated entity.
    ///
    /// Fields absent from the patch must not be touched.
    async fn patch_fields(&self, id: &str, patch: &EntityPatch) -> WayfarerResult<Entity>;
}

/// Filter criteria for listing entities.
///
/// All fields are optional; combining them narrows the result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityFilter {
    /// Only these ids
    pub ids: Option<Vec<String>>,
    /// Maximum number of entities to return
    pub limit: Option<usize>,
}

impl EntityFilter {
    /// Create an empty filter (returns all entities).
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict to the given ids.
    pub fn with_ids<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ids = Some(ids.into_iter().map(Into::into).collect());
        self
    }

    /// Set a maximum result count.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Whether an entity id passes the id restriction.
    pub fn admits(&self, id: &str) -> bool {
        self.ids
            .as_ref()
            .is_none_or(|ids| ids.iter().any(|wanted| wanted == id))
    }

    /// Apply the limit to an already filtered, ordered list.
    pub fn truncate<T>(&self, mut items: Vec<T>) -> Vec<T> {
        if let Some(limit) = self.limit {
            items.truncate(limit);
        }
        items
    }
}

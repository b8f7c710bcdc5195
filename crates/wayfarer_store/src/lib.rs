//! Entity document stores for Wayfarer.
//!
//! The store exclusively owns persisted entity state. Entities are kept as
//! raw JSON documents: the migration only ever replaces the image keys it
//! patches, and every other key in a document survives untouched.
//!
//! # Example
//!
//! ```rust
//! use wayfarer_core::{EntityPatch, FieldValue, ImageField};
//! use wayfarer_store::{EntityFilter, EntityStore, InMemoryEntityStore};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = InMemoryEntityStore::new();
//! store
//!     .insert_document(serde_json::json!({"id": "c1", "name": "Lisbon", "population": 545000}))
//!     .await?;
//!
//! let mut patch = EntityPatch::default();
//! patch.insert(ImageField::Primary, FieldValue::from("https://blob.store/cities/a.webp".to_string()));
//! let updated = store.patch_fields("c1", &patch).await?;
//! assert_eq!(updated.image_url.as_deref(), Some("https://blob.store/cities/a.webp"));
//! assert_eq!(store.list(&EntityFilter::new()).await?.len(), 1);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod document;
mod json_dir;
mod memory;
mod store;

pub use json_dir::JsonDirectoryStore;
pub use memory::InMemoryEntityStore;
pub use store::{EntityFilter, EntityStore};
pub use wayfarer_error::{StoreError, StoreErrorKind};

//! Partial entity updates.

use crate::ImageField;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// New value of one image field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::From)]
#[serde(untagged)]
pub enum FieldValue {
    /// Value of the singular field
    Single(String),
    /// Values of a list field, same length and order as before migration;
    /// `None` is a `null` slot
    List(Vec<Option<String>>),
}

impl FieldValue {
    /// Number of image values held.
    pub fn len(&self) -> usize {
        match self {
            FieldValue::Single(_) => 1,
            FieldValue::List(list) => list.len(),
        }
    }

    /// True for an empty list.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Convert into a JSON value for document stores.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            FieldValue::Single(v) => serde_json::Value::String(v.clone()),
            FieldValue::List(list) => serde_json::Value::Array(
                list.iter()
                    .map(|slot| {
                        slot.as_ref()
                            .map_or(serde_json::Value::Null, |v| serde_json::Value::String(v.clone()))
                    })
                    .collect(),
            ),
        }
    }
}

/// Partial update containing only the image fields that changed.
///
/// Serializes as a JSON object keyed by document field name, which is
/// exactly the shape a store's `patch_fields` merges into a document.
///
/// # Examples
///
/// ```
/// use wayfarer_core::{EntityPatch, FieldValue, ImageField};
///
/// let mut patch = EntityPatch::default();
/// patch.insert(ImageField::Primary, FieldValue::Single("https://blob.store/cities/a.webp".into()));
///
/// let json = serde_json::to_value(&patch).unwrap();
/// assert_eq!(json["imageUrl"], "https://blob.store/cities/a.webp");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityPatch(BTreeMap<ImageField, FieldValue>);

impl EntityPatch {
    /// Set the new value of a field.
    pub fn insert(&mut self, field: ImageField, value: FieldValue) {
        self.0.insert(field, value);
    }

    /// New value of a field, if it changed.
    pub fn get(&self, field: ImageField) -> Option<&FieldValue> {
        self.0.get(&field)
    }

    /// True when nothing changed.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of changed fields.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Changed fields in stable order.
    pub fn fields(&self) -> impl Iterator<Item = ImageField> + '_ {
        self.0.keys().copied()
    }

    /// Changed fields with their new values.
    pub fn iter(&self) -> impl Iterator<Item = (&ImageField, &FieldValue)> {
        self.0.iter()
    }

    /// Document-shaped JSON object of the changed fields.
    pub fn to_json_object(&self) -> serde_json::Map<String, serde_json::Value> {
        self.0
            .iter()
            .map(|(field, value)| (field.key().to_string(), value.to_json()))
            .collect()
    }
}

//! Image-bearing entity records.

use crate::{EntityPatch, FieldValue, ImageField};
use serde::{Deserialize, Serialize};

/// A record (e.g. a city) owning up to five independent image fields.
///
/// Only the fields the migration pipeline reads are modelled; stores keep
/// the full document and apply [`EntityPatch`]es key by key, so other
/// document properties are never rewritten. List elements may be `null`
/// in a document; such slots are kept as `None` and written back as `null`.
///
/// # Examples
///
/// ```
/// use wayfarer_core::{Entity, ImageField};
///
/// let city: Entity = serde_json::from_value(serde_json::json!({
///     "id": "c1",
///     "name": "Lisbon",
///     "imageUrl": "https://img.example/a.jpg",
///     "imageUrls": ["https://img.example/b.jpg", null]
/// })).unwrap();
///
/// assert_eq!(city.single(ImageField::Primary), Some("https://img.example/a.jpg"));
/// assert_eq!(city.list(ImageField::Gallery).map(|l| l.len()), Some(2));
/// assert!(city.list(ImageField::Highlights).is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    /// Document id
    pub id: String,
    /// Display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// URL slug
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    /// Singular hero image
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Gallery images
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_urls: Option<Vec<Option<String>>>,
    /// Highlight images
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlight_images: Option<Vec<Option<String>>>,
    /// Activity images
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity_images: Option<Vec<Option<String>>>,
    /// Accommodation images
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accommodation_images: Option<Vec<Option<String>>>,
}

impl Entity {
    /// Create an entity with no image fields set.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    /// Name used in logs and report lines.
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or(self.slug.as_deref())
            .unwrap_or(&self.id)
    }

    /// Name blob filenames are derived from: slug, then name, then id.
    pub fn naming_source(&self) -> &str {
        self.slug
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .or(self.name.as_deref().filter(|s| !s.trim().is_empty()))
            .unwrap_or(&self.id)
    }

    /// Value of the singular field, if the field is singular and set.
    pub fn single(&self, field: ImageField) -> Option<&str> {
        match field {
            ImageField::Primary => self.image_url.as_deref(),
            _ => None,
        }
    }

    /// Values of a list field, if the field is a list and set.
    pub fn list(&self, field: ImageField) -> Option<&[Option<String>]> {
        let list = match field {
            ImageField::Primary => return None,
            ImageField::Gallery => &self.image_urls,
            ImageField::Highlights => &self.highlight_images,
            ImageField::Activities => &self.activity_images,
            ImageField::Accommodations => &self.accommodation_images,
        };
        list.as_deref()
    }

    /// Current value of a field in patch form.
    pub fn value(&self, field: ImageField) -> Option<FieldValue> {
        if field.is_list() {
            self.list(field).map(|l| FieldValue::List(l.to_vec()))
        } else {
            self.single(field).map(|s| FieldValue::Single(s.to_string()))
        }
    }

    /// Overwrite the fields present in `patch`, leaving every other field untouched.
    pub fn apply(&mut self, patch: &EntityPatch) {
        for (field, value) in patch.iter() {
            match (field, value) {
                (ImageField::Primary, FieldValue::Single(v)) => self.image_url = Some(v.clone()),
                (ImageField::Gallery, FieldValue::List(v)) => self.image_urls = Some(v.clone()),
                (ImageField::Highlights, FieldValue::List(v)) => {
                    self.highlight_images = Some(v.clone())
                }
                (ImageField::Activities, FieldValue::List(v)) => {
                    self.activity_images = Some(v.clone())
                }
                (ImageField::Accommodations, FieldValue::List(v)) => {
                    self.accommodation_images = Some(v.clone())
                }
                // Arity mismatch: patches are built per field shape, so ignore.
                _ => {}
            }
        }
    }

    /// Total number of image slots across all fields, empty and `null` ones included.
    pub fn image_count(&self) -> usize {
        let single = usize::from(self.image_url.is_some());
        let lists: usize = [
            &self.image_urls,
            &self.highlight_images,
            &self.activity_images,
            &self.accommodation_images,
        ]
        .iter()
        .map(|l| l.as_ref().map_or(0, Vec::len))
        .sum();
        single + lists
    }
}

//! Raw JSON document helpers shared by the store backends.

use serde_json::{Map, Value};
use wayfarer_core::{Entity, EntityPatch};
use wayfarer_error::{StoreError, StoreErrorKind, ValidationError, WayfarerResult};

/// Decode a stored document into the typed entity view.
///
/// Keys the entity type does not know about are ignored here and kept in
/// the document itself.
pub(crate) fn decode(id: &str, document: &Value) -> WayfarerResult<Entity> {
    serde_json::from_value(document.clone()).map_err(|e| {
        StoreError::new(StoreErrorKind::Malformed {
            id: id.to_string(),
            reason: e.to_string(),
        })
        .into()
    })
}

/// Extract the `id` key of a new document.
pub(crate) fn document_id(document: &Value) -> WayfarerResult<String> {
    document
        .get("id")
        .and_then(Value::as_str)
        .filter(|id| !id.trim().is_empty())
        .map(str::to_string)
        .ok_or_else(|| ValidationError::new("Entity document must be an object with a string 'id'").into())
}

/// Overwrite exactly the patched keys of `document`.
pub(crate) fn merge_patch(id: &str, document: &mut Value, patch: &EntityPatch) -> WayfarerResult<()> {
    let object: &mut Map<String, Value> = document.as_object_mut().ok_or_else(|| {
        StoreError::new(StoreErrorKind::Malformed {
            id: id.to_string(),
            reason: "document is not a JSON object".to_string(),
        })
    })?;
    object.extend(patch.to_json_object());
    Ok(())
}

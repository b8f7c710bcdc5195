//! Core data types for the Wayfarer media pipeline.
//!
//! This crate holds the typed model every other crate speaks:
//! image categories, the five image-bearing entity fields, partial
//! updates, per-entity and per-run outcomes, and the URL taxonomy that
//! decides whether a value still needs migrating.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod category;
mod entity;
mod field;
mod outcome;
mod patch;
mod taxonomy;

pub use category::MediaCategory;
pub use entity::Entity;
pub use field::ImageField;
pub use outcome::{
    BatchReport, ElementIssue, EntityOutcome, EntityStatus, ImageChange, IssueKind,
    MigrationResult,
};
pub use patch::{EntityPatch, FieldValue};
pub use taxonomy::{classify, needs_migration, sniff_image_mime, BlobHostPattern, ImageSource};

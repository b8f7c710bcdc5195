//! Error types for the Wayfarer media pipeline.
//!
//! This crate provides the error taxonomy shared by every Wayfarer crate.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All errors use `#[track_caller]` for automatic location capture
//!
//! Only [`ConfigError`] aborts a whole migration run. Every other error is
//! caught at the smallest scope that can record it (element, entity) and
//! downgraded to a reported outcome.
//!
//! # Examples
//!
//! ```
//! use wayfarer_error::{NotFoundError, WayfarerResult};
//!
//! fn load_city(id: &str) -> WayfarerResult<String> {
//!     Err(NotFoundError::new("entity", id))?
//! }
//!
//! let err = load_city("c404").unwrap_err();
//! assert!(err.is_not_found());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod classification;
mod compression;
mod config;
mod error;
mod json;
mod not_found;
mod storage;
mod store;
mod transport;
mod validation;

pub use classification::{ClassificationError, ClassificationErrorKind};
pub use compression::{CompressionError, CompressionErrorKind};
pub use config::ConfigError;
pub use error::{WayfarerError, WayfarerErrorKind, WayfarerResult};
pub use json::JsonError;
pub use not_found::NotFoundError;
pub use storage::{StorageError, StorageErrorKind};
pub use store::{StoreError, StoreErrorKind};
pub use transport::{TransportError, TransportErrorKind};
pub use validation::ValidationError;

//! Blob storage for the Wayfarer media pipeline.
//!
//! Once bytes are uploaded here they are owned by the blob backend and
//! addressed by a public URL. Whether a URL points into the store is the
//! idempotency predicate for the whole migration: see [`BlobStorage::is_blob_url`].
//!
//! # Features
//!
//! - **Pluggable backends**: filesystem (served under a public base URL) and in-memory
//! - **Deterministic naming**: `{category}/{slug}-{timestamp|hash}.{ext}`
//! - **Atomic writes**: temp file + rename
//! - **Source fetching**: http(s) and `data:` URIs
//!
//! # Example
//!
//! ```rust,no_run
//! use wayfarer_core::MediaCategory;
//! use wayfarer_storage::{BlobNaming, BlobStorage, FileSystemBlobStorage, SourceFetcher};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let storage = FileSystemBlobStorage::new(
//!     "/var/wayfarer/blob",
//!     "https://blob.store/media",
//!     BlobNaming::Timestamp,
//!     SourceFetcher::default(),
//! )?;
//!
//! let reference = storage
//!     .upload_from_url("https://img.example/a.jpg", MediaCategory::Cities, Some("lisbon-hero"))
//!     .await?;
//! assert!(storage.is_blob_url(&reference.url));
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod fetch;
mod filesystem;
mod memory;
mod naming;
mod storage;

pub use fetch::SourceFetcher;
pub use filesystem::FileSystemBlobStorage;
pub use memory::InMemoryBlobStorage;
pub use naming::{blob_file_name, extension_for, slugify, BlobNaming};
pub use storage::{BlobReference, BlobStorage};
pub use wayfarer_error::{StorageError, StorageErrorKind};

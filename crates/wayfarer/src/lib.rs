//! Wayfarer - media compression and storage migration.
//!
//! Wayfarer moves the images referenced by travel-content entities (cities,
//! highlights, activities, accommodations) off third-party hosts and inline
//! base64 payloads into durable blob storage, re-encoding them on the way.
//!
//! # Features
//!
//! - **Compression engine**: resize-to-fit plus WebP, or the smaller of PNG and JPEG
//! - **Idempotent migration**: already-migrated URLs are recognised by host and never touched
//! - **Partial writes**: only changed fields are written back
//! - **Dry runs**: preview every change with no uploads and no writes
//! - **Pluggable backends**: filesystem or in-memory blobs, JSON-directory or in-memory entities
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use wayfarer::{WayfarerConfig, RunRequest};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = WayfarerConfig::load()?;
//! let orchestrator = config.build_orchestrator()?;
//!
//! let response = orchestrator.execute(&RunRequest::batch(true)).await?;
//! if let wayfarer::RunOutcome::Batch { report } = &response.outcome {
//!     for line in report.detail_lines() {
//!         println!("{}", line);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod observability;

pub use config::{
    BlobConfig, LoggingConfig, MigrationSettings, ServerConfig, StoreConfig, WayfarerConfig,
};
pub use observability::init_logging;

pub use wayfarer_compression::{
    compress, compress_async, CompressionOptions, CompressionProfiles, CompressionResult,
    OutputFormat, TargetFormat,
};
pub use wayfarer_core::{
    classify, needs_migration, BatchReport, BlobHostPattern, ElementIssue, Entity,
    EntityOutcome, EntityPatch, EntityStatus, FieldValue, ImageChange, ImageField, ImageSource,
    IssueKind, MediaCategory, MigrationResult,
};
pub use wayfarer_error::{
    ConfigError, JsonError, NotFoundError, StorageError, StorageErrorKind, ValidationError,
    WayfarerError, WayfarerErrorKind, WayfarerResult,
};
pub use wayfarer_migration::{
    MigrationOrchestrator, OrchestratorConfig, OrchestratorConfigBuilder, RunOptions,
    RunOutcome, RunRequest, RunResponse,
};
pub use wayfarer_server::{create_router, serve, ApiState};
pub use wayfarer_storage::{
    BlobNaming, BlobReference, BlobStorage, FileSystemBlobStorage, InMemoryBlobStorage,
    SourceFetcher,
};
pub use wayfarer_store::{EntityFilter, EntityStore, InMemoryEntityStore, JsonDirectoryStore};

//! Migration orchestrator for the Wayfarer media pipeline.
//!
//! Scans image-bearing entities, moves every image that is not yet on blob
//! storage into it (optionally re-encoding on the way), and writes back only
//! the fields that changed.
//!
//! # Guarantees
//!
//! - **Idempotent**: a value already on a blob host is never touched, so a
//!   second run reports every entity unchanged with zero backend calls
//! - **Order preserving**: list fields keep their element order
//! - **Dry-run pure**: dry runs never upload and never write to the store
//! - **Failure isolated**: one element or one entity failing never affects another
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use wayfarer_migration::{MigrationOrchestrator, OrchestratorConfig, RunRequest};
//! use wayfarer_storage::InMemoryBlobStorage;
//! use wayfarer_store::InMemoryEntityStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let orchestrator = MigrationOrchestrator::new(
//!     OrchestratorConfig::default(),
//!     Some(Arc::new(InMemoryEntityStore::new())),
//!     Some(Arc::new(InMemoryBlobStorage::new("https://blob.store"))),
//! )?;
//!
//! let response = orchestrator.execute(&RunRequest::batch(true)).await?;
//! println!("{}", serde_json::to_string_pretty(&response)?);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod element;
mod orchestrator;
mod request;

pub use config::{OrchestratorConfig, OrchestratorConfigBuilder, RunOptions};
pub use orchestrator::MigrationOrchestrator;
pub use request::{RunOutcome, RunRequest, RunResponse};

//! Orchestrator configuration and per-run options.

use derive_getters::Getters;
use std::collections::BTreeSet;
use std::time::Duration;
use strum::IntoEnumIterator;
use wayfarer_compression::{CompressionProfiles, TargetFormat};
use wayfarer_core::{ImageField, MediaCategory};

/// Explicit orchestrator configuration.
///
/// Backend availability is a plain flag here instead of an ambient
/// environment toggle; a `false` flag is rejected when the orchestrator is
/// constructed, before any work starts.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use wayfarer_migration::OrchestratorConfigBuilder;
///
/// let config = OrchestratorConfigBuilder::default()
///     .entity_concurrency(2usize)
///     .deadline(Some(Duration::from_secs(600)))
///     .build()
///     .unwrap();
/// assert_eq!(*config.entity_concurrency(), 2);
/// assert_eq!(*config.image_concurrency(), 8);
/// assert!(*config.blob_configured());
/// ```
#[derive(Debug, Clone, Getters, derive_setters::Setters, derive_builder::Builder)]
#[setters(prefix = "with_")]
#[builder(default)]
pub struct OrchestratorConfig {
    /// Blob storage backend is configured
    blob_configured: bool,

    /// Entity store backend is configured
    store_configured: bool,

    /// Entities migrated at the same time
    entity_concurrency: usize,

    /// Image jobs in flight across the whole run
    image_concurrency: usize,

    /// Re-encode images before upload
    compress_on_ingest: bool,

    /// Encoding path used when compressing on ingest
    target_format: TargetFormat,

    /// Per-category compression constraints
    profiles: CompressionProfiles,

    /// Entities not started before this much time has passed are reported as not started
    deadline: Option<Duration>,

    /// Per-request timeout for source downloads
    fetch_timeout: Duration,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            blob_configured: true,
            store_configured: true,
            entity_concurrency: 4,
            image_concurrency: 8,
            compress_on_ingest: true,
            target_format: TargetFormat::default(),
            profiles: CompressionProfiles::default(),
            deadline: None,
            fetch_timeout: Duration::from_secs(30),
        }
    }
}

/// Options for one run, derived from a validated request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Compute outcomes without uploads or store writes
    pub dry_run: bool,
    /// Restrict the run to fields of these categories; `None` means all
    pub categories: Option<BTreeSet<MediaCategory>>,
}

impl RunOptions {
    /// A run over every image field.
    pub fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            categories: None,
        }
    }

    /// Restrict the run to some categories.
    pub fn with_categories(mut self, categories: impl IntoIterator<Item = MediaCategory>) -> Self {
        self.categories = Some(categories.into_iter().collect());
        self
    }

    /// Image fields this run looks at, in canonical order.
    pub fn fields(&self) -> Vec<ImageField> {
        ImageField::iter()
            .filter(|field| {
                self.categories
                    .as_ref()
                    .is_none_or(|categories| categories.contains(&field.category()))
            })
            .collect()
    }
}

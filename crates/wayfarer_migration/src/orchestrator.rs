//! The migration orchestrator.

use crate::element::{abbreviate, issue_kind, url_extension, ElementJob, ElementOutcome};
use crate::{OrchestratorConfig, RunOptions};
use futures::stream::{self, StreamExt};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tracing::{debug, info, instrument, warn};
use wayfarer_compression::{compress_async, TargetFormat};
use wayfarer_core::{
    classify, BatchReport, Entity, EntityOutcome, EntityPatch, FieldValue, ImageChange,
    ImageField, ImageSource, IssueKind, MediaCategory, MigrationResult,
};
use wayfarer_error::{ConfigError, WayfarerResult};
use wayfarer_storage::{extension_for, slugify, BlobStorage, SourceFetcher};
use wayfarer_store::{EntityFilter, EntityStore};

/// Moves entity images into blob storage and writes back changed fields.
///
/// The orchestrator is stateless between runs: whether a value still needs
/// migrating is decided purely by whether its URL is on a blob host.
pub struct MigrationOrchestrator {
    config: OrchestratorConfig,
    store: Arc<dyn EntityStore>,
    blob: Arc<dyn BlobStorage>,
    fetcher: SourceFetcher,
    image_permits: Arc<Semaphore>,
}

impl std::fmt::Debug for MigrationOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MigrationOrchestrator")
            .field("config", &self.config)
            .field("available_image_permits", &self.image_permits.available_permits())
            .finish_non_exhaustive()
    }
}

impl MigrationOrchestrator {
    /// Create an orchestrator over a store and a blob backend.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when either backend is flagged as not
    /// configured or is missing, or when a concurrency limit is zero.
    pub fn new(
        config: OrchestratorConfig,
        store: Option<Arc<dyn EntityStore>>,
        blob: Option<Arc<dyn BlobStorage>>,
    ) -> WayfarerResult<Self> {
        let blob = match blob {
            Some(blob) if *config.blob_configured() => blob,
            _ => return Err(ConfigError::new("Blob storage is not configured").into()),
        };
        let store = match store {
            Some(store) if *config.store_configured() => store,
            _ => return Err(ConfigError::new("Entity store is not configured").into()),
        };
        if *config.entity_concurrency() == 0 || *config.image_concurrency() == 0 {
            return Err(ConfigError::new("Concurrency limits must be at least 1").into());
        }

        let fetcher = SourceFetcher::new(*config.fetch_timeout())?;
        let image_permits = Arc::new(Semaphore::new(*config.image_concurrency()));

        info!(
            entity_concurrency = config.entity_concurrency(),
            image_concurrency = config.image_concurrency(),
            compress_on_ingest = config.compress_on_ingest(),
            target_format = %config.target_format(),
            "Created migration orchestrator"
        );

        Ok(Self {
            config,
            store,
            blob,
            fetcher,
            image_permits,
        })
    }

    /// Use a different fetcher for source downloads.
    pub fn with_fetcher(mut self, fetcher: SourceFetcher) -> Self {
        self.fetcher = fetcher;
        self
    }

    /// Configuration this orchestrator runs with.
    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Migrate every image field of one entity.
    ///
    /// # Errors
    ///
    /// A missing entity surfaces as a not-found error; store read and write
    /// failures are returned as-is. Element failures never error: they are
    /// recorded in the result and the original value is kept.
    pub async fn migrate_entity(&self, entity_id: &str, dry_run: bool) -> WayfarerResult<MigrationResult> {
        self.migrate_entity_with(entity_id, &RunOptions::new(dry_run))
            .await
    }

    /// Migrate one entity with explicit run options.
    #[instrument(skip(self, options), fields(dry_run = options.dry_run))]
    pub async fn migrate_entity_with(
        &self,
        entity_id: &str,
        options: &RunOptions,
    ) -> WayfarerResult<MigrationResult> {
        let entity = self.store.get(entity_id).await?;
        self.migrate_loaded(&entity, options).await
    }

    /// Migrate every entity the store lists.
    ///
    /// # Errors
    ///
    /// Only a failure to enumerate entity ids is returned. Per-entity failures,
    /// including documents that cannot be read or decoded, are recorded in the
    /// report and never stop the run.
    pub async fn migrate_all(&self, dry_run: bool) -> WayfarerResult<BatchReport> {
        self.migrate_all_with(&RunOptions::new(dry_run)).await
    }

    /// Migrate every entity with explicit run options.
    #[instrument(skip(self, options), fields(dry_run = options.dry_run))]
    pub async fn migrate_all_with(&self, options: &RunOptions) -> WayfarerResult<BatchReport> {
        let started = Instant::now();
        let deadline = (*self.config.deadline()).map(|limit| started + limit);
        let ids = self.store.list_ids(&EntityFilter::new()).await?;

        info!(entities = ids.len(), "Starting batch migration");

        let outcomes: Vec<EntityOutcome> = stream::iter(ids)
            .map(|id| async move {
                if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
                    debug!(entity_id = %id, "Deadline expired, not starting entity");
                    return EntityOutcome::not_started(id.as_str(), id.as_str());
                }
                // An unreadable document fails alone
                let entity = match self.store.get(&id).await {
                    Ok(entity) => entity,
                    Err(e) => {
                        warn!(entity_id = %id, error = %e, "Entity could not be read");
                        return EntityOutcome::failed(id.as_str(), id.as_str(), e.to_string());
                    }
                };
                let name = entity.display_name().to_string();
                match self.migrate_loaded(&entity, options).await {
                    Ok(result) => EntityOutcome::completed(name, result),
                    Err(e) => {
                        warn!(entity_id = %entity.id, error = %e, "Entity migration failed");
                        EntityOutcome::failed(entity.id.as_str(), name, e.to_string())
                    }
                }
            })
            .buffered(*self.config.entity_concurrency())
            .collect()
            .await;

        let mut report = BatchReport::new(options.dry_run);
        for outcome in outcomes {
            report.record(outcome);
        }

        info!(
            total = report.total,
            migrated = report.migrated,
            skipped = report.skipped,
            failed = report.failed,
            not_started = report.not_started,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Batch migration complete"
        );
        Ok(report)
    }

    #[instrument(skip(self, entity, options), fields(entity_id = %entity.id))]
    async fn migrate_loaded(&self, entity: &Entity, options: &RunOptions) -> WayfarerResult<MigrationResult> {
        let mut fields: BTreeMap<ImageField, FieldValue> = options
            .fields()
            .into_iter()
            .filter_map(|field| entity.value(field).map(|value| (field, value)))
            .collect();
        let jobs = collect_jobs(&fields);
        if jobs.is_empty() {
            debug!("No image values to inspect");
            return Ok(MigrationResult::unchanged(entity.id.as_str(), options.dry_run));
        }

        let naming_source = slugify(entity.naming_source());
        let element_futures: Vec<_> = jobs
            .iter()
            .map(|job| self.migrate_element(job, &naming_source, options.dry_run))
            .collect();
        let outcomes: Vec<ElementOutcome> = stream::iter(element_futures)
            .buffered(*self.config.image_concurrency())
            .collect()
            .await;

        let mut patch = EntityPatch::default();
        let mut changes = Vec::new();
        let mut issues = Vec::new();
        for (job, outcome) in jobs.iter().zip(outcomes) {
            match outcome {
                ElementOutcome::Kept => {}
                ElementOutcome::Replaced(url) if url == job.value => {}
                ElementOutcome::Replaced(url) => {
                    if let Some(value) = fields.get_mut(&job.field) {
                        replace_element(value, job.index, &url);
                    }
                    changes.push(ImageChange {
                        field: job.field,
                        index: job.index,
                        old: abbreviate(&job.value),
                        new: url,
                    });
                }
                ElementOutcome::Failed(issue) => issues.push(issue),
            }
        }

        // Whole field values go into the patch, untouched elements included
        for change in &changes {
            if patch.get(change.field).is_none() {
                if let Some(value) = fields.get(&change.field) {
                    patch.insert(change.field, value.clone());
                }
            }
        }

        if patch.is_empty() {
            debug!(issues = issues.len(), "Nothing to migrate");
            let mut result = MigrationResult::unchanged(entity.id.as_str(), options.dry_run);
            result.issues = issues;
            return Ok(result);
        }

        let result = MigrationResult {
            entity_id: entity.id.clone(),
            updated_fields: patch,
            unchanged: false,
            dry_run: options.dry_run,
            changes,
            issues,
        };

        if options.dry_run {
            info!(
                fields = result.updated_fields.len(),
                images = result.changes.len(),
                "Dry run, skipping write"
            );
            return Ok(result);
        }

        self.store
            .patch_fields(&entity.id, &result.updated_fields)
            .await?;
        info!(
            fields = result.updated_fields.len(),
            images = result.changes.len(),
            issues = result.issues.len(),
            "Migrated entity"
        );
        Ok(result)
    }

    async fn migrate_element(&self, job: &ElementJob, naming_source: &str, dry_run: bool) -> ElementOutcome {
        let source = match classify(&job.value, self.blob.host_pattern()) {
            Ok(source) => source,
            Err(e) => {
                warn!(field = %job.field, index = ?job.index, error = %e, "Unclassifiable image value");
                return ElementOutcome::Failed(job.issue(IssueKind::Unclassifiable, e.to_string()));
            }
        };
        if !source.needs_migration() {
            return ElementOutcome::Kept;
        }

        let category = job.field.category();
        let stem = job.file_stem(naming_source);
        if dry_run {
            let extension = self.planned_extension(&source);
            return ElementOutcome::Replaced(self.blob.planned_url(category, Some(&stem), &extension));
        }

        let _permit = match self.image_permits.acquire().await {
            Ok(permit) => permit,
            Err(e) => return ElementOutcome::Failed(job.issue(IssueKind::Other, e.to_string())),
        };

        let uploaded = match source {
            ImageSource::Remote(url) => self.upload_remote(&url, category, &stem).await,
            ImageSource::Inline { data, .. } => self.upload_bytes(data, category, &stem).await,
            ImageSource::Empty | ImageSource::Blob(_) => return ElementOutcome::Kept,
        };

        match uploaded {
            Ok(url) => {
                debug!(field = %job.field, index = ?job.index, url = %url, "Uploaded image");
                ElementOutcome::Replaced(url)
            }
            Err(e) => {
                warn!(field = %job.field, index = ?job.index, error = %e, "Image migration failed, keeping original value");
                ElementOutcome::Failed(job.issue(issue_kind(&e), e.to_string()))
            }
        }
    }

    async fn upload_remote(&self, url: &str, category: MediaCategory, stem: &str) -> WayfarerResult<String> {
        if !*self.config.compress_on_ingest() {
            let reference = self.blob.upload_from_url(url, category, Some(stem)).await?;
            return Ok(reference.url);
        }
        let data = self.fetcher.fetch(url).await?;
        self.upload_bytes(data, category, stem).await
    }

    async fn upload_bytes(&self, data: Vec<u8>, category: MediaCategory, stem: &str) -> WayfarerResult<String> {
        let bytes = if *self.config.compress_on_ingest() {
            let options = self
                .config
                .profiles()
                .get(category)
                .with_target(*self.config.target_format());
            let result = compress_async(data, options).await;
            debug!(
                original = result.original_size,
                compressed = result.compressed_size,
                reduction = result.reduction_percent,
                format = %result.format,
                "Compressed image"
            );
            result.buffer
        } else {
            data
        };
        let reference = self.blob.upload_from_bytes(&bytes, category, Some(stem)).await?;
        Ok(reference.url)
    }

    /// Extension a real upload would most likely get.
    fn planned_extension(&self, source: &ImageSource) -> String {
        if *self.config.compress_on_ingest() && *self.config.target_format() == TargetFormat::WebP {
            return "webp".to_string();
        }
        match source {
            ImageSource::Remote(url) => url_extension(url).unwrap_or_else(|| "bin".to_string()),
            ImageSource::Inline { data, .. } => extension_for(data).to_string(),
            ImageSource::Empty | ImageSource::Blob(_) => "bin".to_string(),
        }
    }
}

/// Flatten the inspected fields into element jobs, in field then list order.
///
/// `null` list slots produce no job and stay `null` on write-back.
fn collect_jobs(fields: &BTreeMap<ImageField, FieldValue>) -> Vec<ElementJob> {
    let mut jobs = Vec::new();
    for (field, value) in fields {
        match value {
            FieldValue::Single(value) => jobs.push(ElementJob {
                field: *field,
                index: None,
                value: value.clone(),
            }),
            FieldValue::List(values) => {
                jobs.extend(values.iter().enumerate().filter_map(|(index, slot)| {
                    slot.as_ref().map(|value| ElementJob {
                        field: *field,
                        index: Some(index),
                        value: value.clone(),
                    })
                }))
            }
        }
    }
    jobs
}

fn replace_element(value: &mut FieldValue, index: Option<usize>, url: &str) {
    match (value, index) {
        (FieldValue::Single(single), None) => *single = url.to_string(),
        (FieldValue::List(list), Some(index)) => {
            if let Some(slot) = list.get_mut(index) {
                *slot = Some(url.to_string());
            }
        }
        _ => {}
    }
}

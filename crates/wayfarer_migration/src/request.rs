//! Run request and response shapes shared by the HTTP and CLI surfaces.

use crate::{MigrationOrchestrator, RunOptions};
use serde::{Deserialize, Serialize};
use tracing::info;
use wayfarer_core::{BatchReport, MediaCategory, MigrationResult};
use wayfarer_error::WayfarerResult;

/// A request to run a migration.
///
/// # Examples
///
/// ```
/// use wayfarer_migration::RunRequest;
///
/// let request: RunRequest =
///     serde_json::from_str(r#"{"entityId": "c1", "dryRun": true, "categories": ["cities"]}"#).unwrap();
/// assert_eq!(request.entity_id.as_deref(), Some("c1"));
/// assert!(request.options().is_ok());
///
/// let bad: RunRequest = serde_json::from_str(r#"{"categories": ["stock"]}"#).unwrap();
/// assert!(bad.options().unwrap_err().is_validation());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunRequest {
    /// Migrate only this entity; all entities when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<String>,
    /// Compute outcomes without uploads or store writes
    #[serde(default)]
    pub dry_run: bool,
    /// Restrict to fields of these categories; all when absent or empty
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<String>>,
}

impl RunRequest {
    /// A run over every entity.
    pub fn batch(dry_run: bool) -> Self {
        Self {
            dry_run,
            ..Default::default()
        }
    }

    /// A run over one entity.
    pub fn entity(entity_id: impl Into<String>, dry_run: bool) -> Self {
        Self {
            entity_id: Some(entity_id.into()),
            dry_run,
            categories: None,
        }
    }

    /// Restrict the run to some categories.
    pub fn with_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories = Some(categories.into_iter().map(Into::into).collect());
        self
    }

    /// Validate the request into run options.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an unknown category or a blank entity id.
    pub fn options(&self) -> WayfarerResult<RunOptions> {
        if self
            .entity_id
            .as_deref()
            .is_some_and(|id| id.trim().is_empty())
        {
            return Err(wayfarer_error::ValidationError::new("entityId must not be blank").into());
        }
        let options = RunOptions::new(self.dry_run);
        match self.categories.as_deref() {
            None | Some([]) => Ok(options),
            Some(names) => {
                let categories = names
                    .iter()
                    .map(|name| name.parse::<MediaCategory>())
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(options.with_categories(categories))
            }
        }
    }
}

/// Outcome payload of a run, tagged by its scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum RunOutcome {
    /// A single-entity run
    Entity {
        /// Outcome for the entity
        result: MigrationResult,
    },
    /// A run over every entity
    Batch {
        /// Aggregate report
        report: BatchReport,
    },
}

/// Response to a [`RunRequest`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunResponse {
    /// Whether the run was a dry run
    pub dry_run: bool,
    /// Entity result or batch report
    #[serde(flatten)]
    pub outcome: RunOutcome,
}

impl RunResponse {
    /// Whether the run recorded an entity-level failure.
    pub fn has_failures(&self) -> bool {
        match &self.outcome {
            RunOutcome::Entity { .. } => false,
            RunOutcome::Batch { report } => report.has_failures(),
        }
    }
}

impl MigrationOrchestrator {
    /// Execute a run request.
    ///
    /// # Errors
    ///
    /// Validation errors are returned before any work starts. For an
    /// entity-scoped run a missing entity surfaces as not found; batch runs
    /// only fail when entities cannot be listed.
    pub async fn execute(&self, request: &RunRequest) -> WayfarerResult<RunResponse> {
        let options = request.options()?;
        info!(
            entity_id = request.entity_id.as_deref().unwrap_or("*"),
            dry_run = request.dry_run,
            "Executing migration request"
        );
        let outcome = match request.entity_id.as_deref() {
            Some(entity_id) => RunOutcome::Entity {
                result: self.migrate_entity_with(entity_id, &options).await?,
            },
            None => RunOutcome::Batch {
                report: self.migrate_all_with(&options).await?,
            },
        };
        Ok(RunResponse {
            dry_run: request.dry_run,
            outcome,
        })
    }
}

//! Per-entity and per-run migration outcomes.

use crate::{EntityPatch, ImageField};
use serde::{Deserialize, Serialize};

/// One value that was (or in a dry run, would be) replaced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageChange {
    /// Field the value lives in
    pub field: ImageField,
    /// Position within a list field; `None` for the singular field
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    /// Value before migration (inline payloads are abbreviated)
    pub old: String,
    /// Blob URL after migration
    pub new: String,
}

/// Why an element kept its original value.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    /// The value was neither a URL, base64 payload, nor blob reference
    #[display("unclassifiable")]
    Unclassifiable,
    /// Fetching the source failed
    #[display("transport")]
    Transport,
    /// Uploading to blob storage failed
    #[display("storage")]
    Storage,
    /// Any other element failure
    #[display("other")]
    Other,
}

/// An element that could not be migrated and kept its original value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementIssue {
    /// Field the value lives in
    pub field: ImageField,
    /// Position within a list field; `None` for the singular field
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    /// Offending value (abbreviated)
    pub value: String,
    /// Failure class
    pub kind: IssueKind,
    /// Error message
    pub message: String,
}

/// Outcome of migrating one entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationResult {
    /// Entity id
    pub entity_id: String,
    /// Changed fields only, each with its complete new value
    pub updated_fields: EntityPatch,
    /// True when no field changed and the store was not touched
    pub unchanged: bool,
    /// Whether this was computed without uploads or writes
    pub dry_run: bool,
    /// Individual replaced values
    #[serde(default)]
    pub changes: Vec<ImageChange>,
    /// Elements that kept their original value
    #[serde(default)]
    pub issues: Vec<ElementIssue>,
}

impl MigrationResult {
    /// An outcome with nothing to write.
    pub fn unchanged(entity_id: impl Into<String>, dry_run: bool) -> Self {
        Self {
            entity_id: entity_id.into(),
            updated_fields: EntityPatch::default(),
            unchanged: true,
            dry_run,
            changes: Vec::new(),
            issues: Vec::new(),
        }
    }
}

/// Classification of an entity within a batch run.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
#[serde(rename_all = "snake_case")]
pub enum EntityStatus {
    /// At least one field changed
    #[display("migrated")]
    Migrated,
    /// Nothing to migrate
    #[display("skipped")]
    Skipped,
    /// The entity failed as a whole
    #[display("failed")]
    Failed,
    /// Not attempted because the run deadline expired
    #[display("not started")]
    NotStarted,
}

/// Per-entity line of a batch report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityOutcome {
    /// Entity id
    pub entity_id: String,
    /// Entity display name
    pub name: String,
    /// Outcome class
    pub status: EntityStatus,
    /// Result when the entity did not fail
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<MigrationResult>,
    /// Error message when the entity failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Human-readable summary line
    pub detail: String,
}

impl EntityOutcome {
    /// Outcome for an entity that ran to completion.
    pub fn completed(name: impl Into<String>, result: MigrationResult) -> Self {
        let name = name.into();
        let (status, detail) = if result.unchanged {
            let detail = if result.issues.is_empty() {
                format!("{}: already migrated", name)
            } else {
                format!(
                    "{}: nothing migrated, {} image(s) kept original value",
                    name,
                    result.issues.len()
                )
            };
            (EntityStatus::Skipped, detail)
        } else {
            let fields: Vec<String> = result.updated_fields.fields().map(|f| f.to_string()).collect();
            let verb = if result.dry_run { "would migrate" } else { "migrated" };
            let mut detail = format!(
                "{}: {} {} image(s) in {}",
                name,
                verb,
                result.changes.len(),
                fields.join(", ")
            );
            if !result.issues.is_empty() {
                detail.push_str(&format!(", {} kept original value", result.issues.len()));
            }
            (EntityStatus::Migrated, detail)
        };
        Self {
            entity_id: result.entity_id.clone(),
            name,
            status,
            result: Some(result),
            error: None,
            detail,
        }
    }

    /// Outcome for an entity whose migration failed.
    pub fn failed(entity_id: impl Into<String>, name: impl Into<String>, error: impl Into<String>) -> Self {
        let name = name.into();
        let error = error.into();
        Self {
            entity_id: entity_id.into(),
            detail: format!("{}: failed: {}", name, error),
            name,
            status: EntityStatus::Failed,
            result: None,
            error: Some(error),
        }
    }

    /// Outcome for an entity never started because the deadline expired.
    pub fn not_started(entity_id: impl Into<String>, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            entity_id: entity_id.into(),
            detail: format!("{}: not started (deadline expired)", name),
            name,
            status: EntityStatus::NotStarted,
            result: None,
            error: None,
        }
    }
}

/// Aggregate outcome of a run over many entities.
///
/// Built fresh per run and never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    /// Entities enumerated
    pub total: usize,
    /// Entities with at least one changed field
    pub migrated: usize,
    /// Entities with nothing to change
    pub skipped: usize,
    /// Entities that failed as a whole
    pub failed: usize,
    /// Entities not attempted because the deadline expired
    pub not_started: usize,
    /// Whether this was a dry run
    pub dry_run: bool,
    /// One outcome per entity, in enumeration order
    pub per_entity: Vec<EntityOutcome>,
}

impl BatchReport {
    /// Empty report for a run.
    pub fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            ..Default::default()
        }
    }

    /// Add one entity outcome and bump the matching counter.
    pub fn record(&mut self, outcome: EntityOutcome) {
        self.total += 1;
        match outcome.status {
            EntityStatus::Migrated => self.migrated += 1,
            EntityStatus::Skipped => self.skipped += 1,
            EntityStatus::Failed => self.failed += 1,
            EntityStatus::NotStarted => self.not_started += 1,
        }
        self.per_entity.push(outcome);
    }

    /// Whether any entity failed.
    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }

    /// Human-readable detail lines, one per entity.
    pub fn detail_lines(&self) -> impl Iterator<Item = &str> {
        self.per_entity.iter().map(|o| o.detail.as_str())
    }
}

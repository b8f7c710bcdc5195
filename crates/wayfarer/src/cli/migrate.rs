//! Migrate command handler.

use crate::cli::OutputFormat;
use wayfarer::{JsonError, RunOutcome, RunRequest, RunResponse, WayfarerConfig, WayfarerResult};

/// Handle the `migrate` command.
///
/// Returns whether the run recorded failures, so the caller can set the exit code.
pub async fn handle_migrate_command(
    config: &WayfarerConfig,
    entity_id: Option<String>,
    dry_run: bool,
    categories: Vec<String>,
    format: OutputFormat,
) -> WayfarerResult<bool> {
    let orchestrator = config.build_orchestrator()?;

    let mut request = match entity_id {
        Some(id) => RunRequest::entity(id, dry_run),
        None => RunRequest::batch(dry_run),
    };
    if !categories.is_empty() {
        request = request.with_categories(categories);
    }

    let response = orchestrator.execute(&request).await?;
    match format {
        OutputFormat::Json => {
            let rendered = serde_json::to_string_pretty(&response)
                .map_err(|e| JsonError::new(e.to_string()))?;
            println!("{}", rendered);
        }
        OutputFormat::Human => print_human(&response),
    }

    Ok(response.has_failures())
}

fn print_human(response: &RunResponse) {
    let prefix = if response.dry_run { "[dry run] " } else { "" };
    match &response.outcome {
        RunOutcome::Entity { result } => {
            if result.unchanged {
                println!("{}{}: nothing to migrate", prefix, result.entity_id);
            } else {
                println!(
                    "{}{}: {} image(s) in {} field(s)",
                    prefix,
                    result.entity_id,
                    result.changes.len(),
                    result.updated_fields.len()
                );
            }
            for change in &result.changes {
                println!("  {} {} -> {}", change.field, change.old, change.new);
            }
            for issue in &result.issues {
                println!("  ! {} {}: {}", issue.field, issue.value, issue.message);
            }
        }
        RunOutcome::Batch { report } => {
            for line in report.detail_lines() {
                println!("{}{}", prefix, line);
            }
            println!(
                "{}total {} | migrated {} | skipped {} | failed {} | not started {}",
                prefix,
                report.total,
                report.migrated,
                report.skipped,
                report.failed,
                report.not_started
            );
        }
    }
}

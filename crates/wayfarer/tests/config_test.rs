//! Tests for layered configuration.

use std::time::Duration;
use tempfile::TempDir;
use wayfarer::{BlobNaming, MediaCategory, RunRequest, TargetFormat, WayfarerConfig};

fn write_config(dir: &TempDir, body: &str) -> std::path::PathBuf {
    let path = dir.path().join("wayfarer.toml");
    std::fs::write(&path, body).unwrap();
    path
}

#[test]
fn test_bundled_defaults_leave_backends_unconfigured() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "");

    let config = WayfarerConfig::from_file(&path).unwrap();

    assert!(!config.blob.is_configured());
    assert!(!config.store.is_configured());
    assert_eq!(config.blob.naming, BlobNaming::Timestamp);
    assert_eq!(config.migration.entity_concurrency, 4);
    assert_eq!(config.migration.image_concurrency, 8);
    assert!(config.migration.compress_on_ingest);
    assert_eq!(config.migration.target_format, TargetFormat::WebP);
    assert_eq!(config.server.bind, "127.0.0.1:8080");
    assert_eq!(config.logging.level, "info");

    let cities = config.compression.get(MediaCategory::Cities);
    assert_eq!(*cities.max_width(), Some(1920));
    assert_eq!(*cities.max_height(), Some(1080));

    let orchestrator = config.orchestrator_config();
    assert!(!*orchestrator.blob_configured());
    assert!(!*orchestrator.store_configured());
}

#[test]
fn test_file_overrides_defaults() {
    let dir = TempDir::new().unwrap();
    let blob_root = dir.path().join("blob");
    let store_path = dir.path().join("entities");
    let path = write_config(
        &dir,
        &format!(
            r#"
[blob]
root = "{}"
public_base_url = "https://media.example.org/assets"
host_patterns = ["*.cdn.example.org"]
naming = "content_hash"

[store]
path = "{}"

[migration]
entity_concurrency = 2
target_format = "smallest"
deadline_secs = 60

[compression.cities]
quality = 60
"#,
            blob_root.display(),
            store_path.display()
        ),
    );

    let config = WayfarerConfig::from_file(&path).unwrap();

    assert!(config.blob.is_configured());
    assert!(config.store.is_configured());
    assert_eq!(config.blob.naming, BlobNaming::ContentHash);
    assert_eq!(config.blob.host_patterns, vec!["*.cdn.example.org".to_string()]);

    let cities = config.compression.get(MediaCategory::Cities);
    assert_eq!(*cities.quality(), 60);
    assert_eq!(*cities.max_width(), Some(1920));

    let orchestrator = config.orchestrator_config();
    assert!(*orchestrator.blob_configured());
    assert!(*orchestrator.store_configured());
    assert_eq!(*orchestrator.entity_concurrency(), 2);
    assert_eq!(*orchestrator.image_concurrency(), 8);
    assert_eq!(*orchestrator.target_format(), TargetFormat::Smallest);
    assert_eq!(*orchestrator.deadline(), Some(Duration::from_secs(60)));
}

#[test]
fn test_missing_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let result = WayfarerConfig::from_file(dir.path().join("absent.toml"));
    assert!(result.unwrap_err().is_configuration());
}

#[test]
fn test_unconfigured_backends_refuse_to_build() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "");
    let config = WayfarerConfig::from_file(&path).unwrap();

    let err = config.build_orchestrator().unwrap_err();
    assert!(err.is_configuration());
}

#[tokio::test]
async fn test_configured_backends_run_an_empty_batch() {
    let dir = TempDir::new().unwrap();
    let blob_root = dir.path().join("blob");
    let store_path = dir.path().join("entities");
    let path = write_config(
        &dir,
        &format!(
            "[blob]\nroot = \"{}\"\npublic_base_url = \"https://media.example.org/\"\n\n[store]\npath = \"{}\"\n",
            blob_root.display(),
            store_path.display()
        ),
    );

    let config = WayfarerConfig::from_file(&path).unwrap();
    let orchestrator = config.build_orchestrator().unwrap();

    assert!(blob_root.is_dir());
    assert!(store_path.is_dir());

    let response = orchestrator.execute(&RunRequest::batch(false)).await.unwrap();
    assert!(!response.has_failures());
    match response.outcome {
        wayfarer::RunOutcome::Batch { report } => assert_eq!(report.total, 0),
        other => panic!("expected batch outcome, got {:?}", other),
    }
}

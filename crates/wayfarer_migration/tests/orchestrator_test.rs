//! Tests for the migration orchestrator.

mod test_utils;

use std::sync::Arc;
use std::time::Duration;
use test_utils::{orchestrator, passthrough_config, remote, RecordingBlob, RecordingStore, BLOB_BASE};
use wayfarer_core::{Entity, EntityStatus, FieldValue, ImageField, IssueKind, MediaCategory};
use wayfarer_migration::{MigrationOrchestrator, OrchestratorConfig, RunOptions};
use tempfile::TempDir;
use wayfarer_storage::{BlobNaming, BlobStorage, FileSystemBlobStorage, SourceFetcher};
use wayfarer_store::{EntityStore, JsonDirectoryStore};

fn city(id: &str, name: &str) -> Entity {
    Entity {
        name: Some(name.to_string()),
        ..Entity::new(id)
    }
}

fn c1() -> Entity {
    Entity {
        image_url: Some("https://img.example/a.jpg".to_string()),
        image_urls: Some(vec![
            Some("https://img.example/b.jpg".to_string()),
            Some("https://blob.store/already.jpg".to_string()),
        ]),
        ..Entity::new("c1")
    }
}

#[tokio::test]
async fn test_concrete_scenario_migrates_pending_elements_only() {
    let store = Arc::new(RecordingStore::with_entities([c1()]));
    let blob = Arc::new(RecordingBlob::new());
    let orchestrator = orchestrator(passthrough_config(), &store, &blob);

    let result = orchestrator.migrate_entity("c1", false).await.unwrap();

    assert!(!result.unchanged);
    assert_eq!(blob.upload_calls(), 2);
    assert_eq!(store.patch_calls(), 1);

    let fields: Vec<_> = result.updated_fields.fields().collect();
    assert_eq!(fields, [ImageField::Primary, ImageField::Gallery]);

    let entity = store.entity("c1").await;
    let hero = entity.image_url.unwrap();
    assert!(hero.starts_with(BLOB_BASE));
    assert!(hero.contains("/cities/c1-hero-"));

    let gallery: Vec<String> = entity.image_urls.unwrap().into_iter().flatten().collect();
    assert_eq!(gallery.len(), 2);
    assert!(gallery[0].starts_with(BLOB_BASE));
    assert!(gallery[0].contains("/cities/c1-gallery-0-"));
    assert_eq!(gallery[1], "https://blob.store/already.jpg");

    assert_eq!(result.changes.len(), 2);
    assert_eq!(result.changes[1].field, ImageField::Gallery);
    assert_eq!(result.changes[1].index, Some(0));
    assert_eq!(result.changes[1].old, "https://img.example/b.jpg");
}

#[tokio::test]
async fn test_second_run_is_unchanged_with_zero_backend_calls() {
    let store = Arc::new(RecordingStore::with_entities([c1()]));
    let blob = Arc::new(RecordingBlob::new());
    let orchestrator = orchestrator(passthrough_config(), &store, &blob);

    orchestrator.migrate_entity("c1", false).await.unwrap();
    let after_first = store.entity("c1").await;
    store.reset_counters();
    blob.reset_counters();

    let second = orchestrator.migrate_entity("c1", false).await.unwrap();

    assert!(second.unchanged);
    assert!(second.updated_fields.is_empty());
    assert_eq!(blob.upload_calls(), 0);
    assert_eq!(store.patch_calls(), 0);
    assert_eq!(store.entity("c1").await, after_first);
}

#[tokio::test]
async fn test_list_order_preserved_under_random_latency() {
    let urls: Vec<String> = (0..24).map(|i| remote(&format!("g{}", i))).collect();
    let entity = Entity {
        image_urls: Some(urls.iter().cloned().map(Some).collect()),
        ..city("lisbon", "Lisbon")
    };
    let store = Arc::new(RecordingStore::with_entities([entity]));
    let blob = Arc::new(RecordingBlob::new().with_latency(15));
    let orchestrator = orchestrator(passthrough_config(), &store, &blob);

    orchestrator.migrate_entity("lisbon", false).await.unwrap();

    let gallery: Vec<String> = store
        .entity("lisbon")
        .await
        .image_urls
        .unwrap()
        .into_iter()
        .flatten()
        .collect();
    assert_eq!(gallery.len(), urls.len());
    for (index, url) in gallery.iter().enumerate() {
        assert!(
            url.contains(&format!("/cities/lisbon-gallery-{}-", index)),
            "element {} out of place: {}",
            index,
            url
        );
    }
}

#[tokio::test]
async fn test_empty_list_is_unchanged() {
    let entity = Entity {
        image_urls: Some(Vec::new()),
        ..city("empty", "Empty")
    };
    let store = Arc::new(RecordingStore::with_entities([entity]));
    let blob = Arc::new(RecordingBlob::new());
    let orchestrator = orchestrator(passthrough_config(), &store, &blob);

    let result = orchestrator.migrate_entity("empty", false).await.unwrap();

    assert!(result.unchanged);
    assert_eq!(store.patch_calls(), 0);
    assert_eq!(store.entity("empty").await.image_urls, Some(Vec::new()));
}

#[tokio::test]
async fn test_dry_run_is_pure_and_predicts_the_real_write() {
    let store = Arc::new(RecordingStore::with_entities([c1()]));
    let blob = Arc::new(RecordingBlob::new());
    let orchestrator = orchestrator(passthrough_config(), &store, &blob);
    let before = store.entity("c1").await;

    let preview = orchestrator.migrate_entity("c1", true).await.unwrap();

    assert!(preview.dry_run);
    assert!(!preview.unchanged);
    assert_eq!(blob.upload_calls(), 0);
    assert_eq!(store.patch_calls(), 0);
    assert_eq!(store.entity("c1").await, before);

    let real = orchestrator.migrate_entity("c1", false).await.unwrap();

    let preview_fields: Vec<_> = preview.updated_fields.fields().collect();
    let real_fields: Vec<_> = real.updated_fields.fields().collect();
    assert_eq!(preview_fields, real_fields);

    let positions = |result: &wayfarer_core::MigrationResult| {
        result
            .changes
            .iter()
            .map(|c| (c.field, c.index, c.old.clone()))
            .collect::<Vec<_>>()
    };
    assert_eq!(positions(&preview), positions(&real));

    // Untouched elements are identical in both patches
    let untouched = |result: &wayfarer_core::MigrationResult| match result.updated_fields.get(ImageField::Gallery) {
        Some(FieldValue::List(list)) => list[1].clone(),
        other => panic!("unexpected gallery value {:?}", other),
    };
    assert_eq!(untouched(&preview), untouched(&real));
    for change in &preview.changes {
        assert!(blob.is_blob_url(&change.new));
    }
}

#[tokio::test]
async fn test_partial_failure_isolated_to_one_entity() {
    let entities = (1..=3).map(|i| Entity {
        image_url: Some(remote(&format!("e{}", i))),
        ..city(&format!("e{}", i), &format!("City {}", i))
    });
    let store = Arc::new(RecordingStore::with_entities(entities));
    store.fail_patch("e2");
    let blob = Arc::new(RecordingBlob::new());
    let orchestrator = orchestrator(passthrough_config(), &store, &blob);

    let report = orchestrator.migrate_all(false).await.unwrap();

    assert_eq!(report.total, 3);
    assert_eq!(report.migrated, 2);
    assert_eq!(report.failed, 1);
    assert!(report.has_failures());

    let statuses: Vec<_> = report.per_entity.iter().map(|o| o.status).collect();
    assert_eq!(
        statuses,
        [EntityStatus::Migrated, EntityStatus::Failed, EntityStatus::Migrated]
    );
    assert!(report.per_entity[1].detail.starts_with("City 2: failed:"));
    assert!(report.per_entity[1].error.is_some());

    for id in ["e1", "e3"] {
        let url = store.entity(id).await.image_url.unwrap();
        assert!(url.starts_with(BLOB_BASE), "{} not migrated", id);
    }
    assert_eq!(store.entity("e2").await.image_url.unwrap(), remote("e2"));
}

#[tokio::test]
async fn test_element_failure_keeps_original_value() {
    let bad = remote("missing");
    let entity = Entity {
        highlight_images: Some(vec![Some(remote("ok")), Some(bad.clone())]),
        ..city("porto", "Porto")
    };
    let store = Arc::new(RecordingStore::with_entities([entity]));
    let blob = Arc::new(RecordingBlob::new());
    blob.fail_source(&bad);
    let orchestrator = orchestrator(passthrough_config(), &store, &blob);

    let result = orchestrator.migrate_entity("porto", false).await.unwrap();

    assert!(!result.unchanged);
    assert_eq!(result.issues.len(), 1);
    assert_eq!(result.issues[0].field, ImageField::Highlights);
    assert_eq!(result.issues[0].index, Some(1));
    assert_eq!(result.issues[0].kind, IssueKind::Transport);

    let highlights = store.entity("porto").await.highlight_images.unwrap();
    assert!(highlights[0].as_deref().unwrap().contains("/highlights/porto-highlight-0-"));
    assert_eq!(highlights[1].as_deref(), Some(bad.as_str()));
}

#[tokio::test]
async fn test_unclassifiable_value_is_recorded_not_thrown() {
    let entity = Entity {
        image_url: Some("ftp://img.example/a.jpg".to_string()),
        ..city("odd", "Odd")
    };
    let store = Arc::new(RecordingStore::with_entities([entity]));
    let blob = Arc::new(RecordingBlob::new());
    let orchestrator = orchestrator(passthrough_config(), &store, &blob);

    let result = orchestrator.migrate_entity("odd", false).await.unwrap();

    assert!(result.unchanged);
    assert_eq!(result.issues.len(), 1);
    assert_eq!(result.issues[0].kind, IssueKind::Unclassifiable);
    assert_eq!(blob.upload_calls(), 0);
    assert_eq!(store.patch_calls(), 0);
}

#[tokio::test]
async fn test_missing_entity_is_not_found() {
    let store = Arc::new(RecordingStore::default());
    let blob = Arc::new(RecordingBlob::new());
    let orchestrator = orchestrator(passthrough_config(), &store, &blob);

    let err = orchestrator.migrate_entity("nope", false).await.unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn test_missing_backend_is_configuration_error() {
    let store: Arc<dyn EntityStore> = Arc::new(RecordingStore::default());
    let blob: Arc<dyn BlobStorage> = Arc::new(RecordingBlob::new());

    let err = MigrationOrchestrator::new(OrchestratorConfig::default(), Some(store.clone()), None)
        .unwrap_err();
    assert!(err.is_configuration());

    let err = MigrationOrchestrator::new(OrchestratorConfig::default(), None, Some(blob.clone()))
        .unwrap_err();
    assert!(err.is_configuration());

    let flagged_off = OrchestratorConfig::default().with_blob_configured(false);
    let err = MigrationOrchestrator::new(flagged_off, Some(store), Some(blob)).unwrap_err();
    assert!(err.is_configuration());
}

#[tokio::test]
async fn test_expired_deadline_marks_entities_not_started() {
    let entities = (1..=3).map(|i| Entity {
        image_url: Some(remote(&format!("d{}", i))),
        ..city(&format!("d{}", i), &format!("Town {}", i))
    });
    let store = Arc::new(RecordingStore::with_entities(entities));
    let blob = Arc::new(RecordingBlob::new());
    let config = passthrough_config().with_deadline(Some(Duration::ZERO));
    let orchestrator = orchestrator(config, &store, &blob);

    let report = orchestrator.migrate_all(false).await.unwrap();

    assert_eq!(report.total, 3);
    assert_eq!(report.not_started, 3);
    assert_eq!(blob.upload_calls(), 0);
    assert!(report
        .detail_lines()
        .all(|line| line.ends_with("not started (deadline expired)")));
}

#[tokio::test]
async fn test_category_filter_restricts_fields() {
    let entity = Entity {
        image_url: Some(remote("hero")),
        highlight_images: Some(vec![Some(remote("h0"))]),
        activity_images: Some(vec![Some(remote("a0"))]),
        ..city("faro", "Faro")
    };
    let store = Arc::new(RecordingStore::with_entities([entity]));
    let blob = Arc::new(RecordingBlob::new());
    let orchestrator = orchestrator(passthrough_config(), &store, &blob);

    let options = RunOptions::new(false).with_categories([MediaCategory::Highlights]);
    let result = orchestrator.migrate_entity_with("faro", &options).await.unwrap();

    let fields: Vec<_> = result.updated_fields.fields().collect();
    assert_eq!(fields, [ImageField::Highlights]);
    let stored = store.entity("faro").await;
    assert_eq!(stored.image_url.unwrap(), remote("hero"));
    assert_eq!(stored.activity_images.unwrap(), vec![Some(remote("a0"))]);
}

#[tokio::test]
async fn test_image_jobs_bounded_across_entities() {
    let entities = (0..6).map(|i| Entity {
        accommodation_images: Some((0..5).map(|j| Some(remote(&format!("h{}-{}", i, j)))).collect()),
        ..city(&format!("h{}", i), &format!("Hotel {}", i))
    });
    let store = Arc::new(RecordingStore::with_entities(entities));
    let blob = Arc::new(RecordingBlob::new().with_latency(5));
    let config = passthrough_config()
        .with_entity_concurrency(4)
        .with_image_concurrency(3);
    let orchestrator = orchestrator(config, &store, &blob);

    let report = orchestrator.migrate_all(false).await.unwrap();

    assert_eq!(report.migrated, 6);
    assert_eq!(blob.upload_calls(), 30);
    assert!(blob.max_in_flight() <= 3, "saw {} concurrent uploads", blob.max_in_flight());
}

#[tokio::test]
async fn test_inline_payload_is_compressed_to_webp_before_upload() {
    use base64::{engine::general_purpose::STANDARD, Engine};

    let image = image::RgbImage::from_pixel(64, 48, image::Rgb([30, 120, 200]));
    let mut png = std::io::Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(image)
        .write_to(&mut png, image::ImageFormat::Png)
        .unwrap();
    let data_uri = format!("data:image/png;base64,{}", STANDARD.encode(png.into_inner()));

    let entity = Entity {
        image_url: Some(data_uri),
        ..city("inline", "Inline")
    };
    let store = Arc::new(RecordingStore::with_entities([entity]));
    let blob = Arc::new(RecordingBlob::new());
    let orchestrator = orchestrator(OrchestratorConfig::default(), &store, &blob);

    let result = orchestrator.migrate_entity("inline", false).await.unwrap();

    assert!(!result.unchanged);
    let uploaded = blob.uploaded_bytes();
    assert_eq!(uploaded.len(), 1);
    assert_eq!(&uploaded[0][0..4], b"RIFF");
    assert_eq!(&uploaded[0][8..12], b"WEBP");
    assert!(store.entity("inline").await.image_url.unwrap().ends_with(".webp"));
}

#[tokio::test]
async fn test_null_and_empty_list_elements_are_left_in_place() {
    let entity = Entity {
        image_urls: Some(vec![
            Some(remote("g0")),
            None,
            Some(String::new()),
            Some(remote("g3")),
        ]),
        ..city("braga", "Braga")
    };
    let store = Arc::new(RecordingStore::with_entities([entity]));
    let blob = Arc::new(RecordingBlob::new());
    let orchestrator = orchestrator(passthrough_config(), &store, &blob);

    let result = orchestrator.migrate_entity("braga", false).await.unwrap();

    assert!(result.issues.is_empty());
    let indices: Vec<_> = result.changes.iter().map(|c| c.index).collect();
    assert_eq!(indices, [Some(0), Some(3)]);
    assert_eq!(blob.upload_calls(), 2);

    let gallery = store.entity("braga").await.image_urls.unwrap();
    assert_eq!(gallery.len(), 4);
    assert!(gallery[0].as_deref().unwrap().contains("/cities/braga-gallery-0-"));
    assert_eq!(gallery[1], None);
    assert_eq!(gallery[2].as_deref(), Some(""));
    assert!(gallery[3].as_deref().unwrap().contains("/cities/braga-gallery-3-"));
}

#[tokio::test]
async fn test_unreadable_entity_fails_alone_in_batch() {
    let entities = (1..=3).map(|i| Entity {
        image_url: Some(remote(&format!("r{}", i))),
        ..city(&format!("r{}", i), &format!("Region {}", i))
    });
    let store = Arc::new(RecordingStore::with_entities(entities));
    store.fail_get("r2");
    let blob = Arc::new(RecordingBlob::new());
    let orchestrator = orchestrator(passthrough_config(), &store, &blob);

    let report = orchestrator.migrate_all(false).await.unwrap();

    assert_eq!(report.total, 3);
    assert_eq!(report.migrated, 2);
    assert_eq!(report.failed, 1);
    assert_eq!(report.per_entity[1].entity_id, "r2");
    assert_eq!(report.per_entity[1].status, EntityStatus::Failed);
    assert!(report.per_entity[1].detail.starts_with("r2: failed:"));
    assert_eq!(blob.upload_calls(), 2);
    assert_eq!(store.patch_calls(), 2);
}

#[tokio::test]
async fn test_malformed_document_does_not_abort_batch() {
    let temp_dir = TempDir::new().unwrap();
    let documents = [
        ("a", r#"{"id":"a","imageUrl":"https://img.example/a.jpg"}"#),
        ("b", r#"{"id":"b","imageUrls":["https://img.example/x.jpg",null]}"#),
        ("c", r#"{"id":"c","imageUrl":42}"#),
        ("d", r#"{"id":"d","imageUrl":"https://img.example/d.jpg"}"#),
    ];
    for (id, body) in documents {
        std::fs::write(temp_dir.path().join(format!("{}.json", id)), body).unwrap();
    }
    let store: Arc<dyn EntityStore> = Arc::new(JsonDirectoryStore::new(temp_dir.path()).unwrap());
    let blob = Arc::new(RecordingBlob::new());
    let orchestrator = MigrationOrchestrator::new(
        passthrough_config(),
        Some(store),
        Some(blob.clone() as Arc<dyn BlobStorage>),
    )
    .unwrap();

    let report = orchestrator.migrate_all(false).await.unwrap();

    let statuses: Vec<_> = report.per_entity.iter().map(|o| o.status).collect();
    assert_eq!(
        statuses,
        [
            EntityStatus::Migrated,
            EntityStatus::Migrated,
            EntityStatus::Failed,
            EntityStatus::Migrated
        ]
    );
    assert_eq!(report.per_entity[2].entity_id, "c");

    let raw: serde_json::Value =
        serde_json::from_slice(&std::fs::read(temp_dir.path().join("b.json")).unwrap()).unwrap();
    let gallery = raw["imageUrls"].as_array().unwrap();
    assert_eq!(gallery.len(), 2);
    assert!(gallery[0].as_str().unwrap().starts_with(BLOB_BASE));
    assert!(gallery[1].is_null());
}

#[tokio::test]
async fn test_same_named_entities_never_share_a_blob() {
    use base64::{engine::general_purpose::STANDARD, Engine};

    let sources: Vec<Vec<u8>> = (0..8u8)
        .map(|i| {
            let image = image::RgbImage::from_pixel(8, 8, image::Rgb([i * 30, 90, 200 - i * 20]));
            let mut png = std::io::Cursor::new(Vec::new());
            image::DynamicImage::ImageRgb8(image)
                .write_to(&mut png, image::ImageFormat::Png)
                .unwrap();
            png.into_inner()
        })
        .collect();
    let entities = sources.iter().enumerate().map(|(i, png)| Entity {
        image_url: Some(format!("data:image/png;base64,{}", STANDARD.encode(png))),
        ..city(&format!("sj{}", i), "San Jose")
    });
    let store = Arc::new(RecordingStore::with_entities(entities));

    let temp_dir = TempDir::new().unwrap();
    let blob = FileSystemBlobStorage::new(
        temp_dir.path(),
        "https://blob.store/media",
        BlobNaming::Timestamp,
        SourceFetcher::default(),
    )
    .unwrap();
    let orchestrator = MigrationOrchestrator::new(
        passthrough_config().with_entity_concurrency(8),
        Some(store.clone() as Arc<dyn EntityStore>),
        Some(Arc::new(blob) as Arc<dyn BlobStorage>),
    )
    .unwrap();

    let report = orchestrator.migrate_all(false).await.unwrap();
    assert_eq!(report.migrated, 8);

    let mut urls = std::collections::HashSet::new();
    for (i, source) in sources.iter().enumerate() {
        let url = store.entity(&format!("sj{}", i)).await.image_url.unwrap();
        let key = url.strip_prefix("https://blob.store/media/").unwrap();
        assert!(key.starts_with("cities/san-jose-hero-"), "unexpected key {}", key);
        let on_disk = std::fs::read(temp_dir.path().join(key)).unwrap();
        assert_eq!(&on_disk, source, "sj{} points at another entity's image", i);
        urls.insert(url);
    }
    assert_eq!(urls.len(), 8);
}

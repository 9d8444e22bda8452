//! Embedded backend tests
//!
//! RedbBackend against temporary database files.

use chrono::{Duration, Utc};
use tempfile::TempDir;

use scanty::config::EmbeddedConfig;
use scanty::errors::ScantyError;
use scanty::storage::{Item, LinkBackend, RedbBackend};

fn config_in(dir: &TempDir) -> EmbeddedConfig {
    EmbeddedConfig {
        path: dir.path().join("links.redb").display().to_string(),
        table: "links".to_string(),
    }
}

async fn open_temp() -> (RedbBackend, TempDir) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let backend = RedbBackend::open(&config_in(&dir)).await.unwrap();
    (backend, dir)
}

#[tokio::test]
async fn test_create_load_and_visits() {
    let (backend, _dir) = open_temp().await;

    backend.create(&Item::new(100, "https://r/a", None)).await.unwrap();
    assert_eq!(backend.load(100).await.unwrap(), "https://r/a");
    assert_eq!(backend.load(100).await.unwrap(), "https://r/a");

    let info = backend.load_info(100).await.unwrap();
    assert_eq!(info.visits, 2);
    assert_eq!(info.id, 100);
}

#[tokio::test]
async fn test_duplicate_and_missing() {
    let (backend, _dir) = open_temp().await;

    backend.create(&Item::new(1, "https://r/1", None)).await.unwrap();
    assert!(backend
        .create(&Item::new(1, "https://r/other", None))
        .await
        .unwrap_err()
        .is_duplicate());
    assert!(backend.load(2).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_expired_record_is_lazily_hidden_then_swept() {
    let (backend, _dir) = open_temp().await;
    let past = Utc::now() - Duration::minutes(10);

    backend.create(&Item::new(3, "https://r/old", Some(past))).await.unwrap();
    backend
        .create(&Item::new(4, "https://r/new", Some(Utc::now() + Duration::hours(1))))
        .await
        .unwrap();

    assert!(backend.load(3).await.unwrap_err().is_not_found());

    let stat = backend.stat().await.unwrap();
    assert_eq!(stat.active_items, Some(1));
    assert_eq!(stat.details["stored_items"], 2);

    assert_eq!(backend.clean_expired().await.unwrap(), 1);
    assert_eq!(backend.stat().await.unwrap().details["stored_items"], 1);
    assert_eq!(backend.load(4).await.unwrap(), "https://r/new");
}

#[tokio::test]
async fn test_expired_id_can_be_reused() {
    let (backend, _dir) = open_temp().await;
    let past = Utc::now() - Duration::minutes(1);

    backend.create(&Item::new(8, "https://r/was", Some(past))).await.unwrap();
    backend.create(&Item::new(8, "https://r/is", None)).await.unwrap();

    assert_eq!(backend.load(8).await.unwrap(), "https://r/is");
    assert_eq!(backend.clean_expired().await.unwrap(), 0);
}

#[tokio::test]
async fn test_data_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let config = config_in(&dir);

    {
        let backend = RedbBackend::open(&config).await.unwrap();
        backend.create(&Item::new(77, "https://r/persist", None)).await.unwrap();
        backend.close().await.unwrap();
    }

    let backend = RedbBackend::open(&config).await.unwrap();
    assert_eq!(backend.load(77).await.unwrap(), "https://r/persist");
}

#[tokio::test]
async fn test_closed_backend_rejects_operations() {
    let (backend, _dir) = open_temp().await;
    backend.close().await.unwrap();

    let err = backend.load(1).await.unwrap_err();
    assert!(matches!(err, ScantyError::DatabaseConnection(_)));
    assert!(backend.create(&Item::new(1, "https://r", None)).await.is_err());

    // 重复关闭无副作用
    backend.close().await.unwrap();
}

#[tokio::test]
async fn test_capabilities() {
    let (backend, _dir) = open_temp().await;
    let caps = backend.capabilities();
    assert!(!caps.find);
    assert!(caps.clean_expired);
    assert_eq!(backend.find("https://anything").await.unwrap(), None);
}

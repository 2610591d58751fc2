//! Tests for the async import entry points (file reads, format detection,
//! profile handling).

use std::sync::{Arc, Mutex};

use linkvault::database::migrations::DEFAULT_PROFILE_ID;
use linkvault::database::Database;
use linkvault::managers::link_manager::{LinkManager, LinkManagerTrait};
use linkvault::managers::profile_manager::{ProfileManager, ProfileManagerTrait};
use linkvault::services::import_service::ImportService;
use linkvault::services::importers::ImportFormat;
use linkvault::types::errors::ImportError;
use tempfile::TempDir;

fn setup() -> (Arc<Mutex<Database>>, ImportService) {
    let db = Arc::new(Mutex::new(
        Database::open_in_memory().expect("Failed to open in-memory database"),
    ));
    let svc = ImportService::new(Arc::clone(&db));
    (db, svc)
}

#[tokio::test]
async fn test_import_file_reads_from_disk() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("links.txt");
    std::fs::write(&path, "https://a.com\nhttps://b.com\n").unwrap();

    let (_db, svc) = setup();
    let result = svc
        .import_file(ImportFormat::PlainText, &path, DEFAULT_PROFILE_ID)
        .await
        .unwrap();
    assert_eq!(result.imported_count, 2);
}

#[tokio::test]
async fn test_missing_file_is_source_unreadable() {
    let dir = TempDir::new().unwrap();
    let (db, svc) = setup();

    let err = svc
        .import_file(
            ImportFormat::Csv,
            dir.path().join("nope.csv"),
            DEFAULT_PROFILE_ID,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ImportError::SourceUnreadable(ref m) if m.contains("nope.csv")));

    let guard = db.lock().unwrap();
    assert_eq!(
        LinkManager::new(guard.connection())
            .count_links(DEFAULT_PROFILE_ID)
            .unwrap(),
        0
    );
}

#[tokio::test]
async fn test_import_detected_uses_extension() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("backup.csv");
    std::fs::write(&path, "link,createdAt,openedCount\napp://x,,2\n").unwrap();

    let (_db, svc) = setup();
    let (format, result) = svc
        .import_detected(&path, DEFAULT_PROFILE_ID)
        .await
        .unwrap();
    assert_eq!(format, ImportFormat::Csv);
    assert_eq!(result.imported_count, 1);
}

#[test]
fn test_unknown_profile_is_storage_error() {
    let (_db, svc) = setup();
    let err = svc
        .import_content(ImportFormat::PlainText, "https://a.com", 99)
        .unwrap_err();
    assert!(matches!(err, ImportError::Storage(_)));
}

#[test]
fn test_imports_are_scoped_to_profile() {
    let (db, svc) = setup();
    let work = {
        let guard = db.lock().unwrap();
        ProfileManager::new(guard.connection())
            .create_profile("Work")
            .unwrap()
    };

    svc.import_content(ImportFormat::PlainText, "https://a.com", DEFAULT_PROFILE_ID)
        .unwrap();
    let result = svc
        .import_content(ImportFormat::PlainText, "https://a.com", work.id)
        .unwrap();
    assert_eq!(
        result.imported_count, 1,
        "a link stored in another profile is not a duplicate"
    );
}

//! Unit tests for CSV backup import.

use std::sync::{Arc, Mutex};

use linkvault::database::migrations::DEFAULT_PROFILE_ID;
use linkvault::database::Database;
use linkvault::managers::link_manager::{LinkManager, LinkManagerTrait};
use linkvault::managers::tag_manager::{TagManager, TagManagerTrait};
use linkvault::services::import_service::ImportService;
use linkvault::services::importers::csv_file::CsvImporter;
use linkvault::services::importers::{BookmarkImporter, ImportFormat};
use linkvault::types::errors::ImportError;
use rstest::rstest;

const HEADER: &str = "link,createdAt,openedCount,name,notes,tags,thumbnail";

fn setup() -> (Arc<Mutex<Database>>, ImportService) {
    let db = Arc::new(Mutex::new(
        Database::open_in_memory().expect("Failed to open in-memory database"),
    ));
    let svc = ImportService::new(Arc::clone(&db));
    (db, svc)
}

fn assert_single_link_tagged_work_personal(db: &Arc<Mutex<Database>>) {
    let guard = db.lock().unwrap();
    let links = LinkManager::new(guard.connection())
        .list_links_with_tags(DEFAULT_PROFILE_ID)
        .unwrap();
    assert_eq!(links.len(), 1);
    assert_eq!(links[0].link.name, "Example");
    assert_eq!(links[0].link.thumbnail, "");
    assert_eq!(links[0].tags, vec!["personal", "work"]);
    assert_eq!(TagManager::new(guard.connection()).list_tags().unwrap().len(), 2);
}

/// A quoted tags field stays one column and yields two tags.
#[test]
fn test_quoted_tag_field_creates_two_tags() {
    let (db, svc) = setup();
    let content = format!(
        "{HEADER}\nhttps://example.com,,\"0\",Example,,\"work,personal\",\n"
    );

    let result = svc
        .import_content(ImportFormat::Csv, &content, DEFAULT_PROFILE_ID)
        .unwrap();
    assert_eq!((result.imported_count, result.skipped_count), (1, 0));
    assert_single_link_tagged_work_personal(&db);
}

/// An unquoted tag list spread over several columns is still read as tags,
/// with the last column kept as the thumbnail.
#[test]
fn test_unquoted_tag_list_creates_two_tags() {
    let (db, svc) = setup();
    let content = format!("{HEADER}\nhttps://example.com,,\"0\",Example,,work,personal,\n");

    let parsed = CsvImporter.parse(&content).unwrap();
    assert_eq!(parsed.candidates[0].tags, vec!["work", "personal"]);
    assert_eq!(parsed.candidates[0].thumbnail, "");

    let result = svc
        .import_content(ImportFormat::Csv, &content, DEFAULT_PROFILE_ID)
        .unwrap();
    assert_eq!((result.imported_count, result.skipped_count), (1, 0));
    assert_single_link_tagged_work_personal(&db);
}

#[rstest]
#[case("createdAt,link,openedCount\nhttps://a.com,0,0")]
#[case("url,createdAt,openedCount\nhttps://a.com,0,0")]
#[case("link,createdAt\nhttps://a.com,0")]
#[case("")]
fn test_bad_header_is_fatal(#[case] content: &str) {
    let (db, svc) = setup();
    let err = svc
        .import_content(ImportFormat::Csv, content, DEFAULT_PROFILE_ID)
        .unwrap_err();
    assert!(matches!(err, ImportError::MalformedStructure(_)));

    let guard = db.lock().unwrap();
    assert_eq!(
        LinkManager::new(guard.connection())
            .count_links(DEFAULT_PROFILE_ID)
            .unwrap(),
        0
    );
}

#[test]
fn test_minimal_header_is_accepted() {
    let parsed = CsvImporter
        .parse("link,createdAt,openedCount\napp://x,,3\n")
        .unwrap();
    assert_eq!(parsed.candidates.len(), 1);
    assert_eq!(parsed.candidates[0].opened_count, 3);
    assert_eq!(parsed.candidates[0].created_at, None);
}

#[test]
fn test_short_and_blank_rows_are_skipped() {
    let (_db, svc) = setup();
    let content = format!(
        "{HEADER}\nhttps://a.com,,0\nhttps://b.com\n,,0\nhttps://c.com,,1,C\n"
    );

    let result = svc
        .import_content(ImportFormat::Csv, &content, DEFAULT_PROFILE_ID)
        .unwrap();
    assert_eq!(result.imported_count, 2);
    assert_eq!(result.skipped_count, 2);
    assert_eq!(result.total(), 4, "every data row is accounted for");
}

#[test]
fn test_unparseable_open_count_defaults_to_zero() {
    let parsed = CsvImporter
        .parse(&format!("{HEADER}\napp://x,,many\napp://y,,-4\n"))
        .unwrap();
    assert_eq!(parsed.candidates[0].opened_count, 0);
    assert_eq!(parsed.candidates[1].opened_count, 0);
}

#[rstest]
#[case("1700000000123", Some(1_700_000_000_123))]
#[case("2023-11-14T22:13:20Z", Some(1_700_000_000_000))]
#[case("yesterday", None)]
fn test_created_at_column(#[case] raw: &str, #[case] expected: Option<i64>) {
    let parsed = CsvImporter
        .parse(&format!("{HEADER}\napp://x,{raw},0\n"))
        .unwrap();
    assert_eq!(parsed.candidates[0].created_at, expected);
}

#[test]
fn test_existing_links_are_skipped() {
    let (_db, svc) = setup();
    let content = format!("{HEADER}\nhttps://a.com,,0\nhttps://b.com,,0\n");
    svc.import_content(ImportFormat::Csv, &content, DEFAULT_PROFILE_ID)
        .unwrap();

    let result = svc
        .import_content(ImportFormat::Csv, &content, DEFAULT_PROFILE_ID)
        .unwrap();
    assert_eq!((result.imported_count, result.skipped_count), (0, 2));
}

#[test]
fn test_shared_tag_creates_one_row() {
    let (db, svc) = setup();
    let content = format!("{HEADER}\napp://a,,0,A,,shared,\napp://b,,0,B,,shared,\n");
    svc.import_content(ImportFormat::Csv, &content, DEFAULT_PROFILE_ID)
        .unwrap();

    let guard = db.lock().unwrap();
    let usage = TagManager::new(guard.connection())
        .list_tags_with_usage()
        .unwrap();
    assert_eq!(usage.len(), 1);
    assert_eq!(usage[0].name, "shared");
    assert_eq!(usage[0].count, 2);
}

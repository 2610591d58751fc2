//! Unit tests for the TagManager public API.

use linkvault::database::migrations::DEFAULT_PROFILE_ID;
use linkvault::database::Database;
use linkvault::managers::link_manager::{LinkManager, LinkManagerTrait};
use linkvault::managers::tag_manager::{split_tag_list, TagManager, TagManagerTrait};
use linkvault::types::deeplink::NewDeeplink;
use linkvault::types::errors::TagError;
use rstest::rstest;

fn setup() -> Database {
    Database::open_in_memory().expect("Failed to open in-memory database")
}

#[test]
fn test_find_or_create_reuses_existing_tag() {
    let db = setup();
    let mut tags = TagManager::new(db.connection());

    let first = tags.find_or_create("work").unwrap();
    let again = tags.find_or_create("  work ").unwrap();
    assert_eq!(first.id, again.id);
    assert_eq!(tags.list_tags().unwrap().len(), 1);
}

/// Tag names are exact keys: different case means a different tag.
#[test]
fn test_tag_names_are_case_sensitive() {
    let db = setup();
    let mut tags = TagManager::new(db.connection());

    let lower = tags.find_or_create("work").unwrap();
    let upper = tags.find_or_create("Work").unwrap();
    assert_ne!(lower.id, upper.id);
}

#[test]
fn test_blank_tag_name_rejected() {
    let db = setup();
    let mut tags = TagManager::new(db.connection());
    assert!(matches!(tags.find_or_create("   "), Err(TagError::EmptyName)));
}

#[test]
fn test_attach_is_idempotent_and_counts_usage() {
    let db = setup();
    let conn = db.connection();
    let mut links = LinkManager::new(conn);
    let a = links
        .insert_link(DEFAULT_PROFILE_ID, &NewDeeplink::new("app://a"))
        .unwrap();
    let b = links
        .insert_link(DEFAULT_PROFILE_ID, &NewDeeplink::new("app://b"))
        .unwrap();

    let mut tags = TagManager::new(conn);
    let work = tags.find_or_create("work").unwrap();
    tags.find_or_create("empty").unwrap();
    tags.attach(a, work.id).unwrap();
    tags.attach(a, work.id).unwrap();
    tags.attach(b, work.id).unwrap();

    let usage = tags.list_tags_with_usage().unwrap();
    let counts: Vec<(String, i64)> = usage.into_iter().map(|u| (u.name, u.count)).collect();
    assert_eq!(
        counts,
        vec![("empty".to_string(), 0), ("work".to_string(), 2)]
    );
    assert_eq!(tags.tags_for_link(a).unwrap(), vec!["work"]);
}

#[test]
fn test_delete_orphans_only_removes_unused() {
    let db = setup();
    let conn = db.connection();
    let id = LinkManager::new(conn)
        .insert_link(DEFAULT_PROFILE_ID, &NewDeeplink::new("app://a"))
        .unwrap();

    let mut tags = TagManager::new(conn);
    let used = tags.find_or_create("used").unwrap();
    let unused = tags.find_or_create("unused").unwrap();
    tags.attach(id, used.id).unwrap();

    let deleted = tags.delete_orphans(&[used.id, unused.id]).unwrap();
    assert_eq!(deleted, 1);
    assert!(tags.find_by_name("used").unwrap().is_some());
    assert!(tags.find_by_name("unused").unwrap().is_none());
}

#[rstest]
#[case("work,personal", vec!["work", "personal"])]
#[case(" work , personal ,", vec!["work", "personal"])]
#[case("a,,a,b", vec!["a", "b"])]
#[case("", vec![])]
fn test_split_tag_list(#[case] raw: &str, #[case] expected: Vec<&str>) {
    assert_eq!(split_tag_list(raw), expected);
}

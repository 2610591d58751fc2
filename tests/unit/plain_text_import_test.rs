//! Unit tests for plain-text link list import and the preview/selection flow.

use std::sync::{Arc, Mutex};

use linkvault::database::migrations::DEFAULT_PROFILE_ID;
use linkvault::database::Database;
use linkvault::services::import_service::ImportService;
use linkvault::services::importers::plain_text::{classify, split_tokens};
use linkvault::services::importers::ImportFormat;
use rstest::rstest;

fn service() -> ImportService {
    let db = Database::open_in_memory().expect("Failed to open in-memory database");
    ImportService::new(Arc::new(Mutex::new(db)))
}

#[test]
fn test_comma_separated_hosts_become_three_candidates() {
    let tokens = split_tokens("a.com, b.com, c.com");
    assert_eq!(tokens, vec!["a.com", "b.com", "c.com"]);

    let candidates = classify("a.com, b.com, c.com");
    let links: Vec<&str> = candidates.iter().map(|c| c.link.as_str()).collect();
    assert_eq!(links, vec!["https://a.com", "https://b.com", "https://c.com"]);
    assert!(candidates.iter().all(|c| c.is_valid));
}

#[rstest]
#[case("https://a.com\nhttps://b.com\n\nhttps://c.com\n", 3)]
#[case("app://one\r\napp://two", 2)]
#[case("Hello, world, again\nhttps://a.com", 2)]
#[case("https://a.com,\nhttps://b.com", 2)]
#[case("   \n\n", 0)]
fn test_token_count(#[case] content: &str, #[case] expected: usize) {
    assert_eq!(split_tokens(content).len(), expected);
}

#[test]
fn test_import_skips_invalid_tokens() {
    let svc = service();
    let result = svc
        .import_content(
            ImportFormat::PlainText,
            "https://a.com\nnot a link\nmyapp://open/1\n",
            DEFAULT_PROFILE_ID,
        )
        .unwrap();
    assert_eq!(result.imported_count, 2);
    assert_eq!(result.skipped_count, 1);
    assert_eq!(result.summary(), "Imported 2 link(s), skipped 1");
}

/// Importing the same file twice imports everything once, then skips everything.
#[test]
fn test_second_run_skips_everything() {
    let svc = service();
    let content = "https://a.com\nhttps://b.com\nintent://scan/#Intent;scheme=zxing;end\n";

    let first = svc
        .import_content(ImportFormat::PlainText, content, DEFAULT_PROFILE_ID)
        .unwrap();
    assert_eq!((first.imported_count, first.skipped_count), (3, 0));

    let second = svc
        .import_content(ImportFormat::PlainText, content, DEFAULT_PROFILE_ID)
        .unwrap();
    assert_eq!((second.imported_count, second.skipped_count), (0, 3));
}

#[test]
fn test_duplicate_within_one_file_is_skipped() {
    let svc = service();
    let result = svc
        .import_content(
            ImportFormat::PlainText,
            "https://a.com\nhttps://a.com\n",
            DEFAULT_PROFILE_ID,
        )
        .unwrap();
    assert_eq!((result.imported_count, result.skipped_count), (1, 1));
}

#[test]
fn test_preview_flags_invalid_and_duplicates() {
    let svc = service();
    svc.import_content(ImportFormat::PlainText, "https://stored.com", DEFAULT_PROFILE_ID)
        .unwrap();

    let preview = svc
        .preview_plain_text(
            "https://stored.com\nhttps://new.com\nhttps://new.com\n???\n",
            DEFAULT_PROFILE_ID,
        )
        .unwrap();

    assert_eq!(preview.len(), 4);
    assert!(preview[0].is_valid && preview[0].is_duplicate && !preview[0].is_selected_by_default);
    assert!(preview[1].is_valid && !preview[1].is_duplicate && preview[1].is_selected_by_default);
    assert!(preview[2].is_duplicate && !preview[2].is_selected_by_default);
    assert!(!preview[3].is_valid && !preview[3].is_selected_by_default);
}

#[test]
fn test_preview_does_not_write() {
    let svc = service();
    svc.preview_plain_text("https://a.com", DEFAULT_PROFILE_ID)
        .unwrap();
    let again = svc
        .preview_plain_text("https://a.com", DEFAULT_PROFILE_ID)
        .unwrap();
    assert!(!again[0].is_duplicate);
}

#[test]
fn test_import_selected_commits_only_chosen_links() {
    let svc = service();
    let preview = svc
        .preview_plain_text("https://a.com\nhttps://b.com\nbad link", DEFAULT_PROFILE_ID)
        .unwrap();

    let chosen: Vec<String> = preview
        .iter()
        .filter(|e| e.is_selected_by_default && e.link.contains("a.com"))
        .map(|e| e.link.clone())
        .collect();
    let result = svc.import_selected(&chosen, DEFAULT_PROFILE_ID).unwrap();
    assert_eq!((result.imported_count, result.skipped_count), (1, 0));

    let after = svc
        .preview_plain_text("https://a.com\nhttps://b.com", DEFAULT_PROFILE_ID)
        .unwrap();
    assert!(after[0].is_duplicate);
    assert!(!after[1].is_duplicate);
}

#[test]
fn test_import_selected_rejects_invalid_entries() {
    let svc = service();
    let result = svc
        .import_selected(&["not valid".to_string()], DEFAULT_PROFILE_ID)
        .unwrap();
    assert_eq!((result.imported_count, result.skipped_count), (0, 1));
}

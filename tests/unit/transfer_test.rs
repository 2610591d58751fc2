//! Tests for the transfer envelope, merge-import and QR payload.

use linkvault::database::migrations::DEFAULT_PROFILE_ID;
use linkvault::database::Database;
use linkvault::managers::link_manager::{LinkManager, LinkManagerTrait};
use linkvault::managers::tag_manager::{TagManager, TagManagerTrait};
use linkvault::services::import_writer::insert_with_tags;
use linkvault::services::transfer::{build_envelope, merge_envelope};
use linkvault::types::deeplink::NewDeeplink;
use linkvault::types::errors::TransferError;
use linkvault::types::transfer::{ExportedDeeplink, QrTransferInfo, TransferEnvelope};

fn seeded() -> Database {
    let db = Database::open_in_memory().unwrap();
    let conn = db.connection();
    insert_with_tags(
        conn,
        DEFAULT_PROFILE_ID,
        &NewDeeplink {
            opened_count: 4,
            is_favourite: true,
            thumbnail: "https://img.example/t.png".into(),
            ..NewDeeplink::new("https://a.com")
                .with_name("A")
                .with_notes("first")
                .with_tags(["work"])
        },
    )
    .unwrap();
    insert_with_tags(conn, DEFAULT_PROFILE_ID, &NewDeeplink::new("app://b").with_name("B")).unwrap();
    TagManager::new(conn).find_or_create("unused").unwrap();
    db
}

#[test]
fn test_envelope_json_shape() {
    let db = seeded();
    let envelope = build_envelope(db.connection(), DEFAULT_PROFILE_ID, "1.2.0").unwrap();
    let json = serde_json::to_value(&envelope).unwrap();

    assert_eq!(json["appVersion"], "1.2.0");
    assert!(json["exportedAt"].is_i64());
    assert_eq!(json["links"].as_array().unwrap().len(), 2);
    assert_eq!(json["tags"].as_array().unwrap().len(), 2);

    let a = json["links"]
        .as_array()
        .unwrap()
        .iter()
        .find(|l| l["link"] == "https://a.com")
        .unwrap();
    assert_eq!(a["name"], "A");
    assert_eq!(a["notes"], "first");
    assert_eq!(a["openedCount"], 4);
    assert_eq!(a["isFavourite"], true);
    assert_eq!(a["thumbnail"], "https://img.example/t.png");
    assert_eq!(a["tags"], serde_json::json!(["work"]));
    assert!(a["createdAt"].as_str().unwrap().ends_with('Z'));
}

#[test]
fn test_merge_carries_fields_and_empty_tags() {
    let source = seeded();
    let envelope = build_envelope(source.connection(), DEFAULT_PROFILE_ID, "1.2.0").unwrap();

    let target = Database::open_in_memory().unwrap();
    let result = merge_envelope(target.connection(), DEFAULT_PROFILE_ID, &envelope).unwrap();
    assert_eq!((result.imported_count, result.skipped_count), (2, 0));

    let conn = target.connection();
    let links = LinkManager::new(conn)
        .list_links_with_tags(DEFAULT_PROFILE_ID)
        .unwrap();
    let a = links.iter().find(|l| l.link.link == "https://a.com").unwrap();
    assert_eq!(a.link.opened_count, 4);
    assert!(a.link.is_favourite);
    assert_eq!(a.link.notes, "first");
    assert_eq!(a.tags, vec!["work"]);

    let tags = TagManager::new(conn);
    assert!(tags.find_by_name("unused").unwrap().is_some(), "empty tags survive transfer");
}

#[test]
fn test_merge_skips_links_already_present() {
    let source = seeded();
    let envelope = build_envelope(source.connection(), DEFAULT_PROFILE_ID, "1.2.0").unwrap();

    let result = merge_envelope(source.connection(), DEFAULT_PROFILE_ID, &envelope).unwrap();
    assert_eq!((result.imported_count, result.skipped_count), (0, 2));
    assert_eq!(
        LinkManager::new(source.connection())
            .count_links(DEFAULT_PROFILE_ID)
            .unwrap(),
        2
    );
}

#[test]
fn test_merge_accepts_minimal_records() {
    let raw = r#"{
        "appVersion": "0.9.0",
        "exportedAt": 1700000000000,
        "links": [ { "link": "app://only-link" } ],
        "tags": []
    }"#;
    let envelope: TransferEnvelope = serde_json::from_str(raw).unwrap();
    assert_eq!(
        envelope.links[0],
        ExportedDeeplink {
            link: "app://only-link".into(),
            name: String::new(),
            created_at: String::new(),
            opened_count: 0,
            notes: String::new(),
            tags: vec![],
            is_favourite: false,
            thumbnail: String::new(),
        }
    );

    let db = Database::open_in_memory().unwrap();
    let result = merge_envelope(db.connection(), DEFAULT_PROFILE_ID, &envelope).unwrap();
    assert_eq!(result.imported_count, 1);
}

#[test]
fn test_qr_payload_produces_exact_export_url() {
    let info =
        QrTransferInfo::from_json(r#"{"ip":"192.168.1.5","port":9000,"appVersion":"1.2.0"}"#)
            .unwrap();
    assert_eq!(info.ip, "192.168.1.5");
    assert_eq!(info.port, 9000);
    assert_eq!(info.app_version, "1.2.0");
    assert_eq!(info.export_url(), "http://192.168.1.5:9000/api/export");
}

#[test]
fn test_qr_json_field_names() {
    let info = QrTransferInfo::new("10.0.0.2", 9000, "1.2.0");
    assert_eq!(
        info.to_json().unwrap(),
        r#"{"ip":"10.0.0.2","port":9000,"appVersion":"1.2.0"}"#
    );
}

#[test]
fn test_qr_renders() {
    let info = QrTransferInfo::new("10.0.0.2", 9000, "1.2.0");
    assert!(info.render_svg().unwrap().contains("<svg"));
    assert!(!info.render_terminal().unwrap().is_empty());
}

#[test]
fn test_garbage_qr_payload_is_invalid() {
    assert!(matches!(
        QrTransferInfo::from_json("hello"),
        Err(TransferError::InvalidPayload(_))
    ));
}

/// An app opened from a database file exports what was written to that file.
#[test]
fn test_app_from_database_file_exports_its_links() {
    use linkvault::app::App;
    use linkvault::services::settings_engine::SettingsEngine;

    let dir = tempfile::TempDir::new().unwrap();
    let db_path = dir.path().join("links.db");
    {
        let db = Database::open(&db_path).unwrap();
        insert_with_tags(db.connection(), DEFAULT_PROFILE_ID, &NewDeeplink::new("app://kept")).unwrap();
    }

    let settings = SettingsEngine::new(Some(
        dir.path().join("settings.json").to_string_lossy().to_string(),
    ));
    let app = App::new(&db_path, settings).unwrap();
    let envelope = app.export().unwrap();
    assert_eq!(envelope.links.len(), 1);
    assert_eq!(envelope.links[0].link, "app://kept");
}

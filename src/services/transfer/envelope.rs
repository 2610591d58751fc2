//! Building the export envelope and merging a received one.

use rusqlite::Connection;

use crate::managers::link_manager::{LinkManager, LinkManagerTrait};
use crate::managers::profile_manager::{ProfileManager, ProfileManagerTrait};
use crate::managers::tag_manager::{TagManager, TagManagerTrait};
use crate::services::import_writer::persist_parsed;
use crate::services::timestamps::{format_timestamp, parse_timestamp};
use crate::types::deeplink::{LinkWithTags, NewDeeplink};
use crate::types::errors::TransferError;
use crate::types::import::{ImportResult, ParsedSource};
use crate::types::transfer::{ExportedDeeplink, ExportedTag, TransferEnvelope};

fn export_link(entry: LinkWithTags) -> ExportedDeeplink {
    let LinkWithTags { link, tags } = entry;
    ExportedDeeplink {
        created_at: format_timestamp(link.created_at),
        link: link.link,
        name: link.name,
        opened_count: link.opened_count,
        notes: link.notes,
        tags,
        is_favourite: link.is_favourite,
        thumbnail: link.thumbnail,
    }
}

fn import_link(exported: &ExportedDeeplink) -> NewDeeplink {
    NewDeeplink {
        link: exported.link.clone(),
        name: exported.name.clone(),
        notes: exported.notes.clone(),
        thumbnail: exported.thumbnail.clone(),
        opened_count: exported.opened_count,
        is_favourite: exported.is_favourite,
        created_at: parse_timestamp(&exported.created_at),
        tags: exported.tags.clone(),
    }
}

/// Snapshot of every link in `profile_id` with its tag names, plus the full tag list.
/// Computed fresh on every call.
pub fn build_envelope(
    conn: &Connection,
    profile_id: i64,
    app_version: &str,
) -> Result<TransferEnvelope, TransferError> {
    let links = LinkManager::new(conn).list_links_with_tags(profile_id)?;
    let tags = TagManager::new(conn).list_tags()?;

    Ok(TransferEnvelope {
        app_version: app_version.to_string(),
        exported_at: chrono::Utc::now().timestamp_millis(),
        links: links.into_iter().map(export_link).collect(),
        tags: tags
            .into_iter()
            .map(|t| ExportedTag { id: t.id, name: t.name })
            .collect(),
    })
}

/// Merges a peer's envelope into `profile_id`.
///
/// Every tag in the envelope's tag list is created if absent, attached or not.
/// Links already present by exact match are skipped; the rest are inserted one
/// transaction per link, carrying over notes, open count, favourite flag,
/// thumbnail and creation time.
pub fn merge_envelope(
    conn: &Connection,
    profile_id: i64,
    envelope: &TransferEnvelope,
) -> Result<ImportResult, TransferError> {
    ProfileManager::new(conn)
        .get_profile(profile_id)
        .map_err(|e| TransferError::Storage(e.to_string()))?;

    let mut tags = TagManager::new(conn);
    for tag in &envelope.tags {
        if tag.name.trim().is_empty() {
            continue;
        }
        tags.find_or_create(&tag.name)?;
    }

    let parsed = ParsedSource {
        candidates: envelope.links.iter().map(import_link).collect(),
        rejected: 0,
    };
    let result = persist_parsed(conn, profile_id, parsed);

    tracing::info!(
        peer_version = %envelope.app_version,
        profile_id,
        imported = result.imported_count,
        skipped = result.skipped_count,
        "transfer merge finished"
    );
    Ok(result)
}

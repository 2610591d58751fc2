//! Deduplicating, transactional persistence shared by every import path.
//!
//! Each accepted record is written in its own transaction together with its
//! tags, so a failing record rolls back alone and is counted as skipped while
//! the rest of the batch carries on.

use rusqlite::Connection;

use crate::managers::link_manager::{LinkManager, LinkManagerTrait};
use crate::managers::tag_manager::{TagManager, TagManagerTrait};
use crate::services::deeplink::is_valid_deeplink;
use crate::types::deeplink::NewDeeplink;
use crate::types::errors::LinkError;
use crate::types::import::{ImportResult, ParsedSource};

/// Inserts one link and creates/attaches its tags atomically. Returns the new link id.
///
/// # Errors
/// `LinkError::Duplicate` if the link already exists in the profile; any other
/// failure rolls the whole record back.
pub fn insert_with_tags(
    conn: &Connection,
    profile_id: i64,
    candidate: &NewDeeplink,
) -> Result<i64, LinkError> {
    let tx = conn
        .unchecked_transaction()
        .map_err(|e| LinkError::DatabaseError(e.to_string()))?;

    let link_id = LinkManager::new(&tx).insert_link(profile_id, candidate)?;

    let mut tags = TagManager::new(&tx);
    for name in &candidate.tags {
        if name.trim().is_empty() {
            continue;
        }
        let tag = tags
            .find_or_create(name)
            .map_err(|e| LinkError::DatabaseError(e.to_string()))?;
        tags.attach(link_id, tag.id)
            .map_err(|e| LinkError::DatabaseError(e.to_string()))?;
    }

    tx.commit()
        .map_err(|e| LinkError::DatabaseError(e.to_string()))?;
    Ok(link_id)
}

/// Writes every candidate not already stored in `profile_id`.
///
/// Rows the parser rejected, blank or invalid links, duplicates (in the store or earlier
/// in the same batch) and records whose transaction fails all count as skipped.
pub fn persist_parsed(conn: &Connection, profile_id: i64, parsed: ParsedSource) -> ImportResult {
    let mut result = ImportResult::default();
    result.skip_many(parsed.rejected);

    let links = LinkManager::new(conn);
    for candidate in parsed.candidates {
        let link = candidate.link.trim();
        if !is_valid_deeplink(link) {
            tracing::debug!(link, "skipping invalid deeplink");
            result.record_skipped();
            continue;
        }

        match links.link_exists(profile_id, link) {
            Ok(true) => {
                tracing::debug!(link, "skipping duplicate link");
                result.record_skipped();
                continue;
            }
            Ok(false) => {}
            Err(e) => {
                tracing::warn!(link, error = %e, "duplicate check failed");
                result.record_skipped();
                continue;
            }
        }

        let candidate = NewDeeplink {
            link: link.to_string(),
            ..candidate
        };
        match insert_with_tags(conn, profile_id, &candidate) {
            Ok(_) => result.record_imported(),
            Err(LinkError::Duplicate(link)) => {
                tracing::debug!(link = %link, "link inserted concurrently, skipping");
                result.record_skipped();
            }
            Err(e) => {
                tracing::warn!(link = %candidate.link, error = %e, "record insert rolled back");
                result.record_skipped();
            }
        }
    }

    result
}

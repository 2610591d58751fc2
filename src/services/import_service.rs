//! Import entry points used by the CLI and the restore screen.
//!
//! File reads are async; parsing and database writes run on the blocking
//! pool while holding the shared database lock.

use std::path::Path;
use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::database::Database;
use crate::managers::link_manager::{LinkManager, LinkManagerTrait};
use crate::managers::profile_manager::{ProfileManager, ProfileManagerTrait};
use crate::services::deeplink::{is_valid_deeplink, normalize_link};
use crate::services::import_writer::persist_parsed;
use crate::services::importers::plain_text;
use crate::services::importers::ImportFormat;
use crate::types::deeplink::NewDeeplink;
use crate::types::errors::ImportError;
use crate::types::import::{ImportResult, ParsedSource, PreviewEntry};

#[derive(Clone)]
pub struct ImportService {
    db: Arc<Mutex<Database>>,
}

fn ensure_profile(conn: &Connection, profile_id: i64) -> Result<(), ImportError> {
    ProfileManager::new(conn)
        .get_profile(profile_id)
        .map(|_| ())
        .map_err(|e| ImportError::Storage(e.to_string()))
}

impl ImportService {
    pub fn new(db: Arc<Mutex<Database>>) -> Self {
        Self { db }
    }

    fn with_connection<T>(
        &self,
        f: impl FnOnce(&Connection) -> Result<T, ImportError>,
    ) -> Result<T, ImportError> {
        let db = self
            .db
            .lock()
            .map_err(|e| ImportError::Storage(format!("database lock poisoned: {}", e)))?;
        f(db.connection())
    }

    /// Reads `path` and imports it as `format` into `profile_id`.
    pub async fn import_file(
        &self,
        format: ImportFormat,
        path: impl AsRef<Path>,
        profile_id: i64,
    ) -> Result<ImportResult, ImportError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ImportError::SourceUnreadable(format!("{}: {}", path.display(), e)))?;

        let service = self.clone();
        tokio::task::spawn_blocking(move || service.import_content(format, &content, profile_id))
            .await
            .map_err(|e| ImportError::Storage(format!("import task failed: {}", e)))?
    }

    /// Like [`Self::import_file`], guessing the format from the file itself.
    pub async fn import_detected(
        &self,
        path: impl AsRef<Path>,
        profile_id: i64,
    ) -> Result<(ImportFormat, ImportResult), ImportError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ImportError::SourceUnreadable(format!("{}: {}", path.display(), e)))?;
        let format = ImportFormat::detect(path, &content);

        let service = self.clone();
        let result = tokio::task::spawn_blocking(move || {
            service.import_content(format, &content, profile_id)
        })
        .await
        .map_err(|e| ImportError::Storage(format!("import task failed: {}", e)))??;
        Ok((format, result))
    }

    /// Parses already-loaded content and persists the accepted records.
    pub fn import_content(
        &self,
        format: ImportFormat,
        content: &str,
        profile_id: i64,
    ) -> Result<ImportResult, ImportError> {
        let parsed = format.importer().parse(content)?;
        let result = self.with_connection(|conn| {
            ensure_profile(conn, profile_id)?;
            Ok(persist_parsed(conn, profile_id, parsed))
        })?;

        tracing::info!(
            format = format.display_name(),
            profile_id,
            imported = result.imported_count,
            skipped = result.skipped_count,
            "import finished"
        );
        Ok(result)
    }

    /// Classifies every token of a plain-text source without writing anything.
    ///
    /// Duplicates are flagged against the store and against earlier tokens of
    /// the same source; only valid, non-duplicate links are pre-selected.
    pub fn preview_plain_text(
        &self,
        content: &str,
        profile_id: i64,
    ) -> Result<Vec<PreviewEntry>, ImportError> {
        let candidates = plain_text::classify(content);
        self.with_connection(|conn| {
            let links = LinkManager::new(conn);
            let mut seen: Vec<&str> = Vec::new();
            let mut entries = Vec::with_capacity(candidates.len());

            for candidate in &candidates {
                let is_duplicate = seen.contains(&candidate.link.as_str())
                    || links.link_exists(profile_id, &candidate.link)?;
                seen.push(&candidate.link);
                entries.push(PreviewEntry {
                    link: candidate.link.clone(),
                    is_valid: candidate.is_valid,
                    is_duplicate,
                    is_selected_by_default: candidate.is_valid && !is_duplicate,
                });
            }
            Ok(entries)
        })
    }

    /// Commits the links the user kept selected after a preview.
    pub fn import_selected(
        &self,
        links: &[String],
        profile_id: i64,
    ) -> Result<ImportResult, ImportError> {
        let mut parsed = ParsedSource::default();
        for raw in links {
            let link = normalize_link(raw);
            if is_valid_deeplink(&link) {
                parsed.candidates.push(NewDeeplink::new(link));
            } else {
                parsed.rejected += 1;
            }
        }

        let result = self.with_connection(|conn| {
            ensure_profile(conn, profile_id)?;
            Ok(persist_parsed(conn, profile_id, parsed))
        })?;
        tracing::info!(
            profile_id,
            imported = result.imported_count,
            skipped = result.skipped_count,
            "selected links imported"
        );
        Ok(result)
    }
}

use serde::{Deserialize, Serialize};

use super::deeplink::NewDeeplink;

/// One bookmark as extracted from an HTML export, before it is mapped onto
/// the stored link shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookmarkRecord {
    pub url: String,
    pub title: String,
    /// Ancestor folder names joined with `" / "`, root first.
    pub folder_path: Option<String>,
    pub tags: Option<Vec<String>>,
    /// Epoch milliseconds taken from the browser's `add_date` attribute.
    pub added_at: Option<i64>,
}

impl BookmarkRecord {
    /// Maps the record onto an insertable link. The folder path lands in
    /// `notes` since links have no folder column.
    pub fn into_new_deeplink(self) -> NewDeeplink {
        NewDeeplink {
            link: self.url,
            name: self.title,
            notes: self.folder_path.unwrap_or_default(),
            created_at: self.added_at,
            tags: self.tags.unwrap_or_default(),
            ..NewDeeplink::default()
        }
    }
}

/// What a parser extracted from a source: insert candidates plus the number
/// of rows that were malformed and never became candidates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedSource {
    pub candidates: Vec<NewDeeplink>,
    pub rejected: usize,
}

/// Counts accumulated over one import run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResult {
    pub imported_count: usize,
    pub skipped_count: usize,
}

impl ImportResult {
    pub fn record_imported(&mut self) {
        self.imported_count += 1;
    }

    pub fn record_skipped(&mut self) {
        self.skipped_count += 1;
    }

    pub fn skip_many(&mut self, n: usize) {
        self.skipped_count += n;
    }

    /// Total rows seen by the run.
    pub fn total(&self) -> usize {
        self.imported_count + self.skipped_count
    }

    /// One-line summary shown to the user after an import.
    pub fn summary(&self) -> String {
        format!(
            "Imported {} link(s), skipped {}",
            self.imported_count, self.skipped_count
        )
    }
}

/// One line of the plain-text preview shown before committing a selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewEntry {
    pub link: String,
    pub is_valid: bool,
    pub is_duplicate: bool,
    pub is_selected_by_default: bool,
}

//! Bookmark importers.
//!
//! Each supported file format has one [`BookmarkImporter`] that turns the raw
//! source text into insert candidates. Deduplication and persistence are
//! format-independent and live in [`crate::services::import_writer`].

pub mod csv_file;
pub mod html;
pub mod plain_text;

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::types::errors::ImportError;
use crate::types::import::ParsedSource;

use csv_file::CsvImporter;
use html::HtmlImporter;
use plain_text::PlainTextImporter;

/// Format-specific half of an import: labels for the picker and the parser.
pub trait BookmarkImporter: Send + Sync {
    /// Human label shown in the restore screen.
    fn display_name(&self) -> &'static str;
    /// MIME types used to filter the file picker.
    fn supported_mime_types(&self) -> &'static [&'static str];
    /// Extracts insert candidates. Fails only when the source as a whole is unusable.
    fn parse(&self, content: &str) -> Result<ParsedSource, ImportError>;
}

/// The closed set of import formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportFormat {
    PlainText,
    Csv,
    /// Netscape bookmark HTML from an unknown exporter (generic folder rule).
    Html,
    ChromeHtml,
    FirefoxHtml,
}

static PLAIN_TEXT: PlainTextImporter = PlainTextImporter;
static CSV: CsvImporter = CsvImporter;
static GENERIC_HTML: HtmlImporter = HtmlImporter::generic();
static CHROME_HTML: HtmlImporter = HtmlImporter::chrome();
static FIREFOX_HTML: HtmlImporter = HtmlImporter::firefox();

impl ImportFormat {
    pub const ALL: [ImportFormat; 5] = [
        ImportFormat::PlainText,
        ImportFormat::Csv,
        ImportFormat::Html,
        ImportFormat::ChromeHtml,
        ImportFormat::FirefoxHtml,
    ];

    pub fn importer(&self) -> &'static dyn BookmarkImporter {
        match self {
            ImportFormat::PlainText => &PLAIN_TEXT,
            ImportFormat::Csv => &CSV,
            ImportFormat::Html => &GENERIC_HTML,
            ImportFormat::ChromeHtml => &CHROME_HTML,
            ImportFormat::FirefoxHtml => &FIREFOX_HTML,
        }
    }

    pub fn display_name(&self) -> &'static str {
        self.importer().display_name()
    }

    pub fn supported_mime_types(&self) -> &'static [&'static str] {
        self.importer().supported_mime_types()
    }

    /// Parses a CLI-style format name (`text`, `csv`, `html`, `chrome`, `firefox`).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "text" | "txt" | "plain" | "plain_text" => Some(ImportFormat::PlainText),
            "csv" => Some(ImportFormat::Csv),
            "html" | "netscape" => Some(ImportFormat::Html),
            "chrome" | "chrome_html" => Some(ImportFormat::ChromeHtml),
            "firefox" | "firefox_html" => Some(ImportFormat::FirefoxHtml),
            _ => None,
        }
    }

    /// Guesses the format from the file extension and, for HTML, the exporter's markers.
    pub fn detect(path: &Path, content: &str) -> Self {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();

        let looks_html = matches!(ext.as_str(), "html" | "htm")
            || content.trim_start().starts_with("<!DOCTYPE NETSCAPE-Bookmark-file");

        if ext == "csv" {
            ImportFormat::Csv
        } else if looks_html {
            if content.contains("Bookmarks Menu") || content.contains("\"place:") {
                ImportFormat::FirefoxHtml
            } else {
                ImportFormat::ChromeHtml
            }
        } else {
            ImportFormat::PlainText
        }
    }
}

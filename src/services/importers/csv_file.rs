//! CSV backups: `link,createdAt,openedCount[,name,notes,tags,thumbnail]`.

use csv::{ReaderBuilder, StringRecord, Trim};

use crate::managers::tag_manager::split_tag_list;
use crate::services::timestamps::parse_timestamp;
use crate::types::deeplink::NewDeeplink;
use crate::types::errors::ImportError;
use crate::types::import::ParsedSource;

use super::BookmarkImporter;

/// Leading header columns, matched exactly and in order.
pub const REQUIRED_HEADER: [&str; 3] = ["link", "createdAt", "openedCount"];

const COL_LINK: usize = 0;
const COL_CREATED_AT: usize = 1;
const COL_OPENED_COUNT: usize = 2;
const COL_NAME: usize = 3;
const COL_NOTES: usize = 4;
const COL_TAGS: usize = 5;
const COL_THUMBNAIL: usize = 6;
const FULL_ROW_LEN: usize = COL_THUMBNAIL + 1;

pub struct CsvImporter;

fn field(record: &StringRecord, index: usize) -> String {
    record.get(index).unwrap_or("").to_string()
}

fn check_header(header: &StringRecord) -> Result<(), ImportError> {
    let leading: Vec<&str> = header.iter().take(REQUIRED_HEADER.len()).collect();
    if leading.as_slice() != REQUIRED_HEADER {
        return Err(ImportError::MalformedStructure(format!(
            "expected header starting with {}, found {}",
            REQUIRED_HEADER.join(","),
            header.iter().collect::<Vec<_>>().join(",")
        )));
    }
    Ok(())
}

/// Tags and thumbnail of a row. An unquoted tag list spills over into extra
/// columns, so every field between `tags` and the last one belongs to the tags.
fn tags_and_thumbnail(record: &StringRecord) -> (String, String) {
    if record.len() <= FULL_ROW_LEN {
        return (field(record, COL_TAGS), field(record, COL_THUMBNAIL));
    }
    let last = record.len() - 1;
    let tags: Vec<&str> = (COL_TAGS..last).filter_map(|i| record.get(i)).collect();
    (tags.join(","), field(record, last))
}

/// Maps one data row to an insert candidate, or `None` when the row is unusable.
fn row_to_candidate(record: &StringRecord) -> Option<NewDeeplink> {
    if record.len() < REQUIRED_HEADER.len() {
        return None;
    }

    let link = field(record, COL_LINK);
    if link.is_empty() {
        return None;
    }

    let (tags, thumbnail) = tags_and_thumbnail(record);
    Some(NewDeeplink {
        link,
        name: field(record, COL_NAME),
        notes: field(record, COL_NOTES),
        thumbnail,
        opened_count: field(record, COL_OPENED_COUNT)
            .parse::<i64>()
            .map(|n| n.max(0))
            .unwrap_or(0),
        is_favourite: false,
        created_at: parse_timestamp(&field(record, COL_CREATED_AT)),
        tags: split_tag_list(&tags),
    })
}

impl BookmarkImporter for CsvImporter {
    fn display_name(&self) -> &'static str {
        "CSV backup"
    }

    fn supported_mime_types(&self) -> &'static [&'static str] {
        &["text/csv", "text/comma-separated-values", "application/csv"]
    }

    fn parse(&self, content: &str) -> Result<ParsedSource, ImportError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(content.as_bytes());

        let mut records = reader.records();
        let header = match records.next() {
            Some(Ok(header)) => header,
            Some(Err(e)) => {
                return Err(ImportError::MalformedStructure(format!("unreadable header: {}", e)))
            }
            None => return Err(ImportError::MalformedStructure("missing header row".to_string())),
        };
        check_header(&header)?;

        let mut parsed = ParsedSource::default();
        for (index, record) in records.enumerate() {
            match record.ok().as_ref().and_then(row_to_candidate) {
                Some(candidate) => parsed.candidates.push(candidate),
                None => {
                    tracing::debug!(row = index + 2, "skipping malformed CSV row");
                    parsed.rejected += 1;
                }
            }
        }
        Ok(parsed)
    }
}

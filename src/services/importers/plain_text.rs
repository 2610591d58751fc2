//! Plain-text link lists: one link per line, or a single comma-separated run.

use crate::services::deeplink::{is_valid_deeplink, normalize_link};
use crate::types::deeplink::NewDeeplink;
use crate::types::errors::ImportError;
use crate::types::import::ParsedSource;

use super::BookmarkImporter;

pub struct PlainTextImporter;

/// A normalized token from a text source and whether it passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextCandidate {
    pub link: String,
    pub is_valid: bool,
}

fn is_url_shaped(part: &str) -> bool {
    part.contains("://") || (part.contains('.') && !part.contains('\n'))
}

/// Splits a text source into raw tokens.
///
/// The source is treated as comma-separated when it contains commas and at
/// least half of the comma parts look like URLs; otherwise it is split on
/// line breaks. Blank tokens are dropped.
pub fn split_tokens(content: &str) -> Vec<String> {
    let parts: Vec<&str> = content.split(',').collect();
    let url_shaped = parts.iter().filter(|p| is_url_shaped(p.trim())).count();
    let comma_separated = parts.len() > 1 && url_shaped * 2 >= parts.len();

    let tokens: Box<dyn Iterator<Item = &str>> = if comma_separated {
        Box::new(parts.into_iter().flat_map(str::lines))
    } else {
        Box::new(content.lines())
    };

    tokens
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Normalizes and validates every token in `content`, keeping source order.
pub fn classify(content: &str) -> Vec<TextCandidate> {
    split_tokens(content)
        .iter()
        .map(|token| {
            let link = normalize_link(token);
            TextCandidate {
                is_valid: is_valid_deeplink(&link),
                link,
            }
        })
        .collect()
}

impl BookmarkImporter for PlainTextImporter {
    fn display_name(&self) -> &'static str {
        "Plain text"
    }

    fn supported_mime_types(&self) -> &'static [&'static str] {
        &["text/plain"]
    }

    fn parse(&self, content: &str) -> Result<ParsedSource, ImportError> {
        let mut parsed = ParsedSource::default();
        for candidate in classify(content) {
            if candidate.is_valid {
                parsed.candidates.push(NewDeeplink::new(candidate.link));
            } else {
                tracing::debug!(token = %candidate.link, "skipping invalid deeplink");
                parsed.rejected += 1;
            }
        }
        Ok(parsed)
    }
}

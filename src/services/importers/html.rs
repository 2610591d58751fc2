//! Netscape bookmark HTML exports (Chrome, Firefox and unknown exporters).
//!
//! All flavours share the anchor scan and the folder walk; they differ only in
//! which ancestor elements name a folder, when the walk stops, and which
//! browser-specific attributes are read off the anchor.

use scraper::{ElementRef, Html, Selector};

use crate::managers::tag_manager::split_tag_list;
use crate::services::timestamps::parse_epoch_seconds;
use crate::types::errors::ImportError;
use crate::types::import::{BookmarkRecord, ParsedSource};

use super::BookmarkImporter;

/// Separator between folder names in a derived path.
pub const FOLDER_SEPARATOR: &str = " / ";

/// Firefox's built-in roots; they never appear in a folder path.
pub const FIREFOX_PSEUDO_FOLDERS: [&str; 3] = ["Bookmarks Menu", "Bookmarks Toolbar", "Other Bookmarks"];

/// What the folder walk should do at one ancestor element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FolderStep {
    /// The ancestor names a folder.
    Segment(String),
    /// Not a folder boundary; keep walking up.
    Continue,
    /// The ancestor is the top of the bookmark tree; stop here.
    Stop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HtmlFlavor {
    Generic,
    Chrome,
    Firefox,
}

pub struct HtmlImporter {
    flavor: HtmlFlavor,
}

/// Visible text of an element with runs of whitespace collapsed.
pub fn element_text(el: ElementRef) -> String {
    el.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

fn previous_element(el: ElementRef) -> Option<ElementRef> {
    el.prev_siblings().find_map(ElementRef::wrap)
}

fn child_element<'a>(el: ElementRef<'a>, name: &str) -> Option<ElementRef<'a>> {
    el.children()
        .filter_map(ElementRef::wrap)
        .find(|child| child.value().name() == name)
}

fn heading_segment(heading: Option<ElementRef>) -> FolderStep {
    match heading {
        Some(h) if h.value().name() == "h3" => {
            let text = element_text(h);
            if text.is_empty() {
                FolderStep::Continue
            } else {
                FolderStep::Segment(text)
            }
        }
        _ => FolderStep::Continue,
    }
}

/// Walks from `anchor` to the document root, letting `step` classify each
/// ancestor element. Segments are met leaf first, so they are reversed before
/// joining; `None` when no folder was found.
pub fn walk_folder_path<F>(anchor: ElementRef, mut step: F) -> Option<String>
where
    F: FnMut(ElementRef) -> FolderStep,
{
    let mut segments: Vec<String> = Vec::new();
    for ancestor in anchor.ancestors().filter_map(ElementRef::wrap) {
        match step(ancestor) {
            FolderStep::Segment(name) => segments.push(name),
            FolderStep::Continue => {}
            FolderStep::Stop => break,
        }
    }

    if segments.is_empty() {
        return None;
    }
    segments.reverse();
    Some(segments.join(FOLDER_SEPARATOR))
}

/// Base rule: a `<dt>` whose previous sibling is an `<h3>` names a folder.
pub fn generic_step(ancestor: ElementRef) -> FolderStep {
    if ancestor.value().name() == "dt" {
        heading_segment(previous_element(ancestor))
    } else {
        FolderStep::Continue
    }
}

/// Chrome: a `<dt>` holding an `<h3>` child names a folder; the top-level
/// `<dl>` (child of `<body>`/`<html>`) is the synthetic "Bookmarks" root and ends the walk.
pub fn chrome_step(ancestor: ElementRef) -> FolderStep {
    match ancestor.value().name() {
        "dl" => {
            let parent_name = ancestor
                .parent()
                .and_then(ElementRef::wrap)
                .map(|p| p.value().name().to_string());
            match parent_name.as_deref() {
                Some("html") | Some("body") => FolderStep::Stop,
                _ => FolderStep::Continue,
            }
        }
        "dt" => heading_segment(child_element(ancestor, "h3")),
        _ => FolderStep::Continue,
    }
}

/// Firefox: a `<dl>` whose previous sibling is an `<h3>` names a folder,
/// unless it is one of the built-in roots.
pub fn firefox_step(ancestor: ElementRef) -> FolderStep {
    if ancestor.value().name() != "dl" {
        return FolderStep::Continue;
    }
    match heading_segment(previous_element(ancestor)) {
        FolderStep::Segment(name) if FIREFOX_PSEUDO_FOLDERS.contains(&name.as_str()) => {
            FolderStep::Continue
        }
        other => other,
    }
}

impl HtmlImporter {
    pub const fn generic() -> Self {
        Self { flavor: HtmlFlavor::Generic }
    }

    pub const fn chrome() -> Self {
        Self { flavor: HtmlFlavor::Chrome }
    }

    pub const fn firefox() -> Self {
        Self { flavor: HtmlFlavor::Firefox }
    }

    pub fn flavor(&self) -> HtmlFlavor {
        self.flavor
    }

    fn folder_path(&self, anchor: ElementRef) -> Option<String> {
        match self.flavor {
            HtmlFlavor::Generic => walk_folder_path(anchor, generic_step),
            HtmlFlavor::Chrome => walk_folder_path(anchor, chrome_step),
            HtmlFlavor::Firefox => walk_folder_path(anchor, firefox_step),
        }
    }

    fn reads_browser_attributes(&self) -> bool {
        self.flavor != HtmlFlavor::Generic
    }

    /// Extracts one record per usable anchor, plus the number of anchors dropped
    /// (blank `href`, or Firefox `place:` queries).
    pub fn extract_records(&self, content: &str) -> Result<(Vec<BookmarkRecord>, usize), ImportError> {
        if !content.contains('<') {
            return Err(ImportError::MalformedStructure(
                "not an HTML bookmark file".to_string(),
            ));
        }

        let document = Html::parse_document(content);
        let anchors = Selector::parse("a[href]")
            .map_err(|e| ImportError::MalformedStructure(e.to_string()))?;

        let mut records = Vec::new();
        let mut dropped = 0;

        for anchor in document.select(&anchors) {
            let url = anchor.value().attr("href").unwrap_or("").trim().to_string();
            if url.is_empty() || (self.flavor == HtmlFlavor::Firefox && url.starts_with("place:")) {
                dropped += 1;
                continue;
            }

            let text = element_text(anchor);
            let title = if text.is_empty() { url.clone() } else { text };

            let (tags, added_at) = if self.reads_browser_attributes() {
                let tags = anchor
                    .value()
                    .attr("tags")
                    .map(split_tag_list)
                    .filter(|t| !t.is_empty());
                let added_at = anchor.value().attr("add_date").and_then(parse_epoch_seconds);
                (tags, added_at)
            } else {
                (None, None)
            };

            records.push(BookmarkRecord {
                folder_path: self.folder_path(anchor),
                url,
                title,
                tags,
                added_at,
            });
        }

        Ok((records, dropped))
    }
}

impl BookmarkImporter for HtmlImporter {
    fn display_name(&self) -> &'static str {
        match self.flavor {
            HtmlFlavor::Generic => "Bookmarks (HTML)",
            HtmlFlavor::Chrome => "Chrome bookmarks (HTML)",
            HtmlFlavor::Firefox => "Firefox bookmarks (HTML)",
        }
    }

    fn supported_mime_types(&self) -> &'static [&'static str] {
        &["text/html", "application/xhtml+xml"]
    }

    fn parse(&self, content: &str) -> Result<ParsedSource, ImportError> {
        let (records, dropped) = self.extract_records(content)?;
        Ok(ParsedSource {
            candidates: records.into_iter().map(BookmarkRecord::into_new_deeplink).collect(),
            rejected: dropped,
        })
    }
}

use serde::{Deserialize, Serialize};

/// A persisted deeplink row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredLink {
    pub id: i64,
    pub link: String,
    pub name: String,
    pub notes: String,
    pub thumbnail: String,
    pub opened_count: i64,
    pub is_favourite: bool,
    /// Epoch milliseconds.
    pub created_at: i64,
    pub last_opened_at: Option<i64>,
    pub profile_id: i64,
}

/// A stored link together with the names of its tags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkWithTags {
    #[serde(flatten)]
    pub link: StoredLink,
    pub tags: Vec<String>,
}

/// Everything needed to insert one link and its tags.
///
/// Importers, the transfer merge and `POST /api/links` all funnel through
/// this shape. `created_at = None` means "stamp with the insert time".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewDeeplink {
    pub link: String,
    pub name: String,
    pub notes: String,
    pub thumbnail: String,
    pub opened_count: i64,
    pub is_favourite: bool,
    pub created_at: Option<i64>,
    pub tags: Vec<String>,
}

impl NewDeeplink {
    pub fn new(link: impl Into<String>) -> Self {
        Self {
            link: link.into(),
            ..Self::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }
}

/// Page metadata scraped for `GET /api/link-info`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkInfo {
    pub url: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
}

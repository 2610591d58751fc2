use serde::{Deserialize, Serialize};

/// Body of `GET /api/export`: the full link set of one profile plus every tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferEnvelope {
    pub app_version: String,
    /// Epoch milliseconds.
    pub exported_at: i64,
    pub links: Vec<ExportedDeeplink>,
    pub tags: Vec<ExportedTag>,
}

/// A link as it travels between devices. `created_at` is RFC 3339 text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedDeeplink {
    pub link: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub opened_count: i64,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub is_favourite: bool,
    #[serde(default)]
    pub thumbnail: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedTag {
    pub id: i64,
    pub name: String,
}

/// Connection descriptor carried by the QR code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QrTransferInfo {
    pub ip: String,
    pub port: u16,
    pub app_version: String,
}

/// Which embedded server a [`crate::services::transfer::server::LocalServer`] runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServerKind {
    /// General CRUD API (links, tags, link info, server info).
    Api,
    /// Point-to-point export endpoint scanned via QR.
    Transfer,
}

impl ServerKind {
    pub fn label(&self) -> &'static str {
        match self {
            ServerKind::Api => "api",
            ServerKind::Transfer => "transfer",
        }
    }
}

/// Lifecycle of an embedded server: Stopped -> Starting -> Running -> Stopped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum ServerStatus {
    Stopped,
    Starting,
    Running { url: String },
}

impl ServerStatus {
    /// The published base URL, only present while running.
    pub fn url(&self) -> Option<&str> {
        match self {
            ServerStatus::Running { url } => Some(url),
            _ => None,
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self, ServerStatus::Running { .. })
    }
}

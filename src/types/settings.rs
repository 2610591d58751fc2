use serde::{Deserialize, Serialize};

/// Top-level application settings container.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct AppSettings {
    pub general: GeneralSettings,
    pub server: ServerSettings,
    pub transfer: TransferSettings,
}

/// Profile selection and storage location.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GeneralSettings {
    /// Profile that imports write into and exports read from.
    pub active_profile_id: i64,
    /// Database file name, resolved against the data directory.
    pub database_file: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            active_profile_id: 1,
            database_file: "linkvault.db".to_string(),
        }
    }
}

/// Embedded HTTP server settings shared by the API and transfer servers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerSettings {
    pub bind_address: String,
    pub api_port: u16,
    pub transfer_port: u16,
    /// Fixed IPv4 to advertise instead of running interface discovery.
    pub advertised_address: Option<String>,
    /// Interface-name prefixes treated as the WiFi interface.
    pub preferred_interfaces: Vec<String>,
    /// Time allowed for in-flight requests to finish before the listener is aborted.
    pub shutdown_grace_ms: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            api_port: 8080,
            transfer_port: 9000,
            advertised_address: None,
            preferred_interfaces: vec![
                "wlan".to_string(),
                "wl".to_string(),
                "en0".to_string(),
                "Wi-Fi".to_string(),
            ],
            shutdown_grace_ms: 1000,
        }
    }
}

/// Peer-to-peer transfer settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TransferSettings {
    pub fetch_timeout_secs: u64,
    /// Version string advertised in QR payloads and export envelopes.
    pub app_version: String,
}

impl Default for TransferSettings {
    fn default() -> Self {
        Self {
            fetch_timeout_secs: 30,
            app_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

//! Receiving side of a transfer: fetch a peer's export and merge it.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::database::Database;
use crate::types::errors::TransferError;
use crate::types::import::ImportResult;
use crate::types::settings::TransferSettings;
use crate::types::transfer::{QrTransferInfo, TransferEnvelope};

use super::envelope::merge_envelope;

#[derive(Debug, Clone)]
pub struct TransferClient {
    http: reqwest::Client,
}

impl TransferClient {
    pub fn new(timeout: Duration) -> Result<Self, TransferError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransferError::Network(format!("failed to create HTTP client: {e}")))?;
        Ok(Self { http })
    }

    pub fn from_settings(settings: &TransferSettings) -> Result<Self, TransferError> {
        Self::new(Duration::from_secs(settings.fetch_timeout_secs))
    }

    /// `GET http://{ip}:{port}/api/export`. Timeouts, refused connections and
    /// non-2xx answers are returned as errors without retrying.
    pub async fn fetch_envelope(
        &self,
        info: &QrTransferInfo,
    ) -> Result<TransferEnvelope, TransferError> {
        let url = info.export_url();
        tracing::info!(%url, "fetching peer export");

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| TransferError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransferError::HttpStatus(status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| TransferError::Network(e.to_string()))?;
        serde_json::from_slice(&body).map_err(|e| TransferError::InvalidPayload(e.to_string()))
    }

    /// Fetches the peer's export and merges it into `profile_id`.
    pub async fn pull(
        &self,
        db: Arc<Mutex<Database>>,
        profile_id: i64,
        info: &QrTransferInfo,
    ) -> Result<ImportResult, TransferError> {
        let envelope = self.fetch_envelope(info).await?;

        tokio::task::spawn_blocking(move || {
            let db = db
                .lock()
                .map_err(|e| TransferError::Storage(format!("database lock poisoned: {e}")))?;
            merge_envelope(db.connection(), profile_id, &envelope)
        })
        .await
        .map_err(|e| TransferError::Storage(format!("merge task failed: {e}")))?
    }
}

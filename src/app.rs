//! App Core for LinkVault.
//!
//! Central struct holding the shared database, settings, both embedded
//! servers and the import service.

use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::database::connection::Database;
use crate::services::import_service::ImportService;
use crate::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use crate::services::transfer::envelope::build_envelope;
use crate::services::transfer::{LocalServer, TransferClient};
use crate::types::errors::TransferError;
use crate::types::import::ImportResult;
use crate::types::settings::AppSettings;
use crate::types::transfer::{QrTransferInfo, ServerKind, TransferEnvelope};

/// Central application struct.
///
/// Managers are not stored because they borrow `&Connection`; lock `db` and
/// create them on demand, e.g. `LinkManager::new(app.db.lock()?.connection())`.
pub struct App {
    pub db: Arc<Mutex<Database>>,
    pub settings_engine: SettingsEngine,
    pub api_server: LocalServer,
    pub transfer_server: LocalServer,
    pub import_service: ImportService,
}

impl App {
    /// Opens (and migrates) the database at `db_path` and wires it with the
    /// already-loaded settings.
    pub fn new(
        db_path: impl AsRef<Path>,
        settings_engine: SettingsEngine,
    ) -> Result<Self, rusqlite::Error> {
        let db = Database::open(db_path)?;
        Ok(Self::with_database(db, settings_engine))
    }

    /// Wires an already-open database with the given settings.
    pub fn with_database(db: Database, settings_engine: SettingsEngine) -> Self {
        let db = Arc::new(Mutex::new(db));
        let settings = settings_engine.get_settings().clone();

        let api_server = LocalServer::new(ServerKind::Api, Arc::clone(&db), settings.clone());
        let transfer_server = LocalServer::new(ServerKind::Transfer, Arc::clone(&db), settings);
        let import_service = ImportService::new(Arc::clone(&db));

        Self {
            db,
            settings_engine,
            api_server,
            transfer_server,
            import_service,
        }
    }

    pub fn settings(&self) -> &AppSettings {
        self.settings_engine.get_settings()
    }

    pub fn active_profile_id(&self) -> i64 {
        self.settings().general.active_profile_id
    }

    /// Snapshot of the active profile in transfer format.
    pub fn export(&self) -> Result<TransferEnvelope, TransferError> {
        let db = self
            .db
            .lock()
            .map_err(|e| TransferError::Storage(format!("database lock poisoned: {e}")))?;
        build_envelope(
            db.connection(),
            self.active_profile_id(),
            &self.settings().transfer.app_version,
        )
    }

    /// Fetches a peer's export described by a scanned QR payload and merges it
    /// into the active profile.
    pub async fn pull(&self, info: &QrTransferInfo) -> Result<ImportResult, TransferError> {
        let client = TransferClient::from_settings(&self.settings().transfer)?;
        client
            .pull(Arc::clone(&self.db), self.active_profile_id(), info)
            .await
    }

    /// Stops both servers.
    pub async fn shutdown(&self) {
        self.api_server.stop().await;
        self.transfer_server.stop().await;
    }
}

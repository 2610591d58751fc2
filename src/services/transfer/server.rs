//! Start/stop lifecycle for one embedded HTTP server.
//!
//! Status moves Stopped -> Starting -> Running -> Stopped and is published on
//! a `watch` channel so callers can follow the toggle without polling.

use std::net::Ipv4Addr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;

use crate::database::Database;
use crate::services::link_info::LinkInfoClient;
use crate::types::errors::TransferError;
use crate::types::settings::AppSettings;
use crate::types::transfer::{QrTransferInfo, ServerKind, ServerStatus};

use super::address::AddressResolver;
use super::handlers::{router, ApiState};

struct RunningServer {
    url: String,
    ip: Ipv4Addr,
    port: u16,
    shutdown: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

pub struct LocalServer {
    kind: ServerKind,
    db: Arc<Mutex<Database>>,
    settings: AppSettings,
    resolver: AddressResolver,
    status: Arc<watch::Sender<ServerStatus>>,
    running: tokio::sync::Mutex<Option<RunningServer>>,
}

impl LocalServer {
    pub fn new(kind: ServerKind, db: Arc<Mutex<Database>>, settings: AppSettings) -> Self {
        let resolver = AddressResolver::from_settings(&settings.server);
        let (status, _) = watch::channel(ServerStatus::Stopped);
        Self {
            kind,
            db,
            settings,
            resolver,
            status: Arc::new(status),
            running: tokio::sync::Mutex::new(None),
        }
    }

    /// Replaces the address discovery used on the next `start`.
    pub fn with_resolver(mut self, resolver: AddressResolver) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn kind(&self) -> ServerKind {
        self.kind
    }

    fn configured_port(&self) -> u16 {
        match self.kind {
            ServerKind::Api => self.settings.server.api_port,
            ServerKind::Transfer => self.settings.server.transfer_port,
        }
    }

    pub fn status(&self) -> ServerStatus {
        self.status.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ServerStatus> {
        self.status.subscribe()
    }

    /// Binds and starts serving. Returns the published base URL.
    ///
    /// Calling `start` on a running server returns the existing URL. If no
    /// LAN address can be found or the bind fails, the status falls back to
    /// `Stopped` and the error is returned.
    pub async fn start(&self) -> Result<String, TransferError> {
        let mut running = self.running.lock().await;
        if let Some(current) = running.as_ref() {
            if !current.handle.is_finished() {
                return Ok(current.url.clone());
            }
            *running = None;
        }

        self.status.send_replace(ServerStatus::Starting);

        let ip = match self.resolver.resolve() {
            Ok(ip) => ip,
            Err(e) => {
                tracing::warn!(server = self.kind.label(), error = %e, "server start aborted");
                self.status.send_replace(ServerStatus::Stopped);
                return Err(e);
            }
        };

        let bind_address = self.settings.server.bind_address.as_str();
        let listener = match TcpListener::bind((bind_address, self.configured_port())).await {
            Ok(listener) => listener,
            Err(e) => {
                self.status.send_replace(ServerStatus::Stopped);
                return Err(TransferError::Bind(format!(
                    "{}:{}: {}",
                    bind_address,
                    self.configured_port(),
                    e
                )));
            }
        };
        let port = match listener.local_addr() {
            Ok(addr) => addr.port(),
            Err(e) => {
                self.status.send_replace(ServerStatus::Stopped);
                return Err(TransferError::Bind(e.to_string()));
            }
        };

        let link_info = match LinkInfoClient::new(Duration::from_secs(
            self.settings.transfer.fetch_timeout_secs,
        )) {
            Ok(client) => client,
            Err(e) => {
                self.status.send_replace(ServerStatus::Stopped);
                return Err(e);
            }
        };
        let app = router(ApiState {
            db: Arc::clone(&self.db),
            profile_id: self.settings.general.active_profile_id,
            app_version: self.settings.transfer.app_version.clone(),
            kind: self.kind,
            link_info,
        });

        let url = format!("http://{}:{}", ip, port);
        self.status.send_replace(ServerStatus::Running { url: url.clone() });
        tracing::info!(server = self.kind.label(), %url, "server listening");

        let (shutdown, shutdown_rx) = oneshot::channel::<()>();
        let status = Arc::clone(&self.status);
        let label = self.kind.label();
        let handle = tokio::spawn(async move {
            let served = axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await;
            if let Err(e) = served {
                tracing::warn!(server = label, error = %e, "server loop exited with error");
            }
            status.send_replace(ServerStatus::Stopped);
        });

        *running = Some(RunningServer {
            url: url.clone(),
            ip,
            port,
            shutdown,
            handle,
        });
        Ok(url)
    }

    /// Stops the listener, giving in-flight requests `shutdown_grace_ms`
    /// before the task is aborted. Stopping a stopped server does nothing.
    pub async fn stop(&self) {
        let Some(server) = self.running.lock().await.take() else {
            return;
        };
        let RunningServer {
            shutdown,
            mut handle,
            url,
            ..
        } = server;

        let _ = shutdown.send(());
        let grace = Duration::from_millis(self.settings.server.shutdown_grace_ms);
        if tokio::time::timeout(grace, &mut handle).await.is_err() {
            tracing::warn!(server = self.kind.label(), "grace period elapsed, aborting");
            handle.abort();
            let _ = handle.await;
        }

        self.status.send_replace(ServerStatus::Stopped);
        tracing::info!(server = self.kind.label(), %url, "server stopped");
    }

    /// The QR descriptor for the running server, `None` while stopped.
    pub async fn connection_info(&self) -> Option<QrTransferInfo> {
        let running = self.running.lock().await;
        let server = running.as_ref().filter(|s| !s.handle.is_finished())?;
        Some(QrTransferInfo::new(
            server.ip.to_string(),
            server.port,
            self.settings.transfer.app_version.clone(),
        ))
    }
}

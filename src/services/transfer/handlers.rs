//! Axum routes for the embedded API and transfer servers.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::database::Database;
use crate::managers::link_manager::{LinkManager, LinkManagerTrait};
use crate::managers::tag_manager::{TagManager, TagManagerTrait};
use crate::services::deeplink::{is_valid_deeplink, normalize_link};
use crate::services::import_writer::insert_with_tags;
use crate::services::link_info::LinkInfoClient;
use crate::types::deeplink::{LinkInfo, LinkWithTags, NewDeeplink};
use crate::types::errors::{LinkError, TagError, TransferError};
use crate::types::tag::TagUsage;
use crate::types::transfer::{ServerKind, TransferEnvelope};

use super::envelope::build_envelope;
use super::qr::EXPORT_PATH;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct ApiState {
    pub db: Arc<Mutex<Database>>,
    pub profile_id: i64,
    pub app_version: String,
    pub kind: ServerKind,
    pub link_info: LinkInfoClient,
}

/// JSON error body: `{"error": "..."}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::warn!(status = %self.status, error = %self.message, "request failed");
        }
        (self.status, Json(ErrorBody { error: self.message })).into_response()
    }
}

impl From<LinkError> for ApiError {
    fn from(e: LinkError) -> Self {
        let status = match e {
            LinkError::NotFound(_) => StatusCode::NOT_FOUND,
            LinkError::Duplicate(_) => StatusCode::CONFLICT,
            LinkError::Invalid(_) => StatusCode::BAD_REQUEST,
            LinkError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, e.to_string())
    }
}

impl From<TagError> for ApiError {
    fn from(e: TagError) -> Self {
        Self::internal(e.to_string())
    }
}

impl From<TransferError> for ApiError {
    fn from(e: TransferError) -> Self {
        let status = match e {
            TransferError::Network(_) | TransferError::HttpStatus(_) => StatusCode::BAD_GATEWAY,
            TransferError::InvalidPayload(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, e.to_string())
    }
}

/// Runs database work on the blocking pool under the shared lock.
async fn with_db<T, F>(state: &ApiState, f: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&Connection) -> Result<T, ApiError> + Send + 'static,
{
    let db = Arc::clone(&state.db);
    tokio::task::spawn_blocking(move || {
        let guard = db
            .lock()
            .map_err(|e| ApiError::internal(format!("database lock poisoned: {e}")))?;
        f(guard.connection())
    })
    .await
    .map_err(|e| ApiError::internal(format!("database task failed: {e}")))?
}

/// Routes for `kind`. Both servers serve the export; only the API server
/// carries the CRUD endpoints.
pub fn router(state: ApiState) -> Router {
    let routes = Router::new().route(EXPORT_PATH, get(get_export));
    let routes = match state.kind {
        ServerKind::Transfer => routes,
        ServerKind::Api => routes
            .route("/api/links", post(post_link))
            .route("/api/tags", get(get_tags))
            .route("/api/link-info", get(get_link_info))
            .route("/api/server-info", get(get_server_info)),
    };
    routes.with_state(state)
}

async fn get_export(State(state): State<ApiState>) -> Result<Json<TransferEnvelope>, ApiError> {
    let profile_id = state.profile_id;
    let version = state.app_version.clone();
    let envelope = with_db(&state, move |conn| {
        Ok(build_envelope(conn, profile_id, &version)?)
    })
    .await?;
    tracing::info!(links = envelope.links.len(), "served export");
    Ok(Json(envelope))
}

async fn post_link(
    State(state): State<ApiState>,
    Json(body): Json<NewDeeplink>,
) -> Result<(StatusCode, Json<LinkWithTags>), ApiError> {
    let link = normalize_link(&body.link);
    if !is_valid_deeplink(&link) {
        return Err(LinkError::Invalid(body.link).into());
    }
    let candidate = NewDeeplink { link, ..body };

    let profile_id = state.profile_id;
    let created = with_db(&state, move |conn| {
        let id = insert_with_tags(conn, profile_id, &candidate)?;
        let link = LinkManager::new(conn).get_link(id)?;
        let tags = TagManager::new(conn).tags_for_link(id)?;
        Ok(LinkWithTags { link, tags })
    })
    .await?;

    tracing::info!(id = created.link.id, link = %created.link.link, "link created via API");
    Ok((StatusCode::CREATED, Json(created)))
}

async fn get_tags(State(state): State<ApiState>) -> Result<Json<Vec<TagUsage>>, ApiError> {
    let tags = with_db(&state, |conn| Ok(TagManager::new(conn).list_tags_with_usage()?)).await?;
    Ok(Json(tags))
}

#[derive(Debug, Deserialize)]
pub struct LinkInfoQuery {
    url: Option<String>,
}

async fn get_link_info(
    State(state): State<ApiState>,
    Query(query): Query<LinkInfoQuery>,
) -> Result<Json<LinkInfo>, ApiError> {
    let raw = query.url.unwrap_or_default();
    let url = normalize_link(&raw);
    let is_web = url::Url::parse(&url)
        .map(|u| matches!(u.scheme(), "http" | "https"))
        .unwrap_or(false);
    if !is_web {
        return Err(ApiError::new(
            StatusCode::BAD_REQUEST,
            format!("Expected an http(s) url, got: {raw}"),
        ));
    }

    let info = state.link_info.fetch(&url).await?;
    Ok(Json(info))
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointInfo {
    pub method: &'static str,
    pub path: &'static str,
    pub description: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerInfo {
    pub name: &'static str,
    pub app_version: String,
    pub server: &'static str,
    pub profile_id: i64,
    pub endpoints: Vec<EndpointInfo>,
}

pub const API_ENDPOINTS: [EndpointInfo; 5] = [
    EndpointInfo {
        method: "GET",
        path: EXPORT_PATH,
        description: "Full export of links and tags",
    },
    EndpointInfo {
        method: "POST",
        path: "/api/links",
        description: "Create a link from a JSON body, tags included",
    },
    EndpointInfo {
        method: "GET",
        path: "/api/tags",
        description: "Tags with usage counts",
    },
    EndpointInfo {
        method: "GET",
        path: "/api/link-info?url=",
        description: "Title, description and image of a web page",
    },
    EndpointInfo {
        method: "GET",
        path: "/api/server-info",
        description: "This catalog",
    },
];

async fn get_server_info(State(state): State<ApiState>) -> Json<ServerInfo> {
    Json(ServerInfo {
        name: env!("CARGO_PKG_NAME"),
        app_version: state.app_version.clone(),
        server: state.kind.label(),
        profile_id: state.profile_id,
        endpoints: API_ENDPOINTS.to_vec(),
    })
}

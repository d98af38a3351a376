//! HTTP request handlers for the Solder API.
//!
//! Handlers that expose bundle contents call
//! [`UpdateCoordinator::ensure_fresh`](crate::coordinator::UpdateCoordinator::ensure_fresh)
//! first; blob downloads read the currently published bundle directly.

use crate::error::UpdateError;
use crate::hash::{ContentHash, is_hex};
use crate::responses::{
    ApiInfo, BuildDescriptor, KeyValidation, ModpackList, ModpackSummary, OutdatedBuild,
    PrettyJson,
};
use crate::server::AppState;
use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use std::sync::Arc;

/// Query string of `GET /api/modpack/`.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    /// `full` to include bundle summaries
    pub include: Option<String>,
}

/// Handle GET /api/ endpoint.
pub async fn handle_api_info() -> PrettyJson<ApiInfo> {
    PrettyJson(ApiInfo::default())
}

/// Handle GET /api/verify/{key} endpoint.
///
/// Any hex key is accepted.
///
/// # Errors
///
/// Returns `AppError::NotFound` if the key is not hex.
pub async fn handle_verify(Path(key): Path<String>) -> Result<PrettyJson<KeyValidation>, AppError> {
    if !is_hex(&key) {
        return Err(AppError::NotFound);
    }
    Ok(PrettyJson(KeyValidation::accepted()))
}

/// Handle GET /api/modpack/ endpoint.
///
/// With `include=full` the bundle is refreshed and summarised; otherwise only
/// display names are listed.
///
/// # Errors
///
/// Returns `AppError::Update` if a required rebuild fails.
pub async fn handle_list_modpacks(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Result<Response, AppError> {
    let info = state.modpack();

    if query.include.as_deref() == Some("full") {
        tracing::debug!("Handling full modpack listing");
        let bundle = state.coordinator().ensure_fresh().await?;
        let summary = ModpackSummary::new(info, &bundle);
        return Ok(PrettyJson(ModpackList::single(info, summary)).into_response());
    }

    Ok(PrettyJson(ModpackList::single(info, info.name.clone())).into_response())
}

/// Handle GET /api/modpack/{id}/ endpoint.
///
/// # Errors
///
/// Returns `AppError::NotFound` for an unknown modpack, or `AppError::Update`
/// if a required rebuild fails.
pub async fn handle_describe_modpack(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<PrettyJson<ModpackSummary>, AppError> {
    tracing::debug!("Handling modpack request for {}", id);

    if id != state.modpack().id {
        return Err(AppError::NotFound);
    }

    let bundle = state.coordinator().ensure_fresh().await?;
    Ok(PrettyJson(ModpackSummary::new(state.modpack(), &bundle)))
}

/// Handle GET /api/modpack/{id}/{version} endpoint.
///
/// A version other than the current one gets a 200 reply carrying an
/// `error` message that names the current build.
///
/// # Errors
///
/// Returns `AppError::NotFound` for an unknown modpack or a non-hex version,
/// or `AppError::Update` if a required rebuild fails.
pub async fn handle_describe_build(
    Path((id, version)): Path<(String, String)>,
    State(state): State<Arc<AppState>>,
) -> Result<Response, AppError> {
    tracing::debug!("Handling build request for {} {}", id, version);

    if id != state.modpack().id || !is_hex(&version) {
        return Err(AppError::NotFound);
    }

    let bundle = state.coordinator().ensure_fresh().await?;
    if !bundle.version_id().matches(&version) {
        tracing::debug!(
            "Client requested build {}, current is {}",
            version,
            bundle.version_id()
        );
        return Ok(PrettyJson(OutdatedBuild::new(bundle.version_id().as_str())).into_response());
    }

    Ok(PrettyJson(BuildDescriptor::new(&bundle)).into_response())
}

/// Handle GET /download/{hash}.zip endpoint.
///
/// Serves raw blob bytes from the published bundle.
///
/// # Errors
///
/// Returns `AppError::NotFound` if the hash is not in the current bundle.
pub async fn handle_download(
    Path(file): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Response, AppError> {
    let hash = file
        .strip_suffix(".zip")
        .filter(|hex| is_hex(hex))
        .and_then(|hex| ContentHash::from_hex(hex).ok())
        .ok_or(AppError::NotFound)?;

    let blob = state
        .coordinator()
        .current()
        .and_then(|bundle| bundle.blob(&hash))
        .ok_or(AppError::NotFound)?;

    tracing::debug!("Serving blob {} ({} bytes)", hash, blob.len());

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/zip")],
        Body::from(blob),
    )
        .into_response())
}

/// Application-level error type for HTTP handlers.
#[derive(Debug)]
pub enum AppError {
    /// Resource not found (404, empty body)
    NotFound,
    /// Bundle rebuild failed (500)
    Update(Arc<UpdateError>),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND.into_response(),
            Self::Update(err) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response(),
        }
    }
}

impl From<Arc<UpdateError>> for AppError {
    fn from(err: Arc<UpdateError>) -> Self {
        Self::Update(err)
    }
}

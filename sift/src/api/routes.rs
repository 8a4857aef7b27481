//! Request handlers for the facade's route table.

use crate::api::error::ApiError;
use crate::denoise::Denoiser;
use crate::lifecycle::IndexManager;
use crate::query::params::parse_bool;
use crate::query::validate::validate;
use crate::query::{DenoiseParams, RenameParams, SearchLimits, SearchParams};
use crate::search::{self, SearchResponse};
use crate::stout::StoutIngest;
use crate::Error;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub manager: Arc<IndexManager>,
    pub denoiser: Arc<dyn Denoiser>,
    /// Present only when enabled via configuration.
    pub stout: Option<Arc<dyn StoutIngest>>,
    pub limits: SearchLimits,
}

/// GET / - service identity, connection status, registered indices.
pub async fn identity(State(state): State<AppState>) -> Json<Value> {
    let connected = state.manager.store().ping().await;
    let applications = if connected {
        state.manager.list().await.unwrap_or_default()
    } else {
        Vec::new()
    };
    Json(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "status": if connected { "connected" } else { "unreachable" },
        "applications": applications,
    }))
}

/// POST/PUT /create/{app_id}
pub async fn create(
    Path(app_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Value>, ApiError> {
    state.manager.create(&app_id).await?;
    Ok(Json(json!({ "acknowledged": true, "index": app_id })))
}

/// GET /status/{app_id}
pub async fn status(
    Path(app_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Value>, ApiError> {
    let metadata = state.manager.read(&app_id).await?;
    Ok(Json(json!({
        "index": app_id,
        "fields": metadata.fields,
        "doc_types": metadata.doc_types,
    })))
}

/// POST/PUT /update/{app_id}?name=
pub async fn update(
    Path(app_id): Path<String>,
    Query(params): Query<RenameParams>,
    State(state): State<AppState>,
) -> Result<Json<Value>, ApiError> {
    let new_name = params
        .name
        .filter(|n| !n.is_empty())
        .ok_or_else(|| Error::Validation("parameter 'name' is required".to_string()))?;
    state.manager.update(&app_id, &new_name).await?;
    Ok(Json(json!({ "acknowledged": true, "index": new_name })))
}

/// DELETE /{app_id}
pub async fn delete(
    Path(app_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Value>, ApiError> {
    state.manager.delete(&app_id).await?;
    Ok(Json(json!({ "acknowledged": true })))
}

/// GET /search/{app_id}
pub async fn search(
    Path(app_id): Path<String>,
    Query(params): Query<SearchParams>,
    State(state): State<AppState>,
) -> Result<Json<SearchResponse>, ApiError> {
    run_search(state, app_id, None, params).await
}

/// GET /search/{app_id}/{app_type}
pub async fn search_typed(
    Path((app_id, app_type)): Path<(String, String)>,
    Query(params): Query<SearchParams>,
    State(state): State<AppState>,
) -> Result<Json<SearchResponse>, ApiError> {
    run_search(state, app_id, Some(app_type), params).await
}

async fn run_search(
    state: AppState,
    app_id: String,
    app_type: Option<String>,
    params: SearchParams,
) -> Result<Json<SearchResponse>, ApiError> {
    let metadata = state.manager.metadata_for_search(&app_id).await;
    let spec = validate(&app_id, app_type, &params, metadata.as_ref(), &state.limits)?;
    let page = search::execute(state.manager.store().as_ref(), &spec).await?;
    let response = search::assemble(page, &spec.fields);
    tracing::info!(
        index = %spec.index,
        query = params.q.as_deref().unwrap_or("*:*"),
        total = response.total,
        returned = response.hits.len(),
        scrolled = spec.scroll,
        "search completed"
    );
    Ok(Json(response))
}

/// GET /stat/{app_id}[/{app_type}] - reserved for per-element statistics;
/// always answers 501.
pub async fn stat() -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_IMPLEMENTED,
        Json(json!({ "error": "stat is not implemented" })),
    )
}

/// GET /denoise/{app_id}?save=&type=
pub async fn denoise(
    Path(app_id): Path<String>,
    Query(params): Query<DenoiseParams>,
    State(state): State<AppState>,
) -> Result<Json<Value>, ApiError> {
    let save = match params.save.as_deref() {
        None => false,
        Some(raw) => parse_bool("save", raw).map_err(ApiError::from)?,
    };
    let doc_type = params.doc_type.unwrap_or_else(|| "parsed".to_string());
    let report = state.denoiser.denoise(&app_id, &doc_type, save).await?;
    Ok(Json(report))
}

/// GET /stout
pub async fn stout(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    match &state.stout {
        Some(ingest) => Ok(Json(ingest.ingest().await?)),
        None => Ok(Json(json!({ "status": "stout is disabled" }))),
    }
}

/// Unmatched routes get a plain-text message, not JSON.
pub async fn fallback() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "not found")
}

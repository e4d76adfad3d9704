//! API Handlers
//!
//! HTTP request handlers for the diagnostics endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use tracing::info;

use crate::config::Settings;
use crate::error::{CacheError, Result};
use crate::metadata::{MetadataCategory, MetadataService};
use crate::models::{
    ClearResponse, DeleteResponse, HealthResponse, MetadataResponse, SettingsResponse,
    StatsResponse, UpdateSettingsRequest,
};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Metadata service owning the category caches
    pub service: Arc<MetadataService>,
}

impl AppState {
    /// Creates a new AppState around an existing service.
    pub fn new(service: MetadataService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }

    /// Creates a new AppState from settings, without background sweepers.
    pub fn from_settings(settings: Settings) -> Result<Self> {
        Ok(Self::new(MetadataService::new(settings)?))
    }
}

/// Handler for GET /metadata/:category/:key
///
/// Reads the cache only; a miss never triggers a fetch.
pub async fn get_metadata_handler(
    State(state): State<AppState>,
    Path((category, key)): Path<(String, String)>,
) -> Result<Json<MetadataResponse>> {
    let category: MetadataCategory = category.parse()?;
    let service = &state.service;

    let record = match category {
        MetadataCategory::Track => to_json(service.cached_track(&key))?,
        MetadataCategory::Album => to_json(service.cached_album(&key))?,
        MetadataCategory::External => to_json(service.cached_external(&key))?,
    };

    match record {
        Some(record) => Ok(Json(MetadataResponse::new(category, key, record))),
        None => Err(CacheError::NotFound(format!("{}/{}", category, key))),
    }
}

/// Handler for DELETE /metadata/:category/:key
pub async fn delete_metadata_handler(
    State(state): State<AppState>,
    Path((category, key)): Path<(String, String)>,
) -> Result<Json<DeleteResponse>> {
    let category: MetadataCategory = category.parse()?;

    if !state.service.remove(category, &key) {
        return Err(CacheError::NotFound(format!("{}/{}", category, key)));
    }
    Ok(Json(DeleteResponse::new(category, key)))
}

/// Handler for DELETE /cache
pub async fn clear_handler(State(state): State<AppState>) -> Json<ClearResponse> {
    state.service.invalidate_all();
    Json(ClearResponse::cleared())
}

/// Handler for PUT /settings
///
/// Applies a partial settings update and rebuilds the caches.
pub async fn update_settings_handler(
    State(state): State<AppState>,
    Json(req): Json<UpdateSettingsRequest>,
) -> Result<Json<SettingsResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let settings = state.service.update_settings(|current| req.apply_to(current))?;
    info!("Settings updated via API");

    Ok(Json(SettingsResponse::applied(settings)))
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse::new(state.service.statistics()))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

fn to_json<T: Serialize>(record: Option<T>) -> Result<Option<serde_json::Value>> {
    record
        .map(|r| serde_json::to_value(r).map_err(|e| CacheError::Internal(e.to_string())))
        .transpose()
}

//! API Handlers
//!
//! HTTP request handlers for each cache admin endpoint.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use tracing::debug;

use crate::engine::RefreshableCache;
use crate::error::{CacheError, Result};
use crate::models::{
    AllResponse, GetResponse, HealthResponse, LifecycleResponse, PurgeResponse, ReloadResponse,
    SetRequest, SetResponse, StatsResponse, ValuesResponse,
};
use crate::traits::LoadableCache;

/// Application state shared across all handlers.
///
/// The engine does its own locking, so handlers only share the `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub cache: Arc<RefreshableCache<String, String>>,
}

impl AppState {
    pub fn new(cache: Arc<RefreshableCache<String, String>>) -> Self {
        Self { cache }
    }
}

/// Handler for PUT /set
///
/// Stores a key-value pair until the next successful reload.
pub async fn set_handler(
    State(state): State<AppState>,
    Json(req): Json<SetRequest>,
) -> Result<Json<SetResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    state.cache.set(req.key.clone(), req.value)?;
    Ok(Json(SetResponse::new(req.key)))
}

/// Handler for GET /get/:key
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<GetResponse>> {
    let value = state
        .cache
        .get(&key)
        .ok_or_else(|| CacheError::NotFound(key.clone()))?;

    Ok(Json(GetResponse::new(key, value)))
}

/// Handler for GET /all
pub async fn all_handler(State(state): State<AppState>) -> Json<AllResponse> {
    Json(AllResponse::new(state.cache.get_all()))
}

/// Handler for GET /values
pub async fn values_handler(State(state): State<AppState>) -> Json<ValuesResponse> {
    Json(ValuesResponse::new(state.cache.values()))
}

/// Handler for DELETE /purge
pub async fn purge_handler(State(state): State<AppState>) -> Json<PurgeResponse> {
    state.cache.purge();
    Json(PurgeResponse::new())
}

/// Handler for POST /reload
///
/// The refresh source may block, so the reload runs on the blocking pool.
pub async fn reload_handler(State(state): State<AppState>) -> Result<Json<ReloadResponse>> {
    let cache = Arc::clone(&state.cache);
    let reloaded = tokio::task::spawn_blocking(move || cache.try_reload_now())
        .await
        .map_err(|err| CacheError::Internal(format!("reload task failed: {}", err)))?;

    debug!(reloaded, "Manual reload finished");
    Ok(Json(ReloadResponse { reloaded }))
}

/// Handler for POST /stop
pub async fn stop_handler(State(state): State<AppState>) -> Json<LifecycleResponse> {
    state.cache.stop();
    Json(LifecycleResponse {
        state: state.cache.state(),
    })
}

/// Handler for POST /restart
pub async fn restart_handler(State(state): State<AppState>) -> Json<LifecycleResponse> {
    state.cache.restart();
    Json(LifecycleResponse {
        state: state.cache.state(),
    })
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse::new(
        state.cache.stats(),
        state.cache.expiration(),
    ))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

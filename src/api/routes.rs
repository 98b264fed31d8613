//! API Routes
//!
//! Configures the Axum router with all cache admin endpoints.

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    all_handler, get_handler, health_handler, purge_handler, reload_handler, restart_handler,
    set_handler, stats_handler, stop_handler, values_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /get/:key` - Retrieve a value by key
/// - `GET /all` - Snapshot of every entry
/// - `GET /values` - Every stored value
/// - `PUT /set` - Store a key-value pair until the next reload
/// - `DELETE /purge` - Remove every entry
/// - `POST /reload` - Run one refresh now
/// - `POST /stop` - Stop scheduled reloads
/// - `POST /restart` - Resume scheduled reloads
/// - `GET /stats` - Cache and reload statistics
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - CORS: Allows any origin
/// - Tracing: Logs all requests
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/get/:key", get(get_handler))
        .route("/all", get(all_handler))
        .route("/values", get(values_handler))
        .route("/set", put(set_handler))
        .route("/purge", delete(purge_handler))
        .route("/reload", post(reload_handler))
        .route("/stop", post(stop_handler))
        .route("/restart", post(restart_handler))
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

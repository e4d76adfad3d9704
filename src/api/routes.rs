//! API Routes
//!
//! Configures the Axum router with all diagnostics endpoints.

use axum::{
    routing::{delete, get, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    clear_handler, delete_metadata_handler, get_metadata_handler, health_handler, stats_handler,
    update_settings_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Middleware
/// - CORS: Allows any origin
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route(
            "/metadata/:category/:key",
            get(get_metadata_handler).delete(delete_metadata_handler),
        )
        .route("/cache", delete(clear_handler))
        .route("/settings", put(update_settings_handler))
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

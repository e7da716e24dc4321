//! Route definitions for the API.

use axum::{routing::get, Json, Router};

use super::handlers;
use super::SharedState;

/// Create the main API router
pub fn create_router(state: SharedState) -> Router {
    // Build the OpenAPI spec once at startup
    let openapi = super::openapi::build_openapi();

    Router::new()
        // Health endpoints (no auth required)
        .route("/health", get(handlers::health::health_check))
        .route("/healthz", get(handlers::health::health_check))
        // OpenAPI spec
        .route(
            "/api/v1/openapi.json",
            get(move || async move { Json(openapi) }),
        )
        // API v1 routes
        .nest("/api/v1/artifacts", handlers::artifacts::router())
        .route("/api/v1/stats", get(handlers::stats::get_stats))
        .with_state(state)
}

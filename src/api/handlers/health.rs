//! Health check handlers.

use axum::Json;
use serde_json::{json, Value};

/// Liveness check. No auth, no store access.
pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "config-depot",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

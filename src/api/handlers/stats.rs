//! Usage statistics handler.

use axum::{extract::State, Json};

use crate::api::dto::StatsResponse;
use crate::api::SharedState;
use crate::error::Result;

/// Get aggregate usage statistics
pub async fn get_stats(State(state): State<SharedState>) -> Result<Json<StatsResponse>> {
    let stats = state.stats_service().usage().await?;
    Ok(Json(StatsResponse::from(stats)))
}

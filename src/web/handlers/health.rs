//! Health check HTTP handler

use axum::{extract::State, response::IntoResponse};

use crate::web::{
    AppState,
    responses::{HealthResponse, ok},
};

/// Health check endpoint
///
/// Reports cache occupancy and background job load alongside the version.
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let stats = state.resize_service.stats().await;
    ok(HealthResponse::healthy(stats))
}

//! Health handler

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;
use smartfinance_core::ChatBackend;

/// Health status response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub backend: String,
    pub model: String,
    /// Whether the provider credential is set (never the credential itself)
    pub configured: bool,
}

/// GET /api/health - Service status
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let provider = state.pipeline.provider();
    Json(HealthResponse {
        status: "ok",
        backend: provider.backend().name().to_string(),
        model: provider.model().to_string(),
        configured: provider.is_configured(),
    })
}

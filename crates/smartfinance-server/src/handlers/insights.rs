//! AI insight handler

use std::sync::Arc;

use axum::{body::Bytes, extract::State, http::StatusCode, Json};
use tracing::debug;

use crate::{AppError, AppState};
use smartfinance_core::{InsightRequest, InsightResponse};

/// POST /api/ai-insights - Generate savings insights
///
/// The body is parsed by hand so a missing or non-list `transactions`
/// field falls back to the store instead of being rejected. Unparseable
/// JSON and malformed transaction entries are uncaught faults.
pub async fn generate_insights(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<(StatusCode, Json<InsightResponse>), AppError> {
    let request = InsightRequest::from_slice(&body)?;
    debug!(
        transactions = ?request.transactions.as_ref().map(Vec::len),
        "Insight request received"
    );

    let response = state.pipeline.respond(&request).await;
    let status = if response.is_success() {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };

    Ok((status, Json(response)))
}

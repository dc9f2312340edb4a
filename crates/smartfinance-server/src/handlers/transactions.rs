//! Transaction and category handlers

use std::sync::Arc;

use axum::{extract::State, Json};

use crate::AppState;
use smartfinance_core::insights::category_breakdown;
use smartfinance_core::{CategoryAggregate, Transaction};

/// GET /api/transactions - List the store's transactions
pub async fn list_transactions(State(state): State<Arc<AppState>>) -> Json<Vec<Transaction>> {
    Json(state.store.fetch_transactions())
}

/// GET /api/categories - Category breakdown of the store's transactions
pub async fn list_categories(State(state): State<Arc<AppState>>) -> Json<Vec<CategoryAggregate>> {
    let transactions = state.store.fetch_transactions();
    Json(category_breakdown(&transactions))
}

//! SmartFinance Web Server
//!
//! Axum-based REST API for the SmartFinance insight service.
//!
//! - `GET /api/transactions` - the store's transactions
//! - `GET /api/categories` - per-category totals for the breakdown chart
//! - `POST /api/ai-insights` - savings insights for posted (or default) transactions
//! - `GET /api/health` - backend and credential status
//!
//! Every response under `/api` is JSON, including unknown routes, body
//! parse failures and handler panics.

use std::any::Any;
use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{Any as AnyOrigin, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing::{error, info, warn};

use smartfinance_core::{ChatBackend, InsightPipeline, TransactionSource};

mod handlers;

/// Default listen port
pub const DEFAULT_PORT: u16 = 5000;

/// Message for uncaught faults
const INTERNAL_ERROR_MESSAGE: &str = "Internal Server Error";

/// Server configuration
#[derive(Clone, Default)]
pub struct ServerConfig {
    /// Allowed CORS origins (empty = any origin)
    pub allowed_origins: Vec<String>,
}

impl ServerConfig {
    /// Read `SMARTFINANCE_ALLOWED_ORIGINS` (comma-separated)
    pub fn from_env() -> Self {
        let allowed_origins = std::env::var("SMARTFINANCE_ALLOWED_ORIGINS")
            .map(|v| parse_origins(&v))
            .unwrap_or_default();
        Self { allowed_origins }
    }
}

fn parse_origins(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(str::to_string)
        .collect()
}

/// Shared application state
pub struct AppState {
    pub pipeline: InsightPipeline,
    pub store: Arc<dyn TransactionSource>,
}

/// Create the application router
///
/// The pipeline's fallback transactions are replaced by `store`, so an
/// insight request without transactions analyzes what
/// `GET /api/transactions` returns.
pub fn create_router(
    pipeline: InsightPipeline,
    store: Arc<dyn TransactionSource>,
    static_dir: Option<&str>,
    config: ServerConfig,
) -> Router {
    let pipeline = pipeline.with_fallback(store.clone());
    let provider = pipeline.provider();
    info!(
        "AI backend: {} at {} (model: {})",
        provider.backend().name(),
        provider.backend().host(),
        provider.model()
    );
    if !provider.is_configured() {
        warn!(
            "⚠️  {} not set; /api/ai-insights will answer with a configuration error",
            smartfinance_core::API_KEY_ENV
        );
    }

    let state = Arc::new(AppState { pipeline, store });

    let api_routes = Router::new()
        .route("/transactions", get(handlers::list_transactions))
        .route("/categories", get(handlers::list_categories))
        .route("/ai-insights", post(handlers::generate_insights))
        .route("/health", get(handlers::health))
        .fallback(api_not_found);

    let mut app = Router::new()
        .nest("/api", api_routes)
        .with_state(state)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config));

    // Serve static files if directory provided
    if let Some(dir) = static_dir {
        app = app.fallback_service(ServeDir::new(dir));
    }

    app
}

fn cors_layer(config: &ServerConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    if config.allowed_origins.is_empty() {
        cors.allow_origin(AnyOrigin)
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        cors.allow_origin(origins)
    }
}

/// Start the server with custom configuration
pub async fn serve_with_config(
    pipeline: InsightPipeline,
    store: Arc<dyn TransactionSource>,
    host: &str,
    port: u16,
    static_dir: Option<&str>,
    config: ServerConfig,
) -> anyhow::Result<()> {
    check_ai_connection(&pipeline).await;

    let app = create_router(pipeline, store, static_dir, config);
    let addr = format!("{}:{}", host, port);

    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Check and log AI backend connection status
async fn check_ai_connection(pipeline: &InsightPipeline) {
    let backend = pipeline.provider().backend();
    if backend.health_check().await {
        info!("✅ AI backend reachable: {}", backend.host());
    } else {
        warn!("⚠️  AI backend not responding: {}", backend.host());
    }
}

async fn api_not_found() -> AppError {
    AppError::not_found("Not found")
}

/// Turn a handler panic into the standard JSON error body
fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let details = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "handler panicked".to_string()
    };
    error!(details = %details, "Handler panicked");

    AppError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        message: INTERNAL_ERROR_MESSAGE.to_string(),
        details: Some(details),
    }
    .into_response()
}

// ============================================================================
// Error Handling
// ============================================================================

/// Application error type with proper HTTP status codes
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
    details: Option<String>,
}

impl AppError {
    pub fn not_found(msg: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: msg.to_string(),
            details: None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = match &self.details {
            Some(details) => serde_json::json!({
                "error": self.message,
                "details": details,
            }),
            None => serde_json::json!({ "error": self.message }),
        };

        (self.status, Json(body)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        let err = err.into();
        error!(error = %err, "Request failed");
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: INTERNAL_ERROR_MESSAGE.to_string(),
            details: Some(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests;

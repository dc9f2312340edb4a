//! Server API tests

use super::*;
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use serde_json::json;
use smartfinance_core::test_utils::MockChatServer;
use smartfinance_core::{
    ApiKey, InsightProvider, InsightSettings, MockBackend, PromptBuilder, StaticTransactions,
};
use tower::ServiceExt;

fn pipeline_with(backend: MockBackend, key: Option<&str>) -> InsightPipeline {
    let provider = InsightProvider::new(backend, key.and_then(ApiKey::new), "gpt-4o-mini");
    InsightPipeline::new(
        PromptBuilder::embedded().unwrap(),
        provider,
        Arc::new(StaticTransactions::sample()),
    )
}

fn app_with(backend: MockBackend, key: Option<&str>) -> Router {
    create_router(
        pipeline_with(backend, key),
        Arc::new(StaticTransactions::sample()),
        None,
        ServerConfig::default(),
    )
}

fn setup_test_app() -> Router {
    app_with(MockBackend::new(), Some("sk-test"))
}

async fn get_body_json(response: axum::response::Response) -> serde_json::Value {
    let body = response.into_body();
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_insights(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/ai-insights")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

// ========== Transactions & Categories ==========

#[tokio::test]
async fn test_list_transactions() {
    let app = setup_test_app();

    let response = app.oneshot(get("/api/transactions")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    let transactions = json.as_array().unwrap();
    assert_eq!(transactions.len(), 4);
    assert_eq!(
        transactions[0],
        json!({
            "id": 1,
            "date": "2025-08-15",
            "description": "Groceries",
            "amount": -45.67,
            "category": "Food"
        })
    );
    assert_eq!(transactions[1]["amount"], json!(2500.0));
}

#[tokio::test]
async fn test_list_categories() {
    let app = setup_test_app();

    let response = app.oneshot(get("/api/categories")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    let categories = json.as_array().unwrap();
    let names: Vec<&str> = categories
        .iter()
        .map(|c| c["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Food", "Income", "Entertainment", "Utilities"]);
    assert_eq!(categories[3]["value"], json!(60.0));
}

// ========== AI Insights ==========

#[tokio::test]
async fn test_insights_end_to_end() {
    let app = app_with(
        MockBackend::with_answer("1. Cook at home\n2. Cancel unused subscriptions"),
        Some("sk-test"),
    );

    let body = r#"{"transactions":[{"id":1,"date":"2025-08-15","description":"Groceries","amount":-45.67,"category":"Food"}]}"#;
    let response = app.oneshot(post_insights(body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(
        json,
        json!({"insights": ["Cook at home", "Cancel unused subscriptions"]})
    );
}

#[tokio::test]
async fn test_insights_without_transactions_uses_store() {
    let backend = MockBackend::new();
    let app = app_with(backend.clone(), Some("sk-test"));

    for body in ["{}", r#"{"transactions": "nope"}"#, r#"{"transactions": []}"#, ""] {
        let response = app.clone().oneshot(post_insights(body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK, "body: {:?}", body);
        let json = get_body_json(response).await;
        assert_eq!(json["insights"].as_array().unwrap().len(), 4);
    }
    assert_eq!(backend.calls(), 4);
}

#[tokio::test]
async fn test_insights_missing_api_key() {
    let backend = MockBackend::new();
    let app = app_with(backend.clone(), None);

    let response = app.oneshot(post_insights("{}")).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let json = get_body_json(response).await;
    assert_eq!(json, json!({"error": "Server misconfigured (no API key)"}));
    assert_eq!(backend.calls(), 0);
}

#[tokio::test]
async fn test_insights_provider_failure() {
    let app = app_with(
        MockBackend::failing(Some(503), "The server is overloaded"),
        Some("sk-test"),
    );

    let response = app.oneshot(post_insights("{}")).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let json = get_body_json(response).await;
    assert_eq!(json["error"], "Failed to get AI insights");
    assert_eq!(json["debug"]["status"], 503);
    assert_eq!(json["debug"]["message"], "The server is overloaded");
}

#[tokio::test]
async fn test_insights_invalid_json_body() {
    let app = setup_test_app();

    let response = app.oneshot(post_insights("{not json")).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let json = get_body_json(response).await;
    assert_eq!(json["error"], "Internal Server Error");
    assert!(json["details"].as_str().unwrap().contains("JSON"));
}

#[tokio::test]
async fn test_insights_malformed_transaction_entry() {
    let app = setup_test_app();

    let response = app
        .oneshot(post_insights(r#"{"transactions": [{"id": "x"}]}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let json = get_body_json(response).await;
    assert_eq!(json["error"], "Internal Server Error");
    assert!(json["details"].is_string());
}

#[tokio::test]
async fn test_insights_over_http_backend() {
    let server = MockChatServer::with_answer("- Cook at home\n- Review subscriptions").await;

    let mut settings = InsightSettings::default();
    settings.base_url = server.url();
    settings.prompts_dir = Some(std::env::temp_dir().join("smartfinance-test-no-overrides"));
    let pipeline = InsightPipeline::from_settings(&settings, Some("sk-test".to_string())).unwrap();
    let app = create_router(
        pipeline,
        Arc::new(StaticTransactions::sample()),
        None,
        ServerConfig::default(),
    );

    let response = app.oneshot(post_insights("{}")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(
        json,
        json!({"insights": ["Cook at home", "Review subscriptions"]})
    );

    let requests = server.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].body.model, "gpt-4o-mini");
    assert!(requests[0].body.messages[0]
        .content
        .contains("2025-08-14 - Salary (Income): $2500"));
}

#[tokio::test]
async fn test_insights_over_http_backend_error() {
    let server = MockChatServer::failing(401, "Incorrect API key provided").await;

    let mut settings = InsightSettings::default();
    settings.base_url = server.url();
    settings.prompts_dir = Some(std::env::temp_dir().join("smartfinance-test-no-overrides"));
    let pipeline = InsightPipeline::from_settings(&settings, Some("sk-bad".to_string())).unwrap();
    let app = create_router(
        pipeline,
        Arc::new(StaticTransactions::sample()),
        None,
        ServerConfig::default(),
    );

    let response = app.oneshot(post_insights("{}")).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = get_body_json(response).await;
    assert_eq!(json["debug"]["status"], 401);
    assert_eq!(json["debug"]["message"], "Incorrect API key provided");
    assert_eq!(json["debug"]["data"]["error"]["type"], "mock_error");
}

// ========== Health & Errors ==========

#[tokio::test]
async fn test_health() {
    let app = app_with(MockBackend::new(), None);

    let response = app.oneshot(get("/api/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(
        json,
        json!({"status": "ok", "backend": "mock", "model": "gpt-4o-mini", "configured": false})
    );
}

#[tokio::test]
async fn test_unknown_api_route_is_json_404() {
    let app = setup_test_app();

    let response = app.oneshot(get("/api/nope")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let json = get_body_json(response).await;
    assert_eq!(json, json!({"error": "Not found"}));
}

#[tokio::test]
async fn test_panic_becomes_json_500() {
    async fn boom() -> &'static str {
        panic!("exploded in handler")
    }

    let app = Router::new()
        .route("/api/boom", axum::routing::get(boom))
        .layer(CatchPanicLayer::custom(handle_panic));

    let response = app.oneshot(get("/api/boom")).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let json = get_body_json(response).await;
    assert_eq!(json["error"], "Internal Server Error");
    assert_eq!(json["details"], "exploded in handler");
}

#[tokio::test]
async fn test_cors_allows_configured_origin() {
    let config = ServerConfig {
        allowed_origins: vec!["http://localhost:3000".to_string()],
    };
    let app = create_router(
        pipeline_with(MockBackend::new(), Some("sk-test")),
        Arc::new(StaticTransactions::sample()),
        None,
        config,
    );

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/transactions")
                .header("origin", "http://localhost:3000")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .unwrap(),
        "http://localhost:3000"
    );
}

#[test]
fn test_parse_origins() {
    assert_eq!(
        parse_origins(" http://a.test, ,http://b.test "),
        vec!["http://a.test", "http://b.test"]
    );
    assert!(parse_origins("").is_empty());
}

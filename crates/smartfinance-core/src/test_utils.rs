//! Test utilities for smartfinance-core
//!
//! Provides a mock OpenAI-compatible chat completions server for wire-level
//! tests of the HTTP backend.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{
    extract::{Json, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde_json::json;
use tokio::sync::oneshot;

use crate::ai::{ChatCompletionRequest, ChatCompletionResponse};

/// How the mock server answers chat completion calls
#[derive(Debug, Clone)]
pub enum MockChatReply {
    /// 200 with a single choice carrying this content
    Answer(String),
    /// Error status with an OpenAI-style `{"error": {"message": ...}}` body
    Error(u16, String),
}

/// Request captured by the mock server
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub authorization: Option<String>,
    pub body: ChatCompletionRequest,
}

#[derive(Clone)]
struct MockState {
    reply: MockChatReply,
    captured: Arc<Mutex<Vec<CapturedRequest>>>,
}

/// Mock chat completions server for testing
pub struct MockChatServer {
    addr: SocketAddr,
    captured: Arc<Mutex<Vec<CapturedRequest>>>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockChatServer {
    /// Start a server that answers every call with `content`
    pub async fn with_answer(content: &str) -> Self {
        Self::start(MockChatReply::Answer(content.to_string())).await
    }

    /// Start a server that fails every call with `status`
    pub async fn failing(status: u16, message: &str) -> Self {
        Self::start(MockChatReply::Error(status, message.to_string())).await
    }

    /// Start the mock server on an available port
    pub async fn start(reply: MockChatReply) -> Self {
        let captured = Arc::new(Mutex::new(Vec::new()));
        let state = MockState {
            reply,
            captured: captured.clone(),
        };

        let app = Router::new()
            .route("/v1/models", get(handle_models))
            .route("/v1/chat/completions", post(handle_chat))
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            captured,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Base URL for this mock server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Requests received so far
    pub fn requests(&self) -> Vec<CapturedRequest> {
        self.captured.lock().unwrap().clone()
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockChatServer {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn handle_models() -> Json<serde_json::Value> {
    Json(json!({
        "object": "list",
        "data": [{"id": "gpt-4o-mini", "object": "model"}]
    }))
}

async fn handle_chat(
    State(state): State<MockState>,
    headers: HeaderMap,
    Json(body): Json<ChatCompletionRequest>,
) -> Response {
    let authorization = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    state
        .captured
        .lock()
        .unwrap()
        .push(CapturedRequest { authorization, body });

    match &state.reply {
        MockChatReply::Answer(content) => {
            Json(ChatCompletionResponse::with_content(content)).into_response()
        }
        MockChatReply::Error(status, message) => {
            let status = StatusCode::from_u16(*status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            (
                status,
                Json(json!({
                    "error": {
                        "message": message,
                        "type": "mock_error",
                        "code": status.as_u16()
                    }
                })),
            )
                .into_response()
        }
    }
}

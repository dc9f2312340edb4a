//! OpenAI-compatible backend implementation
//!
//! Works with the hosted OpenAI API and any server implementing the
//! `/v1/chat/completions` endpoint (vLLM, LocalAI, llama-server, etc.).

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use crate::error::{Error, ProviderFailure, Result};

use super::types::{ChatCompletionRequest, ChatCompletionResponse};
use super::ChatBackend;

/// OpenAI-compatible chat completions backend
#[derive(Clone)]
pub struct OpenAIBackend {
    http_client: Client,
    base_url: String,
}

impl OpenAIBackend {
    /// Create a new backend for the given host
    pub fn new(base_url: &str) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn completions_url(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url)
    }
}

#[async_trait]
impl ChatBackend for OpenAIBackend {
    async fn chat_completion(
        &self,
        api_key: &str,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse> {
        debug!(url = %self.completions_url(), model = %request.model, "Sending chat completion");

        let response = self
            .http_client
            .post(self.completions_url())
            .bearer_auth(api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = match response.text().await {
                Ok(body) => body,
                Err(e) => {
                    debug!(status = status.as_u16(), error = %e, "Failed to read error body");
                    String::new()
                }
            };
            return Err(Error::Provider(failure_from_body(status.as_u16(), &body)));
        }

        Ok(response.json().await?)
    }

    async fn health_check(&self) -> bool {
        // Any HTTP answer means the host is reachable; auth is checked per call
        self.http_client
            .get(format!("{}/v1/models", self.base_url))
            .send()
            .await
            .is_ok()
    }

    fn name(&self) -> &str {
        "openai"
    }

    fn host(&self) -> &str {
        &self.base_url
    }
}

/// Build a failure from a non-success response body
///
/// OpenAI-style bodies look like `{"error": {"message": "...", ...}}`; the
/// nested message becomes the failure message. Non-JSON bodies are kept as
/// raw text in `data`.
fn failure_from_body(status: u16, body: &str) -> ProviderFailure {
    let parsed: Option<Value> = serde_json::from_str(body).ok();

    let message = parsed
        .as_ref()
        .and_then(|v| v.pointer("/error/message"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| format!("Provider returned HTTP {}", status));

    let failure = ProviderFailure::new(Some(status), message);
    match parsed {
        Some(data) => failure.with_data(data),
        None if !body.trim().is_empty() => failure.with_data(Value::String(body.to_string())),
        None => failure,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_backend_new_trims_trailing_slash() {
        let backend = OpenAIBackend::new("https://api.openai.com/");
        assert_eq!(backend.host(), "https://api.openai.com");
        assert_eq!(
            backend.completions_url(),
            "https://api.openai.com/v1/chat/completions"
        );
        assert_eq!(backend.name(), "openai");
    }

    #[test]
    fn test_failure_from_openai_error_body() {
        let body = r#"{"error": {"message": "Incorrect API key provided", "type": "invalid_request_error", "code": "invalid_api_key"}}"#;
        let failure = failure_from_body(401, body);

        assert_eq!(failure.status, Some(401));
        assert_eq!(failure.message, "Incorrect API key provided");
        assert_eq!(
            failure.data.unwrap()["error"]["code"],
            json!("invalid_api_key")
        );
    }

    #[test]
    fn test_failure_from_plain_text_body() {
        let failure = failure_from_body(502, "Bad Gateway");
        assert_eq!(failure.message, "Provider returned HTTP 502");
        assert_eq!(failure.data, Some(json!("Bad Gateway")));
    }

    #[test]
    fn test_failure_from_empty_body() {
        let failure = failure_from_body(500, "");
        assert_eq!(failure.status, Some(500));
        assert!(failure.data.is_none());
    }

    #[tokio::test]
    async fn test_truncated_error_body_keeps_status() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut received = Vec::new();
            let mut buf = [0u8; 1024];
            while !received.ends_with(b"}") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                received.extend_from_slice(&buf[..n]);
            }
            // Promise more body than is sent, then hang up
            socket
                .write_all(b"HTTP/1.1 500 Internal Server Error\r\ncontent-length: 100\r\n\r\npartial")
                .await
                .unwrap();
        });

        let backend = OpenAIBackend::new(&format!("http://{}", addr));
        let request = ChatCompletionRequest::single_user("gpt-4o-mini", "hi");

        match backend.chat_completion("sk-test", &request).await {
            Err(Error::Provider(failure)) => {
                assert_eq!(failure.status, Some(500));
                assert_eq!(failure.message, "Provider returned HTTP 500");
                assert!(failure.data.is_none());
            }
            other => panic!("expected provider error, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn test_unreachable_host_is_provider_error() {
        let backend = OpenAIBackend::new("http://127.0.0.1:1");
        let request = ChatCompletionRequest::single_user("gpt-4o-mini", "hi");

        let result = backend.chat_completion("sk-test", &request).await;
        match result {
            Err(Error::Provider(failure)) => assert!(failure.status.is_none()),
            other => panic!("expected provider error, got {:?}", other.map(|_| ())),
        }
        assert!(!backend.health_check().await);
    }
}

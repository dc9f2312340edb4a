//! Pluggable chat-completion backend abstraction
//!
//! # Architecture
//!
//! - `ChatBackend` trait: one chat completion call, plus identity/health
//! - `AIClient` enum: concrete wrapper providing Clone + compile-time dispatch
//! - Backend implementations: `OpenAIBackend`, `MockBackend`
//! - `InsightProvider`: credential precondition, timeout, retry and answer
//!   extraction on top of any backend
//!
//! # Usage
//!
//! ```rust,ignore
//! let settings = InsightSettings::load(None)?;
//! let provider = InsightProvider::from_settings(&settings, api_key_from_env());
//! let answer = provider.fetch_answer("Analyze these transactions...").await?;
//! ```

mod mock;
mod openai;
pub mod provider;
pub mod types;

pub use mock::{MockBackend, MockReply, DEFAULT_MOCK_ANSWER};
pub use openai::OpenAIBackend;
pub use provider::{ApiKey, InsightProvider, RetryPolicy, NO_INSIGHTS_FALLBACK};
pub use types::*;

use async_trait::async_trait;

use crate::error::Result;
use crate::settings::{BackendKind, InsightSettings};

/// Trait implemented by every chat backend
///
/// Backends only speak the wire protocol. Credential checks, timeouts and
/// retries live in `InsightProvider`.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Perform one non-streaming chat completion
    async fn chat_completion(
        &self,
        api_key: &str,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse>;

    /// Check if the backend host is reachable
    async fn health_check(&self) -> bool;

    /// Short backend name (for logging and health output)
    fn name(&self) -> &str;

    /// Host URL (for logging)
    fn host(&self) -> &str;
}

/// Concrete AI client enum
#[derive(Clone)]
pub enum AIClient {
    /// OpenAI or any OpenAI-compatible server
    OpenAI(OpenAIBackend),
    /// Mock backend for testing
    Mock(MockBackend),
}

impl AIClient {
    /// Create the client selected by the settings
    pub fn from_settings(settings: &InsightSettings) -> Self {
        match settings.backend {
            BackendKind::OpenAI => AIClient::OpenAI(OpenAIBackend::new(&settings.base_url)),
            BackendKind::Mock => AIClient::Mock(MockBackend::new()),
        }
    }

    /// Create a mock client for testing
    pub fn mock() -> Self {
        AIClient::Mock(MockBackend::new())
    }
}

impl From<MockBackend> for AIClient {
    fn from(backend: MockBackend) -> Self {
        AIClient::Mock(backend)
    }
}

impl From<OpenAIBackend> for AIClient {
    fn from(backend: OpenAIBackend) -> Self {
        AIClient::OpenAI(backend)
    }
}

#[async_trait]
impl ChatBackend for AIClient {
    async fn chat_completion(
        &self,
        api_key: &str,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse> {
        match self {
            AIClient::OpenAI(b) => b.chat_completion(api_key, request).await,
            AIClient::Mock(b) => b.chat_completion(api_key, request).await,
        }
    }

    async fn health_check(&self) -> bool {
        match self {
            AIClient::OpenAI(b) => b.health_check().await,
            AIClient::Mock(b) => b.health_check().await,
        }
    }

    fn name(&self) -> &str {
        match self {
            AIClient::OpenAI(b) => b.name(),
            AIClient::Mock(b) => b.name(),
        }
    }

    fn host(&self) -> &str {
        match self {
            AIClient::OpenAI(b) => b.host(),
            AIClient::Mock(b) => b.host(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ai_client_mock() {
        let client = AIClient::mock();
        assert_eq!(client.name(), "mock");
        assert_eq!(client.host(), "mock://localhost");
    }

    #[test]
    fn test_client_from_settings() {
        let mut settings = InsightSettings::default();
        settings.base_url = "http://localhost:8080".to_string();
        let client = AIClient::from_settings(&settings);
        assert_eq!(client.name(), "openai");
        assert_eq!(client.host(), "http://localhost:8080");

        settings.backend = BackendKind::Mock;
        assert_eq!(AIClient::from_settings(&settings).name(), "mock");
    }

    #[tokio::test]
    async fn test_mock_health_check() {
        let client = AIClient::mock();
        assert!(client.health_check().await);
    }
}

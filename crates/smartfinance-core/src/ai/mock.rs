//! Mock backend for testing
//!
//! Replays a script of canned replies without touching the network.
//! Useful for unit tests and for running the server without a provider
//! account (`AI_BACKEND=mock`).

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{Error, ProviderFailure, Result};

use super::types::{ChatCompletionRequest, ChatCompletionResponse};
use super::ChatBackend;

/// Answer returned when no script is configured
pub const DEFAULT_MOCK_ANSWER: &str = "1. **Cook at home** a few more nights a week to cut grocery and dining spend.\n\
2. Review streaming subscriptions and cancel the ones you rarely use.\n\
3. Compare electricity plans or shift heavy usage to off-peak hours.\n\
4. Move a fixed share of each paycheck into savings as soon as it arrives.";

/// One scripted reply
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Successful response whose first choice has this content (None = no content)
    Content(Option<String>),
    /// Provider failure
    Failure(ProviderFailure),
    /// Wait before answering with the inner reply
    Delayed(Duration, Box<MockReply>),
}

/// Mock chat backend
///
/// Replies are consumed in order; the last one repeats once the script runs
/// out. Clones share the call counter.
#[derive(Clone)]
pub struct MockBackend {
    script: Arc<Vec<MockReply>>,
    calls: Arc<AtomicUsize>,
}

impl MockBackend {
    /// Mock that always answers with the default insight list
    pub fn new() -> Self {
        Self::with_answer(DEFAULT_MOCK_ANSWER)
    }

    /// Mock that always answers with the given text
    pub fn with_answer(answer: &str) -> Self {
        Self::scripted(vec![MockReply::Content(Some(answer.to_string()))])
    }

    /// Mock that always fails with the given status
    pub fn failing(status: Option<u16>, message: &str) -> Self {
        Self::scripted(vec![MockReply::Failure(ProviderFailure::new(
            status, message,
        ))])
    }

    /// Mock that replays the given replies in order
    pub fn scripted(script: Vec<MockReply>) -> Self {
        Self {
            script: Arc::new(script),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Number of chat completion calls received so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn reply_for(&self, call: usize) -> Option<&MockReply> {
        self.script.get(call).or_else(|| self.script.last())
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

async fn play(reply: &MockReply) -> Result<ChatCompletionResponse> {
    let mut reply = reply;
    loop {
        match reply {
            MockReply::Content(Some(content)) => {
                return Ok(ChatCompletionResponse::with_content(content))
            }
            MockReply::Content(None) => return Ok(ChatCompletionResponse::default()),
            MockReply::Failure(failure) => return Err(Error::Provider(failure.clone())),
            MockReply::Delayed(delay, inner) => {
                tokio::time::sleep(*delay).await;
                reply = inner.as_ref();
            }
        }
    }
}

#[async_trait]
impl ChatBackend for MockBackend {
    async fn chat_completion(
        &self,
        _api_key: &str,
        _request: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        match self.reply_for(call) {
            Some(reply) => play(reply).await,
            None => Ok(ChatCompletionResponse::default()),
        }
    }

    async fn health_check(&self) -> bool {
        true
    }

    fn name(&self) -> &str {
        "mock"
    }

    fn host(&self) -> &str {
        "mock://localhost"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> ChatCompletionRequest {
        ChatCompletionRequest::single_user("mock", "prompt")
    }

    #[tokio::test]
    async fn test_default_answer() {
        let backend = MockBackend::new();
        let response = backend.chat_completion("key", &request()).await.unwrap();
        assert_eq!(response.first_content(), Some(DEFAULT_MOCK_ANSWER));
        assert_eq!(backend.calls(), 1);
    }

    #[tokio::test]
    async fn test_script_replays_in_order_then_repeats_last() {
        let backend = MockBackend::scripted(vec![
            MockReply::Failure(ProviderFailure::new(Some(503), "overloaded")),
            MockReply::Content(Some("ok".into())),
        ]);

        assert!(backend.chat_completion("key", &request()).await.is_err());
        for _ in 0..2 {
            let response = backend.chat_completion("key", &request()).await.unwrap();
            assert_eq!(response.first_content(), Some("ok"));
        }
        assert_eq!(backend.calls(), 3);
    }

    #[tokio::test]
    async fn test_clones_share_call_counter() {
        let backend = MockBackend::new();
        let clone = backend.clone();
        clone.chat_completion("key", &request()).await.unwrap();
        assert_eq!(backend.calls(), 1);
    }

    #[tokio::test]
    async fn test_empty_script_returns_empty_response() {
        let backend = MockBackend::scripted(vec![]);
        let response = backend.chat_completion("key", &request()).await.unwrap();
        assert_eq!(response.first_content(), None);
    }

    #[tokio::test]
    async fn test_failing_mock() {
        let backend = MockBackend::failing(Some(429), "rate limited");
        match backend.chat_completion("key", &request()).await {
            Err(Error::Provider(failure)) => assert_eq!(failure.status, Some(429)),
            other => panic!("expected provider error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_mock_identity() {
        let backend = MockBackend::new();
        assert_eq!(backend.name(), "mock");
        assert_eq!(backend.host(), "mock://localhost");
    }
}

//! Insight provider: the guarded provider call
//!
//! Wraps a chat backend with the rules every insight request follows:
//! - the credential must be present before anything touches the network
//! - every attempt is bounded by a timeout
//! - 429/5xx failures may be retried with exponential backoff
//! - a well-formed answer without content becomes `NO_INSIGHTS_FALLBACK`

use std::fmt;
use std::time::Duration;

use tracing::{debug, error, warn};

use crate::error::{Error, ProviderFailure, Result};
use crate::settings::InsightSettings;

use super::types::{ChatCompletionRequest, ChatCompletionResponse};
use super::{AIClient, ChatBackend};

/// Answer used when the provider returns no usable content
pub const NO_INSIGHTS_FALLBACK: &str = "No insights generated.";

/// Upper bound for a single backoff delay
const MAX_BACKOFF: Duration = Duration::from_secs(8);

/// Provider credential
///
/// Debug output never shows the key.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Returns None for blank keys
    pub fn new(key: impl Into<String>) -> Option<Self> {
        let key = key.into();
        if key.trim().is_empty() {
            None
        } else {
            Some(Self(key))
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(****)")
    }
}

/// Retry behaviour for transient provider failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Additional attempts after the first (0 = single attempt)
    pub max_retries: u32,
    pub initial_backoff: Duration,
}

impl RetryPolicy {
    /// Single attempt, no retries
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            initial_backoff: Duration::ZERO,
        }
    }

    pub fn should_retry(&self, failure: &ProviderFailure, retries_done: u32) -> bool {
        retries_done < self.max_retries && failure.is_transient()
    }

    /// Delay before retry number `retries_done + 1`
    pub fn backoff(&self, retries_done: u32) -> Duration {
        let factor = 2u32.saturating_pow(retries_done);
        self.initial_backoff.saturating_mul(factor).min(MAX_BACKOFF)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::none()
    }
}

/// Guarded provider call
#[derive(Clone)]
pub struct InsightProvider {
    backend: AIClient,
    api_key: Option<ApiKey>,
    model: String,
    timeout: Duration,
    retry: RetryPolicy,
}

impl InsightProvider {
    pub fn new(backend: impl Into<AIClient>, api_key: Option<ApiKey>, model: &str) -> Self {
        Self {
            backend: backend.into(),
            api_key,
            model: model.to_string(),
            timeout: Duration::from_secs(30),
            retry: RetryPolicy::none(),
        }
    }

    /// Build from resolved settings and an optional credential
    pub fn from_settings(settings: &InsightSettings, api_key: Option<String>) -> Self {
        Self::new(
            AIClient::from_settings(settings),
            api_key.and_then(ApiKey::new),
            &settings.model,
        )
        .with_timeout(settings.timeout)
        .with_retry(RetryPolicy {
            max_retries: settings.max_retries,
            initial_backoff: settings.initial_backoff,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn backend(&self) -> &AIClient {
        &self.backend
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Whether a credential is configured
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Send the prompt and return the provider's raw answer text
    pub async fn fetch_answer(&self, prompt: &str) -> Result<String> {
        let Some(api_key) = self.api_key.as_ref() else {
            error!("Provider credential missing, refusing to call {}", self.backend.name());
            return Err(Error::Configuration(format!(
                "{} is not set",
                crate::settings::API_KEY_ENV
            )));
        };

        let request = ChatCompletionRequest::single_user(&self.model, prompt);
        let mut retries_done = 0;

        loop {
            match self.attempt(api_key, &request).await {
                Ok(response) => return Ok(extract_answer(&response)),
                Err(Error::Provider(failure)) if self.retry.should_retry(&failure, retries_done) => {
                    let delay = self.retry.backoff(retries_done);
                    warn!(
                        status = ?failure.status,
                        retry = retries_done + 1,
                        delay_ms = delay.as_millis() as u64,
                        "Transient provider failure, retrying: {}",
                        failure.message
                    );
                    tokio::time::sleep(delay).await;
                    retries_done += 1;
                }
                Err(e) => {
                    error!(error = %e, backend = self.backend.name(), model = %self.model, "Provider call failed");
                    return Err(e);
                }
            }
        }
    }

    async fn attempt(
        &self,
        api_key: &ApiKey,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse> {
        debug!(backend = self.backend.name(), model = %self.model, "Calling provider");
        match tokio::time::timeout(
            self.timeout,
            self.backend.chat_completion(api_key.expose(), request),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(Error::Provider(ProviderFailure::timeout(self.timeout))),
        }
    }
}

fn extract_answer(response: &ChatCompletionResponse) -> String {
    response
        .first_content()
        .unwrap_or(NO_INSIGHTS_FALLBACK)
        .to_string()
}

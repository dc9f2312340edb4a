//! Error types for SmartFinance

use std::fmt;
use std::time::Duration;

use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Required configuration (the provider credential) is missing.
    /// Raised before any network call is attempted.
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Provider error: {0}")]
    Provider(ProviderFailure),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Details of a failed provider call
///
/// Carries whatever the provider (or the transport) told us, so operators
/// can see it in the `debug` block of the error response.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderFailure {
    /// HTTP status returned by the provider, if the call got that far
    pub status: Option<u16>,
    /// Short human-readable description
    pub message: String,
    /// Provider-supplied diagnostic payload (parsed JSON body or raw text)
    pub data: Option<Value>,
}

impl ProviderFailure {
    pub fn new(status: Option<u16>, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            data: None,
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Failure produced when a provider call exceeds its time budget
    pub fn timeout(after: Duration) -> Self {
        Self::new(
            None,
            format!("Provider call timed out after {}ms", after.as_millis()),
        )
    }

    /// 429 and 5xx are transient; everything else is final
    pub fn is_transient(&self) -> bool {
        matches!(self.status, Some(429) | Some(500..=599))
    }
}

impl fmt::Display for ProviderFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "{} (status {})", self.message, status),
            None => write!(f, "{}", self.message),
        }
    }
}

impl From<ProviderFailure> for Error {
    fn from(failure: ProviderFailure) -> Self {
        Error::Provider(failure)
    }
}

// Transport errors are always provider failures from the pipeline's point of view
impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        let status = err.status().map(|s| s.as_u16());
        Error::Provider(ProviderFailure::new(status, err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_statuses() {
        assert!(ProviderFailure::new(Some(429), "slow down").is_transient());
        assert!(ProviderFailure::new(Some(500), "boom").is_transient());
        assert!(ProviderFailure::new(Some(503), "unavailable").is_transient());
        assert!(!ProviderFailure::new(Some(400), "bad request").is_transient());
        assert!(!ProviderFailure::new(Some(401), "unauthorized").is_transient());
        assert!(!ProviderFailure::new(None, "connection refused").is_transient());
    }

    #[test]
    fn test_display_includes_status() {
        let failure = ProviderFailure::new(Some(401), "Incorrect API key provided");
        assert_eq!(failure.to_string(), "Incorrect API key provided (status 401)");

        let err = Error::from(ProviderFailure::timeout(Duration::from_millis(250)));
        assert_eq!(
            err.to_string(),
            "Provider error: Provider call timed out after 250ms"
        );
    }
}

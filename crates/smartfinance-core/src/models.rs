//! Data models for SmartFinance

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::{Error, ProviderFailure, Result};

/// A single dated financial event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique within one input set
    pub id: i64,
    #[serde(deserialize_with = "deserialize_date")]
    pub date: NaiveDate,
    pub description: String,
    /// Negative = expense, positive = income
    pub amount: f64,
    /// Pre-assigned category label
    pub category: String,
}

impl Transaction {
    pub fn is_expense(&self) -> bool {
        self.amount < 0.0
    }
}

/// Parse a transaction date
///
/// Accepts `YYYY-MM-DD` or an RFC 3339 timestamp, which keeps its calendar
/// date in its own offset.
pub fn parse_date(raw: &str) -> std::result::Result<NaiveDate, String> {
    let trimmed = raw.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .or_else(|_| DateTime::parse_from_rfc3339(trimmed).map(|dt| dt.date_naive()))
        .map_err(|_| format!("invalid date `{}`, expected YYYY-MM-DD", raw))
}

fn deserialize_date<'de, D>(deserializer: D) -> std::result::Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_date(&raw).map_err(serde::de::Error::custom)
}

/// Per-category magnitude used for the breakdown chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryAggregate {
    pub name: String,
    /// Sum of absolute amounts, never negative
    pub value: f64,
}

/// Body of `POST /api/ai-insights`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InsightRequest {
    /// None when the caller sent nothing usable; the pipeline falls back
    /// to its default transaction source
    pub transactions: Option<Vec<Transaction>>,
}

impl InsightRequest {
    pub fn new(transactions: Vec<Transaction>) -> Self {
        Self {
            transactions: Some(transactions),
        }
    }

    /// Parse a raw request body
    ///
    /// An empty body is an empty request. Anything else must be JSON.
    pub fn from_slice(body: &[u8]) -> Result<Self> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        let value: Value = serde_json::from_slice(body)?;
        Self::from_value(value)
    }

    /// Interpret an already-decoded JSON body
    ///
    /// A missing or non-array `transactions` field is not an error: it yields
    /// a request without transactions. An array whose entries are not valid
    /// transactions is rejected.
    pub fn from_value(value: Value) -> Result<Self> {
        let Value::Object(mut body) = value else {
            tracing::debug!("Insight request body is not an object, using default transactions");
            return Ok(Self::default());
        };

        match body.remove("transactions") {
            Some(list @ Value::Array(_)) => {
                let transactions: Vec<Transaction> = serde_json::from_value(list)
                    .map_err(|e| Error::InvalidData(format!("Invalid transaction list: {}", e)))?;
                Ok(Self::new(transactions))
            }
            Some(other) => {
                tracing::debug!(
                    kind = json_kind(&other),
                    "Insight request transactions are not a list, using default transactions"
                );
                Ok(Self::default())
            }
            None => Ok(Self::default()),
        }
    }
}

/// Outcome of one insight request, in the shape sent over HTTP
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum InsightResponse {
    Success {
        insights: Vec<String>,
    },
    Failure {
        error: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        debug: Option<InsightDebug>,
    },
}

/// Operator-facing detail attached to provider failures
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InsightDebug {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl From<&ProviderFailure> for InsightDebug {
    fn from(failure: &ProviderFailure) -> Self {
        Self {
            status: failure.status,
            message: Some(failure.message.clone()),
            data: failure.data.clone(),
        }
    }
}

/// Message shown when the provider credential is missing
pub const MISCONFIGURED_MESSAGE: &str = "Server misconfigured (no API key)";

/// Message shown when the provider call fails
pub const PROVIDER_FAILED_MESSAGE: &str = "Failed to get AI insights";

impl InsightResponse {
    pub fn success(insights: Vec<String>) -> Self {
        InsightResponse::Success { insights }
    }

    /// Map a pipeline error to its user-visible response
    ///
    /// Configuration errors never carry debug detail so the credential
    /// state is not echoed back to the caller.
    pub fn from_error(err: &Error) -> Self {
        match err {
            Error::Configuration(_) => InsightResponse::Failure {
                error: MISCONFIGURED_MESSAGE.to_string(),
                debug: None,
            },
            Error::Provider(failure) => InsightResponse::Failure {
                error: PROVIDER_FAILED_MESSAGE.to_string(),
                debug: Some(InsightDebug::from(failure)),
            },
            other => InsightResponse::Failure {
                error: PROVIDER_FAILED_MESSAGE.to_string(),
                debug: Some(InsightDebug {
                    status: None,
                    message: Some(other.to_string()),
                    data: None,
                }),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, InsightResponse::Success { .. })
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

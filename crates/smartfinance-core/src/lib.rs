//! SmartFinance Core Library
//!
//! Shared functionality for the SmartFinance insight service:
//! - Transaction model and read-only transaction sources (built-in, JSON, CSV)
//! - Category aggregation for the breakdown chart
//! - Prompt library and prompt builder for savings analysis
//! - Pluggable chat-completion backends (OpenAI-compatible, mock)
//! - Answer normalization into stable insight lists
//! - Layered settings (embedded TOML, override file, environment)

pub mod ai;
pub mod error;
pub mod insights;
pub mod models;
pub mod prompts;
pub mod settings;
pub mod source;

/// Test utilities including a mock chat completions server
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use ai::{
    AIClient, ApiKey, ChatBackend, InsightProvider, MockBackend, MockReply, OpenAIBackend,
    RetryPolicy, NO_INSIGHTS_FALLBACK,
};
pub use error::{Error, ProviderFailure, Result};
pub use insights::{
    category_breakdown, emphasis_to_html, InsightPipeline, PipelineStage, PromptBuilder,
    ProviderPayload,
};
pub use models::{
    parse_date, CategoryAggregate, InsightDebug, InsightRequest, InsightResponse, Transaction,
};
pub use prompts::{Prompt, PromptId, PromptLibrary};
pub use settings::{api_key_from_env, BackendKind, InsightSettings, API_KEY_ENV};
pub use source::{StaticTransactions, TransactionSource};

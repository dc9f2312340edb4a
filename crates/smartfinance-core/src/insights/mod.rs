//! Insight generation
//!
//! - **aggregate** - per-category totals for charts and prompt summaries
//! - **prompt** - transaction list to provider prompt
//! - **normalize** - provider answer to insight items
//! - **pipeline** - the three stages composed around the provider call
//!
//! ## Usage
//!
//! ```rust,ignore
//! use smartfinance_core::insights::InsightPipeline;
//!
//! let pipeline = InsightPipeline::from_settings(&settings, api_key_from_env())?;
//! let response = pipeline.respond(&InsightRequest::default()).await;
//! ```

pub mod aggregate;
pub mod normalize;
pub mod pipeline;
pub mod prompt;

pub use aggregate::{breakdown_total, category_breakdown};
pub use normalize::{emphasis_to_html, normalize_text, strip_list_marker, ProviderPayload};
pub use pipeline::{InsightPipeline, PipelineStage};
pub use prompt::{format_transaction_line, PromptBuilder, DEFAULT_MAX_LINES};

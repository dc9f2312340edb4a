//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `insights` - Prompt preview and insight requests
//! - `serve` - Web server command
//! - `transactions` - Transaction listing and category breakdown
//!
//! Shared helpers for loading settings, the transaction store and the
//! pipeline live here.

pub mod insights;
pub mod serve;
pub mod transactions;

// Re-export command functions for main.rs
pub use insights::*;
pub use serve::*;
pub use transactions::*;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use smartfinance_core::{api_key_from_env, InsightPipeline, InsightSettings, StaticTransactions};

/// Resolve settings from the config file layers and the environment
pub fn load_settings(config: Option<&Path>) -> Result<InsightSettings> {
    InsightSettings::load(config).context("Failed to load insight settings")
}

/// Load the transaction store (file if given, otherwise the built-in sample)
pub fn load_store(path: Option<&Path>) -> Result<Arc<StaticTransactions>> {
    let store = match path {
        Some(path) => StaticTransactions::from_path(path)
            .with_context(|| format!("Failed to load transactions from {}", path.display()))?,
        None => StaticTransactions::sample(),
    };
    Ok(Arc::new(store))
}

/// Build the insight pipeline with `store` as its fallback source
pub fn build_pipeline(
    settings: &InsightSettings,
    store: Arc<StaticTransactions>,
) -> Result<InsightPipeline> {
    let pipeline = InsightPipeline::from_settings(settings, api_key_from_env())
        .context("Failed to build insight pipeline")?;
    Ok(pipeline.with_fallback(store))
}

/// Truncate a string to a maximum length, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

//! End-to-end insight generation
//!
//! One request walks through
//! `Idle -> BuildingPrompt -> AwaitingProvider -> Normalizing -> Succeeded | Failed`.
//! The pipeline holds only read-only configuration, so a single instance
//! is shared by every concurrent request.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::ai::InsightProvider;
use crate::error::Result;
use crate::models::{InsightRequest, InsightResponse, Transaction};
use crate::prompts::PromptLibrary;
use crate::settings::InsightSettings;
use crate::source::{StaticTransactions, TransactionSource};

use super::normalize::ProviderPayload;
use super::prompt::PromptBuilder;

/// Stage of a single insight request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Idle,
    BuildingPrompt,
    AwaitingProvider,
    Normalizing,
    Succeeded,
    Failed,
}

impl PipelineStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::BuildingPrompt => "building_prompt",
            Self::AwaitingProvider => "awaiting_provider",
            Self::Normalizing => "normalizing",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        }
    }
}

fn enter(stage: PipelineStage) {
    debug!(stage = stage.as_str(), "Insight pipeline stage");
}

/// Composes prompt building, the provider call and normalization
#[derive(Clone)]
pub struct InsightPipeline {
    prompts: PromptBuilder,
    provider: InsightProvider,
    fallback: Arc<dyn TransactionSource>,
}

impl InsightPipeline {
    pub fn new(
        prompts: PromptBuilder,
        provider: InsightProvider,
        fallback: Arc<dyn TransactionSource>,
    ) -> Self {
        Self {
            prompts,
            provider,
            fallback,
        }
    }

    /// Wire a pipeline from settings
    ///
    /// Uses the built-in sample transactions as fallback; swap it with
    /// [`InsightPipeline::with_fallback`].
    pub fn from_settings(settings: &InsightSettings, api_key: Option<String>) -> Result<Self> {
        let library = match &settings.prompts_dir {
            Some(dir) => PromptLibrary::with_override_dir(dir.clone()),
            None => PromptLibrary::new(),
        };
        let prompts = PromptBuilder::from_library(&library)?.with_max_lines(settings.prompt_max_lines);
        let provider = InsightProvider::from_settings(settings, api_key);

        Ok(Self::new(
            prompts,
            provider,
            Arc::new(StaticTransactions::sample()),
        ))
    }

    pub fn with_fallback(mut self, fallback: Arc<dyn TransactionSource>) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn provider(&self) -> &InsightProvider {
        &self.provider
    }

    pub fn prompts(&self) -> &PromptBuilder {
        &self.prompts
    }

    /// Transactions the request will be analyzed with
    ///
    /// Missing or empty lists fall back to the default source.
    pub fn resolve_transactions(&self, request: &InsightRequest) -> Vec<Transaction> {
        match &request.transactions {
            Some(list) if !list.is_empty() => list.clone(),
            _ => {
                debug!("No transactions in request, using default source");
                self.fallback.fetch_transactions()
            }
        }
    }

    /// Render the prompt a request would send
    pub fn prompt_for(&self, request: &InsightRequest) -> String {
        self.prompts.build(&self.resolve_transactions(request))
    }

    /// Run one request and return the normalized insight items
    pub async fn generate(&self, request: &InsightRequest) -> Result<Vec<String>> {
        enter(PipelineStage::Idle);
        let transactions = self.resolve_transactions(request);

        enter(PipelineStage::BuildingPrompt);
        let prompt = self.prompts.build(&transactions);
        debug!(
            transactions = transactions.len(),
            prompt_chars = prompt.len(),
            "Built insight prompt"
        );

        enter(PipelineStage::AwaitingProvider);
        let answer = match self.provider.fetch_answer(&prompt).await {
            Ok(answer) => answer,
            Err(e) => {
                enter(PipelineStage::Failed);
                return Err(e);
            }
        };

        enter(PipelineStage::Normalizing);
        let insights = ProviderPayload::from_answer(&answer).normalize();
        if insights.is_empty() {
            warn!("Provider answer normalized to no insights");
        }

        enter(PipelineStage::Succeeded);
        info!(
            transactions = transactions.len(),
            insights = insights.len(),
            "Generated insights"
        );
        Ok(insights)
    }

    /// Run one request and shape the outcome for the HTTP boundary
    pub async fn respond(&self, request: &InsightRequest) -> InsightResponse {
        match self.generate(request).await {
            Ok(insights) => InsightResponse::success(insights),
            Err(e) => InsightResponse::from_error(&e),
        }
    }
}

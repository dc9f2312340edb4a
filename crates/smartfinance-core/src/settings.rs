//! Insight pipeline settings
//!
//! Settings are resolved in three layers:
//! 1. Embedded defaults (`config/insights.toml`, compiled into binary)
//! 2. Override file (~/.local/share/smartfinance/config/insights.toml, or an explicit path)
//! 3. Environment variables
//!
//! The provider credential is never read from a file: it comes from
//! `OPENAI_API_KEY` only.
//!
//! Environment variables:
//! - `AI_BACKEND`: openai (default) or mock
//! - `OPENAI_BASE_URL`: chat completions host (default: https://api.openai.com)
//! - `OPENAI_MODEL`: model name (default: gpt-4o-mini)
//! - `SMARTFINANCE_TIMEOUT_SECS`: per-call timeout
//! - `SMARTFINANCE_MAX_RETRIES`: retries for 429/5xx responses
//! - `SMARTFINANCE_PROMPT_MAX_LINES`: transaction line cap (0 = unlimited)
//! - `SMARTFINANCE_PROMPTS_DIR`: prompt override directory

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::{Error, Result};

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/insights.toml");

/// Environment variable holding the provider credential
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Which chat backend serves provider calls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// Any OpenAI-compatible chat completions API
    OpenAI,
    /// Canned answers, no network
    Mock,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAI => "openai",
            Self::Mock => "mock",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "openai" | "openai_compatible" => Some(Self::OpenAI),
            "mock" => Some(Self::Mock),
            _ => None,
        }
    }
}

/// Resolved settings for one process
#[derive(Debug, Clone)]
pub struct InsightSettings {
    pub backend: BackendKind,
    pub base_url: String,
    pub model: String,
    /// Upper bound for a single provider attempt
    pub timeout: Duration,
    /// Retries for transient (429/5xx) failures
    pub max_retries: u32,
    /// First backoff delay; doubles on each retry
    pub initial_backoff: Duration,
    /// Transaction line cap for prompts (0 = unlimited)
    pub prompt_max_lines: usize,
    /// Prompt override directory (None = platform default)
    pub prompts_dir: Option<PathBuf>,
}

impl Default for InsightSettings {
    fn default() -> Self {
        Self {
            backend: BackendKind::OpenAI,
            base_url: "https://api.openai.com".to_string(),
            model: "gpt-4o-mini".to_string(),
            timeout: Duration::from_secs(30),
            max_retries: 0,
            initial_backoff: Duration::from_millis(500),
            prompt_max_lines: 200,
            prompts_dir: None,
        }
    }
}

impl InsightSettings {
    /// Load settings from file layers and the process environment
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut settings = load_file(config_path)?;
        settings.apply_overrides(|key| std::env::var(key).ok());
        Ok(settings)
    }

    /// Apply environment-style overrides from a lookup function
    ///
    /// Unparseable values are ignored with a warning.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(backend) = get("AI_BACKEND") {
            match BackendKind::parse(&backend) {
                Some(kind) => self.backend = kind,
                None => {
                    tracing::warn!(backend = %backend, "Unknown AI_BACKEND, keeping {}", self.backend.as_str())
                }
            }
        }
        if let Some(url) = get("OPENAI_BASE_URL") {
            self.base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(model) = get("OPENAI_MODEL") {
            self.model = model;
        }
        match parse_var::<u64>(&get, "SMARTFINANCE_TIMEOUT_SECS") {
            Some(0) => tracing::warn!(
                key = "SMARTFINANCE_TIMEOUT_SECS",
                "Ignoring zero timeout, keeping {}s",
                self.timeout.as_secs()
            ),
            Some(secs) => self.timeout = Duration::from_secs(secs),
            None => {}
        }
        if let Some(retries) = parse_var::<u32>(&get, "SMARTFINANCE_MAX_RETRIES") {
            self.max_retries = retries;
        }
        if let Some(lines) = parse_var::<usize>(&get, "SMARTFINANCE_PROMPT_MAX_LINES") {
            self.prompt_max_lines = lines;
        }
        if let Some(dir) = get("SMARTFINANCE_PROMPTS_DIR") {
            self.prompts_dir = Some(PathBuf::from(dir));
        }
    }
}

/// Read the provider credential from the environment
///
/// Blank values count as missing.
pub fn api_key_from_env() -> Option<String> {
    std::env::var(API_KEY_ENV)
        .ok()
        .filter(|key| !key.trim().is_empty())
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("smartfinance").join("config").join("insights.toml"))
}

fn parse_var<T: std::str::FromStr>(get: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = get(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(key, value = %raw, "Ignoring unparseable setting");
            None
        }
    }
}

/// Load configuration (explicit path, then default override, then embedded)
fn load_file(explicit: Option<&Path>) -> Result<InsightSettings> {
    let content = match explicit {
        Some(path) => fs::read_to_string(path).map_err(|e| {
            Error::InvalidData(format!("Failed to read config {}: {}", path.display(), e))
        })?,
        None => match default_config_path() {
            Some(path) if path.exists() => fs::read_to_string(&path)
                .map_err(|e| Error::InvalidData(format!("Failed to read config: {}", e)))?,
            _ => DEFAULT_CONFIG.to_string(),
        },
    };

    parse_config(&content)
}

/// Raw config structure for TOML parsing
#[derive(Debug, Deserialize)]
struct RawConfig {
    provider: Option<RawProvider>,
    prompt: Option<RawPrompt>,
}

#[derive(Debug, Deserialize)]
struct RawProvider {
    backend: Option<String>,
    base_url: Option<String>,
    model: Option<String>,
    timeout_secs: Option<u64>,
    max_retries: Option<u32>,
    initial_backoff_ms: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct RawPrompt {
    max_lines: Option<usize>,
    overrides_dir: Option<PathBuf>,
}

/// Parse config from TOML content
fn parse_config(content: &str) -> Result<InsightSettings> {
    let raw: RawConfig = toml::from_str(content)
        .map_err(|e| Error::InvalidData(format!("Invalid config TOML: {}", e)))?;

    let mut settings = InsightSettings::default();

    if let Some(provider) = raw.provider {
        if let Some(backend) = provider.backend {
            settings.backend = BackendKind::parse(&backend)
                .ok_or_else(|| Error::InvalidData(format!("Unknown backend: {}", backend)))?;
        }
        if let Some(url) = provider.base_url {
            settings.base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(model) = provider.model {
            settings.model = model;
        }
        if let Some(timeout) = provider.timeout_secs {
            if timeout == 0 {
                return Err(Error::InvalidData(
                    "provider.timeout_secs must be greater than zero".to_string(),
                ));
            }
            settings.timeout = Duration::from_secs(timeout);
        }
        if let Some(retries) = provider.max_retries {
            settings.max_retries = retries;
        }
        if let Some(backoff) = provider.initial_backoff_ms {
            settings.initial_backoff = Duration::from_millis(backoff);
        }
    }

    if let Some(prompt) = raw.prompt {
        if let Some(lines) = prompt.max_lines {
            settings.prompt_max_lines = lines;
        }
        settings.prompts_dir = prompt.overrides_dir;
    }

    Ok(settings)
}

//! Chat completion service configuration.
//!
//! Values come from the process environment (optionally seeded from a `.env`
//! file by the binary). Invalid setup is reported once at startup; individual
//! calls only check for the credential they need.

use std::time::Duration;

use crate::infrastructure::ports::LlmError;

/// Default chat completion endpoint (a local OpenAI-compatible server).
pub const DEFAULT_API_URL: &str = "http://localhost:11434/v1/chat/completions";

/// Default model identifier.
pub const DEFAULT_MODEL: &str = "qwen2.5:14b";

/// Default request timeout. LLM requests can be slow.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Default window during which identical requests share one call.
pub const DEFAULT_COALESCE_WINDOW_MS: u64 = 1000;

/// Settings for the chat completion transport and request coordinator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmSettings {
    pub api_url: String,
    pub model: String,
    pub api_key: Option<String>,
    /// A trusted proxy injects credentials; no bearer header is sent.
    pub use_proxy: bool,
    pub request_timeout: Duration,
    pub coalesce_window: Duration,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
            use_proxy: false,
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            coalesce_window: Duration::from_millis(DEFAULT_COALESCE_WINDOW_MS),
        }
    }
}

impl LlmSettings {
    /// Load settings from environment variables.
    ///
    /// Uses `LLM_API_URL`, `LLM_MODEL`, `LLM_API_KEY`, `LLM_USE_PROXY`,
    /// `LLM_TIMEOUT_SECS` and `LLM_COALESCE_WINDOW_MS`, falling back to
    /// defaults if not set.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load settings through an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let non_empty = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let timeout_secs = non_empty("LLM_TIMEOUT_SECS")
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        let window_ms = non_empty("LLM_COALESCE_WINDOW_MS")
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(DEFAULT_COALESCE_WINDOW_MS);

        Self {
            api_url: non_empty("LLM_API_URL").unwrap_or(defaults.api_url),
            model: non_empty("LLM_MODEL").unwrap_or(defaults.model),
            api_key: non_empty("LLM_API_KEY"),
            use_proxy: non_empty("LLM_USE_PROXY").is_some_and(|v| parse_flag(&v)),
            request_timeout: Duration::from_secs(timeout_secs),
            coalesce_window: Duration::from_millis(window_ms),
        }
    }

    /// Check the static setup. Intended to run once at startup.
    pub fn validate(&self) -> Result<(), LlmError> {
        if self.api_url.is_empty() {
            return Err(LlmError::configuration("API URL is empty"));
        }
        if !(self.api_url.starts_with("http://") || self.api_url.starts_with("https://")) {
            return Err(LlmError::configuration(format!(
                "API URL must start with http:// or https://, got {}",
                self.api_url
            )));
        }
        if self.model.is_empty() {
            return Err(LlmError::configuration("model identifier is empty"));
        }
        if !self.use_proxy && self.api_key.is_none() {
            return Err(LlmError::configuration(
                "API key is missing and no trusted proxy is configured",
            ));
        }
        Ok(())
    }

    /// Human-readable description with the credential masked.
    pub fn summary(&self) -> String {
        let key = match (&self.api_key, self.use_proxy) {
            (_, true) => "handled by proxy".to_string(),
            (Some(key), false) => mask_key(key),
            (None, false) => "missing".to_string(),
        };
        format!(
            "url={} model={} key={} timeout={}s coalesce_window={}ms",
            self.api_url,
            self.model,
            key,
            self.request_timeout.as_secs(),
            self.coalesce_window.as_millis()
        )
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn mask_key(key: &str) -> String {
    let visible: String = key.chars().take(4).collect();
    if key.chars().count() <= 8 {
        "****".to_string()
    } else {
        format!("{}****", visible)
    }
}

//! Provider selection from configuration

use super::{AnthropicService, LlmService, LoggingService};
use std::sync::Arc;

/// Model used for every entity unless overridden
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";

/// Configuration for the LLM provider
#[derive(Debug, Clone, Default)]
pub struct LlmConfig {
    pub anthropic_api_key: Option<String>,
    /// Gateway URL; when set the gateway handles authentication
    pub gateway: Option<String>,
    /// Model override
    pub model: Option<String>,
}

impl LlmConfig {
    pub fn from_env() -> Self {
        Self {
            anthropic_api_key: std::env::var("ANTHROPIC_API_KEY").ok(),
            gateway: std::env::var("LLM_GATEWAY").ok(),
            model: std::env::var("ANTHROPIC_MODEL").ok(),
        }
    }

    pub fn model(&self) -> &str {
        self.model.as_deref().unwrap_or(DEFAULT_MODEL)
    }
}

/// Build the logged provider, or `None` when no credentials are configured
pub fn create_service(config: &LlmConfig) -> Option<Arc<dyn LlmService>> {
    // In gateway mode, use "implicit" as the API key
    let api_key = if config.gateway.is_some() {
        "implicit".to_string()
    } else {
        config
            .anthropic_api_key
            .as_ref()
            .filter(|k| !k.trim().is_empty())?
            .clone()
    };

    match AnthropicService::new(api_key, config.model(), config.gateway.as_deref()) {
        Ok(service) => {
            tracing::info!(model = %config.model(), url = %service.base_url(), "Anthropic client ready");
            Some(Arc::new(LoggingService::new(Arc::new(service))))
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to initialize Anthropic client");
            None
        }
    }
}

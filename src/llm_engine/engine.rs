//! LLM Engine - builds the configured provider and fronts it
//!
//! The engine is constructed once at startup from [`LlmSettings`] and handed to
//! whoever needs completions as an `Arc<dyn LlmProvider>`.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;

use crate::llm_engine::provider::{
    CompletionRequest, CompletionResponse, LlmError, LlmProvider, ProviderType,
};
use crate::llm_engine::providers::{OllamaConfig, OllamaProvider, OpenAiConfig, OpenAiProvider};

/// Settings needed to build a provider
#[derive(Debug, Clone)]
pub struct LlmSettings {
    pub provider: ProviderType,
    /// Overrides the provider's default endpoint
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub model: String,
    pub timeout_secs: u64,
    pub referer: Option<String>,
    pub app_title: Option<String>,
}

impl Default for LlmSettings {
    fn default() -> Self {
        let openrouter = OpenAiConfig::default();
        Self {
            provider: ProviderType::OpenRouter,
            base_url: None,
            api_key: None,
            model: openrouter.model,
            timeout_secs: openrouter.timeout_secs,
            referer: None,
            app_title: None,
        }
    }
}

/// The LLM engine wrapping the active provider
pub struct LlmEngine {
    provider: Arc<dyn LlmProvider>,
}

impl LlmEngine {
    /// Build the provider described by `settings`
    pub fn from_settings(settings: &LlmSettings) -> Result<Self, LlmError> {
        let base_url = settings
            .base_url
            .clone()
            .unwrap_or_else(|| settings.provider.default_base_url().to_string());

        let missing_key = settings
            .api_key
            .as_deref()
            .map_or(true, |key| key.trim().is_empty());
        if settings.provider.requires_api_key() && missing_key {
            log::warn!(
                "No {} API key configured; AI search will fail until one is set",
                settings.provider
            );
        }

        let provider: Arc<dyn LlmProvider> = match settings.provider {
            ProviderType::OpenRouter | ProviderType::OpenAi => {
                Arc::new(OpenAiProvider::new(OpenAiConfig {
                    provider: settings.provider,
                    base_url,
                    api_key: settings.api_key.clone().unwrap_or_default(),
                    model: settings.model.clone(),
                    timeout_secs: settings.timeout_secs,
                    referer: settings.referer.clone(),
                    app_title: settings.app_title.clone(),
                })?)
            }
            ProviderType::Ollama => Arc::new(OllamaProvider::new(OllamaConfig {
                base_url,
                model: settings.model.clone(),
                timeout_secs: settings.timeout_secs,
            })?),
        };

        log::info!(
            "LLM engine using {} with model {}",
            provider.provider_name(),
            provider.model()
        );
        Ok(Self::with_provider(provider))
    }

    /// Wrap an already constructed provider
    pub fn with_provider(provider: Arc<dyn LlmProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl LlmProvider for LlmEngine {
    fn provider_name(&self) -> &'static str {
        self.provider.provider_name()
    }

    fn model(&self) -> &str {
        self.provider.model()
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let started = Instant::now();
        let result = self.provider.complete(request).await;
        match &result {
            Ok(response) => {
                crate::perf_debug!(
                    "{} completion in {:?} (prompt tokens: {:?}, completion tokens: {:?}, finish: {:?})",
                    self.provider.provider_name(),
                    started.elapsed(),
                    response.prompt_tokens,
                    response.completion_tokens,
                    response.finish_reason
                );
                if response.truncated {
                    log::warn!("Completion hit the token limit; output may be cut short");
                }
            }
            Err(e) => log::warn!(
                "{} completion failed after {:?}: {}",
                self.provider.provider_name(),
                started.elapsed(),
                e
            ),
        }
        result
    }
}

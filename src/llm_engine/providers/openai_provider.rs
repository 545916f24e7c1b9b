//! OpenAI-compatible chat completions provider
//!
//! Works against any `/chat/completions` endpoint: OpenRouter (default),
//! OpenAI itself, or a self-hosted gateway.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::llm_engine::provider::{
    CompletionRequest, CompletionResponse, LlmError, LlmProvider, Message, ProviderType,
};

/// Chat message in the OpenAI wire format
#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

impl<'a> From<&'a Message> for ChatMessage<'a> {
    fn from(msg: &'a Message) -> Self {
        Self {
            role: msg.role.as_str(),
            content: &msg.content,
        }
    }
}

/// Chat completion request body
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

/// Chat completion response body
#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
    /// OpenRouter reports some upstream failures inside a 200 body
    #[serde(default)]
    error: Option<ChatError>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    #[serde(default)]
    prompt_tokens: Option<u32>,
    #[serde(default)]
    completion_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ChatError {
    #[serde(default)]
    message: Option<String>,
}

/// OpenAI-compatible provider configuration
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub provider: ProviderType,
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub timeout_secs: u64,
    /// Attribution headers OpenRouter uses for app rankings
    pub referer: Option<String>,
    pub app_title: Option<String>,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            provider: ProviderType::OpenRouter,
            base_url: ProviderType::OpenRouter.default_base_url().to_string(),
            api_key: String::new(),
            model: "nvidia/nemotron-3-nano-30b-a3b:free".to_string(),
            timeout_secs: 30,
            referer: None,
            app_title: None,
        }
    }
}

/// OpenAI-compatible LLM provider
pub struct OpenAiProvider {
    config: OpenAiConfig,
    client: Client,
}

impl OpenAiProvider {
    pub fn new(config: OpenAiConfig) -> Result<Self, LlmError> {
        let mut headers = HeaderMap::new();
        if let Some(ref referer) = config.referer {
            let value = HeaderValue::from_str(referer)
                .map_err(|e| LlmError::InvalidRequest(format!("Invalid referer header: {}", e)))?;
            headers.insert("HTTP-Referer", value);
        }
        if let Some(ref title) = config.app_title {
            let value = HeaderValue::from_str(title)
                .map_err(|e| LlmError::InvalidRequest(format!("Invalid title header: {}", e)))?;
            headers.insert("X-Title", value);
        }

        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| LlmError::Other(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    fn provider_name(&self) -> &'static str {
        match self.config.provider {
            ProviderType::OpenAi => "openai",
            _ => "openrouter",
        }
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let name = self.provider_name();
        if self.config.api_key.trim().is_empty() {
            return Err(LlmError::AuthenticationFailed(format!(
                "{} API key not configured",
                self.config.provider
            )));
        }

        let body = ChatRequest {
            model: &self.config.model,
            messages: request.messages.iter().map(ChatMessage::from).collect(),
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        };

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::from_transport(name, e))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(LlmError::from_status(name, status, &error_text));
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| LlmError::RequestFailed(format!("Invalid response: {}", e)))?;

        if let Some(error) = chat.error {
            return Err(LlmError::RequestFailed(
                error.message.unwrap_or_else(|| format!("{} reported an error", name)),
            ));
        }

        let choice = chat
            .choices
            .into_iter()
            .next()
            .ok_or(LlmError::EmptyCompletion)?;

        let finish_reason = choice.finish_reason;
        Ok(CompletionResponse {
            content: choice.message.content.unwrap_or_default(),
            model: chat.model.unwrap_or_else(|| self.config.model.clone()),
            prompt_tokens: chat.usage.as_ref().and_then(|u| u.prompt_tokens),
            completion_tokens: chat.usage.as_ref().and_then(|u| u.completion_tokens),
            truncated: finish_reason.as_deref() == Some("length"),
            finish_reason,
        })
    }
}

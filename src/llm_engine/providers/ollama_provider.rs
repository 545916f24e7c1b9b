//! Ollama API provider
//!
//! Connects to a running Ollama server (default: localhost:11434) for fully
//! local formula generation.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::llm_engine::provider::{
    CompletionRequest, CompletionResponse, LlmError, LlmProvider, Message, ProviderType,
};

/// Ollama API message format
#[derive(Debug, Serialize, Deserialize)]
struct OllamaMessage {
    role: String,
    content: String,
}

impl From<&Message> for OllamaMessage {
    fn from(msg: &Message) -> Self {
        Self {
            role: msg.role.as_str().to_string(),
            content: msg.content.clone(),
        }
    }
}

/// Ollama chat request
#[derive(Debug, Serialize)]
struct OllamaChatRequest {
    model: String,
    messages: Vec<OllamaMessage>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<OllamaOptions>,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>,
}

/// Ollama chat response
#[derive(Debug, Deserialize)]
struct OllamaChatResponse {
    message: OllamaMessage,
    model: String,
    done: bool,
    #[serde(default)]
    done_reason: Option<String>,
    #[serde(default)]
    prompt_eval_count: Option<u32>,
    #[serde(default)]
    eval_count: Option<u32>,
}

/// Ollama provider configuration
#[derive(Debug, Clone)]
pub struct OllamaConfig {
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: ProviderType::Ollama.default_base_url().to_string(),
            model: "llama3.2".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Ollama LLM provider
pub struct OllamaProvider {
    config: OllamaConfig,
    client: Client,
}

impl OllamaProvider {
    pub fn new(config: OllamaConfig) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LlmError::Other(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }
}

#[async_trait]
impl LlmProvider for OllamaProvider {
    fn provider_name(&self) -> &'static str {
        "ollama"
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let ollama_request = OllamaChatRequest {
            model: self.config.model.clone(),
            messages: request.messages.iter().map(OllamaMessage::from).collect(),
            stream: false,
            options: Some(OllamaOptions {
                temperature: request.temperature,
                num_predict: request.max_tokens,
            }),
        };

        let response = self
            .client
            .post(self.url("/api/chat"))
            .json(&ollama_request)
            .send()
            .await
            .map_err(|e| LlmError::from_transport("ollama", e))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(LlmError::from_status("ollama", status, &error_text));
        }

        let ollama_response: OllamaChatResponse = response
            .json()
            .await
            .map_err(|e| LlmError::RequestFailed(format!("Invalid response: {}", e)))?;

        let truncated = ollama_response.done_reason.as_deref() == Some("length");
        Ok(CompletionResponse {
            content: ollama_response.message.content,
            model: ollama_response.model,
            prompt_tokens: ollama_response.prompt_eval_count,
            completion_tokens: ollama_response.eval_count,
            truncated,
            finish_reason: if ollama_response.done {
                Some(ollama_response.done_reason.unwrap_or_else(|| "stop".to_string()))
            } else {
                None
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_map_max_tokens_to_num_predict() {
        let request = CompletionRequest::single_prompt("hi").with_max_tokens(64);
        let options = OllamaOptions {
            temperature: None,
            num_predict: request.max_tokens,
        };
        let json = serde_json::to_value(&options).unwrap();
        assert_eq!(json["num_predict"], 64);
        assert!(json.get("temperature").is_none());
    }

    #[test]
    fn test_parse_chat_response() {
        let raw = r#"{"model":"llama3.2","message":{"role":"assistant","content":"AND(1)"},"done":true,"done_reason":"stop","eval_count":7}"#;
        let parsed: OllamaChatResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.message.content, "AND(1)");
        assert_eq!(parsed.eval_count, Some(7));
        assert_eq!(parsed.prompt_eval_count, None);
    }
}

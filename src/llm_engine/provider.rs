//! LLM Provider trait and types
//!
//! Defines the common interface for completion backends (OpenAI-compatible
//! APIs such as OpenRouter, and Ollama)

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Error types for LLM operations
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum LlmError {
    /// Provider not reachable (connection refused, DNS, TLS)
    ProviderUnavailable(String),
    /// API key missing or invalid
    AuthenticationFailed(String),
    /// Provider is throttling us
    RateLimited(String),
    /// No response within the configured timeout
    Timeout(String),
    /// Request failed (non-success status, malformed body)
    RequestFailed(String),
    /// Invalid request parameters
    InvalidRequest(String),
    /// Provider answered but produced nothing usable
    EmptyCompletion,
    /// Generic error
    Other(String),
}

impl fmt::Display for LlmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LlmError::ProviderUnavailable(msg) => write!(f, "Provider unavailable: {}", msg),
            LlmError::AuthenticationFailed(msg) => write!(f, "Authentication failed: {}", msg),
            LlmError::RateLimited(msg) => write!(f, "Rate limited: {}", msg),
            LlmError::Timeout(msg) => write!(f, "Request timed out: {}", msg),
            LlmError::RequestFailed(msg) => write!(f, "Request failed: {}", msg),
            LlmError::InvalidRequest(msg) => write!(f, "Invalid request: {}", msg),
            LlmError::EmptyCompletion => write!(f, "Completion was empty"),
            LlmError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for LlmError {}

impl LlmError {
    /// Classify a reqwest transport error
    pub fn from_transport(provider: &str, e: reqwest::Error) -> Self {
        if e.is_timeout() {
            LlmError::Timeout(format!("{}: {}", provider, e))
        } else if e.is_connect() {
            LlmError::ProviderUnavailable(format!("Cannot connect to {}: {}", provider, e))
        } else {
            LlmError::RequestFailed(format!("{} request failed: {}", provider, e))
        }
    }

    /// Classify a non-success HTTP status
    pub fn from_status(provider: &str, status: reqwest::StatusCode, body: &str) -> Self {
        let detail = format!("{} returned {}: {}", provider, status, body);
        match status.as_u16() {
            401 | 403 => LlmError::AuthenticationFailed(detail),
            429 => LlmError::RateLimited(detail),
            400 | 404 | 422 => LlmError::InvalidRequest(detail),
            _ => LlmError::RequestFailed(detail),
        }
    }
}

/// Role of a message in a conversation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

impl MessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::System => "system",
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        }
    }
}

/// A message in a conversation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }
}

/// Request for text completion/generation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompletionRequest {
    /// Conversation messages
    pub messages: Vec<Message>,
    /// Maximum tokens to generate (None = model default)
    pub max_tokens: Option<u32>,
    /// Temperature for sampling (0.0 = deterministic, 1.0+ = creative)
    pub temperature: Option<f32>,
}

impl Default for CompletionRequest {
    fn default() -> Self {
        Self {
            messages: Vec::new(),
            max_tokens: None,
            temperature: Some(0.7),
        }
    }
}

impl CompletionRequest {
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            messages,
            ..Default::default()
        }
    }

    /// A single user turn, the shape used for one-shot instruction prompts
    pub fn single_prompt(prompt: impl Into<String>) -> Self {
        Self::new(vec![Message::user(prompt)])
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// Response from a completion request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompletionResponse {
    /// Generated text content
    pub content: String,
    /// Model that generated the response
    pub model: String,
    /// Number of tokens in the prompt
    pub prompt_tokens: Option<u32>,
    /// Number of tokens generated
    pub completion_tokens: Option<u32>,
    /// Whether the response was truncated (hit max_tokens)
    pub truncated: bool,
    /// Finish reason (stop, length, etc.)
    pub finish_reason: Option<String>,
}

/// The interface every completion backend implements
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Get the provider name (e.g., "openrouter", "ollama")
    fn provider_name(&self) -> &'static str;

    /// Model identifier requests are sent to
    fn model(&self) -> &str;

    /// Run a completion request (non-streaming)
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError>;
}

/// Provider type enum for configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ProviderType {
    OpenRouter,
    OpenAi,
    Ollama,
}

impl ProviderType {
    /// Base URL used when none is configured
    pub fn default_base_url(&self) -> &'static str {
        match self {
            ProviderType::OpenRouter => "https://openrouter.ai/api/v1",
            ProviderType::OpenAi => "https://api.openai.com/v1",
            ProviderType::Ollama => "http://localhost:11434",
        }
    }

    pub fn requires_api_key(&self) -> bool {
        !matches!(self, ProviderType::Ollama)
    }
}

impl fmt::Display for ProviderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderType::OpenRouter => write!(f, "openrouter"),
            ProviderType::OpenAi => write!(f, "openai"),
            ProviderType::Ollama => write!(f, "ollama"),
        }
    }
}

impl FromStr for ProviderType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openrouter" => Ok(ProviderType::OpenRouter),
            "openai" => Ok(ProviderType::OpenAi),
            "ollama" => Ok(ProviderType::Ollama),
            other => Err(format!(
                "unknown LLM provider '{}' (expected openrouter, openai or ollama)",
                other
            )),
        }
    }
}

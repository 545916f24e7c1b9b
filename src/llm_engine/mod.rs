//! LLM Engine module for formula generation
//!
//! Supports multiple backends:
//! - OpenAI-compatible APIs (OpenRouter by default, OpenAI)
//! - Ollama API (requires running Ollama server)

pub mod provider;
pub mod engine;
pub mod providers;

pub use provider::{
    LlmProvider, LlmError, CompletionRequest, CompletionResponse, Message, MessageRole,
    ProviderType,
};
pub use engine::{LlmEngine, LlmSettings};

//! Runtime configuration from flags or environment variables

use clap::Args;
use std::path::PathBuf;

use crate::llm_engine::{LlmSettings, ProviderType};
use crate::record_store::airtable::{AirtableConfig, DEFAULT_API_URL};
use crate::search::TranslatorSettings;

const DEFAULT_REFERER: &str = "https://github.com/ak710/genz-diamonds-inventory";
const DEFAULT_APP_TITLE: &str = "GenZ Diamonds Inventory";

#[derive(Args, Clone, Debug)]
pub struct AirtableArgs {
    /// Airtable personal access token
    #[arg(long, env = "AIRTABLE_API_KEY", hide_env_values = true, default_value = "")]
    pub airtable_api_key: String,

    #[arg(long, env = "AIRTABLE_BASE_ID", default_value = "")]
    pub airtable_base_id: String,

    #[arg(long, env = "AIRTABLE_TABLE_NAME", default_value = "")]
    pub airtable_table: String,

    #[arg(long, env = "AIRTABLE_API_URL", default_value = DEFAULT_API_URL)]
    pub airtable_api_url: String,

    /// Backend request timeout in seconds
    #[arg(long, env = "STORE_TIMEOUT_SECS", default_value_t = 20)]
    pub store_timeout_secs: u64,
}

impl AirtableArgs {
    pub fn store_config(&self) -> AirtableConfig {
        AirtableConfig {
            api_url: self.airtable_api_url.clone(),
            api_key: self.airtable_api_key.clone(),
            base_id: self.airtable_base_id.clone(),
            table_name: self.airtable_table.clone(),
            timeout_secs: self.store_timeout_secs,
        }
    }
}

#[derive(Args, Clone, Debug)]
pub struct LlmArgs {
    /// Completion backend: openrouter, openai or ollama
    #[arg(long, env = "LLM_PROVIDER", default_value = "openrouter")]
    pub llm_provider: ProviderType,

    /// API key for OpenRouter/OpenAI
    #[arg(long, env = "OPENROUTER_API_KEY", hide_env_values = true)]
    pub llm_api_key: Option<String>,

    /// Overrides the provider's default endpoint
    #[arg(long, env = "LLM_BASE_URL")]
    pub llm_base_url: Option<String>,

    /// Model name (provider default when unset)
    #[arg(long, env = "LLM_MODEL")]
    pub llm_model: Option<String>,

    #[arg(long, env = "LLM_MAX_TOKENS", default_value_t = 750)]
    pub llm_max_tokens: u32,

    #[arg(long, env = "LLM_TEMPERATURE", default_value_t = 0.3)]
    pub llm_temperature: f32,

    /// Completion request timeout in seconds
    #[arg(long, env = "LLM_TIMEOUT_SECS", default_value_t = 30)]
    pub llm_timeout_secs: u64,

    /// Replacement search vocabulary (JSON)
    #[arg(long, env = "SEARCH_VOCABULARY")]
    pub search_vocabulary: Option<PathBuf>,
}

impl LlmArgs {
    pub fn llm_settings(&self) -> LlmSettings {
        let model = self
            .llm_model
            .clone()
            .unwrap_or_else(|| default_model(self.llm_provider).to_string());

        LlmSettings {
            provider: self.llm_provider,
            base_url: self.llm_base_url.clone(),
            api_key: self.llm_api_key.clone(),
            model,
            timeout_secs: self.llm_timeout_secs,
            referer: Some(DEFAULT_REFERER.to_string()),
            app_title: Some(DEFAULT_APP_TITLE.to_string()),
        }
    }

    pub fn translator_settings(&self) -> TranslatorSettings {
        TranslatorSettings {
            max_tokens: self.llm_max_tokens,
            temperature: self.llm_temperature,
        }
    }
}

pub fn default_model(provider: ProviderType) -> &'static str {
    match provider {
        ProviderType::OpenRouter => "nvidia/nemotron-3-nano-30b-a3b:free",
        ProviderType::OpenAi => "gpt-4o-mini",
        ProviderType::Ollama => "llama3.2",
    }
}

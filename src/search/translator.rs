//! Natural-language query → filter formula translation
//!
//! One completion call per query, followed by a single heuristic repair pass.
//! Nothing is cached or retried.

use std::sync::Arc;

use crate::llm_engine::{CompletionRequest, LlmProvider};
use crate::record_store::FilterExpression;

use super::error::{SearchError, SearchResult};
use super::prompt::build_translation_prompt;
use super::repair::{repair_with, TypeCodeNormalizer};
use super::vocabulary::FieldVocabulary;

/// Completion parameters for translation requests
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TranslatorSettings {
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for TranslatorSettings {
    fn default() -> Self {
        Self {
            max_tokens: 750,
            temperature: 0.3,
        }
    }
}

pub struct QueryTranslator {
    llm: Arc<dyn LlmProvider>,
    vocabulary: FieldVocabulary,
    settings: TranslatorSettings,
    normalizer: TypeCodeNormalizer,
}

impl QueryTranslator {
    pub fn new(
        llm: Arc<dyn LlmProvider>,
        vocabulary: FieldVocabulary,
        settings: TranslatorSettings,
    ) -> Self {
        let normalizer = TypeCodeNormalizer::new(&vocabulary.type_codes());
        Self {
            llm,
            vocabulary,
            settings,
            normalizer,
        }
    }

    /// Model the completion requests are sent to
    pub fn model(&self) -> &str {
        self.llm.model()
    }

    /// The prompt that would be sent for `query`
    pub fn prompt_for(&self, query: &str) -> String {
        build_translation_prompt(&self.vocabulary, query)
    }

    /// Translate free text into a repaired filter formula
    pub async fn translate(&self, query: &str) -> SearchResult<FilterExpression> {
        let query = query.trim();
        if query.is_empty() {
            return Err(SearchError::InvalidInput("Query is required".to_string()));
        }

        let request = CompletionRequest::single_prompt(self.prompt_for(query))
            .with_max_tokens(self.settings.max_tokens)
            .with_temperature(self.settings.temperature);

        let response = self.llm.complete(request).await?;
        perf_debug!("Raw formula from {}: {:?}", self.llm.provider_name(), response.content);

        if response.content.trim().is_empty() {
            return Err(SearchError::TranslationFailed(
                "Model returned an empty completion".to_string(),
            ));
        }

        let repaired = repair_with(&response.content, &self.normalizer);
        if repaired.expression.is_empty() {
            return Err(SearchError::TranslationFailed(
                "Model returned only formatting, no formula".to_string(),
            ));
        }
        if repaired.was_modified() {
            log::debug!(
                "Repaired formula (fences: {}, +parens: {}, +braces: {}, codes: {})",
                repaired.fences_stripped,
                repaired.appended_parens,
                repaired.appended_braces,
                repaired.normalized_codes
            );
        }

        Ok(FilterExpression::new(repaired.expression))
    }
}

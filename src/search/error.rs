use thiserror::Error;

use crate::llm_engine::LlmError;
use crate::record_store::{FilterExpression, StoreError};

/// Errors surfaced by the search, count and line sheet paths
#[derive(Debug, Clone, Error)]
pub enum SearchError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("translation failed: {0}")]
    TranslationFailed(String),

    #[error("query execution failed for formula `{formula}`: {message}")]
    QueryExecutionFailed { formula: String, message: String },

    #[error("record store unavailable: {0}")]
    BackendUnavailable(String),

    #[error("not found: {0}")]
    NotFound(String),
}

impl SearchError {
    /// Classify a store failure raised while running `formula`
    pub fn from_query_failure(formula: &FilterExpression, error: StoreError) -> Self {
        match error {
            StoreError::Unavailable(message) => Self::BackendUnavailable(message),
            other => Self::QueryExecutionFailed {
                formula: formula.as_str().to_string(),
                message: other.to_string(),
            },
        }
    }

    /// The attempted formula, when the failure happened at execution time
    pub fn formula(&self) -> Option<&str> {
        match self {
            Self::QueryExecutionFailed { formula, .. } => Some(formula),
            _ => None,
        }
    }
}

impl From<LlmError> for SearchError {
    fn from(error: LlmError) -> Self {
        Self::TranslationFailed(error.to_string())
    }
}

// Store failures outside of a formula query (lookups, updates)
impl From<StoreError> for SearchError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::Unavailable(message) => Self::BackendUnavailable(message),
            StoreError::Rejected { kind, message } if kind.ends_with("NOT_FOUND") || kind == "404" => {
                Self::NotFound(message)
            }
            StoreError::Rejected { kind, message }
                if kind.starts_with("INVALID_") || kind == "UNKNOWN_FIELD_NAME" =>
            {
                Self::InvalidInput(message)
            }
            other => Self::BackendUnavailable(other.to_string()),
        }
    }
}

pub type SearchResult<T> = Result<T, SearchError>;

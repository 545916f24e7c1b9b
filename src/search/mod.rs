//! AI search: free text → filter formula → matching inventory
//!
//! - `vocabulary`: the versioned prompt vocabulary asset
//! - `prompt`: deterministic prompt construction
//! - `repair`: fence stripping, delimiter balancing, type-code casing
//! - `translator`: one completion call plus repair
//! - `service`: translation composed with the record store

pub mod error;
pub mod prompt;
pub mod repair;
pub mod service;
pub mod translator;
pub mod vocabulary;

pub use error::{SearchError, SearchResult};
pub use prompt::build_translation_prompt;
pub use repair::{repair_expression, RepairedExpression};
pub use service::{AiSearchOutcome, AiSearchService};
pub use translator::{QueryTranslator, TranslatorSettings};
pub use vocabulary::FieldVocabulary;

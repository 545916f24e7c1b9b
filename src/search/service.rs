use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

use crate::record_store::{InventoryItem, RecordStore};

use super::error::{SearchError, SearchResult};
use super::translator::QueryTranslator;

/// Result of an AI search, as returned to callers
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AiSearchOutcome {
    pub query: String,
    pub formula: String,
    pub results: Vec<InventoryItem>,
    pub count: usize,
}

/// Translates a query and runs the resulting formula against the store
pub struct AiSearchService {
    translator: Arc<QueryTranslator>,
    store: Arc<dyn RecordStore>,
}

impl AiSearchService {
    pub fn new(translator: Arc<QueryTranslator>, store: Arc<dyn RecordStore>) -> Self {
        Self { translator, store }
    }

    pub fn translator(&self) -> &QueryTranslator {
        &self.translator
    }

    pub async fn search(&self, query: &str) -> SearchResult<AiSearchOutcome> {
        let started = Instant::now();
        log::info!("AI search query: {:?}", query);

        let formula = self.translator.translate(query).await?;
        log::info!("Generated formula: {}", formula);

        let records = self
            .store
            .query(&formula)
            .await
            .map_err(|e| SearchError::from_query_failure(&formula, e))?;

        let results: Vec<InventoryItem> = records.iter().map(InventoryItem::from).collect();
        log::info!(
            "AI search matched {} records via {} in {:?}",
            results.len(),
            self.store.store_name(),
            started.elapsed()
        );

        Ok(AiSearchOutcome {
            query: query.trim().to_string(),
            formula: formula.into_inner(),
            count: results.len(),
            results,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_engine::{CompletionRequest, CompletionResponse, LlmError, LlmProvider};
    use crate::record_store::{MemoryStore, Record, StoreError};
    use crate::search::{FieldVocabulary, TranslatorSettings};
    use async_trait::async_trait;
    use serde_json::json;

    struct FixedProvider(Result<String, LlmError>);

    #[async_trait]
    impl LlmProvider for FixedProvider {
        fn provider_name(&self) -> &'static str {
            "fixed"
        }

        fn model(&self) -> &str {
            "fixed"
        }

        async fn complete(&self, _request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
            self.0.clone().map(|content| CompletionResponse {
                content,
                model: "fixed".into(),
                prompt_tokens: None,
                completion_tokens: None,
                truncated: false,
                finish_reason: None,
            })
        }
    }

    const EMERALD: &str =
        "AND(FIND(\"rn\", LOWER({Design})), FIND(\"emerald\", LOWER({AI Description})))";

    fn service(reply: Result<String, LlmError>, store: Arc<MemoryStore>) -> AiSearchService {
        let translator = QueryTranslator::new(
            Arc::new(FixedProvider(reply)),
            FieldVocabulary::embedded().unwrap(),
            TranslatorSettings::default(),
        );
        AiSearchService::new(Arc::new(translator), store)
    }

    fn emerald_ring() -> Record {
        serde_json::from_value(json!({
            "id": "rec1",
            "fields": {
                "Job No.": "4717547",
                "Design": "rn-2231-wg",
                "AI Description": "white gold emerald solitaire ring",
                "HD Image": [{"url": "https://cdn.example/hd/4717547.jpg"}],
                "Tag Price (CAD)": 4200
            }
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_search_returns_items() {
        let store = Arc::new(MemoryStore::new(vec![emerald_ring()]));
        store.script_query(EMERALD, &["rec1"]);

        let outcome = service(
            Ok("AND(FIND(\"RN\", LOWER({Design})), FIND(\"emerald\", LOWER({AI Description}))".into()),
            store.clone(),
        )
        .search(" emerald cut rings ")
        .await
        .unwrap();

        assert_eq!(outcome.query, "emerald cut rings");
        assert_eq!(outcome.formula, EMERALD);
        assert_eq!(outcome.count, 1);
        assert_eq!(outcome.results[0].job_no.as_deref(), Some("4717547"));
        assert_eq!(
            outcome.results[0].image.as_deref(),
            Some("https://cdn.example/hd/4717547.jpg")
        );
    }

    #[tokio::test]
    async fn test_zero_matches_is_success() {
        let store = Arc::new(MemoryStore::new(vec![emerald_ring()]));
        let outcome = service(Ok("FIND(\"nt\", LOWER({Design}))".into()), store)
            .search("necklaces")
            .await
            .unwrap();
        assert_eq!(outcome.count, 0);
        assert!(outcome.results.is_empty());
    }

    #[tokio::test]
    async fn test_translation_failure_never_queries_store() {
        let store = Arc::new(MemoryStore::new(vec![]));
        let result = service(
            Err(LlmError::ProviderUnavailable("connection refused".into())),
            store.clone(),
        )
        .search("rings")
        .await;

        assert!(matches!(result, Err(SearchError::TranslationFailed(_))));
        assert_eq!(store.query_count(), 0);
    }

    #[tokio::test]
    async fn test_rejected_formula_keeps_formula() {
        let store = Arc::new(MemoryStore::new(vec![]));
        store.fail_queries(StoreError::Rejected {
            kind: "INVALID_FILTER_BY_FORMULA".into(),
            message: "The formula for filtering records is invalid: Unknown function CONTAINS".into(),
        });

        let result = service(Ok("CONTAINS({Design}, \"rn\")".into()), store)
            .search("rings")
            .await;

        match result {
            Err(SearchError::QueryExecutionFailed { formula, message }) => {
                assert_eq!(formula, "CONTAINS({Design}, \"rn\")");
                assert!(message.contains("CONTAINS"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_store_timeout_is_backend_unavailable() {
        let store = Arc::new(MemoryStore::new(vec![]));
        store.fail_queries(StoreError::Unavailable("timed out after 20s".into()));

        let result = service(Ok("FIND(\"rn\", LOWER({Design}))".into()), store)
            .search("rings")
            .await;
        assert!(matches!(result, Err(SearchError::BackendUnavailable(_))));
    }
}

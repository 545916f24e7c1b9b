//! In-process record store used by unit tests and offline runs.
//!
//! Formula evaluation is not attempted: `query` returns whatever rows were
//! scripted for the exact formula string, or the configured failure.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use super::models::{FieldMap, Record};
use super::{FilterExpression, RecordStore, StoreError, StoreResult};

#[derive(Default)]
pub struct MemoryStore {
    records: Mutex<Vec<Record>>,
    scripted: Mutex<HashMap<String, Vec<String>>>,
    query_failure: Mutex<Option<StoreError>>,
    update_failure: Mutex<Option<StoreError>>,
    queries: AtomicUsize,
}

impl MemoryStore {
    pub fn new(records: Vec<Record>) -> Self {
        Self {
            records: Mutex::new(records),
            ..Default::default()
        }
    }

    /// Rows (by id) that `query` returns for this exact formula
    pub fn script_query(&self, formula: &str, ids: &[&str]) {
        self.scripted
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(formula.to_string(), ids.iter().map(|s| s.to_string()).collect());
    }

    pub fn fail_queries(&self, error: StoreError) {
        *self.query_failure.lock().unwrap_or_else(|e| e.into_inner()) = Some(error);
    }

    pub fn fail_updates(&self, error: StoreError) {
        *self.update_failure.lock().unwrap_or_else(|e| e.into_inner()) = Some(error);
    }

    /// Number of `query` calls made so far
    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    pub fn record(&self, id: &str) -> Option<Record> {
        self.records
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .find(|r| r.id == id)
            .cloned()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    fn store_name(&self) -> &'static str {
        "memory"
    }

    async fn query(&self, filter: &FilterExpression) -> StoreResult<Vec<Record>> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = self.query_failure.lock().unwrap_or_else(|e| e.into_inner()).clone() {
            return Err(error);
        }

        let ids = self
            .scripted
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(filter.as_str())
            .cloned()
            .unwrap_or_default();
        Ok(ids.iter().filter_map(|id| self.record(id)).collect())
    }

    async fn find_by_job_no(&self, job_no: &str) -> StoreResult<Option<Record>> {
        Ok(self
            .records
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .find(|r| r.job_no().as_deref() == Some(job_no))
            .cloned())
    }

    async fn get(&self, record_id: &str) -> StoreResult<Option<Record>> {
        Ok(self.record(record_id))
    }

    async fn list_all(&self) -> StoreResult<Vec<Record>> {
        Ok(self.records.lock().unwrap_or_else(|e| e.into_inner()).clone())
    }

    async fn update(&self, record_id: &str, fields: FieldMap) -> StoreResult<Record> {
        if let Some(error) = self.update_failure.lock().unwrap_or_else(|e| e.into_inner()).clone() {
            return Err(error);
        }

        let mut records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        let record = records
            .iter_mut()
            .find(|r| r.id == record_id)
            .ok_or_else(|| StoreError::Rejected {
                kind: "MODEL_ID_NOT_FOUND".to_string(),
                message: format!("Could not find record {}", record_id),
            })?;
        record.fields.extend(fields);
        Ok(record.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ring() -> Record {
        serde_json::from_value(json!({
            "id": "rec1",
            "fields": {"Job No.": "4717547", "Design": "RN-1042"}
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_scripted_query() {
        let store = MemoryStore::new(vec![ring()]);
        store.script_query("X", &["rec1", "missing"]);

        let rows = store.query(&FilterExpression::new("X")).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert!(store.query(&FilterExpression::new("Y")).await.unwrap().is_empty());
        assert_eq!(store.query_count(), 2);
    }

    #[tokio::test]
    async fn test_update_merges_fields() {
        let store = MemoryStore::new(vec![ring()]);
        let mut fields = FieldMap::new();
        fields.insert("Purity".into(), json!("14K"));

        let updated = store.update("rec1", fields).await.unwrap();
        assert_eq!(updated.text("Purity").as_deref(), Some("14K"));
        assert_eq!(updated.text("Design").as_deref(), Some("RN-1042"));
        assert!(store.update("nope", FieldMap::new()).await.is_err());
    }
}

//! Record store - the authoritative tabular backend holding inventory rows
//!
//! The store is consumed through the [`RecordStore`] trait so search and
//! inventory code can run against the Airtable client or an in-process fake.

pub mod airtable;
pub mod memory;
pub mod models;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

pub use airtable::{AirtableConfig, AirtableStore};
pub use memory::MemoryStore;
pub use models::{fields, FieldMap, InventoryItem, Record};

/// A filter formula in the backend's boolean/text-predicate grammar.
///
/// Only delimiter balance is ever checked; the backend is the judge of validity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterExpression(String);

impl FilterExpression {
    pub fn new(formula: impl Into<String>) -> Self {
        Self(formula.into())
    }

    /// Exact-match formula on the Job No. field
    pub fn job_no_equals(job_no: &str) -> Self {
        Self(format!(
            "{{{}}} = \"{}\"",
            fields::JOB_NO,
            job_no.replace('\\', "\\\\").replace('"', "\\\"")
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for FilterExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Errors raised by a record store
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    /// Transport-level failure or timeout reaching the backend
    #[error("record store unavailable: {0}")]
    Unavailable(String),
    /// The backend answered with an error status
    #[error("record store rejected the request ({kind}): {message}")]
    Rejected { kind: String, message: String },
    /// The backend answered with a body we could not parse
    #[error("unexpected record store response: {0}")]
    Decode(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Operations the rest of the crate needs from the backend
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Name used in logs (e.g., "airtable")
    fn store_name(&self) -> &'static str;

    /// All rows matching the formula. No result limit is applied.
    async fn query(&self, filter: &FilterExpression) -> StoreResult<Vec<Record>>;

    /// The first row whose Job No. equals `job_no`
    async fn find_by_job_no(&self, job_no: &str) -> StoreResult<Option<Record>>;

    /// A single row by its record id
    async fn get(&self, record_id: &str) -> StoreResult<Option<Record>>;

    /// Every row in the table
    async fn list_all(&self) -> StoreResult<Vec<Record>>;

    /// Overwrite the given fields of a row, returning the updated row
    async fn update(&self, record_id: &str, fields: FieldMap) -> StoreResult<Record>;
}

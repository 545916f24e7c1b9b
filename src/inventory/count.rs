// Inventory count session - barcode scans of Job Nos. during a physical count
// Scanned items live in memory for the session; each scan stamps the backend record.

use chrono::{DateTime, SecondsFormat, Utc};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::record_store::{fields, FieldMap, Record, RecordStore};
use crate::search::{SearchError, SearchResult};

/// An item counted in this session
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScannedItem {
    /// The Job No. as scanned
    pub job_no: String,
    pub record: Record,
    pub scanned_at: DateTime<Utc>,
}

impl ScannedItem {
    pub fn tag_price(&self) -> f64 {
        self.record.tag_price()
    }
}

/// Result of a single scan
#[derive(Debug, Clone, PartialEq)]
pub enum ScanOutcome {
    /// New item added at the front of the list
    Scanned(ScannedItem),
    /// This Job No. was already counted in the session
    Duplicate(String),
    /// No record carries this Job No.
    NotFound(String),
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CountStats {
    pub scanned: usize,
    pub total_value: f64,
}

/// A physical inventory count
#[derive(Debug, Clone)]
pub struct InventoryCount {
    session_id: String,
    started_at: DateTime<Utc>,
    /// Most recent scan first
    items: Vec<ScannedItem>,
}

impl Default for InventoryCount {
    fn default() -> Self {
        Self::new()
    }
}

impl InventoryCount {
    pub fn new() -> Self {
        let session_id = uuid::Uuid::new_v4().to_string();
        info!("Starting inventory count {}", session_id);
        Self {
            session_id,
            started_at: Utc::now(),
            items: Vec::new(),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn items(&self) -> &[ScannedItem] {
        &self.items
    }

    pub fn contains(&self, job_no: &str) -> bool {
        self.items.iter().any(|item| item.job_no == job_no)
    }

    /// Scan a Job No.: look it up, add it, and mark the record as counted.
    ///
    /// Marking the record is best effort; a failed update is logged only.
    pub async fn scan(&mut self, store: &dyn RecordStore, job_no: &str) -> SearchResult<ScanOutcome> {
        let job_no = job_no.trim();
        if job_no.is_empty() {
            return Err(SearchError::InvalidInput("Job No. is required".to_string()));
        }

        if self.contains(job_no) {
            info!("Already scanned: {}", job_no);
            return Ok(ScanOutcome::Duplicate(job_no.to_string()));
        }

        let Some(record) = store.find_by_job_no(job_no).await? else {
            info!("No record for Job No. {}", job_no);
            return Ok(ScanOutcome::NotFound(job_no.to_string()));
        };

        let scanned_at = Utc::now();
        let mut stamp = FieldMap::new();
        stamp.insert(fields::IN_INVENTORY.to_string(), Value::Bool(true));
        stamp.insert(
            fields::LAST_INVENTORY_DATE.to_string(),
            Value::String(inventory_timestamp(scanned_at)),
        );
        if let Err(e) = store.update(&record.id, stamp).await {
            warn!("Failed to mark {} ({}) as counted: {}", job_no, record.id, e);
        }

        let item = ScannedItem {
            job_no: job_no.to_string(),
            record,
            scanned_at,
        };
        self.items.insert(0, item.clone());
        info!("Scanned {} ({} items in count {})", job_no, self.items.len(), self.session_id);

        Ok(ScanOutcome::Scanned(item))
    }

    pub fn stats(&self) -> CountStats {
        CountStats {
            scanned: self.items.len(),
            total_value: self.items.iter().map(ScannedItem::tag_price).sum(),
        }
    }

    /// Remove the item at `index` (0 = most recent)
    pub fn remove(&mut self, index: usize) -> Option<ScannedItem> {
        if index < self.items.len() {
            Some(self.items.remove(index))
        } else {
            None
        }
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

/// `2026-02-09T19:45:30.123Z`
pub fn inventory_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

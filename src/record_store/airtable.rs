//! Airtable REST record store
//!
//! Talks to `https://api.airtable.com/v0/{base}/{table}` with a personal access
//! token. List calls follow the `offset` cursor until the table is exhausted.

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode, Url};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::record_store::{
    FieldMap, FilterExpression, Record, RecordStore, StoreError, StoreResult,
};

pub const DEFAULT_API_URL: &str = "https://api.airtable.com/v0";

/// Airtable store configuration
#[derive(Debug, Clone)]
pub struct AirtableConfig {
    pub api_url: String,
    pub api_key: String,
    pub base_id: String,
    pub table_name: String,
    pub timeout_secs: u64,
}

impl Default for AirtableConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_key: String::new(),
            base_id: String::new(),
            table_name: String::new(),
            timeout_secs: 20,
        }
    }
}

/// One page of a list call
#[derive(Debug, Deserialize)]
struct ListPage {
    #[serde(default)]
    records: Vec<Record>,
    #[serde(default)]
    offset: Option<String>,
}

#[derive(Debug, Serialize)]
struct UpdateBody<'a> {
    fields: &'a FieldMap,
}

/// Error envelope. Airtable uses both `{"error": "NOT_FOUND"}` and
/// `{"error": {"type": ..., "message": ...}}`.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ErrorBody {
    Detailed {
        #[serde(rename = "type")]
        kind: String,
        #[serde(default)]
        message: Option<String>,
    },
    Code(String),
}

/// Airtable-backed record store
pub struct AirtableStore {
    config: AirtableConfig,
    client: Client,
    table_url: Url,
}

impl AirtableStore {
    pub fn new(config: AirtableConfig) -> StoreResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| StoreError::Unavailable(format!("Failed to create HTTP client: {}", e)))?;

        let mut table_url = Url::parse(&config.api_url)
            .map_err(|e| StoreError::Unavailable(format!("Invalid Airtable URL '{}': {}", config.api_url, e)))?;
        table_url
            .path_segments_mut()
            .map_err(|_| StoreError::Unavailable(format!("Airtable URL '{}' cannot carry a path", config.api_url)))?
            .pop_if_empty()
            .push(&config.base_id)
            .push(&config.table_name);

        if config.api_key.is_empty() || config.base_id.is_empty() || config.table_name.is_empty() {
            log::warn!(
                "Airtable configuration incomplete: set AIRTABLE_API_KEY, AIRTABLE_BASE_ID and AIRTABLE_TABLE_NAME"
            );
        }

        Ok(Self {
            config,
            client,
            table_url,
        })
    }

    fn record_url(&self, record_id: &str) -> StoreResult<Url> {
        let mut url = self.table_url.clone();
        url.path_segments_mut()
            .map_err(|_| StoreError::Unavailable("Airtable URL cannot carry a path".to_string()))?
            .push(record_id);
        Ok(url)
    }

    /// Run a list call, following pagination unless `max_records` caps it
    async fn list(
        &self,
        filter: Option<&FilterExpression>,
        max_records: Option<u32>,
    ) -> StoreResult<Vec<Record>> {
        let mut records = Vec::new();
        let mut offset: Option<String> = None;
        let mut page_count = 0usize;

        loop {
            let mut params: Vec<(&str, String)> = Vec::new();
            if let Some(filter) = filter {
                params.push(("filterByFormula", filter.as_str().to_string()));
            }
            if let Some(max) = max_records {
                params.push(("maxRecords", max.to_string()));
            }
            if let Some(ref cursor) = offset {
                params.push(("offset", cursor.clone()));
            }
            crate::perf_trace!("Airtable list {} with {:?}", self.table_url, params);

            let response = self
                .client
                .get(self.table_url.clone())
                .bearer_auth(&self.config.api_key)
                .query(&params)
                .send()
                .await
                .map_err(transport_error)?;

            let response = check_status(response).await?;
            let page: ListPage = response
                .json()
                .await
                .map_err(|e| StoreError::Decode(format!("Invalid list response: {}", e)))?;

            page_count += 1;
            crate::perf_debug!(
                "Airtable page {} returned {} records (more: {})",
                page_count,
                page.records.len(),
                page.offset.is_some()
            );

            records.extend(page.records);

            if let Some(max) = max_records {
                if records.len() >= max as usize {
                    records.truncate(max as usize);
                    break;
                }
            }

            match page.offset {
                Some(next) => offset = Some(next),
                None => break,
            }
        }

        Ok(records)
    }
}

/// Map a reqwest transport error, calling out timeouts explicitly
fn transport_error(e: reqwest::Error) -> StoreError {
    if e.is_timeout() {
        StoreError::Unavailable(format!("Airtable request timed out: {}", e))
    } else {
        StoreError::Unavailable(format!("Cannot reach Airtable: {}", e))
    }
}

/// Turn a non-success response into a `Rejected` error carrying Airtable's message
async fn check_status(response: Response) -> StoreResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(rejection(status, &body))
}

fn rejection(status: StatusCode, body: &str) -> StoreError {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(ErrorEnvelope {
            error: ErrorBody::Detailed { kind, message },
        }) => StoreError::Rejected {
            message: message.unwrap_or_else(|| kind.clone()),
            kind,
        },
        Ok(ErrorEnvelope {
            error: ErrorBody::Code(code),
        }) => StoreError::Rejected {
            kind: code.clone(),
            message: format!("Airtable returned {} ({})", status, code),
        },
        Err(_) => StoreError::Rejected {
            kind: status.as_u16().to_string(),
            message: if body.is_empty() {
                format!("Airtable returned {}", status)
            } else {
                body.to_string()
            },
        },
    }
}

#[async_trait]
impl RecordStore for AirtableStore {
    fn store_name(&self) -> &'static str {
        "airtable"
    }

    async fn query(&self, filter: &FilterExpression) -> StoreResult<Vec<Record>> {
        self.list(Some(filter), None).await
    }

    async fn find_by_job_no(&self, job_no: &str) -> StoreResult<Option<Record>> {
        let filter = FilterExpression::job_no_equals(job_no);
        let mut records = self.list(Some(&filter), Some(1)).await?;
        Ok(if records.is_empty() {
            None
        } else {
            Some(records.swap_remove(0))
        })
    }

    async fn get(&self, record_id: &str) -> StoreResult<Option<Record>> {
        let url = self.record_url(record_id)?;
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.config.api_key)
            .send()
            .await
            .map_err(transport_error)?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let response = check_status(response).await?;
        let record: Record = response
            .json()
            .await
            .map_err(|e| StoreError::Decode(format!("Invalid record response: {}", e)))?;
        Ok(Some(record))
    }

    async fn list_all(&self) -> StoreResult<Vec<Record>> {
        self.list(None, None).await
    }

    async fn update(&self, record_id: &str, fields: FieldMap) -> StoreResult<Record> {
        let url = self.record_url(record_id)?;
        let response = self
            .client
            .patch(url)
            .bearer_auth(&self.config.api_key)
            .json(&UpdateBody { fields: &fields })
            .send()
            .await
            .map_err(transport_error)?;

        let response = check_status(response).await?;
        let record: Record = response
            .json()
            .await
            .map_err(|e| StoreError::Decode(format!("Invalid update response: {}", e)))?;

        log::info!("Updated record {} ({} fields)", record.id, fields.len());
        Ok(record)
    }
}

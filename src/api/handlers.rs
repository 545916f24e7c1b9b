//! HTTP request handlers.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::errors::ApiError;
use crate::linesheet::{line_sheet_for, Discount, LineSheet};
use crate::record_store::Record;
use crate::search::{AiSearchOutcome, SearchError};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AiSearchRequest {
    #[serde(default)]
    pub query: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RecordResponse {
    pub record: Record,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RecordsResponse {
    pub records: Vec<Record>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineSheetRequest {
    #[serde(default)]
    pub record_ids: Vec<String>,
    pub discount_percent: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub store: String,
    pub model: String,
    pub uptime_seconds: u64,
}

/// `GET /health`
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        store: state.store.store_name().to_string(),
        model: state.search.translator().model().to_string(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
    })
}

/// `POST /api/ai-search` - translate a free-text query and run it
pub async fn ai_search(
    State(state): State<AppState>,
    payload: Result<Json<AiSearchRequest>, JsonRejection>,
) -> Result<Json<AiSearchOutcome>, ApiError> {
    let Json(req) = payload?;
    let query = req.query.unwrap_or_default();
    let outcome = state.search.search(&query).await?;
    Ok(Json(outcome))
}

/// `GET /api/search/:job_no` - barcode lookup
pub async fn find_by_job_no(
    State(state): State<AppState>,
    Path(job_no): Path<String>,
) -> Result<Json<RecordResponse>, ApiError> {
    let job_no = job_no.trim();
    if job_no.is_empty() {
        return Err(ApiError::BadRequest("Job No. is required".to_string()));
    }

    let record = state
        .store
        .find_by_job_no(job_no)
        .await
        .map_err(SearchError::from)?
        .ok_or_else(|| ApiError::NotFound("Record not found".to_string()))?;
    Ok(Json(RecordResponse { record }))
}

/// `GET /api/items`
pub async fn list_items(State(state): State<AppState>) -> Result<Json<RecordsResponse>, ApiError> {
    let records = state.store.list_all().await.map_err(SearchError::from)?;
    log::info!("Listed {} records", records.len());
    Ok(Json(RecordsResponse { records }))
}

/// `POST /api/update/:record_id` - body is the field map to write
pub async fn update_record(
    State(state): State<AppState>,
    Path(record_id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<RecordResponse>, ApiError> {
    let Json(body) = payload?;
    let Value::Object(fields) = body else {
        return Err(ApiError::BadRequest(
            "Body must be an object of field values".to_string(),
        ));
    };
    if fields.is_empty() {
        return Err(ApiError::BadRequest("No fields to update".to_string()));
    }

    let record = state
        .store
        .update(&record_id, fields)
        .await
        .map_err(SearchError::from)?;
    log::info!("Updated record {}", record.id);
    Ok(Json(RecordResponse { record }))
}

/// `POST /api/linesheet`
pub async fn line_sheet(
    State(state): State<AppState>,
    payload: Result<Json<LineSheetRequest>, JsonRejection>,
) -> Result<Json<LineSheet>, ApiError> {
    let Json(req) = payload?;
    let discount = Discount::new(req.discount_percent)?;
    let sheet = line_sheet_for(state.store.as_ref(), &req.record_ids, discount).await?;
    Ok(Json(sheet))
}

// In-process stand-ins for Airtable and an OpenAI-compatible completion API.
#![allow(dead_code)]

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const API_KEY: &str = "pat-test";
pub const BASE_ID: &str = "appTEST";
pub const TABLE: &str = "Inventory Items";
pub const PAGE_SIZE: usize = 2;

pub const EMERALD_FORMULA: &str =
    "AND(FIND(\"rn\", LOWER({Design})), FIND(\"emerald\", LOWER({AI Description})))";

pub async fn spawn(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

/// An address nothing listens on
pub async fn closed_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

pub fn sample_records() -> Vec<Value> {
    vec![
        json!({
            "id": "rec001",
            "createdTime": "2026-01-05T10:00:00.000Z",
            "fields": {
                "Job No.": "4717547",
                "Design": "rn-2231-wg",
                "Purity": "14K",
                "Set Cts.": 1.25,
                "AI Description": "white gold emerald solitaire ring",
                "HD Image": [{"id": "att1", "url": "https://cdn.example/hd/4717547.jpg"}],
                "Tag Price (CAD)": 4199.5,
                "Tag Price Rounded (CAD)": 4200
            }
        }),
        json!({
            "id": "rec002",
            "createdTime": "2026-01-05T10:01:00.000Z",
            "fields": {
                "Job No.": "4717548",
                "Design": "er-0101-yg",
                "Purity": "10K",
                "Set Cts.": 0.5,
                "AI Description": "yellow gold princess stud earrings",
                "Image": "https://cdn.example/4717548.jpg",
                "Tag Price (CAD)": 980
            }
        }),
        json!({
            "id": "rec003",
            "createdTime": "2026-01-05T10:02:00.000Z",
            "fields": {
                "Job No.": "4717549",
                "Design": "nt-7777-rg",
                "AI Description": "rose gold oval halo pendant"
            }
        }),
    ]
}

#[derive(Clone, Default)]
pub struct FakeAirtable {
    pub records: Arc<Mutex<Vec<Value>>>,
    pub list_calls: Arc<AtomicUsize>,
    pub formulas: Arc<Mutex<Vec<String>>>,
}

impl FakeAirtable {
    pub fn with_records(records: Vec<Value>) -> Self {
        Self {
            records: Arc::new(Mutex::new(records)),
            ..Default::default()
        }
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn record(&self, id: &str) -> Option<Value> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .find(|r| r["id"] == id)
            .cloned()
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route("/v0/:base/:table", get(airtable_list))
            .route(
                "/v0/:base/:table/:record_id",
                get(airtable_get).patch(airtable_update),
            )
            .with_state(self.clone())
    }
}

fn airtable_error(status: StatusCode, kind: &str, message: &str) -> (StatusCode, Json<Value>) {
    (status, Json(json!({"error": {"type": kind, "message": message}})))
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(|v| v == format!("Bearer {}", API_KEY))
        .unwrap_or(false)
}

fn check_table(base: &str, table: &str) -> Result<(), (StatusCode, Json<Value>)> {
    if base == BASE_ID && table == TABLE {
        Ok(())
    } else {
        Err((StatusCode::NOT_FOUND, Json(json!({"error": "NOT_FOUND"}))))
    }
}

fn text(record: &Value, field: &str) -> String {
    match &record["fields"][field] {
        Value::String(s) => s.to_lowercase(),
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    }
}

fn matches_formula(record: &Value, formula: &str) -> Result<bool, String> {
    if let Some(rest) = formula.strip_prefix("{Job No.} = \"") {
        let job_no = rest.trim_end_matches('"');
        return Ok(text(record, "Job No.") == job_no);
    }
    if formula.contains("CONTAINS") {
        return Err("Unknown function names: CONTAINS".to_string());
    }
    if formula == EMERALD_FORMULA {
        return Ok(text(record, "Design").contains("rn")
            && text(record, "AI Description").contains("emerald"));
    }
    Ok(false)
}

async fn airtable_list(
    State(fake): State<FakeAirtable>,
    Path((base, table)): Path<(String, String)>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    fake.list_calls.fetch_add(1, Ordering::SeqCst);
    if !authorized(&headers) {
        return Err(airtable_error(
            StatusCode::UNAUTHORIZED,
            "AUTHENTICATION_REQUIRED",
            "Authentication required",
        ));
    }
    check_table(&base, &table)?;

    let records = fake.records.lock().unwrap().clone();
    let mut matching = Vec::new();
    match params.get("filterByFormula") {
        Some(formula) => {
            fake.formulas.lock().unwrap().push(formula.clone());
            for record in records {
                match matches_formula(&record, formula) {
                    Ok(true) => matching.push(record),
                    Ok(false) => {}
                    Err(message) => {
                        return Err(airtable_error(
                            StatusCode::UNPROCESSABLE_ENTITY,
                            "INVALID_FILTER_BY_FORMULA",
                            &format!("The formula for filtering records is invalid: {}", message),
                        ))
                    }
                }
            }
        }
        None => matching = records,
    }

    if let Some(max) = params.get("maxRecords").and_then(|m| m.parse::<usize>().ok()) {
        matching.truncate(max);
    }

    let start: usize = params
        .get("offset")
        .and_then(|o| o.strip_prefix("itr"))
        .and_then(|o| o.parse().ok())
        .unwrap_or(0);
    let end = (start + PAGE_SIZE).min(matching.len());
    let page: Vec<Value> = matching.get(start..end).map(|s| s.to_vec()).unwrap_or_default();

    let mut body = json!({ "records": page });
    if end < matching.len() {
        body["offset"] = json!(format!("itr{}", end));
    }
    Ok(Json(body))
}

async fn airtable_get(
    State(fake): State<FakeAirtable>,
    Path((base, table, record_id)): Path<(String, String, String)>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    check_table(&base, &table)?;
    fake.record(&record_id).map(Json).ok_or_else(|| {
        airtable_error(
            StatusCode::NOT_FOUND,
            "MODEL_ID_NOT_FOUND",
            "Could not find a record with that ID",
        )
    })
}

async fn airtable_update(
    State(fake): State<FakeAirtable>,
    Path((base, table, record_id)): Path<(String, String, String)>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    check_table(&base, &table)?;
    let Some(fields) = body.get("fields").and_then(Value::as_object).cloned() else {
        return Err(airtable_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "INVALID_REQUEST_MISSING_FIELDS",
            "Could not find field \"fields\" in the request body",
        ));
    };
    if fields.contains_key("Colour") {
        return Err(airtable_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "UNKNOWN_FIELD_NAME",
            "Unknown field name: \"Colour\"",
        ));
    }

    let mut records = fake.records.lock().unwrap();
    let record = records
        .iter_mut()
        .find(|r| r["id"] == record_id.as_str())
        .ok_or_else(|| {
            airtable_error(
                StatusCode::NOT_FOUND,
                "MODEL_ID_NOT_FOUND",
                "Could not find a record with that ID",
            )
        })?;
    if let Some(existing) = record["fields"].as_object_mut() {
        existing.extend(fields);
    }
    Ok(Json(record.clone()))
}

/// Replies keyed by a substring of the prompt's query line
#[derive(Clone, Default)]
pub struct FakeLlm {
    pub replies: Arc<Mutex<Vec<(String, String)>>>,
    pub calls: Arc<AtomicUsize>,
    pub last_body: Arc<Mutex<Option<Value>>>,
    pub last_headers: Arc<Mutex<Option<HeaderMap>>>,
    /// When set, every call fails with this status
    pub fail_status: Arc<Mutex<Option<StatusCode>>>,
}

impl FakeLlm {
    pub fn reply(self, query: &str, content: &str) -> Self {
        self.replies
            .lock()
            .unwrap()
            .push((format!("Query: \"{}\"", query), content.to_string()));
        self
    }

    pub fn failing(self, status: StatusCode) -> Self {
        *self.fail_status.lock().unwrap() = Some(status);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route("/chat/completions", post(chat_completions))
            .route("/api/chat", post(ollama_chat))
            .with_state(self.clone())
    }

    fn record_call(&self, headers: HeaderMap, body: &Value) -> Result<String, (StatusCode, Json<Value>)> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_body.lock().unwrap() = Some(body.clone());
        *self.last_headers.lock().unwrap() = Some(headers);

        if let Some(status) = *self.fail_status.lock().unwrap() {
            return Err((status, Json(json!({"error": {"message": "upstream says no"}}))));
        }

        let prompt = body["messages"][0]["content"].as_str().unwrap_or_default();
        Ok(self
            .replies
            .lock()
            .unwrap()
            .iter()
            .find(|(key, _)| prompt.contains(key.as_str()))
            .map(|(_, reply)| reply.clone())
            .unwrap_or_else(|| "FIND(\"zz\", LOWER({Design}))".to_string()))
    }
}

async fn chat_completions(
    State(fake): State<FakeLlm>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let content = fake.record_call(headers, &body)?;
    Ok(Json(json!({
        "id": "gen-1",
        "model": body["model"],
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }],
        "usage": {"prompt_tokens": 900, "completion_tokens": 40, "total_tokens": 940}
    })))
}

async fn ollama_chat(
    State(fake): State<FakeLlm>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let content = fake.record_call(headers, &body)?;
    Ok(Json(json!({
        "model": body["model"],
        "message": {"role": "assistant", "content": content},
        "done": true,
        "done_reason": "stop",
        "prompt_eval_count": 900,
        "eval_count": 40
    })))
}

//! API error type mapped to HTTP status codes.
//!
//! Every error response body is `{"error": "message"}`; query execution
//! failures also carry the attempted `formula`.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::search::SearchError;

#[derive(Debug)]
pub enum ApiError {
    /// 400
    BadRequest(String),
    /// 404
    NotFound(String),
    /// 500, with the formula the backend refused
    QueryFailed { formula: String, message: String },
    /// 500
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, json!({ "error": msg })),
            ApiError::QueryFailed { formula, message } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": message, "formula": formula }),
            ),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": msg })),
        };
        (status, Json(body)).into_response()
    }
}

impl From<SearchError> for ApiError {
    fn from(error: SearchError) -> Self {
        match error {
            SearchError::InvalidInput(msg) => ApiError::BadRequest(msg),
            SearchError::NotFound(msg) => ApiError::NotFound(msg),
            SearchError::QueryExecutionFailed { formula, message } => {
                ApiError::QueryFailed { formula, message }
            }
            other => {
                log::error!("Request failed: {}", other);
                ApiError::Internal(other.to_string())
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

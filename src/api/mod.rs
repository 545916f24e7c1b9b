//! JSON API built on Axum.
//!
//! Routes mirror the inventory browser's server: AI search, barcode lookup,
//! listing, field updates and line sheet pricing.

pub mod errors;
pub mod handlers;

use anyhow::{Context, Result};
use axum::routing::{get, post};
use axum::Router;
use std::net::SocketAddr;

use crate::state::AppState;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/ai-search", post(handlers::ai_search))
        .route("/api/search/:job_no", get(handlers::find_by_job_no))
        .route("/api/items", get(handlers::list_items))
        .route("/api/update/:record_id", post(handlers::update_record))
        .route("/api/linesheet", post(handlers::line_sheet))
        .with_state(state)
}

/// Serve the API on `0.0.0.0:port` until the process is stopped
pub async fn serve(state: AppState, port: u16) -> Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    log::info!("Inventory API listening on http://{}", addr);

    axum::serve(listener, create_router(state))
        .await
        .context("API server stopped unexpectedly")
}

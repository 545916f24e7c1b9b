// Shared service state handed to the API handlers

use std::sync::Arc;
use std::time::Instant;

use crate::record_store::RecordStore;
use crate::search::AiSearchService;

#[derive(Clone)]
pub struct AppState {
    /// Query translation plus store execution
    pub search: Arc<AiSearchService>,
    /// Direct record access (lookup, listing, updates, line sheets)
    pub store: Arc<dyn RecordStore>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(search: Arc<AiSearchService>, store: Arc<dyn RecordStore>) -> Self {
        Self {
            search,
            store,
            started_at: Instant::now(),
        }
    }
}

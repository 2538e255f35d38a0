//! Health handler

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub store_reachable: bool,
    pub cached_queries: u64,
}

/// GET /api/health - Service and data-store status
pub async fn get_health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let store_reachable = state.store.health_check().await;
    Json(HealthResponse {
        status: if store_reachable { "ok" } else { "degraded" },
        store_reachable,
        cached_queries: state.cache.entry_count(),
    })
}

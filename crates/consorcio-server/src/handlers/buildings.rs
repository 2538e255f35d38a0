//! Building handlers

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::{AppError, AppState};
use consorcio_core::{Building, QueryKey};

#[derive(Debug, Deserialize)]
pub struct BuildingQuery {
    pub id: Option<String>,
}

#[derive(Serialize)]
pub struct BuildingListResponse {
    pub buildings: Vec<Building>,
}

/// GET /api/buildings - List buildings, optionally filtered to one id
pub async fn list_buildings(
    State(state): State<Arc<AppState>>,
    Query(params): Query<BuildingQuery>,
) -> Result<Json<BuildingListResponse>, AppError> {
    // Only the unfiltered listing is cached; id lookups are rare and
    // go straight to the store.
    let buildings = match params.id.as_deref() {
        Some(id) => state.store.list_buildings(Some(id)).await?,
        None => {
            let store = state.store.clone();
            state
                .cache
                .get_or_fetch(&QueryKey::BuildingList, move || async move {
                    store.list_buildings(None).await
                })
                .await?
        }
    };
    Ok(Json(BuildingListResponse { buildings }))
}

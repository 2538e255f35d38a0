//! Provider handlers

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Serialize;

use crate::{AppError, AppState};
use consorcio_core::{badge_for_category, BadgeStyle, Provider, QueryKey};

/// A provider decorated with the badge style its category maps to
#[derive(Serialize)]
pub struct ProviderWithBadge {
    #[serde(flatten)]
    pub provider: Provider,
    pub badge: BadgeStyle,
}

#[derive(Serialize)]
pub struct ProviderListResponse {
    pub providers: Vec<ProviderWithBadge>,
}

/// GET /api/providers - List providers with resolved category name and
/// display badge
pub async fn list_providers(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ProviderListResponse>, AppError> {
    let store = state.store.clone();
    let providers: Vec<Provider> = state
        .cache
        .get_or_fetch(&QueryKey::ProviderList, move || async move {
            store.list_providers().await
        })
        .await?;

    let providers = providers
        .into_iter()
        .map(|provider| ProviderWithBadge {
            badge: badge_for_category(provider.category_name.as_deref()),
            provider,
        })
        .collect();

    Ok(Json(ProviderListResponse { providers }))
}

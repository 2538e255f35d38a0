//! Provider operations
//!
//! Providers are created out-of-band and only read here, to populate
//! the admin form's provider selector. Category names come from the
//! `provider_categories` reference table, merged in application code.

use std::collections::HashMap;

use crate::error::Result;
use crate::models::{Provider, ProviderCategory};

use super::StoreClient;

impl StoreClient {
    /// List all providers with their category name resolved.
    pub async fn list_providers(&self) -> Result<Vec<Provider>> {
        let query = vec![
            ("select", "*".to_string()),
            ("order", "name.asc".to_string()),
        ];
        let mut providers: Vec<Provider> = self.select("providers", &query).await?;
        if providers.is_empty() {
            return Ok(providers);
        }

        let categories = self.list_provider_categories().await?;
        let by_id: HashMap<&str, &str> = categories
            .iter()
            .map(|c| (c.id.as_str(), c.name.as_str()))
            .collect();

        for provider in &mut providers {
            provider.category_name = provider
                .category_id
                .as_deref()
                .and_then(|id| by_id.get(id))
                .map(|name| name.to_string());
        }
        Ok(providers)
    }

    /// List the static provider-category reference data.
    pub async fn list_provider_categories(&self) -> Result<Vec<ProviderCategory>> {
        let query = vec![("select", "*".to_string())];
        self.select("provider_categories", &query).await
    }
}

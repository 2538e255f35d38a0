//! Building operations
//!
//! Buildings are read-only from the application's perspective.

use crate::error::Result;
use crate::models::Building;

use super::StoreClient;

impl StoreClient {
    /// List buildings, optionally narrowed to a single id.
    pub async fn list_buildings(&self, id: Option<&str>) -> Result<Vec<Building>> {
        let mut query = vec![
            ("select", "*".to_string()),
            ("order", "address.asc".to_string()),
        ];
        if let Some(id) = id {
            query.push(("id", format!("eq.{}", id)));
        }
        self.select("buildings", &query).await
    }

    /// Fetch one building by id.
    pub async fn get_building(&self, id: &str) -> Result<Option<Building>> {
        let mut rows = self.list_buildings(Some(id)).await?;
        Ok(rows.pop())
    }
}

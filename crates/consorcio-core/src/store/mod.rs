//! Remote data-store access layer
//!
//! All durable state lives in a hosted relational data store exposing
//! table-level CRUD over HTTPS (PostgREST conventions). This module is
//! organized by domain:
//! - `buildings` - Building reads
//! - `providers` - Provider reads with category resolution
//! - `expenses` - Monthly expense reads and bulk insert
//! - `projects` - Full project lifecycle
//!
//! Reads are retried a bounded number of times with exponential
//! backoff; mutations are never auto-retried.

use std::time::Duration;

use reqwest::{header, Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::StoreConfig;
use crate::error::{Error, Result};

mod buildings;
mod expenses;
mod projects;
mod providers;

#[cfg(test)]
mod tests;

pub use expenses::ExpenseFilter;

/// Hard cap on automatic retries for idempotent reads
const MAX_READ_RETRIES: u32 = 2;

/// Base delay for read-retry backoff (doubles per attempt)
const RETRY_BASE_DELAY: Duration = Duration::from_millis(250);

/// HTTP client for the remote data store
///
/// Cheap to clone; all clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct StoreClient {
    http_client: Client,
    config: StoreConfig,
}

impl StoreClient {
    /// Create a client from explicit configuration.
    pub fn new(config: StoreConfig) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(Error::Http)?;
        Ok(Self {
            http_client,
            config,
        })
    }

    /// Create a client from environment configuration.
    pub fn from_env() -> Result<Self> {
        Self::new(StoreConfig::from_env()?)
    }

    /// Base URL of the data store (for diagnostics).
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.config.base_url, table)
    }

    fn request(&self, method: Method, table: &str) -> RequestBuilder {
        self.http_client
            .request(method, self.table_url(table))
            .header("apikey", &self.config.api_key)
            .bearer_auth(&self.config.api_key)
            .header(header::CONTENT_TYPE, "application/json")
    }

    /// Read rows from a table, retrying transient failures.
    ///
    /// `query` holds PostgREST-style pairs, e.g. `("building_id",
    /// "eq.b1")` or `("order", "created_at.desc")`.
    pub(crate) async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<T>> {
        let mut attempt = 0u32;
        loop {
            let result = self.select_once(table, query).await;
            match result {
                Ok(rows) => return Ok(rows),
                Err(e) if e.is_retryable() && attempt < MAX_READ_RETRIES => {
                    let delay = RETRY_BASE_DELAY * 2u32.pow(attempt);
                    warn!(table, %e, attempt, "Data-store read failed, retrying");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn select_once<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<T>> {
        let response = self
            .request(Method::GET, table)
            .query(query)
            .send()
            .await?;
        let response = check_status(response).await?;
        Ok(response.json().await?)
    }

    /// Insert rows into a table, returning the stored representation.
    pub(crate) async fn insert<T, R>(&self, table: &str, rows: &[T]) -> Result<Vec<R>>
    where
        T: Serialize,
        R: DeserializeOwned,
    {
        debug!(table, count = rows.len(), "Inserting rows");
        let response = self
            .request(Method::POST, table)
            .header("Prefer", "return=representation")
            .json(rows)
            .send()
            .await?;
        let response = check_status(response).await?;
        Ok(response.json().await?)
    }

    /// Patch rows matching `id`, returning the updated representation.
    ///
    /// Matches zero-or-more rows; an empty result means the id did not
    /// exist.
    pub(crate) async fn update_by_id<T, R>(&self, table: &str, id: &str, patch: &T) -> Result<Vec<R>>
    where
        T: Serialize,
        R: DeserializeOwned,
    {
        let response = self
            .request(Method::PATCH, table)
            .query(&[("id", format!("eq.{}", id))])
            .header("Prefer", "return=representation")
            .json(patch)
            .send()
            .await?;
        let response = check_status(response).await?;
        Ok(response.json().await?)
    }

    /// Delete rows matching `id`.
    ///
    /// Delete-by-filter matches zero-or-more rows, so deleting an id
    /// that does not exist succeeds.
    pub(crate) async fn delete_by_id(&self, table: &str, id: &str) -> Result<()> {
        let response = self
            .request(Method::DELETE, table)
            .query(&[("id", format!("eq.{}", id))])
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }

    /// Cheap connectivity probe against the buildings table.
    pub async fn health_check(&self) -> bool {
        let query = [("select", "id".to_string()), ("limit", "1".to_string())];
        self.select_once::<serde_json::Value>("buildings", &query)
            .await
            .is_ok()
    }
}

/// Map a non-success response to a store error, extracting the store's
/// own message when the body carries one.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| {
            v.get("message")
                .or_else(|| v.get("error"))
                .and_then(|m| m.as_str())
                .map(String::from)
        })
        .unwrap_or_else(|| {
            if body.is_empty() {
                status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string()
            } else {
                body
            }
        });

    if status == StatusCode::NOT_FOUND {
        return Err(Error::NotFound(message));
    }
    Err(Error::Store {
        status: status.as_u16(),
        message,
    })
}

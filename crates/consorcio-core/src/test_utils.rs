//! Test utilities for consorcio-core
//!
//! Provides a mock data-store server implementing the PostgREST subset
//! the [`crate::store::StoreClient`] speaks: table reads with `eq.`
//! filters, bulk insert with id assignment, patch-by-id, and
//! delete-by-filter. Used by core and server integration tests.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::Value;
use tokio::sync::oneshot;

use crate::config::StoreConfig;
use crate::store::StoreClient;

#[derive(Clone, Default)]
struct StoreState {
    tables: Arc<Mutex<HashMap<String, Vec<Value>>>>,
    next_id: Arc<AtomicU64>,
}

/// Mock data-store server for testing
pub struct MockStoreServer {
    addr: SocketAddr,
    state: StoreState,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockStoreServer {
    /// Start the mock server on an available port.
    pub async fn start() -> Self {
        let state = StoreState::default();
        let app = Router::new()
            .route(
                "/rest/v1/:table",
                get(handle_select)
                    .post(handle_insert)
                    .patch(handle_update)
                    .delete(handle_delete),
            )
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            state,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Base URL for this mock server.
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// A store client pointed at this mock server.
    pub fn client(&self) -> StoreClient {
        StoreClient::new(StoreConfig::new(&self.url(), "test-key"))
            .expect("mock store client")
    }

    /// Insert rows directly, bypassing the HTTP surface. Rows keep the
    /// ids the caller supplies; missing ids and timestamps are filled in.
    pub fn seed(&self, table: &str, rows: Vec<Value>) {
        let mut tables = self.state.tables.lock().unwrap();
        let stored = tables.entry(table.to_string()).or_default();
        for mut row in rows {
            complete_row(table, &mut row, &self.state.next_id);
            stored.push(row);
        }
    }

    /// Current contents of a table.
    pub fn rows(&self, table: &str) -> Vec<Value> {
        self.state
            .tables
            .lock()
            .unwrap()
            .get(table)
            .cloned()
            .unwrap_or_default()
    }

    /// Number of rows currently in a table.
    pub fn count(&self, table: &str) -> usize {
        self.rows(table).len()
    }

    /// Stop the mock server.
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockStoreServer {
    fn drop(&mut self) {
        self.stop();
    }
}

fn complete_row(table: &str, row: &mut Value, next_id: &AtomicU64) {
    let Some(object) = row.as_object_mut() else {
        return;
    };
    if !object.contains_key("id") {
        let n = next_id.fetch_add(1, Ordering::SeqCst) + 1;
        object.insert("id".to_string(), Value::String(format!("{}_{}", table, n)));
    }
    if !object.contains_key("created_at") {
        object.insert(
            "created_at".to_string(),
            Value::String(chrono::Utc::now().to_rfc3339()),
        );
    }
}

/// Does a row satisfy every `eq.` filter in the query string?
fn row_matches(row: &Value, filters: &[(String, String)]) -> bool {
    filters.iter().all(|(field, needle)| {
        match row.get(field) {
            Some(Value::String(s)) => s == needle,
            Some(Value::Number(n)) => n.to_string() == *needle,
            Some(Value::Bool(b)) => b.to_string() == *needle,
            _ => false,
        }
    })
}

fn eq_filters(params: &HashMap<String, String>) -> Vec<(String, String)> {
    params
        .iter()
        .filter(|(key, _)| !matches!(key.as_str(), "select" | "order" | "limit"))
        .filter_map(|(key, value)| {
            value
                .strip_prefix("eq.")
                .map(|needle| (key.clone(), needle.to_string()))
        })
        .collect()
}

async fn handle_select(
    State(state): State<StoreState>,
    Path(table): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Vec<Value>> {
    let filters = eq_filters(&params);
    let tables = state.tables.lock().unwrap();
    let mut rows: Vec<Value> = tables
        .get(&table)
        .map(|rows| {
            rows.iter()
                .filter(|row| row_matches(row, &filters))
                .cloned()
                .collect()
        })
        .unwrap_or_default();

    if let Some(order) = params.get("order") {
        if let Some((field, direction)) = order.rsplit_once('.') {
            let field = field.to_string();
            rows.sort_by(|a, b| {
                let left = a.get(&field).and_then(Value::as_str).unwrap_or_default();
                let right = b.get(&field).and_then(Value::as_str).unwrap_or_default();
                left.cmp(right)
            });
            if direction == "desc" {
                rows.reverse();
            }
        }
    }
    if let Some(limit) = params.get("limit").and_then(|l| l.parse::<usize>().ok()) {
        rows.truncate(limit);
    }

    Json(rows)
}

async fn handle_insert(
    State(state): State<StoreState>,
    Path(table): Path<String>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<Vec<Value>>), StatusCode> {
    // PostgREST accepts a single object or an array of objects.
    let rows = match body {
        Value::Array(rows) => rows,
        object @ Value::Object(_) => vec![object],
        _ => return Err(StatusCode::BAD_REQUEST),
    };

    let mut tables = state.tables.lock().unwrap();
    let stored = tables.entry(table.clone()).or_default();
    let mut created = Vec::with_capacity(rows.len());
    for mut row in rows {
        complete_row(&table, &mut row, &state.next_id);
        stored.push(row.clone());
        created.push(row);
    }
    Ok((StatusCode::CREATED, Json(created)))
}

async fn handle_update(
    State(state): State<StoreState>,
    Path(table): Path<String>,
    Query(params): Query<HashMap<String, String>>,
    Json(patch): Json<Value>,
) -> Result<Json<Vec<Value>>, StatusCode> {
    let Some(fields) = patch.as_object() else {
        return Err(StatusCode::BAD_REQUEST);
    };
    let filters = eq_filters(&params);

    let mut tables = state.tables.lock().unwrap();
    let mut updated = Vec::new();
    if let Some(rows) = tables.get_mut(&table) {
        for row in rows.iter_mut() {
            if row_matches(row, &filters) {
                if let Some(object) = row.as_object_mut() {
                    for (key, value) in fields {
                        object.insert(key.clone(), value.clone());
                    }
                }
                updated.push(row.clone());
            }
        }
    }
    Ok(Json(updated))
}

async fn handle_delete(
    State(state): State<StoreState>,
    Path(table): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> StatusCode {
    let filters = eq_filters(&params);
    let mut tables = state.tables.lock().unwrap();
    if let Some(rows) = tables.get_mut(&table) {
        rows.retain(|row| !row_matches(row, &filters));
    }
    // Delete-by-filter succeeds whether or not anything matched.
    StatusCode::NO_CONTENT
}

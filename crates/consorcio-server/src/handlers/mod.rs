//! HTTP request handlers organized by domain
//!
//! Each submodule contains handlers for a specific API area.

pub mod buildings;
pub mod expenses;
pub mod health;
pub mod projects;
pub mod providers;

// Re-export all handlers for use in router
pub use buildings::*;
pub use expenses::*;
pub use health::*;
pub use projects::*;
pub use providers::*;

use axum::extract::Request;
use serde::de::DeserializeOwned;

use crate::{AppError, MAX_BODY_SIZE};

/// Extract and parse a JSON request body, mapping failures to 400.
pub(crate) async fn read_json_body<T: DeserializeOwned>(request: Request) -> Result<T, AppError> {
    let bytes = axum::body::to_bytes(request.into_body(), MAX_BODY_SIZE)
        .await
        .map_err(|_| AppError::bad_request("Invalid request body"))?;
    serde_json::from_slice(&bytes).map_err(|_| AppError::bad_request("Invalid JSON"))
}

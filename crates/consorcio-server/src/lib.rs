//! Consorcio Web Server
//!
//! Axum-based REST API for the Consorcio building-expense
//! administration service. The server owns no durable state: every
//! handler is a thin layer that validates input shape, reads through
//! the filter-keyed query cache, forwards to the remote data store,
//! and maps store errors to HTTP status codes.
//!
//! Identity is delegated upstream (reverse proxy / identity provider);
//! this server carries no session handling of its own.

use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing::{error, info};

use consorcio_core::{Error as CoreError, QueryCache, StoreClient};

mod handlers;

/// Maximum accepted request body size (256 KiB; bodies are small forms)
pub const MAX_BODY_SIZE: usize = 256 * 1024;

/// Server configuration
#[derive(Clone, Default)]
pub struct ServerConfig {
    /// Allowed CORS origins (empty = same-origin only)
    pub allowed_origins: Vec<String>,
}

/// Shared application state
pub struct AppState {
    pub store: StoreClient,
    pub cache: QueryCache,
    pub config: ServerConfig,
}

/// Application error type with proper HTTP status codes
///
/// Error bodies take the shape `{error, message?}`. Internal detail is
/// logged, never leaked to the client.
pub struct AppError {
    status: StatusCode,
    error: String,
    message: Option<String>,
    internal: Option<anyhow::Error>,
}

impl AppError {
    pub fn bad_request(message: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error: "Validation error".to_string(),
            message: Some(message.to_string()),
            internal: None,
        }
    }

    pub fn not_found(message: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            error: "Not found".to_string(),
            message: Some(message.to_string()),
            internal: None,
        }
    }

    pub fn internal(err: anyhow::Error) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            error: "An internal error occurred".to_string(),
            message: None,
            internal: Some(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let Some(err) = &self.internal {
            error!(error = %err, "Internal error");
        }

        let body = match &self.message {
            Some(message) => serde_json::json!({
                "error": self.error,
                "message": message,
            }),
            None => serde_json::json!({ "error": self.error }),
        };

        (self.status, Json(body)).into_response()
    }
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidData(message) => Self::bad_request(&message),
            CoreError::NotFound(message) => Self::not_found(&message),
            other => Self::internal(other.into()),
        }
    }
}

/// Success envelope shared by mutation responses
#[derive(Serialize)]
pub struct SuccessResponse {
    pub success: bool,
    pub message: String,
}

/// Create the application router.
pub fn create_router(store: StoreClient, static_dir: Option<&str>, config: ServerConfig) -> Router {
    let state = Arc::new(AppState {
        store,
        cache: QueryCache::new(),
        config: config.clone(),
    });

    let api_routes = Router::new()
        // Health
        .route("/health", get(handlers::get_health))
        // Expenses
        .route("/expenses", get(handlers::list_expenses))
        .route("/expenses/months", get(handlers::list_expense_months))
        .route("/expenses/summary", get(handlers::get_expense_summary))
        .route("/expenses/add", axum::routing::post(handlers::add_expense))
        .route(
            "/expenses/add-bulk",
            axum::routing::post(handlers::add_expenses_bulk),
        )
        // Projects
        .route("/projects", get(handlers::list_projects))
        .route("/projects/add", axum::routing::post(handlers::add_project))
        .route(
            "/projects/add-bulk",
            axum::routing::post(handlers::add_projects_bulk),
        )
        .route(
            "/projects/:id",
            get(handlers::get_project)
                .patch(handlers::update_project)
                .delete(handlers::delete_project),
        )
        // Providers
        .route("/providers", get(handlers::list_providers))
        // Buildings
        .route("/buildings", get(handlers::list_buildings));

    // Build CORS layer
    let cors = if config.allowed_origins.is_empty() {
        // Restrictive default: only allow same-origin
        CorsLayer::new()
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::CONTENT_TYPE])
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::CONTENT_TYPE])
    };

    let mut app = Router::new()
        .nest("/api", api_routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Serve the dashboard frontend if a directory is provided
    if let Some(dir) = static_dir {
        app = app.fallback_service(ServeDir::new(dir));
    }

    app
}

/// Start the server.
pub async fn serve(
    store: StoreClient,
    host: &str,
    port: u16,
    static_dir: Option<&str>,
) -> anyhow::Result<()> {
    serve_with_config(store, host, port, static_dir, ServerConfig::default()).await
}

/// Start the server with custom configuration.
pub async fn serve_with_config(
    store: StoreClient,
    host: &str,
    port: u16,
    static_dir: Option<&str>,
    config: ServerConfig,
) -> anyhow::Result<()> {
    if store.health_check().await {
        info!("Data store reachable: {}", store.base_url());
    } else {
        // Start anyway; reads will retry and the health endpoint reports it.
        tracing::warn!("Data store not responding: {}", store.base_url());
    }

    let app = create_router(store, static_dir, config);
    let addr = format!("{}:{}", host, port);

    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

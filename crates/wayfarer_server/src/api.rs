//! Routes for triggering migrations over HTTP.

use crate::ApiError;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, instrument};
use wayfarer_error::{ConfigError, WayfarerResult};
use wayfarer_migration::{MigrationOrchestrator, RunRequest, RunResponse};

/// API state holding the orchestrator.
#[derive(Clone)]
pub struct ApiState {
    orchestrator: Arc<MigrationOrchestrator>,
}

impl ApiState {
    /// Creates new API state.
    pub fn new(orchestrator: Arc<MigrationOrchestrator>) -> Self {
        Self { orchestrator }
    }
}

/// Creates the migration API router.
pub fn create_router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/media/migrate", post(migrate))
        .with_state(state)
}

/// Bind `addr` and serve the router until the process is stopped.
///
/// # Errors
///
/// Returns a configuration error when the address cannot be bound.
pub async fn serve(addr: SocketAddr, state: ApiState) -> WayfarerResult<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ConfigError::new(format!("Failed to bind {}: {}", addr, e)))?;
    info!(%addr, "Serving migration API");
    axum::serve(listener, create_router(state))
        .await
        .map_err(|e| ConfigError::new(format!("Server error: {}", e)))?;
    Ok(())
}

/// Health check endpoint.
async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({"status": "ok"})))
}

/// Run a migration for one entity or all of them.
#[instrument(skip(state, request), fields(entity_id = ?request.entity_id, dry_run = request.dry_run))]
async fn migrate(
    State(state): State<ApiState>,
    Json(request): Json<RunRequest>,
) -> Result<Json<RunResponse>, ApiError> {
    let response = state.orchestrator.execute(&request).await?;
    Ok(Json(response))
}

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::config::ServiceConfig;
use crate::error::ServiceError;
use crate::pipeline::{self, RunSummary};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServiceConfig>,
}

impl AppState {
    pub fn new(config: ServiceConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz_handler))
        .route("/api/run", get(run_handler).post(run_handler))
        .route("/api/data", get(data_handler))
        .with_state(state)
}

/// Liveness probe. No dependencies, never fails.
async fn healthz_handler() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

/// Full pipeline including the destination write; responds with the run
/// summary.
async fn run_handler(
    State(state): State<AppState>,
) -> Result<Json<RunSummary>, ServiceError> {
    let config = state.config.clone();
    let summary = tokio::task::spawn_blocking(move || pipeline::run_sync(&config))
        .await
        .map_err(|e| ServiceError::Internal(e.to_string()))??;
    Ok(Json(summary))
}

/// Pipeline without the write; responds with the net-new rows as JSON
/// records keyed by column name.
async fn data_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<serde_json::Value>>, ServiceError> {
    let config = state.config.clone();
    let table = tokio::task::spawn_blocking(move || pipeline::run_report(&config))
        .await
        .map_err(|e| ServiceError::Internal(e.to_string()))??;
    Ok(Json(table.records()))
}

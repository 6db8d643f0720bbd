//! HTTP route handlers for the remote read server.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use bytes::Bytes;

use super::error::ApiError;
use super::metrics::Metrics;
use super::response::SnappyProtobuf;
use crate::pipeline::ReadPipeline;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: ReadPipeline,
    pub metrics: Arc<Metrics>,
}

/// Handle POST /api/v1/read
///
/// Expects a snappy-compressed `ReadRequest` with exactly one query and
/// answers with a snappy-compressed `ReadResponse`.
pub async fn handle_read(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<SnappyProtobuf, ApiError> {
    let encoded = state.pipeline.execute(&body).await?;
    Ok(SnappyProtobuf::from(encoded))
}

/// Handle GET /metrics
pub async fn handle_metrics(State(state): State<AppState>) -> String {
    state.metrics.encode()
}

/// Handle GET /-/healthy
pub async fn handle_healthy() -> (StatusCode, &'static str) {
    (StatusCode::OK, "OK")
}

/// Handle GET /-/ready
///
/// Stores are stateless clients, so the server is ready as soon as it listens.
pub async fn handle_ready() -> (StatusCode, &'static str) {
    (StatusCode::OK, "OK")
}

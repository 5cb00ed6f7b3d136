//! Health probes.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::sync::Arc;

use super::{ApiResponse, AppState};

#[derive(Debug, Serialize)]
pub struct HealthLiveResponse {
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct HealthReadyResponse {
    pub ready: bool,
    pub database: bool,
    pub uptime_seconds: u64,
}

/// `GET /api/health/live`
///
/// Lightweight liveness probe to indicate the API process is running.
pub async fn health_live() -> impl IntoResponse {
    Json(ApiResponse::success(HealthLiveResponse { status: "alive" }))
}

/// `GET /api/health/ready`
///
/// Readiness probe that checks database connectivity.
pub async fn health_ready(State(state): State<Arc<AppState>>) -> Response {
    let database = state.store().ping().await.is_ok();

    let body = HealthReadyResponse {
        ready: database,
        database,
        uptime_seconds: state.start_time.elapsed().as_secs(),
    };

    let status = if database {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(ApiResponse::success(body))).into_response()
}

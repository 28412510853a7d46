//! Health endpoint.

use axum::Json;

use crate::models::HealthResponse;

/// `GET /api/health`: liveness probe.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".into(),
        version: skylog_core::version().into(),
    })
}

//! Health check handlers

use super::types::HealthResponse;
use axum::response::Json;

/// Liveness probe
#[utoipa::path(
    get,
    path = "/healthz",
    tag = "Health",
    summary = "Liveness probe",
    responses(
        (status = 200, description = "Server is alive", body = HealthResponse)
    )
)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

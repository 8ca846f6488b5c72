//! Types shared across handlers

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Liveness probe response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    #[schema(example = "ok")]
    pub status: String,
}

/// Error body returned by every failing endpoint
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    #[schema(example = "validation_error")]
    pub error: String,
    #[schema(example = "Validation error: query must not be empty")]
    pub message: String,
    /// Identifier to correlate with server logs
    pub error_id: Option<String>,
}

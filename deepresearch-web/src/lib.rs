//! Deep Research Web Server
//!
//! HTTP interface over the research workflow: catalog reads, resumable
//! research sessions, gateway pass-throughs and OpenAPI documentation.

pub mod handlers;
pub mod openapi;
pub mod routes;
pub mod server;
pub mod state;

// Re-export main types
pub use server::DeepResearchServer;
pub use state::AppState;

use axum::{
    extract::DefaultBodyLimit,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    Router,
};
use deepresearch_core::{DeepResearchError, LogFormat, LoggingConfig, ProviderErrorKind};
use serde_json::json;
use std::path::PathBuf;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Create the main application router
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .merge(routes::api_routes())
        .merge(
            SwaggerUi::new("/swagger-ui")
                .url("/api-docs/openapi.json", openapi::ApiDoc::openapi()),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(DefaultBodyLimit::max(2 * 1024 * 1024))
        .with_state(state)
}

/// Configuration for the web server
#[derive(Debug, Clone)]
pub struct WebConfig {
    pub host: String,
    pub port: u16,
    /// Enable development mode
    pub dev_mode: bool,
    /// Research configuration file; default locations are searched when unset
    pub config_path: Option<PathBuf>,
    /// Idle research sessions older than this are dropped
    pub session_ttl_seconds: u64,
    pub session_cleanup_interval_seconds: u64,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            dev_mode: false,
            config_path: None,
            session_ttl_seconds: 86_400,
            session_cleanup_interval_seconds: 3600,
        }
    }
}

impl WebConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: std::env::var("DEEPRESEARCH_HOST").unwrap_or(defaults.host),
            port: std::env::var("DEEPRESEARCH_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            dev_mode: std::env::var("DEEPRESEARCH_DEV_MODE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.dev_mode),
            config_path: std::env::var("DEEPRESEARCH_CONFIG").ok().map(PathBuf::from),
            session_ttl_seconds: std::env::var("DEEPRESEARCH_SESSION_TTL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.session_ttl_seconds),
            session_cleanup_interval_seconds: defaults.session_cleanup_interval_seconds,
        }
    }

    /// Get the server address
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Session TTL as a duration; saturates for values beyond what chrono can represent
    pub fn session_ttl(&self) -> chrono::Duration {
        i64::try_from(self.session_ttl_seconds)
            .ok()
            .and_then(chrono::Duration::try_seconds)
            .unwrap_or(chrono::Duration::MAX)
    }
}

/// Error types for the web server
#[derive(thiserror::Error, Debug)]
pub enum WebError {
    #[error("Server error: {0}")]
    Server(#[from] std::io::Error),

    #[error(transparent)]
    Research(#[from] DeepResearchError),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for web operations
pub type WebResult<T> = Result<T, WebError>;

impl WebError {
    /// HTTP status and machine-readable error code
    pub fn status(&self) -> (StatusCode, &'static str) {
        let WebError::Research(error) = self else {
            return (StatusCode::INTERNAL_SERVER_ERROR, "internal_error");
        };

        match error {
            DeepResearchError::Validation { .. } => (StatusCode::BAD_REQUEST, "validation_error"),
            DeepResearchError::NotFound { .. } => (StatusCode::NOT_FOUND, "not_found"),
            DeepResearchError::InvalidState { .. } => (StatusCode::CONFLICT, "invalid_state"),
            DeepResearchError::Provider { kind, .. } => match kind {
                ProviderErrorKind::Auth => (StatusCode::BAD_GATEWAY, "provider_auth"),
                ProviderErrorKind::RateLimit => (StatusCode::TOO_MANY_REQUESTS, "rate_limited"),
                ProviderErrorKind::Transient => {
                    (StatusCode::SERVICE_UNAVAILABLE, "provider_unavailable")
                }
                ProviderErrorKind::Malformed | ProviderErrorKind::Unknown => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "provider_error")
                }
            },
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let (status, error_code) = self.status();
        let error_id = match &self {
            WebError::Research(error) => {
                error.log();
                error.context().map(|c| c.error_id.clone())
            }
            other => {
                tracing::error!(error = %other, "Request failed");
                None
            }
        };

        let body = Json(json!({
            "error": error_code,
            "message": self.to_string(),
            "error_id": error_id,
        }));

        (status, body).into_response()
    }
}

/// Initialize logging for the web server
pub fn init_logging(level: &str, dev_mode: bool) -> WebResult<()> {
    let config = LoggingConfig {
        level: level.to_string(),
        format: if dev_mode {
            LogFormat::Pretty
        } else {
            LogFormat::Json
        },
        include_location: dev_mode,
        filter_directives: vec![
            format!("deepresearch_web={}", level),
            format!("deepresearch_applications={}", level),
            format!("deepresearch_provider={}", level),
            "tower_http=debug".to_string(),
        ],
        ..LoggingConfig::default()
    };

    deepresearch_core::init_logging(&config)
        .map_err(|e| WebError::Config(format!("Failed to initialize logging: {}", e)))
}

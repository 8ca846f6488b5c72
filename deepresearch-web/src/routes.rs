//! Route definitions for the Deep Research web server

use crate::{handlers, AppState};
use axum::{
    routing::{get, post},
    Router,
};

/// Catalog, research session and gateway routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health and catalog
        .route("/healthz", get(handlers::health_check))
        .route("/", get(handlers::api_info))
        .route("/research-modes", get(handlers::research_modes))
        .route("/research-depth-options", get(handlers::research_depth_options))
        .route("/tools", get(handlers::research_tools))
        // Research sessions
        .route("/research", post(handlers::start_research))
        .route(
            "/research/{session_id}",
            get(handlers::get_research).delete(handlers::delete_research),
        )
        .route("/research/{session_id}/answers", post(handlers::submit_answers))
        .route("/research/{session_id}/skip", post(handlers::skip_clarification))
        .route("/research/{session_id}/view", get(handlers::get_research_view))
        .route("/research-analysis", post(handlers::research_analysis))
        // Single gateway stages
        .route("/clarify", post(handlers::clarify))
        .route("/rewrite-prompt", post(handlers::rewrite_prompt))
}

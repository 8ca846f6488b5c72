//! Read-only catalog handlers

use super::types::{ModesResponse, ToolsResponse};
use crate::AppState;
use axum::{extract::State, response::Json};
use deepresearch_applications::{depth_options, get_api_info, list_modes, ApiInfo, DepthOptions};
use deepresearch_provider::all_tool_definitions;

/// Service metadata
#[utoipa::path(
    get,
    path = "/",
    tag = "Catalog",
    summary = "Service metadata",
    responses(
        (status = 200, description = "Service name, version, modes and features", body = ApiInfo)
    )
)]
pub async fn api_info() -> Json<ApiInfo> {
    Json(get_api_info())
}

/// Research modes and their capabilities
#[utoipa::path(
    get,
    path = "/research-modes",
    tag = "Catalog",
    summary = "List research modes",
    responses(
        (status = 200, description = "Every research mode", body = ModesResponse)
    )
)]
pub async fn research_modes() -> Json<ModesResponse> {
    Json(ModesResponse {
        modes: list_modes(),
    })
}

/// Research depth presets
#[utoipa::path(
    get,
    path = "/research-depth-options",
    tag = "Catalog",
    summary = "List research depth presets",
    responses(
        (status = 200, description = "Depth presets and the configured default", body = DepthOptions)
    )
)]
pub async fn research_depth_options(State(state): State<AppState>) -> Json<DepthOptions> {
    Json(depth_options(state.research.research.default_depth))
}

/// Tool definitions available to research models
#[utoipa::path(
    get,
    path = "/tools",
    tag = "Catalog",
    summary = "List research tools",
    responses(
        (status = 200, description = "Tool definitions", body = ToolsResponse)
    )
)]
pub async fn research_tools() -> Json<ToolsResponse> {
    Json(ToolsResponse {
        tools: all_tool_definitions(),
        note: "Deep research models (o3-deep-research, o4-mini-deep-research) only access the search and fetch tools".to_string(),
    })
}

//! Catalog response types

use deepresearch_applications::ModeInfo;
use deepresearch_core::ResearchMode;
use deepresearch_provider::ToolDefinition;
use serde::Serialize;
use std::collections::BTreeMap;
use utoipa::ToSchema;

/// Every research mode keyed by its identifier
#[derive(Debug, Serialize, ToSchema)]
pub struct ModesResponse {
    pub modes: BTreeMap<ResearchMode, ModeInfo>,
}

/// Tool definitions available to research models
#[derive(Debug, Serialize, ToSchema)]
pub struct ToolsResponse {
    #[schema(value_type = Vec<Object>)]
    pub tools: Vec<ToolDefinition>,
    pub note: String,
}

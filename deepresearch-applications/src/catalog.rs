//! Read-only service metadata

use deepresearch_core::{ResearchDepth, ResearchMode};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ApiInfo {
    pub message: String,
    pub version: String,
    pub available_modes: Vec<ResearchMode>,
    pub features: Vec<String>,
}

/// Service name, version, modes and feature list
pub fn get_api_info() -> ApiInfo {
    ApiInfo {
        message: "Deep Research API".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        available_modes: ResearchMode::ALL.to_vec(),
        features: [
            "Deep research with o3-deep-research and o4-mini-deep-research",
            "Three-step workflow: clarification, prompt rewriting, research",
            "Combined WebSearch + MCP research",
            "WebSearch-only research",
            "MCP-only research",
            "Deep research models restricted to the search and fetch tools",
            "Configurable research depth",
        ]
        .iter()
        .map(|f| f.to_string())
        .collect(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct DepthOption {
    pub max_tool_calls: u32,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct DepthOptions {
    pub depth_options: BTreeMap<ResearchDepth, DepthOption>,
    pub default: ResearchDepth,
    pub description: String,
}

/// Depth presets, flagging the configured default
pub fn depth_options(default: ResearchDepth) -> DepthOptions {
    DepthOptions {
        depth_options: ResearchDepth::ALL
            .into_iter()
            .map(|depth| {
                (
                    depth,
                    DepthOption {
                        max_tool_calls: depth.max_tool_calls(),
                        description: depth.description().to_string(),
                    },
                )
            })
            .collect(),
        default,
        description: "Research depth presets trading cost and latency for coverage".to_string(),
    }
}

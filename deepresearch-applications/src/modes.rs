//! Research mode registry

use deepresearch_core::ResearchMode;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Catalog entry describing a research mode
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ModeInfo {
    pub name: String,
    pub description: String,
    pub capabilities: BTreeSet<String>,
    pub workflow: String,
}

const THREE_STEP: &str = "Three-step prompting (clarification, prompt rewriting, research)";

fn entry(name: &str, description: &str, capabilities: &[&str], workflow: &str) -> ModeInfo {
    ModeInfo {
        name: name.to_string(),
        description: description.to_string(),
        capabilities: capabilities.iter().map(|c| c.to_string()).collect(),
        workflow: workflow.to_string(),
    }
}

/// Catalog entry for a single mode
pub fn mode_info(mode: ResearchMode) -> ModeInfo {
    match mode {
        ResearchMode::DeepResearchO3 => entry(
            "Deep Research O3",
            "OpenAI o3-deep-research restricted to the search and fetch tools",
            &["mcp_search", "mcp_fetch", "reasoning_summary"],
            THREE_STEP,
        ),
        ResearchMode::DeepResearchO4Mini => entry(
            "Deep Research O4 Mini",
            "OpenAI o4-mini-deep-research restricted to the search and fetch tools",
            &["mcp_search", "mcp_fetch", "reasoning_summary"],
            THREE_STEP,
        ),
        ResearchMode::WebsearchMcp => entry(
            "WebSearch + MCP",
            "Combined research over the public web and internal MCP sources",
            &["web_search", "mcp_search", "mcp_fetch", "synthesis"],
            "Three-step prompting plus combined source analysis",
        ),
        ResearchMode::WebsearchOnly => entry(
            "WebSearch Only",
            "Research using public web search only",
            &["web_search", "web_analysis"],
            "Three-step prompting plus web-focused research",
        ),
        ResearchMode::McpOnly => entry(
            "MCP Only",
            "Research using internal MCP sources only",
            &["mcp_search", "mcp_fetch", "internal_analysis"],
            "Three-step prompting plus internal source analysis",
        ),
    }
}

/// Every supported mode with its catalog entry
pub fn list_modes() -> BTreeMap<ResearchMode, ModeInfo> {
    ResearchMode::ALL
        .into_iter()
        .map(|mode| (mode, mode_info(mode)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_mode_is_listed_with_capabilities() {
        let modes = list_modes();
        assert_eq!(modes.len(), ResearchMode::ALL.len());
        for mode in ResearchMode::ALL {
            let info = modes.get(&mode).unwrap();
            assert!(!info.capabilities.is_empty());
            assert!(!info.name.is_empty());
        }
    }

    #[test]
    fn test_listing_is_idempotent() {
        assert_eq!(list_modes(), list_modes());
    }

    #[test]
    fn test_serializes_keyed_by_identifier() {
        let value = serde_json::to_value(list_modes()).unwrap();
        assert!(value.get("o3-deep-research").is_some());
        assert!(value.get("mcp-only").is_some());
        assert!(value["websearch-only"]["capabilities"]
            .as_array()
            .unwrap()
            .contains(&serde_json::json!("web_search")));
    }
}

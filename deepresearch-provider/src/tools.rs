//! Tool definitions and per-mode tool surfaces

use deepresearch_core::{McpConfig, ResearchMode};
use serde::{Deserialize, Serialize};
use serde_json::json;

pub const SEARCH_TOOL: &str = "search";
pub const FETCH_TOOL: &str = "fetch";
pub const WEB_SEARCH_TOOL: &str = "web_search";

/// The only tools a constrained-tool research model may call
pub const CONSTRAINED_TOOLS: [&str; 2] = [SEARCH_TOOL, FETCH_TOOL];

/// Function-calling definition as published in the tool catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    #[serde(rename = "type")]
    pub tool_type: String,
    pub function: FunctionDefinition,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDefinition {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

impl ToolDefinition {
    fn function(name: &str, description: &str, parameters: serde_json::Value) -> Self {
        Self {
            tool_type: "function".to_string(),
            function: FunctionDefinition {
                name: name.to_string(),
                description: description.to_string(),
                parameters,
            },
        }
    }

    pub fn name(&self) -> &str {
        &self.function.name
    }
}

pub fn search_tool_definition() -> ToolDefinition {
    ToolDefinition::function(
        SEARCH_TOOL,
        "Search internal documents and data sources exposed by the MCP server",
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "Search query to run against the indexed sources"
                }
            },
            "required": ["query"]
        }),
    )
}

pub fn fetch_tool_definition() -> ToolDefinition {
    ToolDefinition::function(
        FETCH_TOOL,
        "Fetch the full content of a document returned by search",
        json!({
            "type": "object",
            "properties": {
                "id": {
                    "type": "string",
                    "description": "Identifier of the document to fetch"
                }
            },
            "required": ["id"]
        }),
    )
}

pub fn web_search_tool_definition() -> ToolDefinition {
    ToolDefinition::function(
        WEB_SEARCH_TOOL,
        "Search the public web for information on a query",
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "Search query to execute"
                }
            },
            "required": ["query"]
        }),
    )
}

/// Every tool definition the service knows about
pub fn all_tool_definitions() -> Vec<ToolDefinition> {
    vec![
        search_tool_definition(),
        fetch_tool_definition(),
        web_search_tool_definition(),
    ]
}

/// Tool entry in a Responses API request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ToolSpec {
    WebSearchPreview,
    Mcp {
        server_label: String,
        server_url: String,
        allowed_tools: Vec<String>,
        require_approval: String,
    },
}

impl ToolSpec {
    /// MCP entry restricted to the search and fetch tools
    pub fn constrained_mcp(mcp: &McpConfig) -> Self {
        ToolSpec::Mcp {
            server_label: mcp.server_label.clone(),
            server_url: mcp.server_url.clone(),
            allowed_tools: CONSTRAINED_TOOLS.iter().map(|t| t.to_string()).collect(),
            require_approval: mcp.require_approval.clone(),
        }
    }

    /// Callable tool names this entry exposes
    pub fn tool_names(&self) -> Vec<String> {
        match self {
            ToolSpec::WebSearchPreview => vec![WEB_SEARCH_TOOL.to_string()],
            ToolSpec::Mcp { allowed_tools, .. } => allowed_tools.clone(),
        }
    }
}

/// Tools exposed to the research model for a mode
pub fn tool_surface(mode: ResearchMode, mcp: &McpConfig) -> Vec<ToolSpec> {
    let mut surface = Vec::new();
    if mode.uses_web_search() {
        surface.push(ToolSpec::WebSearchPreview);
    }
    if mode.uses_mcp() {
        surface.push(ToolSpec::constrained_mcp(mcp));
    }
    surface
}

/// Flattened tool names of a surface
pub fn surface_tool_names(surface: &[ToolSpec]) -> Vec<String> {
    surface.iter().flat_map(ToolSpec::tool_names).collect()
}

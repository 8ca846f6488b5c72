//! Deep Research Provider - HTTP gateway to the hosted research API
//!
//! Clarification and prompt rewriting go through chat completions with JSON
//! output; research runs through the Responses API with a per-mode tool surface.

pub mod chat;
pub mod client;
pub mod gateway;
pub mod prompts;
pub mod responses;
pub mod tools;

pub use client::{status_error, ApiClientConfig};
pub use gateway::OpenAiGateway;
pub use responses::{into_outcome, OutcomeContext, ResponsesRequest, ResponsesResponse};
pub use tools::{
    all_tool_definitions, tool_surface, ToolDefinition, ToolSpec, CONSTRAINED_TOOLS, FETCH_TOOL,
    SEARCH_TOOL, WEB_SEARCH_TOOL,
};

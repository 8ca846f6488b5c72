//! Chat completions wire types used by the clarify and rewrite calls

use crate::client::malformed;
use deepresearch_core::{ClarificationResponse, DeepResearchResult, PromptRewriteResult};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub response_format: ResponseFormat,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResponseFormat {
    #[serde(rename = "type")]
    pub format_type: String,
}

impl ChatRequest {
    /// Single user message answered with a JSON object
    pub fn json_object(model: &str, prompt: String) -> Self {
        Self {
            model: model.to_string(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt,
            }],
            response_format: ResponseFormat {
                format_type: "json_object".to_string(),
            },
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponseMessage {
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RewriteWire {
    #[serde(default)]
    original_query: Option<String>,
    rewritten_prompt: String,
    #[serde(default)]
    reasoning: String,
}

/// Decode the first choice's content as a JSON document
fn parse_json_content<T: DeserializeOwned>(response: &ChatResponse, operation: &str) -> DeepResearchResult<T> {
    let content = response
        .choices
        .first()
        .and_then(|choice| choice.message.content.as_deref())
        .filter(|content| !content.trim().is_empty())
        .ok_or_else(|| malformed("Provider returned no message content", operation))?;

    serde_json::from_str(content).map_err(|e| {
        malformed(
            format!("Provider message is not the expected JSON object: {}", e),
            operation,
        )
    })
}

pub fn parse_clarification(response: &ChatResponse) -> DeepResearchResult<ClarificationResponse> {
    parse_json_content(response, "clarify")
}

pub fn parse_rewrite(
    response: &ChatResponse,
    original_query: &str,
) -> DeepResearchResult<PromptRewriteResult> {
    let wire: RewriteWire = parse_json_content(response, "rewrite")?;
    if wire.rewritten_prompt.trim().is_empty() {
        return Err(malformed("Provider returned an empty rewritten prompt", "rewrite"));
    }

    Ok(PromptRewriteResult {
        original_query: wire
            .original_query
            .filter(|q| !q.trim().is_empty())
            .unwrap_or_else(|| original_query.to_string()),
        rewritten_prompt: wire.rewritten_prompt,
        reasoning: wire.reasoning,
    })
}

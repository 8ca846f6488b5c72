//! Responses API wire types and their mapping onto research outcomes

use crate::tools::{ToolSpec, FETCH_TOOL, SEARCH_TOOL};
use deepresearch_core::{
    FetchResult, Payload, ResearchMode, ResearchOptions, ResearchOutcome, ResearchStep,
    SearchResult, StepType,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Debug, Clone, Serialize)]
pub struct ResponsesRequest {
    pub model: String,
    pub instructions: String,
    pub input: Vec<InputMessage>,
    pub tools: Vec<ToolSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<Reasoning>,
    pub max_tool_calls: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub background: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct InputMessage {
    pub role: String,
    pub content: Vec<InputContent>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputContent {
    InputText { text: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct Reasoning {
    pub summary: String,
}

impl ResponsesRequest {
    /// Build the research request. Reasoning models get a reasoning summary and no temperature.
    pub fn research(
        model: &str,
        instructions: &str,
        prompt: &str,
        tools: Vec<ToolSpec>,
        options: &ResearchOptions,
        reasoning_model: bool,
    ) -> Self {
        Self {
            model: model.to_string(),
            instructions: instructions.to_string(),
            input: vec![InputMessage {
                role: "user".to_string(),
                content: vec![InputContent::InputText {
                    text: prompt.to_string(),
                }],
            }],
            tools,
            reasoning: reasoning_model.then(|| Reasoning {
                summary: "auto".to_string(),
            }),
            max_tool_calls: options.max_tool_calls,
            max_output_tokens: options.max_tokens,
            temperature: if reasoning_model {
                None
            } else {
                options.temperature
            },
            background: options.background,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResponsesResponse {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub output: Vec<OutputItem>,
    #[serde(default)]
    pub error: Option<ResponseError>,
    #[serde(default)]
    pub incomplete_details: Option<IncompleteDetails>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResponseError {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IncompleteDetails {
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutputItem {
    McpCall {
        #[serde(default)]
        name: String,
        #[serde(default)]
        arguments: Option<String>,
        #[serde(default)]
        output: Option<String>,
        #[serde(default)]
        error: Option<Value>,
    },
    WebSearchCall {
        #[serde(default)]
        status: Option<String>,
        #[serde(default)]
        action: Option<WebSearchAction>,
    },
    Message {
        #[serde(default)]
        content: Vec<ContentPart>,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebSearchAction {
    #[serde(default)]
    pub query: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    OutputText {
        #[serde(default)]
        text: String,
        #[serde(default)]
        annotations: Vec<Annotation>,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Annotation {
    UrlCitation {
        #[serde(default)]
        url: String,
        #[serde(default)]
        title: String,
    },
    #[serde(other)]
    Other,
}

impl ResponsesResponse {
    pub fn status(&self) -> &str {
        self.status.as_deref().unwrap_or("unknown")
    }

    /// A response without a status has nothing left to poll for
    pub fn is_terminal(&self) -> bool {
        match self.status.as_deref() {
            Some(status) => matches!(status, "completed" | "failed" | "cancelled" | "incomplete"),
            None => true,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status.as_deref() == Some("completed") && self.error.is_none()
    }

    /// Human-readable reason for an unsuccessful response
    pub fn failure_message(&self) -> Option<String> {
        if self.is_success() {
            return None;
        }

        let message = self
            .error
            .as_ref()
            .map(|e| match &e.code {
                Some(code) if !e.message.is_empty() => format!("{}: {}", code, e.message),
                Some(code) => code.clone(),
                None => e.message.clone(),
            })
            .filter(|m| !m.trim().is_empty())
            .or_else(|| {
                self.incomplete_details
                    .as_ref()
                    .and_then(|d| d.reason.clone())
                    .map(|reason| format!("Research incomplete: {}", reason))
            })
            .unwrap_or_else(|| match &self.status {
                Some(status) => format!("Research ended with status '{}'", status),
                None => "Provider response carried no status".to_string(),
            });

        Some(message)
    }
}

/// Call details that are echoed into the analysis step
#[derive(Debug, Clone)]
pub struct OutcomeContext {
    pub model: String,
    pub mode: ResearchMode,
    pub tools: Vec<String>,
    pub elapsed_ms: u64,
}

fn payload(value: Value) -> Payload {
    match value {
        Value::Object(map) => map,
        _ => Payload::new(),
    }
}

fn string_field(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match value.get(*key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

fn parse_arguments(arguments: Option<&str>) -> Value {
    arguments
        .and_then(|raw| serde_json::from_str(raw).ok())
        .unwrap_or(Value::Null)
}

/// Search hits from an MCP search output: `{"results": [...]}` or a bare array
pub fn parse_search_output(output: &str) -> Vec<SearchResult> {
    let Ok(value) = serde_json::from_str::<Value>(output) else {
        return Vec::new();
    };

    let items: &[Value] = match &value {
        Value::Array(items) => items.as_slice(),
        Value::Object(_) => value
            .get("results")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default(),
        _ => &[],
    };

    items
        .iter()
        .filter_map(|item| {
            let id = string_field(item, &["id"])?;
            Some(SearchResult {
                id,
                title: string_field(item, &["title"]).unwrap_or_default(),
                url: string_field(item, &["url"]).unwrap_or_default(),
                snippet: string_field(item, &["snippet", "text"]).unwrap_or_default(),
                relevance_score: item
                    .get("relevance_score")
                    .or_else(|| item.get("score"))
                    .and_then(Value::as_f64)
                    .map(|score| score.clamp(0.0, 1.0)),
            })
        })
        .collect()
}

/// Document from an MCP fetch output
pub fn parse_fetch_output(output: &str, requested_id: Option<&str>) -> Option<FetchResult> {
    let value = serde_json::from_str::<Value>(output).ok()?;
    if !value.is_object() {
        return None;
    }

    let id = string_field(&value, &["id"]).or_else(|| requested_id.map(str::to_string))?;
    let mut metadata = value
        .get("metadata")
        .cloned()
        .map(payload)
        .unwrap_or_default();
    for key in ["title", "url"] {
        if let Some(field) = value.get(key) {
            metadata.entry(key.to_string()).or_insert_with(|| field.clone());
        }
    }

    Some(FetchResult {
        id,
        content: string_field(&value, &["text", "content"]).unwrap_or_default(),
        metadata,
    })
}

/// Map a terminal Responses API payload onto a research outcome.
///
/// Fields the provider did not return stay empty.
pub fn into_outcome(response: &ResponsesResponse, ctx: &OutcomeContext) -> ResearchOutcome {
    let mut search_results: Vec<SearchResult> = Vec::new();
    let mut fetch_results = Vec::new();
    let mut steps = Vec::new();
    let mut messages = Vec::new();
    let mut citations: Vec<(String, String)> = Vec::new();

    for item in &response.output {
        match item {
            OutputItem::McpCall {
                name,
                arguments,
                output,
                error,
            } => {
                let args = parse_arguments(arguments.as_deref());
                let output = output.as_deref().unwrap_or_default();

                if name == SEARCH_TOOL {
                    let hits = parse_search_output(output);
                    let mut out = json!({ "results_count": hits.len() });
                    if let Some(error) = error {
                        out["error"] = error.clone();
                    }
                    steps.push(ResearchStep::new(
                        StepType::Search,
                        payload(json!({
                            "query": string_field(&args, &["query"]).unwrap_or_default(),
                            "source": "mcp",
                        })),
                        payload(out),
                        0,
                    ));
                    search_results.extend(hits);
                } else if name == FETCH_TOOL {
                    let requested = string_field(&args, &["id"]);
                    let document = parse_fetch_output(output, requested.as_deref());
                    let mut out = json!({
                        "content_length": document.as_ref().map(|d| d.content.chars().count()).unwrap_or(0),
                    });
                    if let Some(error) = error {
                        out["error"] = error.clone();
                    }
                    steps.push(ResearchStep::new(
                        StepType::Fetch,
                        payload(json!({
                            "id": requested.unwrap_or_default(),
                            "source": "mcp",
                        })),
                        payload(out),
                        0,
                    ));
                    fetch_results.extend(document);
                } else {
                    tracing::debug!(tool = %name, "Ignoring call to tool outside the research surface");
                }
            }
            OutputItem::WebSearchCall { status, action } => {
                let query = action
                    .as_ref()
                    .and_then(|a| a.query.clone())
                    .unwrap_or_default();
                steps.push(ResearchStep::new(
                    StepType::Search,
                    payload(json!({ "query": query, "source": "websearch" })),
                    payload(json!({ "status": status.clone().unwrap_or_default() })),
                    0,
                ));
            }
            OutputItem::Message { content } => {
                let mut text = String::new();
                for part in content {
                    if let ContentPart::OutputText {
                        text: part_text,
                        annotations,
                    } = part
                    {
                        text.push_str(part_text);
                        for annotation in annotations {
                            if let Annotation::UrlCitation { url, title } = annotation {
                                citations.push((url.clone(), title.clone()));
                            }
                        }
                    }
                }
                if !text.is_empty() {
                    messages.push(text);
                }
            }
            OutputItem::Other => {}
        }
    }

    let mut citation_index = 0;
    for (url, title) in citations {
        if url.is_empty() || search_results.iter().any(|r| r.url == url) {
            continue;
        }
        citation_index += 1;
        search_results.push(SearchResult {
            id: format!("citation_{}", citation_index),
            title: title.clone(),
            url,
            snippet: title,
            relevance_score: None,
        });
    }

    let final_analysis = messages.join("\n\n");

    steps.push(ResearchStep::new(
        StepType::Analysis,
        payload(json!({
            "model": response.model.clone().unwrap_or_else(|| ctx.model.clone()),
            "mode": ctx.mode.as_str(),
            "tools": ctx.tools,
        })),
        payload(json!({
            "analysis_length": final_analysis.chars().count(),
            "status": response.status(),
        })),
        ctx.elapsed_ms,
    ));

    ResearchOutcome {
        search_results,
        fetch_results,
        final_analysis,
        steps,
        success: response.is_success(),
        error_message: response.failure_message(),
    }
}

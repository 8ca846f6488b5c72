//! Core data type definitions

use crate::error::{DeepResearchError, DeepResearchResult};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Open key-value payload attached to steps and fetched documents.
///
/// Key order is preserved so step logs render in the order the provider produced them.
pub type Payload = serde_json::Map<String, serde_json::Value>;

/// Research modes offered by the service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum ResearchMode {
    #[serde(rename = "o3-deep-research")]
    DeepResearchO3,
    #[serde(rename = "o4-mini-deep-research")]
    DeepResearchO4Mini,
    #[serde(rename = "websearch-mcp")]
    WebsearchMcp,
    #[serde(rename = "websearch-only")]
    WebsearchOnly,
    #[serde(rename = "mcp-only")]
    McpOnly,
}

impl ResearchMode {
    pub const ALL: [ResearchMode; 5] = [
        ResearchMode::DeepResearchO3,
        ResearchMode::DeepResearchO4Mini,
        ResearchMode::WebsearchMcp,
        ResearchMode::WebsearchOnly,
        ResearchMode::McpOnly,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResearchMode::DeepResearchO3 => "o3-deep-research",
            ResearchMode::DeepResearchO4Mini => "o4-mini-deep-research",
            ResearchMode::WebsearchMcp => "websearch-mcp",
            ResearchMode::WebsearchOnly => "websearch-only",
            ResearchMode::McpOnly => "mcp-only",
        }
    }

    /// Modes executed by a deep research model restricted to the `search` and `fetch` tools
    pub fn is_constrained_tool(&self) -> bool {
        matches!(
            self,
            ResearchMode::DeepResearchO3 | ResearchMode::DeepResearchO4Mini
        )
    }

    pub fn uses_web_search(&self) -> bool {
        matches!(
            self,
            ResearchMode::WebsearchMcp | ResearchMode::WebsearchOnly
        )
    }

    pub fn uses_mcp(&self) -> bool {
        !matches!(self, ResearchMode::WebsearchOnly)
    }
}

impl std::fmt::Display for ResearchMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResearchMode {
    type Err = DeepResearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResearchMode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s.trim())
            .ok_or_else(|| {
                crate::validation_error!(
                    format!("Unrecognized research mode: '{}'", s),
                    "mode",
                    "types"
                )
            })
    }
}

/// Follow-up question produced by the clarification stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ClarificationQuestion {
    pub question: String,
    pub context: String,
}

/// Answer to a clarification question, matched by position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ClarificationAnswer {
    pub question_index: usize,
    pub answer: String,
}

/// What the clarify call returns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ClarificationResponse {
    #[serde(default)]
    pub questions: Vec<ClarificationQuestion>,
    #[serde(default)]
    pub clarified_intent: String,
}

/// Questions, the user's answers and the resulting intent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ClarificationWithAnswers {
    #[serde(default)]
    pub questions: Vec<ClarificationQuestion>,
    #[serde(default)]
    pub answers: Vec<ClarificationAnswer>,
    pub clarified_intent: String,
}

impl ClarificationWithAnswers {
    /// Clarification that did not happen: no questions, no answers, intent is the raw query
    pub fn skipped(query: &str) -> Self {
        Self {
            questions: Vec::new(),
            answers: Vec::new(),
            clarified_intent: query.to_string(),
        }
    }

    pub fn is_skipped(&self) -> bool {
        self.questions.is_empty() && self.answers.is_empty()
    }

    /// Question/answer pairs whose index falls inside the question list
    pub fn answered_pairs(&self) -> impl Iterator<Item = (&ClarificationQuestion, &str)> {
        self.answers.iter().filter_map(|answer| {
            self.questions
                .get(answer.question_index)
                .map(|question| (question, answer.answer.as_str()))
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct PromptRewriteResult {
    pub original_query: String,
    pub rewritten_prompt: String,
    #[serde(default)]
    pub reasoning: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct SearchResult {
    pub id: String,
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub snippet: String,
    /// Relevance in [0, 1] when the provider reports one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relevance_score: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct FetchResult {
    pub id: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    #[cfg_attr(feature = "openapi", schema(value_type = Object))]
    pub metadata: Payload,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum StepType {
    Clarification,
    PromptRewriting,
    Search,
    Fetch,
    Analysis,
}

impl StepType {
    pub fn as_str(&self) -> &'static str {
        match self {
            StepType::Clarification => "clarification",
            StepType::PromptRewriting => "prompt_rewriting",
            StepType::Search => "search",
            StepType::Fetch => "fetch",
            StepType::Analysis => "analysis",
        }
    }
}

impl std::fmt::Display for StepType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Append-only log entry describing one unit of work
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ResearchStep {
    pub step_type: StepType,
    #[cfg_attr(feature = "openapi", schema(value_type = Object))]
    pub input_data: Payload,
    #[cfg_attr(feature = "openapi", schema(value_type = Object))]
    pub output_data: Payload,
    /// RFC 3339 timestamp
    pub timestamp: String,
    pub duration_ms: u64,
}

impl ResearchStep {
    /// Create a step stamped with the current time
    pub fn new(step_type: StepType, input_data: Payload, output_data: Payload, duration_ms: u64) -> Self {
        Self {
            step_type,
            input_data,
            output_data,
            timestamp: chrono::Utc::now().to_rfc3339(),
            duration_ms,
        }
    }
}

/// Unified result of one research request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ResearchResult {
    pub query: String,
    pub mode: ResearchMode,
    pub clarification: Option<ClarificationWithAnswers>,
    pub prompt_rewrite: Option<PromptRewriteResult>,
    #[serde(default)]
    pub search_results: Vec<SearchResult>,
    #[serde(default)]
    pub fetch_results: Vec<FetchResult>,
    #[serde(default)]
    pub final_analysis: String,
    #[serde(default)]
    pub steps: Vec<ResearchStep>,
    pub total_duration_ms: u64,
    pub success: bool,
    pub error_message: Option<String>,
}

impl ResearchResult {
    /// Terminal failure: keeps the steps recorded so far, nothing else
    pub fn failed(
        query: &str,
        mode: ResearchMode,
        steps: Vec<ResearchStep>,
        total_duration_ms: u64,
        error_message: impl Into<String>,
    ) -> Self {
        let mut message = error_message.into();
        if message.trim().is_empty() {
            message = "Research failed without an error description".to_string();
        }

        Self {
            query: query.to_string(),
            mode,
            clarification: None,
            prompt_rewrite: None,
            search_results: Vec::new(),
            fetch_results: Vec::new(),
            final_analysis: String::new(),
            steps,
            total_duration_ms,
            success: false,
            error_message: Some(message),
        }
    }

    /// Succeeded but found no sources
    pub fn has_no_sources(&self) -> bool {
        self.success && self.search_results.is_empty() && self.fetch_results.is_empty()
    }
}

/// Research depth presets bounding the number of tool calls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum ResearchDepth {
    Fast,
    #[default]
    Medium,
    Deep,
}

impl ResearchDepth {
    pub const ALL: [ResearchDepth; 3] = [
        ResearchDepth::Fast,
        ResearchDepth::Medium,
        ResearchDepth::Deep,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResearchDepth::Fast => "fast",
            ResearchDepth::Medium => "medium",
            ResearchDepth::Deep => "deep",
        }
    }

    pub fn max_tool_calls(&self) -> u32 {
        match self {
            ResearchDepth::Fast => 8,
            ResearchDepth::Medium => 20,
            ResearchDepth::Deep => 40,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ResearchDepth::Fast => "Quick scan with few tool calls; lowest cost and latency",
            ResearchDepth::Medium => "Balanced coverage for most questions",
            ResearchDepth::Deep => "Exhaustive investigation; highest cost and latency",
        }
    }
}

impl std::fmt::Display for ResearchDepth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResearchDepth {
    type Err = DeepResearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResearchDepth::ALL
            .into_iter()
            .find(|depth| depth.as_str() == s.trim())
            .ok_or_else(|| {
                crate::validation_error!(
                    format!("Unrecognized research depth: '{}'", s),
                    "research_depth",
                    "types"
                )
            })
    }
}

fn default_true() -> bool {
    true
}

fn default_max_tokens() -> Option<u32> {
    Some(4000)
}

fn default_temperature() -> Option<f32> {
    Some(0.7)
}

/// Request that starts a research workflow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearchRequest {
    pub query: String,
    pub mode: ResearchMode,
    #[serde(default = "default_true")]
    pub include_clarification: bool,
    #[serde(default = "default_true")]
    pub include_prompt_rewriting: bool,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: Option<u32>,
    #[serde(default = "default_temperature")]
    pub temperature: Option<f32>,
    #[serde(default)]
    pub research_depth: Option<ResearchDepth>,
    #[serde(default)]
    pub max_tool_calls: Option<u32>,
    #[serde(default)]
    pub background_mode: Option<bool>,
}

impl ResearchRequest {
    pub fn new(query: impl Into<String>, mode: ResearchMode) -> Self {
        Self {
            query: query.into(),
            mode,
            include_clarification: true,
            include_prompt_rewriting: true,
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            research_depth: None,
            max_tool_calls: None,
            background_mode: None,
        }
    }

    pub fn with_clarification(mut self, enabled: bool) -> Self {
        self.include_clarification = enabled;
        self
    }

    pub fn with_prompt_rewriting(mut self, enabled: bool) -> Self {
        self.include_prompt_rewriting = enabled;
        self
    }

    pub fn with_depth(mut self, depth: ResearchDepth) -> Self {
        self.research_depth = Some(depth);
        self
    }

    /// Reject malformed requests before anything is sent to the provider
    pub fn validate(&self) -> DeepResearchResult<()> {
        if self.query.trim().is_empty() {
            return Err(crate::validation_error!(
                "Query must not be empty",
                "query",
                "request"
            ));
        }

        if let Some(max_tokens) = self.max_tokens {
            if max_tokens == 0 {
                return Err(crate::validation_error!(
                    "max_tokens must be greater than 0",
                    "max_tokens",
                    "request"
                ));
            }
        }

        if let Some(temperature) = self.temperature {
            if !(0.0..=2.0).contains(&temperature) {
                return Err(crate::validation_error!(
                    format!("temperature must be within [0, 2], got {}", temperature),
                    "temperature",
                    "request"
                ));
            }
        }

        if self.max_tool_calls == Some(0) {
            return Err(crate::validation_error!(
                "max_tool_calls must be at least 1",
                "max_tool_calls",
                "request"
            ));
        }

        Ok(())
    }

    /// Resolve the provider options, falling back to configured defaults
    pub fn options(&self, default_depth: ResearchDepth, default_background: bool) -> ResearchOptions {
        let depth = self.research_depth.unwrap_or(default_depth);
        ResearchOptions {
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            max_tool_calls: self.max_tool_calls.unwrap_or_else(|| depth.max_tool_calls()),
            background: self.background_mode.unwrap_or(default_background),
        }
    }
}

/// Tuning forwarded to the research stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearchOptions {
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    pub max_tool_calls: u32,
    pub background: bool,
}

impl Default for ResearchOptions {
    fn default() -> Self {
        Self {
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            max_tool_calls: ResearchDepth::default().max_tool_calls(),
            background: false,
        }
    }
}

//! Research workflow request and response types

use deepresearch_applications::{ClarificationForm, WorkflowStage, WorkflowState};
use deepresearch_core::{
    ClarificationAnswer, ClarificationQuestion, ClarificationWithAnswers, DeepResearchResult,
    ResearchDepth, ResearchMode, ResearchRequest, ResearchResult,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

fn default_true() -> bool {
    true
}

fn default_analysis_mode() -> String {
    ResearchMode::DeepResearchO3.as_str().to_string()
}

fn parse_depth(depth: Option<&str>) -> DeepResearchResult<Option<ResearchDepth>> {
    depth.map(str::parse).transpose()
}

/// Start a research workflow.
///
/// `mode` and `research_depth` are plain strings so unknown identifiers
/// surface as validation errors rather than body rejections.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StartResearchRequest {
    #[schema(example = "AI trends in healthcare")]
    pub query: String,
    #[schema(example = "o3-deep-research")]
    pub mode: String,
    #[serde(default = "default_true")]
    pub include_clarification: bool,
    #[serde(default = "default_true")]
    pub include_prompt_rewriting: bool,
    #[schema(example = 4000)]
    pub max_tokens: Option<u32>,
    #[schema(example = 0.7)]
    pub temperature: Option<f32>,
    #[schema(example = "medium")]
    pub research_depth: Option<String>,
    pub max_tool_calls: Option<u32>,
    pub background_mode: Option<bool>,
}

impl StartResearchRequest {
    pub fn into_request(self) -> DeepResearchResult<ResearchRequest> {
        let mode: ResearchMode = self.mode.parse()?;
        let mut request = ResearchRequest::new(self.query, mode)
            .with_clarification(self.include_clarification)
            .with_prompt_rewriting(self.include_prompt_rewriting);

        if self.max_tokens.is_some() {
            request.max_tokens = self.max_tokens;
        }
        if self.temperature.is_some() {
            request.temperature = self.temperature;
        }
        request.research_depth = parse_depth(self.research_depth.as_deref())?;
        request.max_tool_calls = self.max_tool_calls;
        request.background_mode = self.background_mode;
        Ok(request)
    }
}

/// Answers for a suspended workflow, one per question
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SubmitAnswersRequest {
    pub answers: Vec<ClarificationAnswer>,
}

/// Current state of a research session
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WorkflowResponse {
    pub session_id: String,
    pub stage: WorkflowStage,
    /// Present while the workflow awaits answers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub questions: Option<Vec<ClarificationQuestion>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub form: Option<ClarificationForm>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clarified_intent: Option<String>,
    /// Present once the workflow is completed or failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<ResearchResult>,
}

impl From<WorkflowState> for WorkflowResponse {
    fn from(state: WorkflowState) -> Self {
        let form = ClarificationForm::for_state(&state);
        let questions = form
            .is_some()
            .then(|| state.pending_questions().to_vec());

        let clarified_intent = state
            .clarification
            .as_ref()
            .map(|c| c.clarified_intent.clone())
            .or_else(|| {
                state
                    .pending_clarification
                    .as_ref()
                    .map(|p| p.clarified_intent.clone())
            })
            .filter(|intent| !intent.trim().is_empty());

        Self {
            session_id: state.session_id,
            stage: state.stage,
            questions,
            form,
            clarified_intent,
            result: state.result,
        }
    }
}

/// Research stage only, on an already prepared prompt
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AnalysisRequest {
    #[schema(example = "Survey peer-reviewed evidence on AI diagnostics since 2022")]
    pub rewritten_prompt: String,
    #[serde(default = "default_analysis_mode")]
    #[schema(example = "o3-deep-research")]
    pub mode: String,
    #[schema(example = "medium")]
    pub research_depth: Option<String>,
    pub max_tool_calls: Option<u32>,
    #[serde(default = "default_true")]
    pub background_mode: bool,
}

impl AnalysisRequest {
    pub fn into_request(self) -> DeepResearchResult<ResearchRequest> {
        let mode: ResearchMode = self.mode.parse()?;
        let mut request = ResearchRequest::new(self.rewritten_prompt, mode);
        request.research_depth = parse_depth(self.research_depth.as_deref())?;
        request.max_tool_calls = self.max_tool_calls;
        request.background_mode = Some(self.background_mode);
        Ok(request)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ClarifyRequest {
    #[schema(example = "AI trends")]
    pub query: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RewritePromptRequest {
    pub original_query: String,
    #[serde(default)]
    pub clarification_with_answers: Option<ClarificationWithAnswers>,
}

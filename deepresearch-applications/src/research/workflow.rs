//! Resumable workflow state

use chrono::{DateTime, Utc};
use deepresearch_core::{
    ClarificationQuestion, ClarificationResponse, ClarificationWithAnswers, PromptRewriteResult,
    ResearchRequest, ResearchResult, ResearchStep,
};
use serde::{Deserialize, Serialize};

/// Stage of the clarify -> rewrite -> research pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStage {
    Idle,
    Clarifying,
    AwaitingAnswers,
    Rewriting,
    Researching,
    Completed,
    Failed,
}

impl WorkflowStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowStage::Idle => "idle",
            WorkflowStage::Clarifying => "clarifying",
            WorkflowStage::AwaitingAnswers => "awaiting_answers",
            WorkflowStage::Rewriting => "rewriting",
            WorkflowStage::Researching => "researching",
            WorkflowStage::Completed => "completed",
            WorkflowStage::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, WorkflowStage::Completed | WorkflowStage::Failed)
    }
}

impl std::fmt::Display for WorkflowStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything needed to resume a workflow between calls.
///
/// The orchestrator never mutates a state in place: each operation returns a new one,
/// so a caller that drops an in-flight call keeps the state it had before.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowState {
    pub session_id: String,
    pub stage: WorkflowStage,
    pub request: ResearchRequest,
    /// Clarify response while answers are pending
    pub pending_clarification: Option<ClarificationResponse>,
    /// Built once answers are collected or clarification is skipped
    pub clarification: Option<ClarificationWithAnswers>,
    pub prompt_rewrite: Option<PromptRewriteResult>,
    pub steps: Vec<ResearchStep>,
    /// Active processing time; time spent waiting on the user is excluded
    pub elapsed_ms: u64,
    pub result: Option<ResearchResult>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WorkflowState {
    pub fn new(request: ResearchRequest) -> Self {
        let now = Utc::now();
        Self {
            session_id: uuid::Uuid::new_v4().to_string(),
            stage: WorkflowStage::Idle,
            request,
            pending_clarification: None,
            clarification: None,
            prompt_rewrite: None,
            steps: Vec::new(),
            elapsed_ms: 0,
            result: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.stage.is_terminal()
    }

    /// Questions awaiting answers, empty unless the workflow is suspended
    pub fn pending_questions(&self) -> &[ClarificationQuestion] {
        match (&self.stage, &self.pending_clarification) {
            (WorkflowStage::AwaitingAnswers, Some(pending)) => pending.questions.as_slice(),
            _ => &[],
        }
    }

    /// Prompt handed to the research stage: rewritten prompt, then clarified intent, then the query
    pub fn final_prompt(&self) -> &str {
        if let Some(rewrite) = &self.prompt_rewrite {
            if !rewrite.rewritten_prompt.trim().is_empty() {
                return &rewrite.rewritten_prompt;
            }
        }

        if let Some(clarification) = &self.clarification {
            if !clarification.clarified_intent.trim().is_empty() {
                return &clarification.clarified_intent;
            }
        }

        &self.request.query
    }

    pub(crate) fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

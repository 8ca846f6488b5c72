//! Clarify -> rewrite -> research orchestration

use super::workflow::{WorkflowStage, WorkflowState};
use deepresearch_core::{
    invalid_state_error, validation_error, ClarificationAnswer, ClarificationWithAnswers,
    DeepResearchError, DeepResearchResult, Payload, ResearchCall, ResearchDepth, ResearchGateway,
    ResearchOutcome, ResearchRequest, ResearchResult, ResearchStep, StepType,
};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Defaults applied when a request leaves research options unset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrchestratorSettings {
    pub default_depth: ResearchDepth,
    pub background_mode: bool,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            default_depth: ResearchDepth::Medium,
            background_mode: false,
        }
    }
}

impl From<&deepresearch_core::ResearchConfig> for OrchestratorSettings {
    fn from(config: &deepresearch_core::ResearchConfig) -> Self {
        Self {
            default_depth: config.default_depth,
            background_mode: config.background_mode,
        }
    }
}

/// Drives a research request through clarification, rewriting and research.
///
/// Each operation takes the current state by reference and returns the next one.
pub struct ResearchOrchestrator {
    gateway: Arc<dyn ResearchGateway>,
    settings: OrchestratorSettings,
}

fn to_payload<T: Serialize>(value: &T) -> Payload {
    match serde_json::to_value(value) {
        Ok(serde_json::Value::Object(map)) => map,
        _ => Payload::new(),
    }
}

fn elapsed_ms(start: Instant) -> u64 {
    start.elapsed().as_millis() as u64
}

impl ResearchOrchestrator {
    pub fn new(gateway: Arc<dyn ResearchGateway>, settings: OrchestratorSettings) -> Self {
        Self { gateway, settings }
    }

    pub fn gateway(&self) -> &Arc<dyn ResearchGateway> {
        &self.gateway
    }

    pub fn settings(&self) -> OrchestratorSettings {
        self.settings
    }

    /// Start a workflow.
    ///
    /// Invalid requests are rejected before any provider call. Provider failures are
    /// returned as a `Failed` state carrying a failed result.
    pub async fn start(&self, request: ResearchRequest) -> DeepResearchResult<WorkflowState> {
        request.validate()?;

        let mut state = WorkflowState::new(request);
        info!(
            session_id = %state.session_id,
            mode = %state.request.mode,
            clarification = state.request.include_clarification,
            rewriting = state.request.include_prompt_rewriting,
            "Starting research workflow"
        );

        if !state.request.include_clarification {
            return Ok(self.advance(state).await);
        }

        self.transition(&mut state, WorkflowStage::Clarifying);
        let start = Instant::now();
        let clarification = match self.gateway.clarify(&state.request.query).await {
            Ok(clarification) => clarification,
            Err(error) => {
                state.elapsed_ms += elapsed_ms(start);
                return Ok(self.fail(state, error));
            }
        };
        let duration = elapsed_ms(start);
        state.elapsed_ms += duration;

        let mut input = Payload::new();
        input.insert("query".to_string(), json!(state.request.query));
        state.steps.push(ResearchStep::new(
            StepType::Clarification,
            input,
            to_payload(&clarification),
            duration,
        ));

        if clarification.questions.is_empty() {
            info!(session_id = %state.session_id, "No clarification needed");
            state.clarification = Some(ClarificationWithAnswers::skipped(&state.request.query));
            return Ok(self.advance(state).await);
        }

        info!(
            session_id = %state.session_id,
            questions = clarification.questions.len(),
            "Waiting for clarification answers"
        );
        state.pending_clarification = Some(clarification);
        self.transition(&mut state, WorkflowStage::AwaitingAnswers);
        Ok(state)
    }

    /// Resume a suspended workflow with one non-blank answer per question.
    ///
    /// Rejected submissions leave the caller's state untouched.
    pub async fn submit_answers(
        &self,
        state: &WorkflowState,
        answers: Vec<ClarificationAnswer>,
    ) -> DeepResearchResult<WorkflowState> {
        let pending = self.require_awaiting(state, "submit answers")?;
        validate_answers(pending.questions.len(), &answers)?;

        let mut answers = answers;
        answers.sort_by_key(|a| a.question_index);

        let clarified_intent = if pending.clarified_intent.trim().is_empty() {
            state.request.query.clone()
        } else {
            pending.clarified_intent.clone()
        };

        let mut next = state.clone();
        next.clarification = Some(ClarificationWithAnswers {
            questions: pending.questions.clone(),
            answers,
            clarified_intent,
        });
        next.pending_clarification = None;

        info!(session_id = %next.session_id, "Clarification answers accepted");
        Ok(self.advance(next).await)
    }

    /// Resume a suspended workflow without answers; the raw query becomes the intent
    pub async fn skip_clarification(&self, state: &WorkflowState) -> DeepResearchResult<WorkflowState> {
        self.require_awaiting(state, "skip clarification")?;

        let mut next = state.clone();
        next.clarification = Some(ClarificationWithAnswers::skipped(&next.request.query));
        next.pending_clarification = None;

        info!(session_id = %next.session_id, "Clarification skipped");
        Ok(self.advance(next).await)
    }

    /// Run only the research stage on an already prepared prompt
    pub async fn research_only(&self, request: ResearchRequest) -> DeepResearchResult<ResearchResult> {
        let request = request
            .with_clarification(false)
            .with_prompt_rewriting(false);
        let state = self.start(request).await?;

        state.result.ok_or_else(|| DeepResearchError::Internal {
            message: "Research-only workflow finished without a result".to_string(),
            source: None,
            context: deepresearch_core::ErrorContext::new("orchestrator")
                .with_operation("research_only"),
        })
    }

    fn require_awaiting<'a>(
        &self,
        state: &'a WorkflowState,
        action: &str,
    ) -> DeepResearchResult<&'a deepresearch_core::ClarificationResponse> {
        match (&state.stage, &state.pending_clarification) {
            (WorkflowStage::AwaitingAnswers, Some(pending)) => Ok(pending),
            _ => Err(invalid_state_error!(state.stage, action, "orchestrator")),
        }
    }

    fn transition(&self, state: &mut WorkflowState, stage: WorkflowStage) {
        info!(
            session_id = %state.session_id,
            from = %state.stage,
            to = %stage,
            elapsed_ms = state.elapsed_ms,
            "Workflow transition"
        );
        state.stage = stage;
        state.touch();
    }

    /// Rewriting (if enabled) and research, through to a terminal state
    async fn advance(&self, mut state: WorkflowState) -> WorkflowState {
        if state.request.include_prompt_rewriting {
            self.transition(&mut state, WorkflowStage::Rewriting);

            let clarification = state
                .clarification
                .clone()
                .unwrap_or_else(|| ClarificationWithAnswers::skipped(&state.request.query));

            let start = Instant::now();
            let rewrite = match self
                .gateway
                .rewrite(&state.request.query, &clarification)
                .await
            {
                Ok(rewrite) => rewrite,
                Err(error) => {
                    state.elapsed_ms += elapsed_ms(start);
                    return self.fail(state, error);
                }
            };
            let duration = elapsed_ms(start);
            state.elapsed_ms += duration;

            let mut input = Payload::new();
            input.insert("original_query".to_string(), json!(state.request.query));
            input.insert(
                "clarification".to_string(),
                serde_json::Value::Object(to_payload(&clarification)),
            );
            state.steps.push(ResearchStep::new(
                StepType::PromptRewriting,
                input,
                to_payload(&rewrite),
                duration,
            ));
            state.prompt_rewrite = Some(rewrite);
        }

        self.transition(&mut state, WorkflowStage::Researching);

        let options = state
            .request
            .options(self.settings.default_depth, self.settings.background_mode);
        let call = ResearchCall::new(state.final_prompt(), state.request.mode, &state.request.query)
            .with_options(options);

        let start = Instant::now();
        let outcome = match self.gateway.run_research(call).await {
            Ok(outcome) => outcome,
            Err(error) => {
                state.elapsed_ms += elapsed_ms(start);
                return self.fail(state, error);
            }
        };
        state.elapsed_ms += elapsed_ms(start);

        self.complete(state, outcome)
    }

    fn complete(&self, mut state: WorkflowState, outcome: ResearchOutcome) -> WorkflowState {
        let ResearchOutcome {
            search_results,
            fetch_results,
            final_analysis,
            steps,
            success,
            error_message,
            ..
        } = outcome;

        let error_message = if success {
            None
        } else {
            Some(
                error_message
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or_else(|| "Provider reported an unsuccessful research run".to_string()),
            )
        };

        state.steps.extend(steps);
        // Failed results carry only the steps; stage records are attached on success
        let (clarification, prompt_rewrite) = if success {
            (state.clarification.clone(), state.prompt_rewrite.clone())
        } else {
            (None, None)
        };
        let result = ResearchResult {
            query: state.request.query.clone(),
            mode: state.request.mode,
            clarification,
            prompt_rewrite,
            search_results,
            fetch_results,
            final_analysis,
            steps: state.steps.clone(),
            total_duration_ms: state.elapsed_ms,
            success,
            error_message,
        };

        if success {
            info!(
                session_id = %state.session_id,
                search_results = result.search_results.len(),
                fetch_results = result.fetch_results.len(),
                total_duration_ms = result.total_duration_ms,
                "Research workflow completed"
            );
        } else {
            warn!(
                session_id = %state.session_id,
                error = result.error_message.as_deref().unwrap_or_default(),
                "Provider reported an unsuccessful research run"
            );
        }

        state.result = Some(result);
        let stage = if success {
            WorkflowStage::Completed
        } else {
            WorkflowStage::Failed
        };
        self.transition(&mut state, stage);
        state
    }

    /// Absorbing failure: keeps the steps recorded so far, attaches nothing else
    fn fail(&self, mut state: WorkflowState, error: DeepResearchError) -> WorkflowState {
        error.log();
        warn!(
            session_id = %state.session_id,
            stage = %state.stage,
            error = %error,
            "Research workflow failed"
        );

        state.result = Some(ResearchResult::failed(
            &state.request.query,
            state.request.mode,
            state.steps.clone(),
            state.elapsed_ms,
            error.to_string(),
        ));
        state.pending_clarification = None;
        self.transition(&mut state, WorkflowStage::Failed);
        state
    }
}

/// One non-blank answer per question, indices covering exactly `0..question_count`
fn validate_answers(question_count: usize, answers: &[ClarificationAnswer]) -> DeepResearchResult<()> {
    if answers.len() != question_count {
        return Err(validation_error!(
            format!(
                "Expected {} answers, received {}",
                question_count,
                answers.len()
            ),
            "answers",
            "orchestrator"
        ));
    }

    let mut seen = vec![false; question_count];
    for answer in answers {
        match seen.get_mut(answer.question_index) {
            Some(slot) if !*slot => *slot = true,
            Some(_) => {
                return Err(validation_error!(
                    format!("Duplicate answer for question {}", answer.question_index),
                    "question_index",
                    "orchestrator"
                ))
            }
            None => {
                return Err(validation_error!(
                    format!(
                        "question_index {} is out of range for {} questions",
                        answer.question_index, question_count
                    ),
                    "question_index",
                    "orchestrator"
                ))
            }
        }

        if answer.answer.trim().is_empty() {
            return Err(validation_error!(
                format!("Answer to question {} must not be blank", answer.question_index),
                "answer",
                "orchestrator"
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn answer(index: usize, text: &str) -> ClarificationAnswer {
        ClarificationAnswer {
            question_index: index,
            answer: text.to_string(),
        }
    }

    #[test]
    fn test_answers_must_cover_every_question_once() {
        assert!(validate_answers(2, &[answer(1, "b"), answer(0, "a")]).is_ok());
        assert!(validate_answers(2, &[answer(0, "a")]).is_err());
        assert!(validate_answers(2, &[answer(0, "a"), answer(0, "b")]).is_err());
        assert!(validate_answers(2, &[answer(0, "a"), answer(2, "b")]).is_err());
    }

    #[test]
    fn test_blank_answers_are_rejected() {
        let err = validate_answers(2, &[answer(0, "a"), answer(1, "  ")]).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_settings_from_config() {
        let config = deepresearch_core::ResearchConfig {
            default_depth: ResearchDepth::Deep,
            background_mode: true,
            ..Default::default()
        };
        let settings = OrchestratorSettings::from(&config);
        assert_eq!(settings.default_depth, ResearchDepth::Deep);
        assert!(settings.background_mode);
    }
}

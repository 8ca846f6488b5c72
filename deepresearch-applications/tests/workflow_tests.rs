//! Workflow tests against a scripted research gateway

use async_trait::async_trait;
use deepresearch_applications::{
    get_api_info, list_modes, ClarificationForm, OrchestratorSettings, ResearchOrchestrator,
    ResultStatus, ResultView, WorkflowStage,
};
use deepresearch_core::{
    provider_error, ClarificationAnswer, ClarificationQuestion, ClarificationResponse,
    ClarificationWithAnswers, DeepResearchResult, Payload, PromptRewriteResult, ProviderErrorKind,
    ResearchCall, ResearchDepth, ResearchGateway, ResearchMode, ResearchOutcome, ResearchRequest,
    ResearchStep, SearchResult, StepType,
};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Gateway double that replays canned responses and records what it was asked
#[derive(Default)]
struct ScriptedGateway {
    questions: Vec<ClarificationQuestion>,
    clarified_intent: String,
    rewritten_prompt: Option<String>,
    fail_clarify: bool,
    fail_rewrite: bool,
    fail_research: bool,
    /// Provider-reported unsuccessful run, with this message if any
    unsuccessful_outcome: Option<Option<String>>,
    stall_research: bool,
    calls: Mutex<Vec<String>>,
    research_calls: Mutex<Vec<ResearchCall>>,
}

impl ScriptedGateway {
    fn with_questions(mut self, count: usize, intent: &str) -> Self {
        self.questions = (0..count)
            .map(|i| ClarificationQuestion {
                question: format!("Question {}?", i + 1),
                context: format!("Context {}", i + 1),
            })
            .collect();
        self.clarified_intent = intent.to_string();
        self
    }

    fn with_rewrite(mut self, prompt: &str) -> Self {
        self.rewritten_prompt = Some(prompt.to_string());
        self
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn research_calls(&self) -> Vec<ResearchCall> {
        self.research_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ResearchGateway for ScriptedGateway {
    async fn clarify(&self, _query: &str) -> DeepResearchResult<ClarificationResponse> {
        self.calls.lock().unwrap().push("clarify".to_string());
        if self.fail_clarify {
            return Err(provider_error!(
                ProviderErrorKind::Transient,
                Some(503),
                "HTTP 503: service unavailable",
                "scripted_gateway"
            ));
        }
        Ok(ClarificationResponse {
            questions: self.questions.clone(),
            clarified_intent: self.clarified_intent.clone(),
        })
    }

    async fn rewrite(
        &self,
        original_query: &str,
        _clarification: &ClarificationWithAnswers,
    ) -> DeepResearchResult<PromptRewriteResult> {
        self.calls.lock().unwrap().push("rewrite".to_string());
        if self.fail_rewrite {
            return Err(provider_error!(
                ProviderErrorKind::Malformed,
                None,
                "Rewrite reply was not valid JSON",
                "scripted_gateway"
            ));
        }
        Ok(PromptRewriteResult {
            original_query: original_query.to_string(),
            rewritten_prompt: self
                .rewritten_prompt
                .clone()
                .unwrap_or_else(|| original_query.to_string()),
            reasoning: "scripted".to_string(),
        })
    }

    async fn run_research(&self, call: ResearchCall) -> DeepResearchResult<ResearchOutcome> {
        self.calls.lock().unwrap().push("research".to_string());
        self.research_calls.lock().unwrap().push(call.clone());

        if self.stall_research {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }
        if self.fail_research {
            return Err(provider_error!(
                ProviderErrorKind::Auth,
                Some(401),
                "HTTP 401: invalid api key",
                "scripted_gateway"
            ));
        }

        let mut input = Payload::new();
        input.insert("query".to_string(), serde_json::json!(call.prompt));

        if let Some(message) = &self.unsuccessful_outcome {
            return Ok(ResearchOutcome {
                final_analysis: "Partial draft".to_string(),
                steps: vec![ResearchStep::new(StepType::Search, input, Payload::new(), 0)],
                success: false,
                error_message: message.clone(),
                ..ResearchOutcome::default()
            });
        }

        Ok(ResearchOutcome {
            search_results: vec![SearchResult {
                id: "doc-1".to_string(),
                title: "Result".to_string(),
                url: "https://example.org/doc-1".to_string(),
                snippet: "snippet".to_string(),
                relevance_score: Some(0.9),
            }],
            fetch_results: Vec::new(),
            final_analysis: format!("Analysis of {}", call.prompt),
            steps: vec![ResearchStep::new(StepType::Search, input, Payload::new(), 0)],
            success: true,
            error_message: None,
        })
    }
}

fn orchestrator(gateway: Arc<ScriptedGateway>) -> ResearchOrchestrator {
    ResearchOrchestrator::new(gateway, OrchestratorSettings::default())
}

fn answer(index: usize, text: &str) -> ClarificationAnswer {
    ClarificationAnswer {
        question_index: index,
        answer: text.to_string(),
    }
}

fn step_types(steps: &[ResearchStep]) -> Vec<StepType> {
    steps.iter().map(|s| s.step_type).collect()
}

#[tokio::test]
async fn test_direct_research_without_clarification_or_rewrite() {
    let gateway = Arc::new(ScriptedGateway::default());
    let orchestrator = orchestrator(gateway.clone());

    let request = ResearchRequest::new("climate policy 2024", ResearchMode::WebsearchOnly)
        .with_clarification(false)
        .with_prompt_rewriting(false);
    let state = orchestrator.start(request).await.unwrap();

    assert_eq!(state.stage, WorkflowStage::Completed);
    assert_eq!(gateway.calls(), vec!["research"]);
    assert_eq!(gateway.research_calls()[0].prompt, "climate policy 2024");

    let result = state.result.unwrap();
    assert!(result.success);
    assert!(result.clarification.is_none());
    let types = step_types(&result.steps);
    assert!(!types.contains(&StepType::Clarification));
    assert!(!types.contains(&StepType::PromptRewriting));
}

#[tokio::test]
async fn test_clarification_suspends_then_resumes_with_intent() {
    let gateway = Arc::new(ScriptedGateway::default().with_questions(2, "AI trends in healthcare"));
    let orchestrator = orchestrator(gateway.clone());

    let request = ResearchRequest::new("AI trends", ResearchMode::WebsearchMcp)
        .with_prompt_rewriting(false);
    let suspended = orchestrator.start(request).await.unwrap();

    assert_eq!(suspended.stage, WorkflowStage::AwaitingAnswers);
    assert_eq!(suspended.pending_questions().len(), 2);
    assert!(suspended.result.is_none());
    assert_eq!(gateway.calls(), vec!["clarify"]);

    let form = ClarificationForm::for_state(&suspended).unwrap();
    assert_eq!(form.fields.len(), 2);
    assert!(!form.can_submit());

    let done = orchestrator
        .submit_answers(&suspended, vec![answer(1, "Hospitals"), answer(0, "Last two years")])
        .await
        .unwrap();

    assert_eq!(done.stage, WorkflowStage::Completed);
    assert_eq!(gateway.calls(), vec!["clarify", "research"]);
    assert_eq!(gateway.research_calls()[0].prompt, "AI trends in healthcare");
    assert_eq!(gateway.research_calls()[0].original_query, "AI trends");

    let result = done.result.unwrap();
    let clarification = result.clarification.unwrap();
    assert_eq!(clarification.answers[0].answer, "Last two years");
    assert_eq!(clarification.answers[1].answer, "Hospitals");
    assert_eq!(
        step_types(&result.steps),
        vec![StepType::Clarification, StepType::Search]
    );
}

#[tokio::test]
async fn test_blank_answers_do_not_advance() {
    let gateway = Arc::new(ScriptedGateway::default().with_questions(2, "intent"));
    let orchestrator = orchestrator(gateway.clone());

    let suspended = orchestrator
        .start(ResearchRequest::new("AI trends", ResearchMode::McpOnly))
        .await
        .unwrap();

    let err = orchestrator
        .submit_answers(&suspended, vec![answer(0, "fine"), answer(1, "   ")])
        .await
        .unwrap_err();

    assert!(err.is_validation());
    assert_eq!(suspended.stage, WorkflowStage::AwaitingAnswers);
    assert_eq!(gateway.calls(), vec!["clarify"]);
}

#[tokio::test]
async fn test_mismatched_indices_are_rejected() {
    let gateway = Arc::new(ScriptedGateway::default().with_questions(2, "intent"));
    let orchestrator = orchestrator(gateway.clone());

    let suspended = orchestrator
        .start(ResearchRequest::new("AI trends", ResearchMode::McpOnly))
        .await
        .unwrap();

    for answers in [
        vec![answer(0, "a")],
        vec![answer(0, "a"), answer(2, "b")],
        vec![answer(1, "a"), answer(1, "b")],
        vec![answer(0, "a"), answer(1, "b"), answer(2, "c")],
    ] {
        let err = orchestrator
            .submit_answers(&suspended, answers)
            .await
            .unwrap_err();
        assert!(err.is_validation());
    }
    assert!(!gateway.calls().contains(&"research".to_string()));
}

#[tokio::test]
async fn test_answers_outside_awaiting_stage_are_invalid() {
    let gateway = Arc::new(ScriptedGateway::default());
    let orchestrator = orchestrator(gateway);

    let done = orchestrator
        .start(ResearchRequest::new("q", ResearchMode::McpOnly).with_clarification(false))
        .await
        .unwrap();

    let err = orchestrator.skip_clarification(&done).await.unwrap_err();
    assert!(err.to_string().contains("completed"));
}

#[tokio::test]
async fn test_skip_uses_raw_query_as_intent() {
    let gateway = Arc::new(ScriptedGateway::default().with_questions(1, "ignored intent"));
    let orchestrator = orchestrator(gateway.clone());

    let suspended = orchestrator
        .start(
            ResearchRequest::new("raw query", ResearchMode::WebsearchOnly)
                .with_prompt_rewriting(false),
        )
        .await
        .unwrap();
    let done = orchestrator.skip_clarification(&suspended).await.unwrap();

    let clarification = done.result.unwrap().clarification.unwrap();
    assert!(clarification.questions.is_empty());
    assert!(clarification.answers.is_empty());
    assert_eq!(clarification.clarified_intent, "raw query");
    assert_eq!(gateway.research_calls()[0].prompt, "raw query");
}

#[tokio::test]
async fn test_no_questions_proceeds_without_suspending() {
    let gateway = Arc::new(ScriptedGateway::default().with_rewrite("Expanded prompt"));
    let orchestrator = orchestrator(gateway.clone());

    let state = orchestrator
        .start(ResearchRequest::new("X", ResearchMode::DeepResearchO3))
        .await
        .unwrap();

    assert_eq!(state.stage, WorkflowStage::Completed);
    assert_eq!(gateway.calls(), vec!["clarify", "rewrite", "research"]);
    let result = state.result.unwrap();
    assert!(result.clarification.unwrap().is_skipped());
}

#[tokio::test]
async fn test_rewritten_prompt_takes_priority() {
    let gateway = Arc::new(ScriptedGateway::default().with_rewrite("Y"));
    let orchestrator = orchestrator(gateway.clone());

    let state = orchestrator
        .start(ResearchRequest::new("X", ResearchMode::WebsearchOnly).with_clarification(false))
        .await
        .unwrap();

    assert_eq!(gateway.research_calls()[0].prompt, "Y");
    let result = state.result.unwrap();
    assert_eq!(result.prompt_rewrite.unwrap().rewritten_prompt, "Y");
    assert_eq!(result.steps[0].step_type, StepType::PromptRewriting);
}

#[tokio::test]
async fn test_provider_error_keeps_earlier_steps() {
    let gateway = Arc::new(ScriptedGateway {
        fail_research: true,
        ..ScriptedGateway::default().with_questions(1, "intent")
    });
    let orchestrator = orchestrator(gateway.clone());

    let suspended = orchestrator
        .start(ResearchRequest::new("AI trends", ResearchMode::McpOnly))
        .await
        .unwrap();
    let failed = orchestrator
        .submit_answers(&suspended, vec![answer(0, "answer")])
        .await
        .unwrap();

    assert_eq!(failed.stage, WorkflowStage::Failed);
    let result = failed.result.unwrap();
    assert_eq!(ResultView::from_result(&result).status, ResultStatus::Failed);
    assert!(!result.success);
    assert!(result.error_message.as_deref().unwrap().contains("401"));
    assert_eq!(
        step_types(&result.steps),
        vec![StepType::Clarification, StepType::PromptRewriting]
    );
    assert!(result.search_results.is_empty());
}

#[tokio::test]
async fn test_clarify_failure_records_no_steps() {
    let gateway = Arc::new(ScriptedGateway {
        fail_clarify: true,
        ..ScriptedGateway::default().with_questions(2, "intent")
    });
    let orchestrator = orchestrator(gateway.clone());

    let failed = orchestrator
        .start(ResearchRequest::new("AI trends", ResearchMode::McpOnly))
        .await
        .unwrap();

    assert_eq!(failed.stage, WorkflowStage::Failed);
    assert!(failed.pending_questions().is_empty());
    let result = failed.result.unwrap();
    assert!(!result.success);
    assert!(result.error_message.as_deref().unwrap().contains("503"));
    assert!(result.steps.is_empty());
    assert_eq!(gateway.calls(), vec!["clarify"]);
}

#[tokio::test]
async fn test_rewrite_failure_keeps_only_clarification_step() {
    let gateway = Arc::new(ScriptedGateway {
        fail_rewrite: true,
        ..ScriptedGateway::default().with_questions(1, "intent")
    });
    let orchestrator = orchestrator(gateway.clone());

    let suspended = orchestrator
        .start(ResearchRequest::new("AI trends", ResearchMode::WebsearchMcp))
        .await
        .unwrap();
    let failed = orchestrator
        .submit_answers(&suspended, vec![answer(0, "hospitals")])
        .await
        .unwrap();

    assert_eq!(failed.stage, WorkflowStage::Failed);
    let result = failed.result.unwrap();
    assert!(!result.success);
    assert!(!result.error_message.as_deref().unwrap().is_empty());
    assert_eq!(step_types(&result.steps), vec![StepType::Clarification]);
    assert!(result.clarification.is_none());
    assert!(result.prompt_rewrite.is_none());
    assert_eq!(gateway.calls(), vec!["clarify", "rewrite"]);
}

#[tokio::test]
async fn test_unsuccessful_provider_run_fails_workflow() {
    let gateway = Arc::new(ScriptedGateway {
        unsuccessful_outcome: Some(Some("Research incomplete: max_tool_calls".to_string())),
        ..ScriptedGateway::default().with_rewrite("Y")
    });
    let orchestrator = orchestrator(gateway.clone());

    let failed = orchestrator
        .start(
            ResearchRequest::new("X", ResearchMode::WebsearchOnly).with_clarification(false),
        )
        .await
        .unwrap();

    assert_eq!(failed.stage, WorkflowStage::Failed);
    let result = failed.result.unwrap();
    assert!(!result.success);
    assert_eq!(
        result.error_message.as_deref(),
        Some("Research incomplete: max_tool_calls")
    );
    assert_eq!(
        step_types(&result.steps),
        vec![StepType::PromptRewriting, StepType::Search]
    );
    assert_eq!(result.final_analysis, "Partial draft");
    assert!(result.clarification.is_none());
    assert!(result.prompt_rewrite.is_none());
    assert_eq!(ResultView::from_result(&result).status, ResultStatus::Failed);
}

#[tokio::test]
async fn test_unsuccessful_provider_run_without_message_gets_one() {
    let gateway = Arc::new(ScriptedGateway {
        unsuccessful_outcome: Some(None),
        ..ScriptedGateway::default()
    });
    let orchestrator = orchestrator(gateway);

    let failed = orchestrator
        .start(
            ResearchRequest::new("X", ResearchMode::McpOnly)
                .with_clarification(false)
                .with_prompt_rewriting(false),
        )
        .await
        .unwrap();

    assert_eq!(failed.stage, WorkflowStage::Failed);
    let result = failed.result.unwrap();
    assert_eq!(
        result.error_message.as_deref(),
        Some("Provider reported an unsuccessful research run")
    );
}

#[tokio::test]
async fn test_dropping_in_flight_research_leaves_state_unchanged() {
    let gateway = Arc::new(ScriptedGateway {
        stall_research: true,
        ..ScriptedGateway::default().with_questions(1, "intent")
    });
    let orchestrator = orchestrator(gateway.clone());

    let suspended = orchestrator
        .start(ResearchRequest::new("AI trends", ResearchMode::McpOnly).with_prompt_rewriting(false))
        .await
        .unwrap();
    let before = suspended.clone();

    let attempt = tokio::time::timeout(
        Duration::from_millis(50),
        orchestrator.submit_answers(&suspended, vec![answer(0, "answer")]),
    )
    .await;

    assert!(attempt.is_err());
    assert_eq!(suspended, before);
    assert_eq!(suspended.stage, WorkflowStage::AwaitingAnswers);
}

#[tokio::test]
async fn test_depth_defaults_flow_into_research_options() {
    let gateway = Arc::new(ScriptedGateway::default());
    let orchestrator = ResearchOrchestrator::new(
        gateway.clone(),
        OrchestratorSettings {
            default_depth: ResearchDepth::Deep,
            background_mode: true,
        },
    );

    orchestrator
        .research_only(ResearchRequest::new("q", ResearchMode::DeepResearchO4Mini))
        .await
        .unwrap();

    let options = &gateway.research_calls()[0].options;
    assert_eq!(options.max_tool_calls, 40);
    assert!(options.background);
}

#[tokio::test]
async fn test_invalid_request_never_reaches_gateway() {
    let gateway = Arc::new(ScriptedGateway::default());
    let orchestrator = orchestrator(gateway.clone());

    let err = orchestrator
        .start(ResearchRequest::new("   ", ResearchMode::McpOnly))
        .await
        .unwrap_err();

    assert!(err.is_validation());
    assert!(gateway.calls().is_empty());
}

#[test]
fn test_registry_and_catalog_are_stable() {
    let modes = list_modes();
    for mode in ResearchMode::ALL {
        let info = modes.get(&mode).unwrap();
        assert!(!info.capabilities.is_empty());
    }
    assert_eq!(list_modes(), modes);
    assert_eq!(get_api_info(), get_api_info());
}

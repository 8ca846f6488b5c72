//! Integration tests for deepresearch-core infrastructure

use deepresearch_core::{
    config_error, invalid_state_error, not_found_error, validation_error, ClarificationWithAnswers,
    DeepResearchConfig, DeepResearchError, ResearchCall, ResearchDepth, ResearchMode,
    ResearchOutcome, ResearchRequest, ResearchResult, ResearchStep, StepType,
};
use serde_json::json;

#[test]
fn test_error_macros_attach_context() {
    let error = not_found_error!("session 42", "web");

    match &error {
        DeepResearchError::NotFound { resource, context } => {
            assert_eq!(resource, "session 42");
            assert_eq!(context.component, "web");
            assert!(!context.error_id.is_empty());
            assert!(!context.recovery_suggestions.is_empty());
        }
        _ => panic!("Expected NotFound error"),
    }

    error.log();

    let config = config_error!("Invalid config", "test");
    assert!(!config.is_recoverable());

    let state = invalid_state_error!("completed", "submit answers", "workflow");
    assert_eq!(
        state.to_string(),
        "Cannot submit answers while workflow is completed"
    );

    let validation = validation_error!("Query must not be empty", "query", "request");
    match validation {
        DeepResearchError::Validation { field, .. } => assert_eq!(field.as_deref(), Some("query")),
        _ => panic!("Expected Validation error"),
    }
}

#[test]
fn test_result_serializes_with_wire_names() {
    let mut input = serde_json::Map::new();
    input.insert("query".to_string(), json!("climate policy 2024"));
    let mut output = serde_json::Map::new();
    output.insert("result_count".to_string(), json!(3));

    let result = ResearchResult {
        query: "climate policy 2024".to_string(),
        mode: ResearchMode::WebsearchOnly,
        clarification: Some(ClarificationWithAnswers::skipped("climate policy 2024")),
        prompt_rewrite: None,
        search_results: Vec::new(),
        fetch_results: Vec::new(),
        final_analysis: "Summary".to_string(),
        steps: vec![ResearchStep::new(StepType::PromptRewriting, input, output, 15)],
        total_duration_ms: 15,
        success: true,
        error_message: None,
    };

    let value = serde_json::to_value(&result).unwrap();
    assert_eq!(value["mode"], "websearch-only");
    assert_eq!(value["steps"][0]["step_type"], "prompt_rewriting");
    assert_eq!(value["steps"][0]["input_data"]["query"], "climate policy 2024");
    assert_eq!(value["clarification"]["clarified_intent"], "climate policy 2024");

    let back: ResearchResult = serde_json::from_value(value).unwrap();
    assert_eq!(back, result);
}

#[test]
fn test_payload_preserves_insertion_order() {
    let mut payload = serde_json::Map::new();
    payload.insert("zeta".to_string(), json!(1));
    payload.insert("alpha".to_string(), json!(2));

    let keys: Vec<_> = payload.keys().cloned().collect();
    assert_eq!(keys, vec!["zeta", "alpha"]);
}

#[test]
fn test_partial_outcome_deserializes_with_empty_fields() {
    let outcome: ResearchOutcome = serde_json::from_value(json!({ "success": true })).unwrap();
    assert!(outcome.final_analysis.is_empty());
    assert!(outcome.search_results.is_empty());
    assert!(outcome.error_message.is_none());
}

#[test]
fn test_request_options_flow_into_call() {
    let request = ResearchRequest::new("AI trends", ResearchMode::DeepResearchO4Mini)
        .with_depth(ResearchDepth::Fast)
        .with_clarification(false);

    let options = request.options(ResearchDepth::Medium, false);
    let call = ResearchCall::new("AI trends", request.mode, &request.query).with_options(options);

    assert_eq!(call.options.max_tool_calls, 8);
    assert_eq!(call.options.max_tokens, Some(4000));
    assert!(!call.options.background);
}

#[test]
fn test_config_load_from_explicit_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("deepresearch.toml");
    std::fs::write(
        &path,
        r#"
[provider]
base_url = "https://proxy.internal/v1"
timeout_seconds = 120

[retry]
max_attempts = 3
"#,
    )
    .unwrap();

    let config = DeepResearchConfig::load(Some(&path)).unwrap();
    assert_eq!(config.provider.timeout_seconds, 120);
    assert_eq!(config.retry.max_attempts, 3);
    assert_eq!(config.models.clarification, "gpt-4.1");
}

#[test]
fn test_config_load_rejects_missing_explicit_file() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.toml");
    assert!(DeepResearchConfig::load(Some(&missing)).is_err());
}

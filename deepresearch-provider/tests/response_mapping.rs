//! Provider payload mapping against recorded responses

use deepresearch_core::{ResearchMode, StepType};
use deepresearch_provider::chat::{parse_clarification, ChatResponse};
use deepresearch_provider::{into_outcome, OutcomeContext, ResponsesResponse};

const DEEP_RESEARCH_COMPLETED: &str = include_str!("fixtures/deep_research_completed.json");
const WEBSEARCH_INCOMPLETE: &str = include_str!("fixtures/websearch_incomplete.json");
const CHAT_CLARIFICATION: &str = include_str!("fixtures/chat_clarification.json");
const MISSING_STATUS: &str = include_str!("fixtures/missing_status.json");

fn context(mode: ResearchMode, tools: &[&str]) -> OutcomeContext {
    OutcomeContext {
        model: "configured-model".to_string(),
        mode,
        tools: tools.iter().map(|t| t.to_string()).collect(),
        elapsed_ms: 4200,
    }
}

#[test]
fn test_deep_research_response_maps_tool_calls_to_steps() {
    let response: ResponsesResponse = serde_json::from_str(DEEP_RESEARCH_COMPLETED).unwrap();
    let outcome = into_outcome(
        &response,
        &context(ResearchMode::DeepResearchO3, &["search", "fetch"]),
    );

    assert!(outcome.success);
    assert!(outcome.error_message.is_none());

    let step_types: Vec<_> = outcome.steps.iter().map(|s| s.step_type).collect();
    assert_eq!(
        step_types,
        vec![StepType::Search, StepType::Fetch, StepType::Analysis]
    );

    let search = &outcome.steps[0];
    assert_eq!(search.input_data["query"], "climate policy 2024");
    assert_eq!(search.output_data["results_count"], 2);

    let analysis = outcome.steps.last().unwrap();
    assert_eq!(analysis.duration_ms, 4200);
    assert_eq!(analysis.input_data["model"], "o3-deep-research-2025-06-26");
    assert_eq!(analysis.input_data["mode"], "o3-deep-research");
    assert_eq!(analysis.output_data["status"], "completed");

    // Two MCP hits plus the one citation not already listed
    assert_eq!(outcome.search_results.len(), 3);
    assert_eq!(outcome.search_results[0].relevance_score, Some(0.873));
    let citation = &outcome.search_results[2];
    assert_eq!(citation.id, "citation_1");
    assert_eq!(citation.url, "https://climate.example.org/report");
    assert_eq!(citation.snippet, "Global climate report");

    assert_eq!(outcome.fetch_results.len(), 1);
    let document = &outcome.fetch_results[0];
    assert!(document.content.contains("maritime transport"));
    assert_eq!(document.metadata["published"], "2024-03-01");
    assert_eq!(document.metadata["title"], "EU ETS reform 2024");

    assert!(outcome.final_analysis.starts_with("# Climate policy in 2024"));
}

#[test]
fn test_incomplete_response_is_unsuccessful_but_keeps_partial_data() {
    let response: ResponsesResponse = serde_json::from_str(WEBSEARCH_INCOMPLETE).unwrap();
    assert!(response.is_terminal());

    let outcome = into_outcome(&response, &context(ResearchMode::WebsearchOnly, &["web_search"]));

    assert!(!outcome.success);
    assert_eq!(
        outcome.error_message.as_deref(),
        Some("Research incomplete: max_output_tokens")
    );
    assert_eq!(outcome.steps[0].input_data["source"], "websearch");
    assert_eq!(outcome.steps[0].input_data["query"], "AI trends healthcare 2025");
    assert_eq!(outcome.final_analysis, "Partial findings on AI adoption");
    assert!(outcome.search_results.is_empty());
}

#[test]
fn test_pending_response_is_not_terminal() {
    let response: ResponsesResponse =
        serde_json::from_str(r#"{"id": "resp_1", "status": "in_progress", "output": []}"#).unwrap();
    assert!(!response.is_terminal());
    assert!(!response.is_success());
}

#[test]
fn test_chat_clarification_payload() {
    let response: ChatResponse = serde_json::from_str(CHAT_CLARIFICATION).unwrap();
    let clarification = parse_clarification(&response).unwrap();

    assert_eq!(clarification.questions.len(), 2);
    assert_eq!(
        clarification.questions[1].question,
        "What time horizon should the research cover?"
    );
    assert_eq!(
        clarification.clarified_intent,
        "Survey current AI adoption trends across industries"
    );
}

#[test]
fn test_response_without_status_is_not_a_success() {
    let response: ResponsesResponse = serde_json::from_str(MISSING_STATUS).unwrap();
    assert!(response.is_terminal());
    assert!(!response.is_success());

    let outcome = into_outcome(&response, &context(ResearchMode::WebsearchOnly, &["web_search"]));
    assert!(!outcome.success);
    assert_eq!(
        outcome.error_message.as_deref(),
        Some("Provider response carried no status")
    );
    assert_eq!(outcome.final_analysis, "Partial notes on offshore wind permitting.");
    assert_eq!(outcome.steps.last().unwrap().output_data["status"], "unknown");
}

//! Test harness: an in-process gateway double and a spawned server

use async_trait::async_trait;
use deepresearch_core::{
    provider_error, ClarificationQuestion, ClarificationResponse, ClarificationWithAnswers,
    DeepResearchConfig, DeepResearchResult, PromptRewriteResult, ProviderErrorKind, ResearchCall,
    ResearchGateway, ResearchOutcome, SearchResult,
};
use deepresearch_web::{create_app, AppState, WebConfig};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

/// Deterministic gateway: asks `questions` clarifying questions and echoes prompts
#[derive(Default)]
pub struct StubGateway {
    pub questions: usize,
    pub rate_limited: bool,
    /// How long each research call takes
    pub research_delay_ms: u64,
    pub research_calls: Arc<AtomicUsize>,
}

#[async_trait]
impl ResearchGateway for StubGateway {
    async fn clarify(&self, query: &str) -> DeepResearchResult<ClarificationResponse> {
        Ok(ClarificationResponse {
            questions: (0..self.questions)
                .map(|i| ClarificationQuestion {
                    question: format!("Question {} about {}?", i + 1, query),
                    context: "scope".to_string(),
                })
                .collect(),
            clarified_intent: format!("{} (clarified)", query),
        })
    }

    async fn rewrite(
        &self,
        original_query: &str,
        clarification: &ClarificationWithAnswers,
    ) -> DeepResearchResult<PromptRewriteResult> {
        Ok(PromptRewriteResult {
            original_query: original_query.to_string(),
            rewritten_prompt: format!("Research: {}", clarification.clarified_intent),
            reasoning: "stub".to_string(),
        })
    }

    async fn run_research(&self, call: ResearchCall) -> DeepResearchResult<ResearchOutcome> {
        self.research_calls.fetch_add(1, Ordering::SeqCst);
        if self.research_delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.research_delay_ms)).await;
        }

        if self.rate_limited {
            return Err(provider_error!(
                ProviderErrorKind::RateLimit,
                Some(429),
                "HTTP 429: rate limit reached",
                "stub_gateway"
            ));
        }

        Ok(ResearchOutcome {
            search_results: vec![SearchResult {
                id: "doc-1".to_string(),
                title: "Stub source".to_string(),
                url: "https://example.org/doc-1".to_string(),
                snippet: call.prompt.clone(),
                relevance_score: Some(0.42),
            }],
            final_analysis: format!("Findings for: {}", call.prompt),
            success: true,
            ..ResearchOutcome::default()
        })
    }
}

pub fn test_state(gateway: StubGateway) -> AppState {
    AppState::with_gateway(
        WebConfig::default(),
        DeepResearchConfig::default(),
        Arc::new(gateway),
    )
}

pub struct TestApp {
    pub address: String,
    pub api_client: reqwest::Client,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }
}

/// Serve the app on an ephemeral port
pub async fn spawn_app(gateway: StubGateway) -> TestApp {
    let app = create_app(test_state(gateway));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestApp {
        address: format!("http://127.0.0.1:{}", port),
        api_client: reqwest::Client::new(),
    }
}

//! HTTP-backed research gateway

use crate::chat::{parse_clarification, parse_rewrite, ChatRequest, ChatResponse};
use crate::client::{
    create_http_client, handle_response_error, malformed, transport_error, ApiClientConfig,
};
use crate::prompts::{clarification_prompt, rewrite_prompt, RESEARCH_INSTRUCTIONS};
use crate::responses::{into_outcome, OutcomeContext, ResponsesRequest, ResponsesResponse};
use crate::tools::{surface_tool_names, tool_surface, ToolSpec, CONSTRAINED_TOOLS, WEB_SEARCH_TOOL};
use async_trait::async_trait;
use deepresearch_core::{
    performance, retry_async, ClarificationResponse, ClarificationWithAnswers, DeepResearchConfig,
    DeepResearchError, DeepResearchResult, ErrorContext, McpConfig, ModelConfig,
    PromptRewriteResult, ProviderErrorKind, ResearchCall, ResearchConfig, ResearchGateway,
    ResearchMode, ResearchOutcome, RetryConfig,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Gateway to an OpenAI-compatible provider (chat completions + responses)
pub struct OpenAiGateway {
    client: reqwest::Client,
    api: ApiClientConfig,
    models: ModelConfig,
    mcp: McpConfig,
    research: ResearchConfig,
    retry: RetryConfig,
}

/// Only throttling and transient failures are worth another attempt
fn is_retryable(error: &DeepResearchError) -> bool {
    matches!(
        error.provider_kind(),
        Some(ProviderErrorKind::Transient | ProviderErrorKind::RateLimit)
    )
}

impl OpenAiGateway {
    /// Create a gateway; fails with a configuration error when no API key is set
    pub fn new(config: &DeepResearchConfig) -> DeepResearchResult<Self> {
        let api = ApiClientConfig::from_provider(&config.provider)?;
        let client = create_http_client(&api)?;

        info!(
            base_url = %api.base_url,
            retry_enabled = config.retry.is_enabled(),
            max_attempts = config.retry.max_attempts,
            "Created research provider gateway"
        );

        Ok(Self {
            client,
            api,
            models: config.models.clone(),
            mcp: config.mcp.clone(),
            research: config.research.clone(),
            retry: config.retry.clone(),
        })
    }

    /// Model executing the research stage for a mode
    pub fn model_for(&self, mode: ResearchMode) -> &str {
        match mode {
            ResearchMode::DeepResearchO3 => &self.models.deep_research_o3,
            ResearchMode::DeepResearchO4Mini => &self.models.deep_research_o4_mini,
            ResearchMode::WebsearchMcp | ResearchMode::WebsearchOnly | ResearchMode::McpOnly => {
                &self.models.research
            }
        }
    }

    pub fn tool_surface(&self, mode: ResearchMode) -> Vec<ToolSpec> {
        tool_surface(mode, &self.mcp)
    }

    /// Build the Responses API request for a research call
    pub fn build_research_request(&self, call: &ResearchCall) -> ResponsesRequest {
        ResponsesRequest::research(
            self.model_for(call.mode),
            RESEARCH_INSTRUCTIONS,
            &call.prompt,
            self.tool_surface(call.mode),
            &call.options,
            call.mode.is_constrained_tool(),
        )
    }

    async fn decode<R: DeserializeOwned>(
        response: reqwest::Response,
        operation: &str,
    ) -> DeepResearchResult<R> {
        if !response.status().is_success() {
            return Err(handle_response_error(response, operation).await);
        }

        let body = response
            .text()
            .await
            .map_err(|e| transport_error(e, operation))?;
        serde_json::from_str(&body).map_err(|e| {
            malformed(
                format!("Could not decode provider response: {}", e),
                operation,
            )
        })
    }

    async fn post_json<B: Serialize + ?Sized, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        operation: &str,
    ) -> DeepResearchResult<R> {
        let url = self.api.endpoint(path);
        debug!(url = %url, operation = operation, "Sending provider request");

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| transport_error(e, operation))?;

        Self::decode(response, operation).await
    }

    async fn get_json<R: DeserializeOwned>(&self, path: &str, operation: &str) -> DeepResearchResult<R> {
        let url = self.api.endpoint(path);
        debug!(url = %url, operation = operation, "Sending provider request");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| transport_error(e, operation))?;

        Self::decode(response, operation).await
    }

    async fn chat_json(&self, request: &ChatRequest, operation: &str) -> DeepResearchResult<ChatResponse> {
        retry_async(
            || self.post_json("chat/completions", request, operation),
            &self.retry,
            operation,
            is_retryable,
        )
        .await
    }

    /// Poll a background response until it reaches a terminal status
    async fn wait_for_completion(&self, mut response: ResponsesResponse) -> DeepResearchResult<ResponsesResponse> {
        let mut attempts = 0;

        while !response.is_terminal() {
            if response.id.is_empty() {
                return Err(malformed(
                    "Provider returned a pending response without an id",
                    "poll_research",
                ));
            }

            if attempts >= self.research.max_poll_attempts {
                return Err(DeepResearchError::Timeout {
                    operation: format!("waiting for research response {}", response.id),
                    duration_ms: self.research.poll_interval_ms * u64::from(attempts),
                    context: ErrorContext::new("openai_gateway")
                        .with_operation("poll_research")
                        .with_metadata("response_id", &response.id)
                        .with_suggestion("Raise research.max_poll_attempts or use a lower research depth"),
                });
            }

            tokio::time::sleep(Duration::from_millis(self.research.poll_interval_ms)).await;
            attempts += 1;

            let path = format!("responses/{}", response.id);
            response = retry_async(
                || self.get_json(&path, "poll_research"),
                &self.retry,
                "poll_research",
                is_retryable,
            )
            .await?;

            debug!(
                response_id = %response.id,
                status = response.status(),
                attempt = attempts,
                "Polled research response"
            );
        }

        Ok(response)
    }
}

#[async_trait]
impl ResearchGateway for OpenAiGateway {
    async fn clarify(&self, query: &str) -> DeepResearchResult<ClarificationResponse> {
        let request = ChatRequest::json_object(&self.models.clarification, clarification_prompt(query));
        let response =
            performance::measure_async("provider.clarify", self.chat_json(&request, "clarify"))
                .await?;
        let clarification = parse_clarification(&response)?;

        debug!(questions = clarification.questions.len(), "Clarification received");
        Ok(clarification)
    }

    async fn rewrite(
        &self,
        original_query: &str,
        clarification: &ClarificationWithAnswers,
    ) -> DeepResearchResult<PromptRewriteResult> {
        let request = ChatRequest::json_object(
            &self.models.prompt_rewriting,
            rewrite_prompt(original_query, clarification),
        );
        let response =
            performance::measure_async("provider.rewrite", self.chat_json(&request, "rewrite"))
                .await?;
        parse_rewrite(&response, original_query)
    }

    async fn run_research(&self, call: ResearchCall) -> DeepResearchResult<ResearchOutcome> {
        let start = Instant::now();
        let request = self.build_research_request(&call);
        let tools = surface_tool_names(&request.tools);

        info!(
            mode = %call.mode,
            model = %request.model,
            max_tool_calls = request.max_tool_calls,
            background = request.background,
            "Starting research call"
        );

        let response = performance::measure_async("provider.run_research", async {
            let submitted: ResponsesResponse = retry_async(
                || self.post_json("responses", &request, "run_research"),
                &self.retry,
                "run_research",
                is_retryable,
            )
            .await?;
            self.wait_for_completion(submitted).await
        })
        .await?;

        let ctx = OutcomeContext {
            model: request.model.clone(),
            mode: call.mode,
            tools,
            elapsed_ms: start.elapsed().as_millis() as u64,
        };
        let outcome = performance::measure_sync("provider.map_research_response", || {
            into_outcome(&response, &ctx)
        });

        if outcome.success {
            info!(
                search_results = outcome.search_results.len(),
                fetch_results = outcome.fetch_results.len(),
                duration_ms = ctx.elapsed_ms,
                "Research call completed"
            );
        } else {
            warn!(
                status = response.status(),
                error = outcome.error_message.as_deref().unwrap_or_default(),
                "Research call ended unsuccessfully"
            );
        }

        Ok(outcome)
    }

    fn tool_names(&self) -> Vec<String> {
        CONSTRAINED_TOOLS
            .iter()
            .chain(std::iter::once(&WEB_SEARCH_TOOL))
            .map(|name| name.to_string())
            .collect()
    }
}

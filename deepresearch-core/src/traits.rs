//! Core trait definitions

use crate::error::DeepResearchResult;
use crate::types::*;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Input of the research stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearchCall {
    /// Final prompt chosen by the orchestrator
    pub prompt: String,
    pub mode: ResearchMode,
    pub original_query: String,
    #[serde(default)]
    pub options: ResearchOptions,
}

impl ResearchCall {
    pub fn new(prompt: impl Into<String>, mode: ResearchMode, original_query: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            mode,
            original_query: original_query.into(),
            options: ResearchOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ResearchOptions) -> Self {
        self.options = options;
        self
    }
}

/// What the provider produced for a research call.
///
/// Clarification and prompt rewrite records are attached by the orchestrator, not the provider.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ResearchOutcome {
    #[serde(default)]
    pub search_results: Vec<SearchResult>,
    #[serde(default)]
    pub fetch_results: Vec<FetchResult>,
    #[serde(default)]
    pub final_analysis: String,
    #[serde(default)]
    pub steps: Vec<ResearchStep>,
    pub success: bool,
    #[serde(default)]
    pub error_message: Option<String>,
}

/// Uniform call interface to the external research provider
#[async_trait]
pub trait ResearchGateway: Send + Sync {
    /// Ask the provider for follow-up questions. An empty list means none are needed.
    async fn clarify(&self, query: &str) -> DeepResearchResult<ClarificationResponse>;

    /// Turn a (possibly clarified) query into a research prompt
    async fn rewrite(
        &self,
        original_query: &str,
        clarification: &ClarificationWithAnswers,
    ) -> DeepResearchResult<PromptRewriteResult>;

    /// Run the long research stage
    async fn run_research(&self, call: ResearchCall) -> DeepResearchResult<ResearchOutcome>;

    /// Names of the tools the provider can expose
    fn tool_names(&self) -> Vec<String> {
        vec!["search".to_string(), "fetch".to_string()]
    }
}

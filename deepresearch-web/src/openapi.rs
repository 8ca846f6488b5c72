//! OpenAPI specification for the Deep Research web server

use utoipa::OpenApi;

use crate::handlers::{
    AnalysisRequest, ClarifyRequest, ErrorResponse, HealthResponse, ModesResponse,
    RewritePromptRequest, StartResearchRequest, SubmitAnswersRequest, ToolsResponse,
    WorkflowResponse,
};
use deepresearch_applications::{
    presenter::{
        DetailView, FetchSourceView, FormField, QuestionAnswerView, RewriteView,
        SearchSourceView, SourcesView, TimelineEntry,
    },
    ApiInfo, ClarificationForm, DepthOption, DepthOptions, ModeInfo, ResultStatus, ResultView,
    WorkflowStage,
};
use deepresearch_core::{
    ClarificationAnswer, ClarificationQuestion, ClarificationResponse, ClarificationWithAnswers,
    FetchResult, PromptRewriteResult, ResearchDepth, ResearchMode, ResearchResult, ResearchStep,
    SearchResult, StepType,
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Deep Research API",
        version = "0.1.0",
        description = "Clarify, rewrite and research workflow over hosted deep research models"
    ),
    servers(
        (url = "http://localhost:8000", description = "Local development server")
    ),
    paths(
        crate::handlers::health_check,
        crate::handlers::api_info,
        crate::handlers::research_modes,
        crate::handlers::research_depth_options,
        crate::handlers::research_tools,
        crate::handlers::start_research,
        crate::handlers::submit_answers,
        crate::handlers::skip_clarification,
        crate::handlers::get_research,
        crate::handlers::get_research_view,
        crate::handlers::delete_research,
        crate::handlers::research_analysis,
        crate::handlers::clarify,
        crate::handlers::rewrite_prompt,
    ),
    components(
        schemas(
            HealthResponse,
            ErrorResponse,
            ApiInfo,
            ModeInfo,
            ModesResponse,
            DepthOption,
            DepthOptions,
            ToolsResponse,
            StartResearchRequest,
            SubmitAnswersRequest,
            WorkflowResponse,
            AnalysisRequest,
            ClarifyRequest,
            RewritePromptRequest,
            WorkflowStage,
            ResearchMode,
            ResearchDepth,
            ClarificationQuestion,
            ClarificationAnswer,
            ClarificationResponse,
            ClarificationWithAnswers,
            PromptRewriteResult,
            SearchResult,
            FetchResult,
            StepType,
            ResearchStep,
            ResearchResult,
            ResultStatus,
            ResultView,
            TimelineEntry,
            SearchSourceView,
            FetchSourceView,
            SourcesView,
            QuestionAnswerView,
            RewriteView,
            DetailView,
            ClarificationForm,
            FormField,
        )
    ),
    tags(
        (name = "Health", description = "Liveness probe"),
        (name = "Catalog", description = "Modes, depth presets, tools and service metadata"),
        (name = "Research", description = "Resumable research sessions"),
        (name = "Gateway", description = "Single provider stages"),
    )
)]
pub struct ApiDoc;

/// The OpenAPI specification as pretty JSON
pub fn get_openapi_json() -> serde_json::Result<String> {
    ApiDoc::openapi().to_pretty_json()
}

/// The OpenAPI specification as YAML
pub fn get_openapi_yaml() -> Result<String, serde_yaml::Error> {
    serde_yaml::to_string(&ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_generation() {
        let openapi = ApiDoc::openapi();
        assert_eq!(openapi.info.title, "Deep Research API");
        assert!(openapi.paths.paths.contains_key("/research/{session_id}/answers"));
        assert!(openapi.paths.paths.contains_key("/healthz"));
    }

    #[test]
    fn test_openapi_json_and_yaml() {
        assert!(get_openapi_json().unwrap().contains("Deep Research API"));
        assert!(get_openapi_yaml().unwrap().contains("awaiting_answers"));
    }
}

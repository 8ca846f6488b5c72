//! Research workflow handlers

use super::types::{
    AnalysisRequest, ClarifyRequest, ErrorResponse, RewritePromptRequest, StartResearchRequest,
    SubmitAnswersRequest, WorkflowResponse,
};
use crate::{AppState, WebResult};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    Json as JsonExtractor,
};
use deepresearch_applications::{ResultView, WorkflowState};
use deepresearch_core::{
    invalid_state_error, not_found_error, validation_error, ClarificationResponse,
    ClarificationWithAnswers, PromptRewriteResult, ResearchResult,
};
use tracing::info;

async fn load_session(state: &AppState, session_id: &str) -> WebResult<WorkflowState> {
    state
        .sessions
        .get(session_id)
        .await
        .ok_or_else(|| not_found_error!(format!("research session {}", session_id), "web").into())
}

/// Start a research workflow
#[utoipa::path(
    post,
    path = "/research",
    tag = "Research",
    summary = "Start research",
    description = "Runs clarification, prompt rewriting and research. Suspends in `awaiting_answers` when the clarification stage asks questions.",
    request_body = StartResearchRequest,
    responses(
        (status = 200, description = "Workflow suspended or finished", body = WorkflowResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse)
    )
)]
pub async fn start_research(
    State(state): State<AppState>,
    JsonExtractor(body): JsonExtractor<StartResearchRequest>,
) -> WebResult<Json<WorkflowResponse>> {
    let request = body.into_request()?;
    info!(mode = %request.mode, "Starting research session");

    let workflow = state.orchestrator.start(request).await?;
    state.sessions.store(workflow.clone()).await;

    Ok(Json(workflow.into()))
}

/// Answer the clarification questions of a suspended workflow
#[utoipa::path(
    post,
    path = "/research/{session_id}/answers",
    tag = "Research",
    summary = "Submit clarification answers",
    params(("session_id" = String, Path, description = "Research session ID")),
    request_body = SubmitAnswersRequest,
    responses(
        (status = 200, description = "Workflow resumed to completion", body = WorkflowResponse),
        (status = 400, description = "Blank or mismatched answers", body = ErrorResponse),
        (status = 404, description = "Unknown session", body = ErrorResponse),
        (status = 409, description = "Workflow is not awaiting answers or is already being resumed", body = ErrorResponse)
    )
)]
pub async fn submit_answers(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    JsonExtractor(body): JsonExtractor<SubmitAnswersRequest>,
) -> WebResult<Json<WorkflowResponse>> {
    let claim = state.sessions.claim(&session_id, "submit answers").await?;
    let next = state
        .orchestrator
        .submit_answers(claim.state(), body.answers)
        .await?;
    state.sessions.commit(claim, next.clone()).await;

    Ok(Json(next.into()))
}

/// Continue a suspended workflow without answering
#[utoipa::path(
    post,
    path = "/research/{session_id}/skip",
    tag = "Research",
    summary = "Skip clarification",
    params(("session_id" = String, Path, description = "Research session ID")),
    responses(
        (status = 200, description = "Workflow resumed to completion", body = WorkflowResponse),
        (status = 404, description = "Unknown session", body = ErrorResponse),
        (status = 409, description = "Workflow is not awaiting answers or is already being resumed", body = ErrorResponse)
    )
)]
pub async fn skip_clarification(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> WebResult<Json<WorkflowResponse>> {
    let claim = state.sessions.claim(&session_id, "skip clarification").await?;
    let next = state.orchestrator.skip_clarification(claim.state()).await?;
    state.sessions.commit(claim, next.clone()).await;

    Ok(Json(next.into()))
}

/// Current state of a research session
#[utoipa::path(
    get,
    path = "/research/{session_id}",
    tag = "Research",
    summary = "Get research session",
    params(("session_id" = String, Path, description = "Research session ID")),
    responses(
        (status = 200, description = "Session state", body = WorkflowResponse),
        (status = 404, description = "Unknown session", body = ErrorResponse)
    )
)]
pub async fn get_research(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> WebResult<Json<WorkflowResponse>> {
    let current = load_session(&state, &session_id).await?;
    Ok(Json(current.into()))
}

/// Presentation views of a finished session
#[utoipa::path(
    get,
    path = "/research/{session_id}/view",
    tag = "Research",
    summary = "Get result views",
    params(("session_id" = String, Path, description = "Research session ID")),
    responses(
        (status = 200, description = "Analysis, timeline, sources and detail", body = ResultView),
        (status = 404, description = "Unknown session", body = ErrorResponse),
        (status = 409, description = "Workflow has no result yet", body = ErrorResponse)
    )
)]
pub async fn get_research_view(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> WebResult<Json<ResultView>> {
    let current = load_session(&state, &session_id).await?;
    let result = current
        .result
        .as_ref()
        .ok_or_else(|| invalid_state_error!(current.stage, "view results", "web"))?;

    Ok(Json(ResultView::from_result(result)))
}

/// Abandon a research session
#[utoipa::path(
    delete,
    path = "/research/{session_id}",
    tag = "Research",
    summary = "Abandon research session",
    params(("session_id" = String, Path, description = "Research session ID")),
    responses(
        (status = 204, description = "Session removed"),
        (status = 404, description = "Unknown session", body = ErrorResponse)
    )
)]
pub async fn delete_research(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> WebResult<StatusCode> {
    match state.sessions.remove(&session_id).await {
        Some(_) => {
            info!(session_id = %session_id, "Research session abandoned");
            Ok(StatusCode::NO_CONTENT)
        }
        None => Err(not_found_error!(format!("research session {}", session_id), "web").into()),
    }
}

/// Research stage only
#[utoipa::path(
    post,
    path = "/research-analysis",
    tag = "Research",
    summary = "Run research on a prepared prompt",
    description = "Skips clarification and prompt rewriting",
    request_body = AnalysisRequest,
    responses(
        (status = 200, description = "Research result", body = ResearchResult),
        (status = 400, description = "Invalid request", body = ErrorResponse)
    )
)]
pub async fn research_analysis(
    State(state): State<AppState>,
    JsonExtractor(body): JsonExtractor<AnalysisRequest>,
) -> WebResult<Json<ResearchResult>> {
    let request = body.into_request()?;
    let result = state.orchestrator.research_only(request).await?;
    Ok(Json(result))
}

/// Clarification stage only
#[utoipa::path(
    post,
    path = "/clarify",
    tag = "Gateway",
    summary = "Generate clarifying questions",
    request_body = ClarifyRequest,
    responses(
        (status = 200, description = "Clarifying questions", body = ClarificationResponse),
        (status = 400, description = "Empty query", body = ErrorResponse)
    )
)]
pub async fn clarify(
    State(state): State<AppState>,
    JsonExtractor(body): JsonExtractor<ClarifyRequest>,
) -> WebResult<Json<ClarificationResponse>> {
    if body.query.trim().is_empty() {
        return Err(validation_error!("query must not be empty", "query", "web").into());
    }

    let response = state.orchestrator.gateway().clarify(&body.query).await?;
    Ok(Json(response))
}

/// Prompt rewriting stage only
#[utoipa::path(
    post,
    path = "/rewrite-prompt",
    tag = "Gateway",
    summary = "Rewrite a query into a research prompt",
    request_body = RewritePromptRequest,
    responses(
        (status = 200, description = "Rewritten prompt", body = PromptRewriteResult),
        (status = 400, description = "Empty query", body = ErrorResponse)
    )
)]
pub async fn rewrite_prompt(
    State(state): State<AppState>,
    JsonExtractor(body): JsonExtractor<RewritePromptRequest>,
) -> WebResult<Json<PromptRewriteResult>> {
    if body.original_query.trim().is_empty() {
        return Err(validation_error!(
            "original_query must not be empty",
            "original_query",
            "web"
        )
        .into());
    }

    let clarification = body
        .clarification_with_answers
        .unwrap_or_else(|| ClarificationWithAnswers::skipped(&body.original_query));
    let response = state
        .orchestrator
        .gateway()
        .rewrite(&body.original_query, &clarification)
        .await?;
    Ok(Json(response))
}

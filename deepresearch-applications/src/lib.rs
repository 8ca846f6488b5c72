//! Deep Research Applications - the user-facing research workflow
//!
//! Builds on the gateway contract from deepresearch-core:
//!
//! - Resumable clarify -> rewrite -> research orchestration
//! - The research mode registry and API catalog
//! - Result and clarification form presentation
//!
//! ## Architecture
//!
//! - **Core** (deepresearch-core): data model, errors, configuration
//! - **Provider** (deepresearch-provider): the hosted model gateway
//! - **Applications** (this crate): workflow and presentation logic
//! - **Surfaces** (deepresearch-web/cli): HTTP and terminal front ends

pub mod catalog;
pub mod modes;
pub mod presenter;
pub mod research;

pub use catalog::{depth_options, get_api_info, ApiInfo, DepthOption, DepthOptions};
pub use modes::{list_modes, mode_info, ModeInfo};
pub use presenter::{
    format_duration, format_relevance, ClarificationForm, FormField, ResultStatus, ResultView,
};
pub use research::{
    OrchestratorSettings, ResearchOrchestrator, SessionClaim, WorkflowSessions, WorkflowStage,
    WorkflowState,
};

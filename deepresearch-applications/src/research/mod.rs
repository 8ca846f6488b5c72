//! Research workflow: resumable state, orchestration and session storage

pub mod orchestrator;
pub mod sessions;
pub mod workflow;

pub use orchestrator::{OrchestratorSettings, ResearchOrchestrator};
pub use sessions::{SessionClaim, WorkflowSessions};
pub use workflow::{WorkflowStage, WorkflowState};

//! Application state shared by the handlers

use crate::{WebConfig, WebResult};
use deepresearch_applications::{OrchestratorSettings, ResearchOrchestrator, WorkflowSessions};
use deepresearch_core::{DeepResearchConfig, ResearchGateway};
use deepresearch_provider::OpenAiGateway;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Clone)]
pub struct AppState {
    pub config: WebConfig,
    /// Research configuration the gateway was built from
    pub research: Arc<DeepResearchConfig>,
    pub orchestrator: Arc<ResearchOrchestrator>,
    /// Suspended and finished workflows, keyed by session id
    pub sessions: WorkflowSessions,
}

impl AppState {
    /// Load the research configuration and connect the provider gateway
    pub fn new(config: WebConfig) -> WebResult<Self> {
        let research = DeepResearchConfig::load(config.config_path.as_deref())?;
        let gateway = OpenAiGateway::new(&research)?;
        info!(
            default_depth = %research.research.default_depth,
            background_mode = research.research.background_mode,
            "Research gateway ready"
        );

        Ok(Self::with_gateway(config, research, Arc::new(gateway)))
    }

    /// Build the state around an explicitly constructed gateway
    pub fn with_gateway(
        config: WebConfig,
        research: DeepResearchConfig,
        gateway: Arc<dyn ResearchGateway>,
    ) -> Self {
        let settings = OrchestratorSettings::from(&research.research);
        Self {
            config,
            research: Arc::new(research),
            orchestrator: Arc::new(ResearchOrchestrator::new(gateway, settings)),
            sessions: WorkflowSessions::new(),
        }
    }

    /// Drop research sessions idle for longer than the configured TTL
    pub async fn cleanup_expired_sessions(&self) -> usize {
        let removed = self.sessions.cleanup_expired(self.config.session_ttl()).await;
        debug!(removed, "Session cleanup finished");
        removed
    }
}

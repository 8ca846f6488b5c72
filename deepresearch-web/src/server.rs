//! Deep Research web server
//!
//! Main web server implementation using Axum.

use crate::{create_app, AppState, WebConfig, WebError, WebResult};
use axum::serve;
use deepresearch_core::ResearchGateway;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{error, info};

pub struct DeepResearchServer {
    config: WebConfig,
    state: AppState,
}

impl DeepResearchServer {
    /// Create a server backed by the configured provider gateway
    pub fn new(config: WebConfig) -> WebResult<Self> {
        let state = AppState::new(config.clone())?;
        Ok(Self { config, state })
    }

    /// Create a server around an already prepared state
    pub fn with_state(state: AppState) -> Self {
        Self {
            config: state.config.clone(),
            state,
        }
    }

    /// Start the web server
    pub async fn start(self) -> WebResult<()> {
        let address = self.config.address();

        info!("🚀 Starting Deep Research Web Server");
        info!("📍 Server address: http://{}", address);
        info!("🔧 Development mode: {}", self.config.dev_mode);

        let app = create_app(self.state.clone());

        let listener = TcpListener::bind(&address)
            .await
            .map_err(WebError::Server)?;

        info!("✅ Server listening on http://{}", address);
        info!("📖 API docs at http://{}/swagger-ui", address);

        spawn_session_cleanup(
            self.state.clone(),
            Duration::from_secs(self.config.session_cleanup_interval_seconds.max(1)),
        );

        if let Err(e) = serve(listener, app).await {
            error!("❌ Server error: {}", e);
            return Err(WebError::Server(e));
        }

        Ok(())
    }

    pub fn config(&self) -> &WebConfig {
        &self.config
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }
}

/// Periodically drop expired research sessions
fn spawn_session_cleanup(state: AppState, every: Duration) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        loop {
            interval.tick().await;
            let removed = state.cleanup_expired_sessions().await;
            if removed > 0 {
                info!(removed, "Dropped expired research sessions");
            }
        }
    });
}

/// Builder for DeepResearchServer
pub struct DeepResearchServerBuilder {
    config: WebConfig,
    gateway: Option<Arc<dyn ResearchGateway>>,
}

impl DeepResearchServerBuilder {
    pub fn new() -> Self {
        Self {
            config: WebConfig::default(),
            gateway: None,
        }
    }

    /// Start from an existing configuration
    pub fn config(mut self, config: WebConfig) -> Self {
        self.config = config;
        self
    }

    pub fn host<S: Into<String>>(mut self, host: S) -> Self {
        self.config.host = host.into();
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    pub fn dev_mode(mut self, dev_mode: bool) -> Self {
        self.config.dev_mode = dev_mode;
        self
    }

    /// Research configuration file
    pub fn config_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.config.config_path = Some(path.into());
        self
    }

    pub fn session_ttl_seconds(mut self, seconds: u64) -> Self {
        self.config.session_ttl_seconds = seconds;
        self
    }

    /// Use this gateway instead of connecting to the configured provider
    pub fn gateway(mut self, gateway: Arc<dyn ResearchGateway>) -> Self {
        self.gateway = Some(gateway);
        self
    }

    /// Build the server
    pub fn build(self) -> WebResult<DeepResearchServer> {
        match self.gateway {
            Some(gateway) => {
                let research = deepresearch_core::DeepResearchConfig::load(
                    self.config.config_path.as_deref(),
                )?;
                let state = AppState::with_gateway(self.config, research, gateway);
                Ok(DeepResearchServer::with_state(state))
            }
            None => DeepResearchServer::new(self.config),
        }
    }
}

impl Default for DeepResearchServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_builder() {
        let builder = DeepResearchServerBuilder::new()
            .host("localhost")
            .port(3000)
            .dev_mode(true)
            .session_ttl_seconds(60);

        assert_eq!(builder.config.host, "localhost");
        assert_eq!(builder.config.port, 3000);
        assert!(builder.config.dev_mode);
        assert_eq!(builder.config.session_ttl_seconds, 60);
        assert!(builder.gateway.is_none());
    }
}

//! Configuration management

use crate::async_utils::RetryConfig;
use crate::error::{DeepResearchError, DeepResearchResult};
use crate::types::ResearchDepth;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const API_KEY_ENV: &str = "OPENAI_API_KEY";
pub const BASE_URL_ENV: &str = "DEEPRESEARCH_BASE_URL";
pub const MCP_URL_ENV: &str = "DEEPRESEARCH_MCP_URL";
pub const CONFIG_FILE_NAME: &str = "deepresearch.toml";

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DeepResearchConfig {
    pub provider: ProviderConfig,
    pub models: ModelConfig,
    pub mcp: McpConfig,
    pub research: ResearchConfig,
    pub retry: RetryConfig,
}

/// Connection to the hosted provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Falls back to OPENAI_API_KEY when absent
    pub api_key: Option<String>,
    pub base_url: String,
    pub organization: Option<String>,
    pub timeout_seconds: u64,
    pub user_agent: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.openai.com/v1".to_string(),
            organization: None,
            timeout_seconds: 300,
            user_agent: format!("deepresearch/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub deep_research_o3: String,
    pub deep_research_o4_mini: String,
    pub clarification: String,
    pub prompt_rewriting: String,
    /// Model driving the web search and MCP-only modes
    pub research: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            deep_research_o3: "o3-deep-research".to_string(),
            deep_research_o4_mini: "o4-mini-deep-research".to_string(),
            clarification: "gpt-4.1".to_string(),
            prompt_rewriting: "gpt-4.1".to_string(),
            research: "gpt-4.1".to_string(),
        }
    }
}

/// Remote MCP server that serves the search and fetch tools
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct McpConfig {
    pub server_label: String,
    pub server_url: String,
    pub require_approval: String,
}

impl Default for McpConfig {
    fn default() -> Self {
        Self {
            server_label: "internal".to_string(),
            server_url: "http://localhost:8001/sse".to_string(),
            require_approval: "never".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResearchConfig {
    pub default_depth: ResearchDepth,
    pub background_mode: bool,
    pub poll_interval_ms: u64,
    pub max_poll_attempts: u32,
}

impl Default for ResearchConfig {
    fn default() -> Self {
        Self {
            default_depth: ResearchDepth::Medium,
            background_mode: false,
            poll_interval_ms: 2000,
            max_poll_attempts: 450,
        }
    }
}

impl DeepResearchConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> DeepResearchResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| DeepResearchError::Config {
            message: format!("Failed to read config file: {}", e),
            source: Some(Box::new(e)),
            context: crate::ErrorContext::new("config")
                .with_operation("read_file")
                .with_suggestion("Check if the config file exists and is readable"),
        })?;

        let config: DeepResearchConfig =
            toml::from_str(&content).map_err(|e| DeepResearchError::Config {
                message: format!("Failed to parse config: {}", e),
                source: Some(Box::new(e)),
                context: crate::ErrorContext::new("config")
                    .with_operation("parse_toml")
                    .with_suggestion("Check TOML syntax in config file"),
            })?;

        Ok(config)
    }

    /// Save configuration to a TOML file, creating parent directories
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> DeepResearchResult<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self).map_err(|e| DeepResearchError::Config {
            message: format!("Failed to serialize config: {}", e),
            source: Some(Box::new(e)),
            context: crate::ErrorContext::new("config").with_operation("serialize_toml"),
        })?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content).map_err(|e| DeepResearchError::Config {
            message: format!("Failed to write config file: {}", e),
            source: Some(Box::new(e)),
            context: crate::ErrorContext::new("config")
                .with_operation("write_file")
                .with_suggestion("Check if the directory exists and is writable"),
        })?;

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> DeepResearchResult<()> {
        if !self.provider.base_url.starts_with("http://")
            && !self.provider.base_url.starts_with("https://")
        {
            return Err(invalid("provider.base_url must be an http(s) URL"));
        }

        if self.provider.timeout_seconds == 0 {
            return Err(invalid("provider.timeout_seconds must be greater than 0"));
        }

        let models = [
            &self.models.deep_research_o3,
            &self.models.deep_research_o4_mini,
            &self.models.clarification,
            &self.models.prompt_rewriting,
            &self.models.research,
        ];
        if models.iter().any(|m| m.trim().is_empty()) {
            return Err(invalid("model names must not be empty"));
        }

        if self.mcp.server_url.trim().is_empty() {
            return Err(invalid("mcp.server_url must not be empty"));
        }

        if self.research.poll_interval_ms == 0 || self.research.max_poll_attempts == 0 {
            return Err(invalid(
                "research.poll_interval_ms and research.max_poll_attempts must be greater than 0",
            ));
        }

        if self.retry.max_attempts == 0 {
            return Err(invalid("retry.max_attempts must be at least 1"));
        }

        if self.retry.backoff_multiplier < 1.0 {
            return Err(invalid("retry.backoff_multiplier must be at least 1.0"));
        }

        Ok(())
    }

    /// Apply environment variable overrides
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(key) = std::env::var(API_KEY_ENV) {
            if !key.trim().is_empty() {
                self.provider.api_key = Some(key);
            }
        }
        if let Ok(base_url) = std::env::var(BASE_URL_ENV) {
            self.provider.base_url = base_url;
        }
        if let Ok(mcp_url) = std::env::var(MCP_URL_ENV) {
            self.mcp.server_url = mcp_url;
        }
        self
    }

    /// Default config file location under the user's config directory
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("deepresearch").join("config.toml"))
    }

    /// Resolve configuration: explicit path, then the user config dir,
    /// then `deepresearch.toml` in the working directory, then defaults.
    /// Environment overrides are applied last.
    pub fn load(path: Option<&Path>) -> DeepResearchResult<Self> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let candidates = Self::default_path()
                    .into_iter()
                    .chain(std::iter::once(PathBuf::from(CONFIG_FILE_NAME)));

                let mut found = None;
                for candidate in candidates {
                    if candidate.exists() {
                        tracing::debug!(path = %candidate.display(), "Loading configuration");
                        found = Some(Self::from_file(&candidate)?);
                        break;
                    }
                }
                found.unwrap_or_default()
            }
        };

        let config = config.with_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// API key, or a configuration error naming where to put one
    pub fn require_api_key(&self) -> DeepResearchResult<&str> {
        self.provider
            .api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                DeepResearchError::Config {
                    message: format!("No API key configured; set {} or provider.api_key", API_KEY_ENV),
                    source: None,
                    context: crate::ErrorContext::new("config")
                        .with_operation("require_api_key")
                        .with_suggestion("Export OPENAI_API_KEY in your environment or .env file"),
                }
            })
    }
}

fn invalid(message: &str) -> DeepResearchError {
    DeepResearchError::Config {
        message: message.to_string(),
        source: None,
        context: crate::ErrorContext::new("config").with_operation("validate"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_are_valid() {
        let config = DeepResearchConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.provider.timeout_seconds, 300);
        assert_eq!(config.research.poll_interval_ms, 2000);
        assert_eq!(config.retry.max_attempts, 1);
        assert_eq!(config.mcp.server_url, "http://localhost:8001/sse");
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = DeepResearchConfig::default();
        config.models.research = "gpt-4.1-mini".to_string();
        config.research.default_depth = ResearchDepth::Deep;
        config.save_to_file(&path).unwrap();

        let loaded = DeepResearchConfig::from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_file_falls_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[research]\ndefault_depth = \"fast\"\n").unwrap();

        let loaded = DeepResearchConfig::from_file(&path).unwrap();
        assert_eq!(loaded.research.default_depth, ResearchDepth::Fast);
        assert_eq!(loaded.models, ModelConfig::default());
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "[provider\nbase_url = ").unwrap();

        let err = DeepResearchConfig::from_file(&path).unwrap_err();
        assert!(matches!(err, DeepResearchError::Config { .. }));
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = DeepResearchConfig::default();
        config.provider.base_url = "ftp://example.com".to_string();
        assert!(config.validate().is_err());

        let mut config = DeepResearchConfig::default();
        config.retry.max_attempts = 0;
        assert!(config.validate().is_err());

        let mut config = DeepResearchConfig::default();
        config.models.clarification = " ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_api_key_is_config_error() {
        let config = DeepResearchConfig {
            provider: ProviderConfig {
                api_key: Some("  ".to_string()),
                ..ProviderConfig::default()
            },
            ..DeepResearchConfig::default()
        };
        assert!(matches!(
            config.require_api_key(),
            Err(DeepResearchError::Config { .. })
        ));
    }
}

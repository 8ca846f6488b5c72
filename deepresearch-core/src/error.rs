//! Unified error handling system
//!
//! Provides structured error types with context, recovery suggestions, and proper error chaining

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, warn};

pub type DeepResearchResult<T> = Result<T, DeepResearchError>;

/// Error context providing additional information for debugging and recovery
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorContext {
    /// Unique error ID for tracking
    pub error_id: String,
    /// Timestamp when error occurred
    pub timestamp: DateTime<Utc>,
    /// Component where error originated
    pub component: String,
    /// Operation being performed when error occurred
    pub operation: Option<String>,
    /// Additional metadata
    pub metadata: std::collections::HashMap<String, String>,
    /// Recovery suggestions
    pub recovery_suggestions: Vec<String>,
}

impl ErrorContext {
    pub fn new(component: &str) -> Self {
        Self {
            error_id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            component: component.to_string(),
            operation: None,
            metadata: std::collections::HashMap::new(),
            recovery_suggestions: Vec::new(),
        }
    }

    pub fn with_operation(mut self, operation: &str) -> Self {
        self.operation = Some(operation.to_string());
        self
    }

    pub fn with_metadata(mut self, key: &str, value: &str) -> Self {
        self.metadata.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_suggestion(mut self, suggestion: &str) -> Self {
        self.recovery_suggestions.push(suggestion.to_string());
        self
    }
}

/// Classification of a failed provider call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderErrorKind {
    /// Credentials rejected (401/403)
    Auth,
    /// Provider throttled the request (429)
    RateLimit,
    /// Transport failure, timeout or 5xx
    Transient,
    /// Provider answered but the payload could not be understood
    Malformed,
    Unknown,
}

impl ProviderErrorKind {
    /// Classify an HTTP status code returned by the provider
    pub fn from_status(status: u16) -> Self {
        match status {
            401 | 403 => ProviderErrorKind::Auth,
            429 => ProviderErrorKind::RateLimit,
            408 | 500..=599 => ProviderErrorKind::Transient,
            _ => ProviderErrorKind::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderErrorKind::Auth => "auth",
            ProviderErrorKind::RateLimit => "rate_limit",
            ProviderErrorKind::Transient => "transient",
            ProviderErrorKind::Malformed => "malformed",
            ProviderErrorKind::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for ProviderErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Main error type for the Deep Research system
#[derive(Error, Debug)]
pub enum DeepResearchError {
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        field: Option<String>,
        context: ErrorContext,
    },

    #[error("Provider error ({kind}): {message}")]
    Provider {
        kind: ProviderErrorKind,
        /// HTTP status reported by the provider, if the call got that far
        status: Option<u16>,
        message: String,
        context: ErrorContext,
    },

    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        context: ErrorContext,
    },

    #[error("Resource not found: {resource}")]
    NotFound {
        resource: String,
        context: ErrorContext,
    },

    #[error("Cannot {action} while workflow is {stage}")]
    InvalidState {
        stage: String,
        action: String,
        context: ErrorContext,
    },

    #[error("Operation timeout: {operation}")]
    Timeout {
        operation: String,
        duration_ms: u64,
        context: ErrorContext,
    },

    #[error("Internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        context: ErrorContext,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl DeepResearchError {
    /// Get the error context
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            DeepResearchError::Validation { context, .. } => Some(context),
            DeepResearchError::Provider { context, .. } => Some(context),
            DeepResearchError::Config { context, .. } => Some(context),
            DeepResearchError::NotFound { context, .. } => Some(context),
            DeepResearchError::InvalidState { context, .. } => Some(context),
            DeepResearchError::Timeout { context, .. } => Some(context),
            DeepResearchError::Internal { context, .. } => Some(context),
            _ => None,
        }
    }

    /// Whether the error was raised before any remote call was made
    pub fn is_validation(&self) -> bool {
        matches!(self, DeepResearchError::Validation { .. })
    }

    /// Provider classification, if this is a provider error
    pub fn provider_kind(&self) -> Option<ProviderErrorKind> {
        match self {
            DeepResearchError::Provider { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// Check if error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            DeepResearchError::Provider { kind, .. } => matches!(
                kind,
                ProviderErrorKind::Transient | ProviderErrorKind::RateLimit
            ),
            DeepResearchError::Timeout { .. } => true,
            DeepResearchError::Validation { .. } => false,
            DeepResearchError::Config { .. } => false,
            DeepResearchError::NotFound { .. } => false,
            _ => false,
        }
    }

    /// Log the error with appropriate level
    pub fn log(&self) {
        match self {
            DeepResearchError::Internal { .. } => {
                error!(
                    error_id = ?self.context().map(|c| &c.error_id),
                    error = %self,
                    "Internal error occurred"
                );
            }
            DeepResearchError::Config { .. } | DeepResearchError::Validation { .. } => {
                error!(
                    error_id = ?self.context().map(|c| &c.error_id),
                    error = %self,
                    "Configuration or validation error"
                );
            }
            DeepResearchError::Provider { .. } | DeepResearchError::Timeout { .. }
                if self.is_recoverable() =>
            {
                warn!(
                    error_id = ?self.context().map(|c| &c.error_id),
                    error = %self,
                    "Provider or timeout error (may be recoverable)"
                );
            }
            _ => {
                error!(
                    error_id = ?self.context().map(|c| &c.error_id),
                    error = %self,
                    "Error occurred"
                );
            }
        }
    }
}

/// Convenience macros for creating errors with context
#[macro_export]
macro_rules! validation_error {
    ($msg:expr, $field:expr, $component:expr) => {
        $crate::DeepResearchError::Validation {
            message: $msg.to_string(),
            field: Some($field.to_string()),
            context: $crate::ErrorContext::new($component)
                .with_suggestion("Check the field value and format"),
        }
    };
}

#[macro_export]
macro_rules! provider_error {
    ($kind:expr, $status:expr, $msg:expr, $component:expr) => {
        $crate::DeepResearchError::Provider {
            kind: $kind,
            status: $status,
            message: $msg.to_string(),
            context: $crate::ErrorContext::new($component),
        }
    };
}

#[macro_export]
macro_rules! config_error {
    ($msg:expr, $component:expr) => {
        $crate::DeepResearchError::Config {
            message: $msg.to_string(),
            source: None,
            context: $crate::ErrorContext::new($component)
                .with_suggestion("Check your configuration file")
                .with_suggestion("Run 'deepresearch config --init' to create default config"),
        }
    };
}

#[macro_export]
macro_rules! not_found_error {
    ($resource:expr, $component:expr) => {
        $crate::DeepResearchError::NotFound {
            resource: $resource.to_string(),
            context: $crate::ErrorContext::new($component)
                .with_suggestion("Verify the identifier")
                .with_suggestion("Suspended sessions expire after the configured TTL"),
        }
    };
}

#[macro_export]
macro_rules! invalid_state_error {
    ($stage:expr, $action:expr, $component:expr) => {
        $crate::DeepResearchError::InvalidState {
            stage: $stage.to_string(),
            action: $action.to_string(),
            context: $crate::ErrorContext::new($component),
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        assert_eq!(ProviderErrorKind::from_status(401), ProviderErrorKind::Auth);
        assert_eq!(ProviderErrorKind::from_status(403), ProviderErrorKind::Auth);
        assert_eq!(
            ProviderErrorKind::from_status(429),
            ProviderErrorKind::RateLimit
        );
        assert_eq!(
            ProviderErrorKind::from_status(503),
            ProviderErrorKind::Transient
        );
        assert_eq!(
            ProviderErrorKind::from_status(400),
            ProviderErrorKind::Unknown
        );
    }

    #[test]
    fn test_provider_kind_serializes_snake_case() {
        let json = serde_json::to_string(&ProviderErrorKind::RateLimit).unwrap();
        assert_eq!(json, "\"rate_limit\"");
    }

    #[test]
    fn test_recoverability() {
        let transient = provider_error!(
            ProviderErrorKind::Transient,
            Some(502),
            "bad gateway",
            "test"
        );
        assert!(transient.is_recoverable());

        let auth = provider_error!(ProviderErrorKind::Auth, Some(401), "denied", "test");
        assert!(!auth.is_recoverable());

        let validation = validation_error!("query must not be empty", "query", "test");
        assert!(validation.is_validation());
        assert!(!validation.is_recoverable());
    }
}

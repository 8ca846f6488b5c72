//! HTTP plumbing shared by the provider calls

use deepresearch_core::{
    DeepResearchError, DeepResearchResult, ErrorContext, ProviderConfig, ProviderErrorKind,
};
use std::collections::HashMap;

/// Configuration for the provider HTTP client
#[derive(Debug, Clone)]
pub struct ApiClientConfig {
    /// Base URL for the API, without trailing slash
    pub base_url: String,
    pub api_key: String,
    pub organization: Option<String>,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
    pub user_agent: String,
    /// Additional headers
    pub headers: HashMap<String, String>,
}

impl ApiClientConfig {
    /// Build from the provider section; the API key must be present
    pub fn from_provider(provider: &ProviderConfig) -> DeepResearchResult<Self> {
        let api_key = provider
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or_else(|| DeepResearchError::Config {
                message: "No API key configured for the research provider".to_string(),
                source: None,
                context: ErrorContext::new("api_client")
                    .with_operation("configure")
                    .with_suggestion("Set OPENAI_API_KEY or provider.api_key"),
            })?;

        let parsed = url::Url::parse(&provider.base_url).map_err(|e| DeepResearchError::Config {
            message: format!("Invalid provider base URL '{}': {}", provider.base_url, e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("api_client").with_operation("configure"),
        })?;

        Ok(Self {
            base_url: parsed.as_str().trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            organization: provider.organization.clone(),
            timeout_seconds: provider.timeout_seconds,
            user_agent: provider.user_agent.clone(),
            headers: HashMap::new(),
        })
    }

    /// Set additional header
    pub fn with_header(mut self, key: String, value: String) -> Self {
        self.headers.insert(key, value);
        self
    }

    /// Absolute URL for an endpoint path
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

fn header_error(what: &str, e: impl std::error::Error + Send + Sync + 'static) -> DeepResearchError {
    DeepResearchError::Config {
        message: format!("Invalid {}: {}", what, e),
        source: Some(Box::new(e)),
        context: ErrorContext::new("http_client").with_operation("create_client"),
    }
}

/// Create the HTTP client with auth and default headers installed
pub(crate) fn create_http_client(config: &ApiClientConfig) -> DeepResearchResult<reqwest::Client> {
    use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, USER_AGENT};

    let mut headers = HeaderMap::new();

    headers.insert(
        USER_AGENT,
        HeaderValue::from_str(&config.user_agent).map_err(|e| header_error("user agent", e))?,
    );

    let mut auth = HeaderValue::from_str(&format!("Bearer {}", config.api_key))
        .map_err(|e| header_error("API key", e))?;
    auth.set_sensitive(true);
    headers.insert(AUTHORIZATION, auth);

    if let Some(organization) = &config.organization {
        headers.insert(
            HeaderName::from_static("openai-organization"),
            HeaderValue::from_str(organization).map_err(|e| header_error("organization", e))?,
        );
    }

    for (key, value) in &config.headers {
        let name = HeaderName::from_bytes(key.as_bytes())
            .map_err(|e| header_error(&format!("header name '{}'", key), e))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| header_error(&format!("header value for '{}'", key), e))?;
        headers.insert(name, value);
    }

    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(config.timeout_seconds))
        .default_headers(headers)
        .build()
        .map_err(|e| DeepResearchError::Config {
            message: format!("Failed to create HTTP client: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("http_client").with_operation("create_client"),
        })
}

/// Classify a transport failure (no HTTP status received)
pub(crate) fn transport_error(error: reqwest::Error, operation: &str) -> DeepResearchError {
    let kind = if error.is_timeout() || error.is_connect() {
        ProviderErrorKind::Transient
    } else if error.is_decode() {
        ProviderErrorKind::Malformed
    } else {
        ProviderErrorKind::Unknown
    };

    DeepResearchError::Provider {
        kind,
        status: error.status().map(|s| s.as_u16()),
        message: format!("Request to research provider failed: {}", error),
        context: ErrorContext::new("api_client")
            .with_operation(operation)
            .with_suggestion("Check network connectivity and the provider base URL"),
    }
}

/// Payload that arrived but could not be understood
pub(crate) fn malformed(message: impl Into<String>, operation: &str) -> DeepResearchError {
    DeepResearchError::Provider {
        kind: ProviderErrorKind::Malformed,
        status: None,
        message: message.into(),
        context: ErrorContext::new("api_client")
            .with_operation(operation)
            .with_suggestion("The provider response did not match the expected shape"),
    }
}

/// Pull `error.message` out of an OpenAI-style error body
fn extract_error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("error")
        .and_then(|e| e.get("message").or(Some(e)))
        .and_then(|m| m.as_str())
        .map(str::to_string)
}

/// Build a typed provider error from a status code and response body
pub fn status_error(status: u16, body: &str, operation: &str) -> DeepResearchError {
    let kind = ProviderErrorKind::from_status(status);
    let detail = extract_error_message(body).unwrap_or_else(|| {
        if body.trim().is_empty() {
            reqwest::StatusCode::from_u16(status)
                .ok()
                .and_then(|s| s.canonical_reason())
                .unwrap_or("Unknown error")
                .to_string()
        } else {
            body.trim().to_string()
        }
    });

    DeepResearchError::Provider {
        kind,
        status: Some(status),
        message: format!("HTTP {}: {}", status, detail),
        context: ErrorContext::new("api_client")
            .with_operation(operation)
            .with_metadata("status", &status.to_string())
            .with_suggestion(match kind {
                ProviderErrorKind::Auth => "Check your API key and organization",
                ProviderErrorKind::RateLimit => "Slow down or raise the account rate limits",
                ProviderErrorKind::Transient => "The provider is temporarily unavailable; try again",
                _ => "Check the request parameters and the provider status page",
            }),
    }
}

/// Helper function to handle HTTP response errors
pub(crate) async fn handle_response_error(
    response: reqwest::Response,
    operation: &str,
) -> DeepResearchError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    status_error(status, &body, operation)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider(api_key: Option<&str>) -> ProviderConfig {
        ProviderConfig {
            api_key: api_key.map(str::to_string),
            ..ProviderConfig::default()
        }
    }

    #[test]
    fn test_missing_api_key_is_config_error() {
        let err = ApiClientConfig::from_provider(&provider(None)).unwrap_err();
        assert!(matches!(err, DeepResearchError::Config { .. }));

        let err = ApiClientConfig::from_provider(&provider(Some("   "))).unwrap_err();
        assert!(matches!(err, DeepResearchError::Config { .. }));
    }

    #[test]
    fn test_endpoint_joins_paths() {
        let mut config = provider(Some("sk-test"));
        config.base_url = "https://api.example.com/v1/".to_string();
        let api = ApiClientConfig::from_provider(&config).unwrap();
        assert_eq!(api.endpoint("/responses"), "https://api.example.com/v1/responses");
        assert_eq!(
            api.endpoint("chat/completions"),
            "https://api.example.com/v1/chat/completions"
        );
    }

    #[test]
    fn test_invalid_base_url_is_rejected() {
        let mut config = provider(Some("sk-test"));
        config.base_url = "not a url".to_string();
        assert!(ApiClientConfig::from_provider(&config).is_err());
    }

    #[test]
    fn test_client_rejects_invalid_header_values() {
        let api = ApiClientConfig::from_provider(&provider(Some("sk-test")))
            .unwrap()
            .with_header("x-trace".to_string(), "line\nbreak".to_string());
        assert!(create_http_client(&api).is_err());
    }

    #[test]
    fn test_status_error_classification() {
        let body = r#"{"error": {"message": "Incorrect API key provided", "type": "invalid_request_error"}}"#;
        let err = status_error(401, body, "clarify");
        assert_eq!(err.provider_kind(), Some(ProviderErrorKind::Auth));
        assert!(err.to_string().contains("Incorrect API key provided"));

        let err = status_error(429, "", "run_research");
        assert_eq!(err.provider_kind(), Some(ProviderErrorKind::RateLimit));
        assert!(err.to_string().contains("Too Many Requests"));

        let err = status_error(502, "upstream exploded", "run_research");
        assert_eq!(err.provider_kind(), Some(ProviderErrorKind::Transient));
        assert!(err.is_recoverable());

        let err = status_error(400, r#"{"error": "bad tool"}"#, "run_research");
        assert_eq!(err.provider_kind(), Some(ProviderErrorKind::Unknown));
        assert!(err.to_string().contains("bad tool"));
    }
}

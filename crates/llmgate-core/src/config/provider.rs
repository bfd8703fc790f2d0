//! ProviderConfig: one configured model provider

use super::rate_limit::RateLimitPolicy;
use crate::error::{GateError, GateResult};
use serde::{Deserialize, Serialize};

/// Endpoint segment used in derived rate limit keys when a configuration
/// names no endpoint.
pub const DEFAULT_ENDPOINT: &str = "default";

/// Provider-specific extras carried by a configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderExtra {
    /// Literal API key; takes precedence over every other credential source
    #[serde(default, alias = "api_key", skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Rate limit override; takes precedence over provider-family defaults
    #[serde(default, alias = "rate_limit", skip_serializing_if = "Option::is_none")]
    pub rate_limit: Option<RateLimitPolicy>,
}

/// Configuration for one logical provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderConfig {
    /// Logical configuration id; when present it is the rate limit key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Provider family name (openai, anthropic, ollama, ...)
    pub provider: String,
    /// Model name
    pub model: String,
    /// Endpoint URL or deployment name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    /// Reference handed to the secret resolver
    #[serde(default, alias = "api_key_ref", skip_serializing_if = "Option::is_none")]
    pub api_key_ref: Option<String>,
    #[serde(default)]
    pub extra: ProviderExtra,
}

impl ProviderConfig {
    /// Create a new provider config
    pub fn new(provider: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            id: None,
            provider: provider.into(),
            model: model.into(),
            endpoint: None,
            api_key_ref: None,
            extra: ProviderExtra::default(),
        }
    }

    /// Set the logical configuration id
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set endpoint
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set secret reference
    pub fn with_api_key_ref(mut self, reference: impl Into<String>) -> Self {
        self.api_key_ref = Some(reference.into());
        self
    }

    /// Set a literal API key
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.extra.api_key = Some(api_key.into());
        self
    }

    /// Set the rate limit override
    pub fn with_rate_limit(mut self, policy: RateLimitPolicy) -> Self {
        self.extra.rate_limit = Some(policy);
        self
    }

    /// Key scoping this configuration's rate budget.
    ///
    /// The explicit id when present, otherwise `provider:model:endpoint`.
    pub fn rate_limit_key(&self) -> String {
        match self.id.as_deref().filter(|id| !id.is_empty()) {
            Some(id) => id.to_string(),
            None => format!(
                "{}:{}:{}",
                self.provider,
                self.model,
                self.endpoint.as_deref().unwrap_or(DEFAULT_ENDPOINT)
            ),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> GateResult<()> {
        if self.provider.trim().is_empty() {
            return Err(GateError::config("Provider name cannot be empty"));
        }
        if self.model.trim().is_empty() {
            return Err(GateError::config_with_context(
                "Model name cannot be empty",
                format!("Validating provider '{}'", self.provider),
            ));
        }
        if let Some(policy) = &self.extra.rate_limit {
            policy.validate().map_err(|e| {
                GateError::config_with_context(
                    e.to_string(),
                    format!("Validating rate limit for '{}'", self.rate_limit_key()),
                )
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_prefers_id() {
        let config = ProviderConfig::new("openai", "gpt-4o").with_id("primary");
        assert_eq!(config.rate_limit_key(), "primary");
    }

    #[test]
    fn test_key_without_id() {
        let config = ProviderConfig::new("openai", "gpt-4o");
        assert_eq!(config.rate_limit_key(), "openai:gpt-4o:default");

        let config = config.with_endpoint("https://eu.example.com/v1");
        assert_eq!(
            config.rate_limit_key(),
            "openai:gpt-4o:https://eu.example.com/v1"
        );

        // An empty id is treated as absent
        let config = ProviderConfig::new("ollama", "llama3").with_id("");
        assert_eq!(config.rate_limit_key(), "ollama:llama3:default");
    }

    #[test]
    fn test_validate() {
        assert!(ProviderConfig::new("openai", "gpt-4o").validate().is_ok());
        assert!(ProviderConfig::new("", "gpt-4o").validate().is_err());
        assert!(ProviderConfig::new("openai", " ").validate().is_err());
        assert!(
            ProviderConfig::new("openai", "gpt-4o")
                .with_rate_limit(RateLimitPolicy::unlimited().with_requests_per_minute(0))
                .validate()
                .is_err()
        );
    }

    #[test]
    fn test_deserialize_camel_case() {
        let config: ProviderConfig = serde_json::from_str(
            r#"{
                "id": "fast",
                "provider": "anthropic",
                "model": "claude-3-5-haiku",
                "apiKeyRef": "ANTHROPIC_KEY",
                "extra": { "apiKey": "sk-test", "rateLimit": { "requestsPerMinute": 5 } }
            }"#,
        )
        .unwrap();

        assert_eq!(config.id.as_deref(), Some("fast"));
        assert_eq!(config.api_key_ref.as_deref(), Some("ANTHROPIC_KEY"));
        assert_eq!(config.extra.api_key.as_deref(), Some("sk-test"));
        assert_eq!(
            config.extra.rate_limit.and_then(|p| p.requests_per_minute),
            Some(5)
        );
    }
}

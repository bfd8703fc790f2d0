//! API key fallback chain

use super::resolver::{EnvSecretResolver, SecretResolver};
use crate::config::ProviderConfig;
use crate::provider::ProviderFamily;
use std::fmt;
use std::sync::Arc;

/// Where the API key came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiKeySource {
    /// Literal key in the provider configuration
    Explicit,
    /// The configuration's secret reference
    SecretRef,
    /// A conventional environment variable for the provider
    Environment,
    /// Local provider, no key needed
    NotRequired,
    /// Nothing found; the adapter receives no key
    NotFound,
}

impl fmt::Display for ApiKeySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiKeySource::Explicit => write!(f, "config"),
            ApiKeySource::SecretRef => write!(f, "secret reference"),
            ApiKeySource::Environment => write!(f, "env variable"),
            ApiKeySource::NotRequired => write!(f, "not required"),
            ApiKeySource::NotFound => write!(f, "not found"),
        }
    }
}

/// Result of API key resolution with source information
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKeyInfo {
    pub key: Option<String>,
    pub source: ApiKeySource,
    /// Reference or variable name that produced the key
    pub origin: Option<String>,
}

impl fmt::Debug for ApiKeyInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiKeyInfo")
            .field("key", &self.masked_key())
            .field("source", &self.source)
            .field("origin", &self.origin)
            .finish()
    }
}

impl ApiKeyInfo {
    fn found(key: String, source: ApiKeySource, origin: Option<String>) -> Self {
        Self {
            key: Some(key),
            source,
            origin,
        }
    }

    fn missing(source: ApiKeySource) -> Self {
        Self {
            key: None,
            source,
            origin: None,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.key.is_some()
    }

    /// Display-safe version of the key
    pub fn masked_key(&self) -> Option<String> {
        self.key.as_deref().map(mask_api_key)
    }
}

/// Conventional environment variable names for a provider
pub fn get_standard_env_vars(provider: &str) -> Vec<String> {
    match provider.to_lowercase().as_str() {
        "openai" => vec!["OPENAI_API_KEY".to_string()],
        "anthropic" => vec![
            "ANTHROPIC_API_KEY".to_string(),
            "CLAUDE_API_KEY".to_string(),
        ],
        "google" => vec!["GOOGLE_API_KEY".to_string(), "GEMINI_API_KEY".to_string()],
        "azure" => vec![
            "AZURE_OPENAI_API_KEY".to_string(),
            "AZURE_API_KEY".to_string(),
        ],
        "openrouter" => vec!["OPENROUTER_API_KEY".to_string()],
        other => vec![format!(
            "{}_API_KEY",
            other.to_uppercase().replace(['-', '.'], "_")
        )],
    }
}

/// Mask an API key for safe display
pub fn mask_api_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    let len = chars.len();
    if len <= 12 {
        return "*".repeat(len);
    }

    let prefix: String = chars[..8].iter().collect();
    let suffix: String = chars[len - 4..].iter().collect();
    let mask_len = len - 12;

    format!("{}{}...{}", prefix, "*".repeat(mask_len.min(8)), suffix)
}

/// Credential lookup in fixed order:
///
/// 1. literal `extra.api_key` in the configuration
/// 2. the configuration's `api_key_ref`, through the injected secret resolver
/// 3. the provider's conventional environment variables
///
/// Local providers skip the chain entirely.
#[derive(Clone)]
pub struct CredentialChain {
    secrets: Arc<dyn SecretResolver>,
    environment: Arc<dyn SecretResolver>,
}

impl Default for CredentialChain {
    fn default() -> Self {
        Self::new(Arc::new(EnvSecretResolver))
    }
}

impl fmt::Debug for CredentialChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialChain").finish_non_exhaustive()
    }
}

impl CredentialChain {
    pub fn new(secrets: Arc<dyn SecretResolver>) -> Self {
        Self {
            secrets,
            environment: Arc::new(EnvSecretResolver),
        }
    }

    /// Replace the environment lookup used for conventional variables
    pub fn with_environment(mut self, environment: Arc<dyn SecretResolver>) -> Self {
        self.environment = environment;
        self
    }

    /// Resolve the API key for a configuration. Never fails.
    pub async fn resolve(&self, config: &ProviderConfig) -> ApiKeyInfo {
        if !ProviderFamily::of(&config.provider).requires_api_key() {
            return ApiKeyInfo::missing(ApiKeySource::NotRequired);
        }

        if let Some(key) = config.extra.api_key.as_ref().filter(|k| !k.is_empty()) {
            return ApiKeyInfo::found(key.clone(), ApiKeySource::Explicit, None);
        }

        if let Some(reference) = config.api_key_ref.as_deref() {
            if let Some(key) = self.secrets.resolve(reference).await {
                return ApiKeyInfo::found(
                    key,
                    ApiKeySource::SecretRef,
                    Some(reference.to_string()),
                );
            }
        }

        for name in get_standard_env_vars(&config.provider) {
            if let Some(key) = self.environment.resolve(&name).await {
                return ApiKeyInfo::found(key, ApiKeySource::Environment, Some(name));
            }
        }

        ApiKeyInfo::missing(ApiKeySource::NotFound)
    }
}

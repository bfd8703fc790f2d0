//! Secret resolvers

use async_trait::async_trait;
use std::collections::HashMap;

/// Resolves a secret reference to its value.
///
/// Resolution never fails: an absent or unresolvable reference yields `None`.
#[async_trait]
pub trait SecretResolver: Send + Sync {
    async fn resolve(&self, reference: &str) -> Option<String>;
}

/// Treats references as environment variable names, with an optional
/// `env:` prefix.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvSecretResolver;

#[async_trait]
impl SecretResolver for EnvSecretResolver {
    async fn resolve(&self, reference: &str) -> Option<String> {
        let name = reference.strip_prefix("env:").unwrap_or(reference).trim();
        if name.is_empty() {
            return None;
        }
        std::env::var(name).ok().filter(|value| !value.is_empty())
    }
}

/// Fixed in-memory secrets, for embedding hosts and tests
#[derive(Debug, Clone, Default)]
pub struct StaticSecretResolver {
    secrets: HashMap<String, String>,
}

impl StaticSecretResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_secret(mut self, reference: impl Into<String>, value: impl Into<String>) -> Self {
        self.secrets.insert(reference.into(), value.into());
        self
    }
}

#[async_trait]
impl SecretResolver for StaticSecretResolver {
    async fn resolve(&self, reference: &str) -> Option<String> {
        self.secrets
            .get(reference)
            .filter(|value| !value.is_empty())
            .cloned()
    }
}

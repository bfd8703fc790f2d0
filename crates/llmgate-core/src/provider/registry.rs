//! Provider adapter registry

use super::adapter::ProviderAdapter;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Adapters keyed by lowercase provider family name.
///
/// Built once at startup and handed to the gateway.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    adapters: HashMap<String, Arc<dyn ProviderAdapter>>,
}

impl fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("providers", &self.names())
            .finish()
    }
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an adapter; a later registration under the same name wins.
    ///
    /// Returns the adapter that was replaced, if any.
    pub fn register(
        &mut self,
        provider: &str,
        adapter: Arc<dyn ProviderAdapter>,
    ) -> Option<Arc<dyn ProviderAdapter>> {
        self.adapters.insert(provider.to_lowercase(), adapter)
    }

    /// Builder-style registration
    pub fn with_adapter(mut self, provider: &str, adapter: Arc<dyn ProviderAdapter>) -> Self {
        self.register(provider, adapter);
        self
    }

    pub fn get(&self, provider: &str) -> Option<Arc<dyn ProviderAdapter>> {
        self.adapters.get(&provider.to_lowercase()).cloned()
    }

    pub fn contains(&self, provider: &str) -> bool {
        self.adapters.contains_key(&provider.to_lowercase())
    }

    /// Registered provider names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.adapters.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProviderConfig;
    use crate::error::GateResult;
    use crate::provider::{ChatRequest, ChatResponse};
    use async_trait::async_trait;

    struct Fixed(&'static str);

    #[async_trait]
    impl ProviderAdapter for Fixed {
        async fn chat(
            &self,
            _config: &ProviderConfig,
            _api_key: Option<&str>,
            _request: &ChatRequest,
        ) -> GateResult<ChatResponse> {
            Ok(ChatResponse::new(self.0))
        }
    }

    #[tokio::test]
    async fn test_last_registration_wins() {
        let mut registry = ProviderRegistry::new();
        assert!(registry.register("openai", Arc::new(Fixed("first"))).is_none());
        assert!(registry.register("OpenAI", Arc::new(Fixed("second"))).is_some());
        assert_eq!(registry.len(), 1);

        let adapter = registry.get("openai").unwrap();
        let response = adapter
            .chat(
                &ProviderConfig::new("openai", "gpt-4o"),
                None,
                &ChatRequest::default(),
            )
            .await
            .unwrap();
        assert_eq!(response.content, "second");
    }

    #[test]
    fn test_names_sorted() {
        let registry = ProviderRegistry::new()
            .with_adapter("ollama", Arc::new(Fixed("a")))
            .with_adapter("anthropic", Arc::new(Fixed("b")));
        assert_eq!(registry.names(), vec!["anthropic", "ollama"]);
        assert!(registry.contains("ANTHROPIC"));
        assert!(!registry.contains("google"));
    }
}

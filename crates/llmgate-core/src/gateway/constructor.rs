//! Gateway construction and accessors

use super::types::DispatchGateway;
use crate::config::{PolicyDefaults, ProviderConfig, RateLimitPolicy};
use crate::limiter::KeyedRateLimiter;
use crate::observatory::QueueObservatory;
use crate::provider::{ProviderAdapter, ProviderRegistry};
use crate::secrets::{CredentialChain, SecretResolver};
use std::sync::Arc;

/// Builder for [`DispatchGateway`]
#[derive(Debug, Default)]
pub struct GatewayBuilder {
    registry: ProviderRegistry,
    credentials: CredentialChain,
    limiter: Option<KeyedRateLimiter>,
    defaults: PolicyDefaults,
}

impl GatewayBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_registry(mut self, registry: ProviderRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_adapter(mut self, provider: &str, adapter: Arc<dyn ProviderAdapter>) -> Self {
        self.registry.register(provider, adapter);
        self
    }

    /// Resolver consulted for `api_key_ref`
    pub fn with_secret_resolver(mut self, resolver: Arc<dyn SecretResolver>) -> Self {
        self.credentials = CredentialChain::new(resolver);
        self
    }

    /// Full credential chain, including the environment lookup
    pub fn with_credentials(mut self, credentials: CredentialChain) -> Self {
        self.credentials = credentials;
        self
    }

    pub fn with_policy_defaults(mut self, defaults: PolicyDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    /// Share an existing limiter instead of creating one
    pub fn with_limiter(mut self, limiter: KeyedRateLimiter) -> Self {
        self.limiter = Some(limiter);
        self
    }

    pub fn with_history_capacity(mut self, capacity: usize) -> Self {
        self.limiter = Some(KeyedRateLimiter::with_history_capacity(capacity));
        self
    }

    pub fn build(self) -> DispatchGateway {
        DispatchGateway {
            registry: self.registry,
            credentials: self.credentials,
            limiter: self.limiter.unwrap_or_default(),
            defaults: self.defaults,
        }
    }
}

impl DispatchGateway {
    /// Gateway with built-in policy defaults, environment credentials and
    /// the given adapters
    pub fn new(registry: ProviderRegistry) -> Self {
        GatewayBuilder::new().with_registry(registry).build()
    }

    pub fn builder() -> GatewayBuilder {
        GatewayBuilder::new()
    }

    /// Register an adapter after construction; last write wins
    pub fn register(
        &mut self,
        provider: &str,
        adapter: Arc<dyn ProviderAdapter>,
    ) -> Option<Arc<dyn ProviderAdapter>> {
        self.registry.register(provider, adapter)
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    /// Policy applied to a configuration: its own override, else the
    /// provider family default
    pub fn effective_policy(&self, config: &ProviderConfig) -> RateLimitPolicy {
        config
            .extra
            .rate_limit
            .unwrap_or_else(|| self.defaults.for_provider(&config.provider))
    }

    pub fn limiter(&self) -> &KeyedRateLimiter {
        &self.limiter
    }

    /// Read-only view of waiting and recently delayed calls
    pub fn observatory(&self) -> QueueObservatory {
        QueueObservatory::new(self.limiter.clone())
    }
}

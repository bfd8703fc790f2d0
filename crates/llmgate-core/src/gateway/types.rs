//! Gateway type definitions

use crate::config::PolicyDefaults;
use crate::limiter::KeyedRateLimiter;
use crate::provider::ProviderRegistry;
use crate::secrets::CredentialChain;

/// Sole entry point for callers that need a completion.
///
/// Owns the adapter registry and the limiter; every call goes through
/// admission before it reaches a provider.
#[derive(Debug)]
pub struct DispatchGateway {
    pub(super) registry: ProviderRegistry,
    pub(super) credentials: CredentialChain,
    pub(super) limiter: KeyedRateLimiter,
    pub(super) defaults: PolicyDefaults,
}

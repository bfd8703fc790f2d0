//! LLM admission control and dispatch
//!
//! Callers hand a provider configuration and a chat request to the
//! [`DispatchGateway`]; the gateway waits for capacity under the
//! configuration's rate budget, resolves credentials, calls the registered
//! provider adapter and debits reported token usage afterwards. The
//! [`QueueObservatory`] exposes what is waiting and what recently waited.

pub mod config;
pub mod context;
pub mod error;
pub mod gateway;
pub mod limiter;
pub mod observatory;
pub mod provider;
pub mod secrets;

// Re-export commonly used types
pub use config::{PolicyDefaults, ProviderCatalog, ProviderConfig, RateLimitPolicy};
pub use context::{RequestContext, RequestSource};
pub use error::{GateError, GateResult, UnifiedError};
pub use gateway::{DispatchGateway, GatewayBuilder};
pub use limiter::{Admission, DelayedEntry, KeyedRateLimiter, PendingEntry, WindowUsage};
pub use observatory::{QueueObservatory, QueueSnapshot};
pub use provider::{
    ChatMessage, ChatRequest, ChatResponse, ProviderAdapter, ProviderFamily, ProviderRegistry,
    TokenUsage,
};
pub use secrets::{EnvSecretResolver, SecretResolver, StaticSecretResolver};

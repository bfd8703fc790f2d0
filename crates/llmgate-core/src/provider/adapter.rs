//! Adapter trait and provider families

use super::types::{ChatRequest, ChatResponse};
use crate::config::ProviderConfig;
use crate::error::GateResult;
use async_trait::async_trait;

/// Uniform chat capability implemented once per provider family.
///
/// On success the response must carry `content` and, when the backend reports
/// it, `usage`. Failures are returned as-is to the gateway's caller.
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// Send a chat completion request.
    ///
    /// `api_key` is whatever the gateway's credential chain produced; it is
    /// `None` for local providers and when no credential could be found.
    async fn chat(
        &self,
        config: &ProviderConfig,
        api_key: Option<&str>,
        request: &ChatRequest,
    ) -> GateResult<ChatResponse>;
}

/// Broad class of a provider, which decides credential handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderFamily {
    /// Commercial hosted APIs
    Hosted,
    /// Self-hosted or local inference servers
    Local,
    /// Generic HTTP endpoints configured by the user
    Generic,
}

impl ProviderFamily {
    /// Classify a provider family name
    pub fn of(provider: &str) -> Self {
        match provider.to_lowercase().as_str() {
            "ollama" | "lmstudio" | "llamacpp" | "vllm" => Self::Local,
            "http" | "custom" | "openai-compatible" => Self::Generic,
            _ => Self::Hosted,
        }
    }

    /// Whether calls need a credential
    pub fn requires_api_key(&self) -> bool {
        !matches!(self, Self::Local)
    }
}

//! Rate limit policies and provider-family defaults

use crate::error::{GateError, GateResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Budget for one rate limit key over a 60 second window.
///
/// A missing field means that dimension is unbounded. A policy with both
/// fields missing never throttles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitPolicy {
    /// Maximum admitted requests per window
    #[serde(default, alias = "requests_per_minute", skip_serializing_if = "Option::is_none")]
    pub requests_per_minute: Option<u32>,

    /// Maximum tokens debited per window
    #[serde(default, alias = "tokens_per_minute", skip_serializing_if = "Option::is_none")]
    pub tokens_per_minute: Option<u32>,
}

impl RateLimitPolicy {
    /// A policy that never throttles
    pub fn unlimited() -> Self {
        Self::default()
    }

    /// Create a policy with both dimensions bounded
    pub fn new(requests_per_minute: u32, tokens_per_minute: u32) -> Self {
        Self {
            requests_per_minute: Some(requests_per_minute),
            tokens_per_minute: Some(tokens_per_minute),
        }
    }

    /// Set requests per minute
    pub fn with_requests_per_minute(mut self, rpm: u32) -> Self {
        self.requests_per_minute = Some(rpm);
        self
    }

    /// Set tokens per minute
    pub fn with_tokens_per_minute(mut self, tpm: u32) -> Self {
        self.tokens_per_minute = Some(tpm);
        self
    }

    /// True when neither dimension is bounded
    pub fn is_unbounded(&self) -> bool {
        self.requests_per_minute.is_none() && self.tokens_per_minute.is_none()
    }

    /// True when the policy declares a token budget
    pub fn limits_tokens(&self) -> bool {
        self.tokens_per_minute.is_some()
    }

    /// Reject zero-valued limits.
    ///
    /// A zero budget can never be satisfied by a window reset, so a caller
    /// admitted against it would wait forever.
    pub fn validate(&self) -> GateResult<()> {
        if self.requests_per_minute == Some(0) {
            return Err(GateError::config(
                "requestsPerMinute must be greater than 0 (omit it to disable the limit)",
            ));
        }
        if self.tokens_per_minute == Some(0) {
            return Err(GateError::config(
                "tokensPerMinute must be greater than 0 (omit it to disable the limit)",
            ));
        }
        Ok(())
    }
}

/// Default policies per provider family, used when a configuration carries
/// no explicit rate limit override.
#[derive(Debug, Clone)]
pub struct PolicyDefaults {
    by_provider: HashMap<String, RateLimitPolicy>,
}

impl Default for PolicyDefaults {
    fn default() -> Self {
        let mut by_provider = HashMap::new();
        // Hosted families: conservative tier-1 style budgets
        by_provider.insert("openai".to_string(), RateLimitPolicy::new(60, 100_000));
        by_provider.insert("anthropic".to_string(), RateLimitPolicy::new(50, 80_000));
        by_provider.insert("google".to_string(), RateLimitPolicy::new(60, 120_000));
        by_provider.insert("azure".to_string(), RateLimitPolicy::new(60, 100_000));
        by_provider.insert("openrouter".to_string(), RateLimitPolicy::new(60, 100_000));
        // Local inference: no token budget
        by_provider.insert(
            "ollama".to_string(),
            RateLimitPolicy::unlimited().with_requests_per_minute(120),
        );
        Self { by_provider }
    }
}

impl PolicyDefaults {
    /// No defaults at all: every provider without an override is unbounded
    pub fn empty() -> Self {
        Self {
            by_provider: HashMap::new(),
        }
    }

    /// Set (or replace) the default policy for a provider family
    pub fn with_policy(mut self, provider: &str, policy: RateLimitPolicy) -> Self {
        self.set(provider, policy);
        self
    }

    /// Set (or replace) the default policy for a provider family
    pub fn set(&mut self, provider: &str, policy: RateLimitPolicy) {
        self.by_provider.insert(provider.to_lowercase(), policy);
    }

    /// Default policy for a provider family; unknown families are unbounded
    pub fn for_provider(&self, provider: &str) -> RateLimitPolicy {
        self.by_provider
            .get(&provider.to_lowercase())
            .copied()
            .unwrap_or_default()
    }
}

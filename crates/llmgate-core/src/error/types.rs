//! Core error types and traits

use thiserror::Error;

/// Result type alias for gateway operations
pub type GateResult<T> = Result<T, GateError>;

/// Uniform accessors shared by every gateway error.
pub trait UnifiedError: std::error::Error + Send + Sync {
    /// Stable code for programmatic handling
    fn error_code(&self) -> &str;

    /// Human-readable message
    fn message(&self) -> &str;

    /// Optional context about where the error happened
    fn context(&self) -> Option<&str> {
        None
    }

    /// Whether a caller may reasonably retry the same call later.
    ///
    /// The gateway never retries on its own.
    fn is_retryable(&self) -> bool {
        false
    }
}

/// Main error type for the gateway
#[derive(Error, Debug, Clone)]
pub enum GateError {
    /// Invalid or unreadable configuration
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        context: Option<String>,
    },

    /// No adapter is registered for the requested provider family
    #[error("Provider not registered: {provider}")]
    ProviderNotRegistered { provider: String },

    /// Failure reported by a provider adapter
    #[error("Provider error ({provider}): {message}")]
    Provider {
        provider: String,
        message: String,
        status_code: Option<u16>,
        context: Option<String>,
    },

    /// The caller gave up while waiting for admission
    #[error("Admission cancelled for rate limit key '{key}'")]
    Cancelled { key: String },

    /// IO errors
    #[error("IO error: {message}")]
    Io {
        message: String,
        path: Option<String>,
        context: Option<String>,
    },

    /// JSON serialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        context: Option<String>,
    },

    /// Anything else
    #[error("Error: {message}")]
    Other {
        message: String,
        context: Option<String>,
    },
}

//! UnifiedError trait implementation for GateError

use super::types::{GateError, UnifiedError};

impl UnifiedError for GateError {
    fn error_code(&self) -> &str {
        match self {
            Self::Config { .. } => "GATE_CONFIG",
            Self::ProviderNotRegistered { .. } => "GATE_PROVIDER_NOT_REGISTERED",
            Self::Provider { .. } => "GATE_PROVIDER",
            Self::Cancelled { .. } => "GATE_CANCELLED",
            Self::Io { .. } => "GATE_IO",
            Self::Json { .. } => "GATE_JSON",
            Self::Other { .. } => "GATE_OTHER",
        }
    }

    fn message(&self) -> &str {
        match self {
            Self::Config { message, .. } => message,
            Self::ProviderNotRegistered { .. } => "No adapter registered for provider",
            Self::Provider { message, .. } => message,
            Self::Cancelled { .. } => "Admission was cancelled",
            Self::Io { message, .. } => message,
            Self::Json { message, .. } => message,
            Self::Other { message, .. } => message,
        }
    }

    fn context(&self) -> Option<&str> {
        match self {
            Self::Config { context, .. } => context.as_deref(),
            Self::Provider { context, .. } => context.as_deref(),
            Self::Io { context, .. } => context.as_deref(),
            Self::Json { context, .. } => context.as_deref(),
            Self::Other { context, .. } => context.as_deref(),
            Self::ProviderNotRegistered { .. } | Self::Cancelled { .. } => None,
        }
    }

    fn is_retryable(&self) -> bool {
        match self {
            // Network failures carry no status
            Self::Provider { status_code, .. } => match status_code {
                None => true,
                Some(code) => *code == 429 || *code >= 500,
            },
            _ => false,
        }
    }
}

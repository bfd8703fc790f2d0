//! Provider adapter boundary
//!
//! Adapters own the wire format of each backend. The gateway only needs the
//! [`ProviderAdapter::chat`] capability and the usage counts in the response.

mod adapter;
mod registry;
mod types;

pub use adapter::{ProviderAdapter, ProviderFamily};
pub use registry::ProviderRegistry;
pub use types::{ChatMessage, ChatRequest, ChatResponse, MessageRole, TokenUsage};

//! Error types for the gateway
//!
//! Every failure surfaced by this crate is a [`GateError`]. Provider errors are
//! created by adapters and travel back to the caller untouched; the gateway
//! itself only adds configuration, registry and cancellation failures.

mod constructors;
mod types;
mod unified_error;

pub use types::{GateError, GateResult, UnifiedError};

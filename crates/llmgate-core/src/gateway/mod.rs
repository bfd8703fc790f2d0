//! Dispatch gateway: admission, credentials, adapter call, usage accounting

mod chat;
mod constructor;
mod types;


pub use constructor::GatewayBuilder;
pub use types::DispatchGateway;

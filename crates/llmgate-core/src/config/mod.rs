//! Provider configuration
//!
//! - [`ProviderConfig`]: one configured provider (family, model, endpoint, secrets)
//! - [`RateLimitPolicy`]: the request/token budget attached to a rate limit key
//! - [`PolicyDefaults`]: provider-family default policies
//! - [`ProviderCatalog`]: the list of configured providers, loaded from a file

mod catalog;
mod provider;
mod rate_limit;

pub use catalog::ProviderCatalog;
pub use provider::{DEFAULT_ENDPOINT, ProviderConfig, ProviderExtra};
pub use rate_limit::{PolicyDefaults, RateLimitPolicy};

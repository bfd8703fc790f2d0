//! Secret resolution and the credential fallback chain

mod credentials;
mod resolver;

pub use credentials::{
    ApiKeyInfo, ApiKeySource, CredentialChain, get_standard_env_vars, mask_api_key,
};
pub use resolver::{EnvSecretResolver, SecretResolver, StaticSecretResolver};

//! File-based provider catalog

use super::provider::ProviderConfig;
use crate::error::{GateError, GateResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// The configured providers, as stored by the host application
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderCatalog {
    #[serde(default)]
    pub providers: Vec<ProviderConfig>,
}

impl ProviderCatalog {
    /// Build a catalog from already-loaded configurations
    pub fn new(providers: Vec<ProviderConfig>) -> GateResult<Self> {
        let catalog = Self { providers };
        catalog.validate()?;
        Ok(catalog)
    }

    /// Load a catalog from a TOML or JSON file, chosen by extension.
    pub fn load_from_file(path: &Path) -> GateResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            GateError::io_with_path(
                format!("Failed to read provider catalog: {}", e),
                path.display().to_string(),
            )
        })?;

        let catalog: ProviderCatalog = match path.extension().and_then(|s| s.to_str()) {
            Some("toml") => toml::from_str(&content).map_err(|e| {
                GateError::config_with_context(
                    format!("Failed to parse TOML catalog: {}", e),
                    format!("Reading providers from '{}'", path.display()),
                )
            })?,
            _ => serde_json::from_str(&content).map_err(|e| {
                GateError::config_with_context(
                    format!("Failed to parse JSON catalog: {}", e),
                    format!("Reading providers from '{}'", path.display()),
                )
            })?,
        };

        catalog.validate()?;
        Ok(catalog)
    }

    /// Validate every entry and reject duplicate ids
    pub fn validate(&self) -> GateResult<()> {
        let mut seen = HashSet::new();
        for config in &self.providers {
            config.validate()?;
            if let Some(id) = &config.id {
                if !seen.insert(id.as_str()) {
                    return Err(GateError::config(format!(
                        "Duplicate provider configuration id '{}'",
                        id
                    )));
                }
            }
        }
        Ok(())
    }

    /// Look up a configuration by id
    pub fn get(&self, id: &str) -> Option<&ProviderConfig> {
        self.providers
            .iter()
            .find(|config| config.id.as_deref() == Some(id))
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

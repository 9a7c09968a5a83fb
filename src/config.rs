//! Configuration System
//!
//! Layered configuration for the engine and its tooling: merge-policy
//! defaults, then the global config file, then workspace files, then
//! `PAPER__SECTION__KEY` environment variables. Validation reports every
//! violation at once.

use crate::entity::{default_type_relations, EntityClass};
use crate::error::ConfigError;
use crate::logging::LoggingConfig;
use crate::types::ListRef;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

mod facade;
mod merge;
mod sources;

pub use facade::ConfigLoader;
pub use sources::global_file::global_config_path;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaperConfig {
    #[serde(default)]
    pub router: RouterConfig,

    #[serde(default)]
    pub entities: EntityConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Router settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouterConfig {
    /// Provenance of single items declared without `fromList`
    #[serde(default)]
    pub default_from_list: ListRef,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            default_from_list: ListRef::default(),
        }
    }
}

/// Entity store settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityConfig {
    /// Content type → discriminant used for placeholder shapes
    #[serde(default = "default_type_relations")]
    pub type_relations: BTreeMap<String, EntityClass>,
}

impl Default for EntityConfig {
    fn default() -> Self {
        Self {
            type_relations: default_type_relations(),
        }
    }
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    Router(String),
    Entities(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Router(msg) => write!(f, "Router: {}", msg),
            ValidationError::Entities(msg) => write!(f, "Entities: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl RouterConfig {
    pub fn validate(&self) -> Result<(), String> {
        let list = &self.default_from_list;
        if list.kind.is_empty() {
            return Err("default_from_list type cannot be empty".to_string());
        }
        if list.page == 0 {
            return Err("default_from_list page starts at 1".to_string());
        }
        Ok(())
    }
}

impl PaperConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(e) = self.router.validate() {
            errors.push(ValidationError::Router(e));
        }

        for kind in self.entities.type_relations.keys() {
            if kind.trim().is_empty() {
                errors.push(ValidationError::Entities(
                    "type_relations contains an empty type name".to_string(),
                ));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Validate, folding every violation into one error.
    pub fn validated(self) -> Result<Self, ConfigError> {
        self.validate().map_err(|errors| {
            let msgs: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            ConfigError::Invalid(format!(
                "Configuration validation failed:\n{}",
                msgs.join("\n")
            ))
        })?;
        Ok(self)
    }

    /// Effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self)
            .map_err(|e| ConfigError::Invalid(format!("Failed to render configuration: {}", e)))
    }
}

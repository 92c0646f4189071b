//! Configuration loading and validation.
//!
//! The configuration is an explicit value handed to each component at
//! construction time; nothing in the crate reads it from global state.

mod types;
mod validation;

pub use types::*;

use crate::error::Result;
use std::path::Path;

impl Config {
    /// Load configuration from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let mut config: Config = serde_yaml::from_str(yaml)?;
        config.migration.merge_default_type_mappings();
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        validation::validate(self)
    }
}

impl MigrationConfig {
    /// Add built-in type mappings whose key the user did not override.
    pub fn merge_default_type_mappings(&mut self) {
        for (source, target) in types::default_type_mapping() {
            if self.explicit_type(&source).is_none() {
                self.type_mapping.insert(source, target);
            }
        }
    }
}

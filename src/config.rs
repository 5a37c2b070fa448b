use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub const DEFAULT_DATABASE: &str = "restaurant.db";

fn default_database() -> String {
    DEFAULT_DATABASE.to_string()
}

/// Settings for the `restaurant-ops` binary
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// SQLite file path, or `:memory:`
    #[serde(default = "default_database")]
    pub database: String,
    pub log_level: Option<String>,
    /// Load the demo catalog and recipes after migrating
    pub seed_demo_data: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: default_database(),
            log_level: None,
            seed_demo_data: false,
        }
    }
}

impl AppConfig {
    pub fn from_yaml(content: &str) -> Result<Self> {
        let config = serde_yaml::from_str(content).context("invalid configuration")?;
        Ok(config)
    }

    /// Read `path` if it exists; a missing file yields the defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_yaml(&content).with_context(|| format!("failed to parse {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.database, "restaurant.db");
        assert_eq!(config.log_level, None);
        assert!(!config.seed_demo_data);
    }

    #[test]
    fn test_deserialization() {
        let yaml = r#"
database: kitchen.db
log_level: debug
seed_demo_data: true
"#;
        let config = AppConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.database, "kitchen.db");
        assert_eq!(config.log_level.as_deref(), Some("debug"));
        assert!(config.seed_demo_data);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = AppConfig::from_yaml("log_level: warn\n").unwrap();
        assert_eq!(config.database, DEFAULT_DATABASE);
        assert!(!config.seed_demo_data);
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let config = AppConfig::load("does-not-exist.yaml").unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_serialization() {
        let yaml = serde_yaml::to_string(&AppConfig::default()).unwrap();
        assert!(yaml.contains("database: restaurant.db"));
    }
}

//! Configuration handling for DDLSync

use serde::{Deserialize, Serialize};
use std::fs;

use crate::error::{Error, Result};

/// Load configuration from a TOML file
pub fn load_from_file(path: &str) -> Result<Config> {
    let config_str = fs::read_to_string(path)
        .map_err(|e| Error::ConfigError(format!("Failed to read config file: {}", e)))?;

    let config: Config = toml::from_str(&config_str)
        .map_err(|e| Error::ConfigError(format!("Failed to parse config file: {}", e)))?;

    Ok(config)
}

/// Represents the complete DDLSync configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    #[serde(default)]
    pub reconcile: ReconcileConfig,
    pub logging: Option<LoggingConfig>,
}

/// Database connection configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub driver: String,
    pub url: String,
    pub pool_size: Option<u32>,
    pub timeout_seconds: Option<u64>,
    pub enable_ssl: Option<bool>,
}

/// Reconciliation behavior configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ReconcileConfig {
    /// Schemas to scan for existing constructs. An empty list scans only
    /// the default schema.
    #[serde(default)]
    pub schemas: Vec<String>,
    /// Schema name substituted when a model declares no schema
    #[serde(default = "default_schema_name")]
    pub default_schema: String,
    /// Log operations instead of applying them
    #[serde(default)]
    pub dry_run: bool,
    /// Directory where rendered migration scripts are written
    pub script_directory: Option<String>,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            schemas: Vec::new(),
            default_schema: default_schema_name(),
            dry_run: false,
            script_directory: None,
        }
    }
}

fn default_schema_name() -> String {
    "public".to_string()
}

/// Logging configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<String>,
    pub format: String,
    pub stdout: bool,
    pub include_timestamps: bool,
}

//! Application configuration loading from config.toml
//!
//! Every field has a default, so the file is optional. A file that exists but
//! cannot be read or parsed is an error rather than silently ignored.

use crate::{
    core::allocation::DEFAULT_PALETTE,
    errors::{Error, Result},
};
use serde::Deserialize;
use std::path::Path;

/// Default config file location.
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Chart colors, assigned to people by position
    pub palette: Vec<String>,
    /// Path prefix under which split slugs are shared
    pub base_path: String,
    /// Keys of the persisted records
    pub storage: StorageKeys,
}

/// Keys under which the storage collaborator keeps its two records.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StorageKeys {
    /// Key of the `{ splits, selectedId }` record
    pub collection_key: String,
    /// Key of the settlement registry record
    pub settlements_key: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            palette: DEFAULT_PALETTE.iter().map(ToString::to_string).collect(),
            base_path: "/smart-food-splitter".to_string(),
            storage: StorageKeys::default(),
        }
    }
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self {
            collection_key: "smart-food-splitter-v2".to_string(),
            settlements_key: "smart-food-splitter-settlements".to_string(),
        }
    }
}

/// Parses configuration from TOML text.
///
/// # Errors
/// Returns [`Error::Config`] if the TOML syntax is invalid or a field has the
/// wrong type.
pub fn parse_config(contents: &str) -> Result<AppConfig> {
    toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Loads configuration from a TOML file.
///
/// # Errors
/// Returns [`Error::Config`] if the file cannot be read or parsed.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path_ref = path.as_ref();
    tracing::debug!("Attempting to load configuration from: {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path_ref.display()),
    })?;
    parse_config(&contents)
}

/// Loads configuration from the default location (./config.toml), using
/// defaults when the file does not exist.
pub fn load_default_config() -> Result<AppConfig> {
    if Path::new(DEFAULT_CONFIG_PATH).exists() {
        load_config(DEFAULT_CONFIG_PATH)
    } else {
        tracing::info!("No {} found, using default configuration", DEFAULT_CONFIG_PATH);
        Ok(AppConfig::default())
    }
}

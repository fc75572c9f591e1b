//! Application settings loading from config.toml
//!
//! This module loads service settings from a TOML configuration file with
//! environment-variable overrides for deployment. The settings cover the
//! database URL and the receipt storage directory; secrets never live in
//! the config file.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Default maximum receipt upload size: 2 MiB.
pub const DEFAULT_MAX_RECEIPT_BYTES: u64 = 2 * 1024 * 1024;

/// Service settings parsed from config.toml
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    /// Database connection URL (overridden by `DATABASE_URL`)
    #[serde(default = "default_database_url")]
    pub database_url: String,
    /// Directory where receipt files are stored (overridden by `RECEIPT_STORAGE_DIR`)
    #[serde(default = "default_storage_dir")]
    pub storage_dir: String,
    /// Maximum accepted receipt upload size in bytes
    #[serde(default = "default_max_receipt_bytes")]
    pub max_receipt_bytes: u64,
}

fn default_database_url() -> String {
    "sqlite://data/rab_ledger.sqlite".to_string()
}

fn default_storage_dir() -> String {
    "data/receipts".to_string()
}

const fn default_max_receipt_bytes() -> u64 {
    DEFAULT_MAX_RECEIPT_BYTES
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
            storage_dir: default_storage_dir(),
            max_receipt_bytes: default_max_receipt_bytes(),
        }
    }
}

impl Settings {
    /// Applies environment-variable overrides on top of file values.
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var("DATABASE_URL") {
            self.database_url = url;
        }
        if let Ok(dir) = std::env::var("RECEIPT_STORAGE_DIR") {
            self.storage_dir = dir;
        }
        self
    }
}

/// Loads settings from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<Settings> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file: {e}"),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Loads settings from the default location (./config.toml), falling back to
/// defaults when the file is absent. Environment overrides are applied last.
#[must_use]
pub fn load_default_settings() -> Settings {
    load_settings("config.toml")
        .unwrap_or_default()
        .with_env_overrides()
}

//! Optional TOML configuration.
//!
//! Looked up as `<data-dir>/shoplist.toml` unless an explicit path is given.
//! Every field has a default, so a missing file is not an error.

use crate::core::error::ShoplistError;
use crate::core::schemas;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ShoplistConfig {
    /// Key of the durable slot holding the product list.
    pub storage_key: String,
    /// SQLite file name inside the data directory.
    pub db_file: String,
    /// How long a removed product lingers before it is deleted.
    pub removal_grace_ms: u64,
    /// How long a freshly added product is marked as entering.
    pub entry_transition_ms: u64,
    /// Suffix printed after prices.
    pub currency: String,
    /// Default log filter when `RUST_LOG` is unset.
    pub log_level: String,
}

impl Default for ShoplistConfig {
    fn default() -> Self {
        Self {
            storage_key: schemas::PRODUCTS_STORAGE_KEY.to_string(),
            db_file: schemas::SHOPLIST_DB_NAME.to_string(),
            removal_grace_ms: 500,
            entry_transition_ms: 500,
            currency: "zł".to_string(),
            log_level: "warn".to_string(),
        }
    }
}

impl ShoplistConfig {
    pub fn removal_grace(&self) -> Duration {
        Duration::from_millis(self.removal_grace_ms)
    }

    pub fn entry_transition(&self) -> Duration {
        Duration::from_millis(self.entry_transition_ms)
    }

    fn validate(self) -> Result<Self, ShoplistError> {
        if self.storage_key.trim().is_empty() {
            return Err(ShoplistError::ValidationError(
                "config: storage_key must not be empty".into(),
            ));
        }
        if self.db_file.trim().is_empty() {
            return Err(ShoplistError::ValidationError(
                "config: db_file must not be empty".into(),
            ));
        }
        Ok(self)
    }
}

pub fn parse_config(content: &str) -> Result<ShoplistConfig, ShoplistError> {
    let config: ShoplistConfig = toml::from_str(content)?;
    config.validate()
}

/// Load config from an explicit file, or from `<data_dir>/shoplist.toml` if present.
pub fn load_config(
    data_dir: &Path,
    explicit: Option<&Path>,
) -> Result<ShoplistConfig, ShoplistError> {
    if let Some(path) = explicit {
        if !path.is_file() {
            return Err(ShoplistError::PathError(format!(
                "config file not found: {}",
                path.display()
            )));
        }
        let content = fs::read_to_string(path).map_err(ShoplistError::IoError)?;
        return parse_config(&content);
    }

    let config_path = data_dir.join(schemas::CONFIG_FILE_NAME);
    if config_path.is_file() {
        let content = fs::read_to_string(&config_path).map_err(ShoplistError::IoError)?;
        return parse_config(&content);
    }

    Ok(ShoplistConfig::default())
}

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ShoplistError {
    #[error("SQLite error: {0}")]
    RusqliteError(#[from] rusqlite::Error),
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("Config error: {0}")]
    ConfigError(#[from] toml::de::Error),
    #[error("Config error: {0}")]
    ConfigSerializeError(#[from] toml::ser::Error),
    #[error("Path error: {0}")]
    PathError(String),
    /// User input rejected before any state change.
    #[error("Validation error: {0}")]
    ValidationError(String),
    /// Stored payload is present but not an acceptable product list.
    #[error("Decode error: {0}")]
    DecodeError(String),
}

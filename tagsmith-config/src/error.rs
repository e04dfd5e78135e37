// Test table errors

use std::env::VarError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    /// Table file missing or unreadable
    #[error("Cannot load test table: {0}")]
    LoadError(String),

    /// File extension is neither `json` nor `toml`
    #[error("Unsupported test table format: {0}")]
    UnsupportedFormat(String),

    #[error("Malformed test table: {0}")]
    ParseError(String),

    /// Table breaks a boundary or naming rule
    #[error("Invalid test table: {0}")]
    ValidationError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Environment variable {name}: {source}")]
    EnvError {
        name: String,
        #[source]
        source: VarError,
    },
}

pub type Result<T> = std::result::Result<T, ConfigError>;

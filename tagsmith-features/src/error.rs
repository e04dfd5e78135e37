//! Error types for the Tagsmith engine.
//!
//! Gate calls (`enable`, `get_logger`) never fail; these errors only come
//! out of storage, activation and serialisation.

use thiserror::Error;

/// Result type for engine operations.
pub type FeaturesResult<T> = Result<T, FeaturesError>;

/// Engine errors.
#[derive(Debug, Error)]
pub enum FeaturesError {
    /// Variant label is not part of the test table
    #[error("Unknown variant: {0}")]
    UnknownVariant(String),

    /// Factor store could not be read or written
    #[error("Storage error: {0}")]
    Storage(String),

    /// Snapshot or store content could not be (de)serialised
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Operation needs the debug validator, which is not installed
    #[error("Debug validator is not installed")]
    DebugDisabled,

    /// Test table could not be loaded
    #[error("Configuration error: {0}")]
    Config(#[from] tagsmith_config::ConfigError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for FeaturesError {
    fn from(err: serde_json::Error) -> Self {
        FeaturesError::Serialization(err.to_string())
    }
}

//! Error types for the Tagsmith CLI.

use std::fmt;
use tagsmith_config::ConfigError;
use tagsmith_features::FeaturesError;

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

/// CLI error types.
#[derive(Debug)]
pub enum CliError {
    /// IO error
    Io(std::io::Error),

    /// Test table could not be loaded
    Config(String),

    /// State file or engine error
    Engine(String),

    /// Invalid argument
    InvalidArgument(String),

    /// Validation error
    Validation(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Io(e) => write!(f, "IO error: {}", e),
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::Engine(msg) => write!(f, "{}", msg),
            CliError::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            CliError::Validation(msg) => write!(f, "Validation error: {}", msg),
        }
    }
}

impl std::error::Error for CliError {}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Io(e)
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::Config(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Engine(format!("JSON output failed: {}", e))
    }
}

impl From<FeaturesError> for CliError {
    fn from(e: FeaturesError) -> Self {
        match e {
            FeaturesError::UnknownVariant(variant) => {
                CliError::InvalidArgument(format!("unknown variant {}", variant))
            }
            FeaturesError::Config(e) => e.into(),
            FeaturesError::Io(e) => CliError::Io(e),
            other => CliError::Engine(other.to_string()),
        }
    }
}

//! Configuration error types.

use thiserror::Error;

/// Configuration loading error. Any variant is fatal at startup: the
/// monitor refuses to run cycles with invalid financial parameters.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    ReadFile(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("validation failed: {0}")]
    Validation(String),
}

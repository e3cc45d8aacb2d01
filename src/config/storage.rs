//! Storage configuration.

use serde::Deserialize;

/// Persistence settings for opportunities and price history.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Whether persistence is active.
    #[serde(default)]
    pub enabled: bool,
    /// Path to the SQLite database file.
    pub path: Option<String>,
}

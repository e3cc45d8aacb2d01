//! Monitor bootstrap configuration.

use crate::config::Config;

/// Options for constructing the monitor.
pub struct BotConfig {
    /// Application configuration.
    pub app_config: Config,
    /// Application version.
    pub version: String,
    /// Build timestamp.
    pub build_time: String,
}

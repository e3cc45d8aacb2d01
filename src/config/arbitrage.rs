//! Arbitrage detection configuration.

use serde::Deserialize;
use std::time::Duration;

use super::duration;

/// Arbitrage detection and alerting settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ArbitrageConfig {
    /// Minimum net profit percentage for an opportunity to qualify
    /// (e.g., "0.5" for 0.5%). Default: "0.5".
    pub min_profit_threshold: Option<String>,
    /// Minimum time between repeat alerts for the same opportunity
    /// (default: 5m).
    #[serde(default, with = "duration")]
    pub alert_cooldown: Duration,
    /// Profit improvement (in percentage points) that re-triggers an alert
    /// inside the cooldown (e.g., "0.1"). Default: "0.1".
    pub re_alert_delta_pct: Option<String>,
    /// How many top opportunities the ranked dashboard view keeps
    /// (default: 20).
    pub top_n: Option<usize>,
    /// Quotes older than this are dropped before aggregation.
    /// Unset means all quotes are trusted regardless of age.
    #[serde(default, deserialize_with = "duration::deserialize_opt")]
    pub max_quote_age: Option<Duration>,
    /// Interval between detection cycles (default: 60s).
    #[serde(default, with = "duration")]
    pub scan_interval: Duration,
    /// Timeout for a single quote fetch (default: 10s).
    #[serde(default, with = "duration")]
    pub fetch_timeout: Duration,
}

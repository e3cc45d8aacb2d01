//! Exchange configuration.

use serde::Deserialize;

/// Settings for a single exchange.
///
/// All monitored exchanges expose their ticker data through public
/// unauthenticated endpoints, so there are no credentials here; only the
/// fee rate matters for the profit math.
#[derive(Debug, Clone, Deserialize)]
pub struct ExchangeConfig {
    /// Whether this exchange should be polled.
    #[serde(default)]
    pub enabled: bool,
    /// Taker fee as a decimal string (e.g., "0.001" for 0.1%).
    /// Defaults to 0.1% when omitted.
    pub fee_taker: Option<String>,
    /// Override for the REST API base URL (testing, proxies).
    pub base_url: Option<String>,
}

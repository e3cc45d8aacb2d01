//! Configuration loading and validation for the arbitrage monitor.
//!
//! Uses serde_yaml to load YAML configuration files with support for
//! environment variable overrides for sensitive credentials. Validation is
//! strict: the monitor never starts cycles with financial parameters it
//! could not parse.

mod app;
mod arbitrage;
mod duration;
mod error;
mod exchange;
mod notification;
mod storage;

pub use app::AppConfig;
pub use arbitrage::ArbitrageConfig;
pub use error::ConfigError;
pub use exchange::ExchangeConfig;
pub use notification::{NotificationConfig, TelegramConfig};
pub use storage::StorageConfig;

use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;
use std::{env, fs};

use crate::domain::{ExchangeId, FeeSchedule};

/// Default minimum net profit percentage for an opportunity to qualify.
const DEFAULT_MIN_PROFIT_THRESHOLD: &str = "0.5";
/// Default profit improvement (percentage points) that re-triggers an alert.
const DEFAULT_RE_ALERT_DELTA_PCT: &str = "0.1";
/// Default alert cooldown.
const DEFAULT_ALERT_COOLDOWN: Duration = Duration::from_secs(300);
/// Default length of the ranked dashboard view.
const DEFAULT_TOP_N: usize = 20;
/// Default interval between detection cycles.
const DEFAULT_SCAN_INTERVAL: Duration = Duration::from_secs(60);
/// Default timeout for a single quote fetch.
const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Root configuration structure for the arbitrage monitor.
///
/// Required sections: app, exchanges, pairs.
/// Optional sections: arbitrage, notification, storage.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Application-level settings like name and environment.
    pub app: AppConfig,
    /// Maps exchange names to their configurations.
    pub exchanges: HashMap<String, ExchangeConfig>,
    /// List of trading pairs to monitor (e.g., "BTC/USDT").
    pub pairs: Vec<String>,
    /// Detection thresholds, cooldowns and cycle timing (optional).
    pub arbitrage: Option<ArbitrageConfig>,
    /// Alert channels like Telegram (optional).
    pub notification: Option<NotificationConfig>,
    /// Opportunity and price-history persistence (optional).
    pub storage: Option<StorageConfig>,
}

impl Config {
    /// Load configuration from a YAML file at the given path.
    ///
    /// First loads environment variables from `.env` (if present), then the
    /// YAML config, then credentials from the environment:
    /// `TELEGRAM_BOT_TOKEN`, `TELEGRAM_CHAT_ID`, `TELEGRAM_ERROR_CHAT_ID`.
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let content = fs::read_to_string(path)?;
        let mut config: Config = serde_yaml::from_str(&content)?;

        config.load_credentials_from_env();
        config.validate()?;

        Ok(config)
    }

    /// Load credentials from environment variables.
    fn load_credentials_from_env(&mut self) {
        if let Some(ref mut notification) = self.notification {
            if let Some(ref mut telegram) = notification.telegram {
                if telegram.enabled {
                    telegram.bot_token = env::var("TELEGRAM_BOT_TOKEN").unwrap_or_default();
                    telegram.chat_id = env::var("TELEGRAM_CHAT_ID").unwrap_or_default();
                    telegram.error_chat_id = env::var("TELEGRAM_ERROR_CHAT_ID").unwrap_or_default();
                }
            }
        }
    }

    /// Validate the configuration.
    ///
    /// Financial parameters get strict checks: an unparseable fee or a
    /// negative threshold refuses to start rather than falling back to a
    /// silently wrong default.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.app.name.is_empty() {
            return Err(ConfigError::Validation("app.name is required".into()));
        }

        if self.pairs.is_empty() {
            return Err(ConfigError::Validation(
                "at least one trading pair is required".into(),
            ));
        }

        for pair in &self.pairs {
            if !pair.contains('/') {
                return Err(ConfigError::Validation(format!(
                    "pair {} must be in BASE/QUOTE format",
                    pair
                )));
            }
        }

        let mut enabled_exchanges = 0;
        for (name, exchange) in &self.exchanges {
            if !exchange.enabled {
                continue;
            }
            enabled_exchanges += 1;

            ExchangeId::from_str(name).map_err(ConfigError::Validation)?;

            if let Some(ref fee) = exchange.fee_taker {
                let rate = Decimal::from_str(fee).map_err(|e| {
                    ConfigError::Validation(format!("exchange {}: invalid fee_taker: {}", name, e))
                })?;
                if rate < Decimal::ZERO || rate >= Decimal::ONE {
                    return Err(ConfigError::Validation(format!(
                        "exchange {}: fee_taker must be in [0, 1)",
                        name
                    )));
                }
            }
        }

        if enabled_exchanges < 2 {
            return Err(ConfigError::Validation(
                "at least two exchanges must be enabled for cross-exchange arbitrage".into(),
            ));
        }

        if let Some(ref arb) = self.arbitrage {
            let threshold = arb.min_profit_threshold()?;
            if threshold < Decimal::ZERO {
                return Err(ConfigError::Validation(
                    "arbitrage.min_profit_threshold must not be negative".into(),
                ));
            }

            let delta = arb.re_alert_delta()?;
            if delta < Decimal::ZERO {
                return Err(ConfigError::Validation(
                    "arbitrage.re_alert_delta_pct must not be negative".into(),
                ));
            }

            if arb.top_n == Some(0) {
                return Err(ConfigError::Validation(
                    "arbitrage.top_n must be positive".into(),
                ));
            }
        }

        Ok(())
    }

    /// Builds the per-exchange fee schedule from the enabled exchanges.
    /// Exchanges without a configured rate use the 0.1% default.
    pub fn fee_schedule(&self) -> Result<FeeSchedule, ConfigError> {
        let mut rates = HashMap::new();
        for (name, exchange) in &self.exchanges {
            if !exchange.enabled {
                continue;
            }
            let id = ExchangeId::from_str(name).map_err(ConfigError::Validation)?;
            if let Some(ref fee) = exchange.fee_taker {
                let rate = Decimal::from_str(fee).map_err(|e| {
                    ConfigError::Validation(format!("exchange {}: invalid fee_taker: {}", name, e))
                })?;
                rates.insert(id, rate);
            }
        }
        Ok(FeeSchedule::new(rates))
    }

    /// Returns the enabled exchange identifiers.
    pub fn enabled_exchanges(&self) -> Result<Vec<ExchangeId>, ConfigError> {
        let mut ids = Vec::new();
        for (name, exchange) in &self.exchanges {
            if exchange.enabled {
                ids.push(ExchangeId::from_str(name).map_err(ConfigError::Validation)?);
            }
        }
        ids.sort();
        Ok(ids)
    }
}

impl ArbitrageConfig {
    /// Minimum net profit percentage, default 0.5.
    pub fn min_profit_threshold(&self) -> Result<Decimal, ConfigError> {
        parse_pct_field(
            self.min_profit_threshold.as_deref(),
            DEFAULT_MIN_PROFIT_THRESHOLD,
            "arbitrage.min_profit_threshold",
        )
    }

    /// Re-alert profit delta in percentage points, default 0.1.
    pub fn re_alert_delta(&self) -> Result<Decimal, ConfigError> {
        parse_pct_field(
            self.re_alert_delta_pct.as_deref(),
            DEFAULT_RE_ALERT_DELTA_PCT,
            "arbitrage.re_alert_delta_pct",
        )
    }

    /// Alert cooldown, default 5 minutes.
    pub fn alert_cooldown_or_default(&self) -> Duration {
        nonzero_or(self.alert_cooldown, DEFAULT_ALERT_COOLDOWN)
    }

    /// Ranked view length, default 20.
    pub fn top_n_or_default(&self) -> usize {
        self.top_n.unwrap_or(DEFAULT_TOP_N)
    }

    /// Cycle interval, default 60 seconds.
    pub fn scan_interval_or_default(&self) -> Duration {
        nonzero_or(self.scan_interval, DEFAULT_SCAN_INTERVAL)
    }

    /// Quote fetch timeout, default 10 seconds.
    pub fn fetch_timeout_or_default(&self) -> Duration {
        nonzero_or(self.fetch_timeout, DEFAULT_FETCH_TIMEOUT)
    }
}

fn parse_pct_field(
    value: Option<&str>,
    default: &str,
    field: &str,
) -> Result<Decimal, ConfigError> {
    let raw = value.unwrap_or(default);
    Decimal::from_str(raw)
        .map_err(|e| ConfigError::Validation(format!("{}: invalid value {}: {}", field, raw, e)))
}

fn nonzero_or(value: Duration, default: Duration) -> Duration {
    if value.is_zero() { default } else { value }
}

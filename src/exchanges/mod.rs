//! Exchange quote-fetch clients.
//!
//! Each client wraps one exchange's public REST ticker endpoint and
//! normalizes the response into the canonical [`Quote`] shape at the
//! boundary. Nothing past this module branches on exchange-specific
//! payloads.

mod binance;
mod bybit;
mod kucoin;
mod manager;

pub use binance::BinanceClient;
pub use bybit::BybitClient;
pub use kucoin::KucoinClient;
pub use manager::Manager;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{ExchangeId, Quote};

/// Exchange fetch errors. All of them are tolerated per cycle: a failed
/// fetch just means no quote for that exchange this round.
#[derive(Debug, Error)]
pub enum ExchangeError {
    /// HTTP transport failure.
    #[error("request error: {0}")]
    Request(#[from] reqwest::Error),

    /// Non-success status or error payload from the exchange API.
    #[error("API error: {0}")]
    Api(String),

    /// Response arrived but did not contain a usable price.
    #[error("invalid price in response: {0}")]
    InvalidPrice(String),

    /// Fetch did not complete within the configured timeout.
    #[error("fetch timed out after {0:?}")]
    Timeout(std::time::Duration),
}

/// Result type for exchange operations.
pub type Result<T> = std::result::Result<T, ExchangeError>;

/// QuoteFetcher returns the current spot price for one trading pair.
///
/// `pair` is in canonical "BASE/QUOTE" format; implementations convert to
/// their native symbol format internally.
#[async_trait]
pub trait QuoteFetcher: Send + Sync {
    /// Fetches the latest quote for the pair.
    async fn fetch_quote(&self, pair: &str) -> Result<Quote>;

    /// The exchange this fetcher talks to.
    fn id(&self) -> ExchangeId;
}

/// Converts "BTC/USDT" to a concatenated symbol like "BTCUSDT".
pub(crate) fn pair_to_symbol(pair: &str) -> String {
    pair.replace('/', "")
}

/// Converts "BTC/USDT" to a dashed symbol like "BTC-USDT".
pub(crate) fn pair_to_dashed_symbol(pair: &str) -> String {
    pair.replace('/', "-")
}

#[cfg(test)]
mod symbol_tests {
    use super::*;

    #[test]
    fn test_pair_to_symbol() {
        assert_eq!(pair_to_symbol("BTC/USDT"), "BTCUSDT");
    }

    #[test]
    fn test_pair_to_dashed_symbol() {
        assert_eq!(pair_to_dashed_symbol("BTC/USDT"), "BTC-USDT");
    }
}

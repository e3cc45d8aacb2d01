//! Manager for fetching quotes across all enabled exchanges.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use tracing::{info, warn};

use crate::config::Config;
use crate::domain::{ExchangeId, Quote};

use super::{BinanceClient, BybitClient, ExchangeError, KucoinClient, QuoteFetcher, Result};

/// Manager coordinates the per-cycle quote fetches.
///
/// Every (exchange, pair) combination is fetched concurrently with a
/// per-request timeout. Failures and timeouts are logged and absorbed:
/// the cycle proceeds with whatever quotes arrived, and a symbol quoted by
/// only a subset of exchanges is still processed downstream.
pub struct Manager {
    fetchers: Vec<Arc<dyn QuoteFetcher>>,
    fetch_timeout: Duration,
}

impl Manager {
    pub fn new(fetchers: Vec<Arc<dyn QuoteFetcher>>, fetch_timeout: Duration) -> Self {
        Self {
            fetchers,
            fetch_timeout,
        }
    }

    /// Creates a Manager from configuration. Only enabled exchanges get a
    /// fetcher; an unknown exchange name is a startup error.
    pub fn from_config(config: &Config, fetch_timeout: Duration) -> Result<Self> {
        let mut fetchers: Vec<Arc<dyn QuoteFetcher>> = Vec::new();

        for (name, exchange_config) in &config.exchanges {
            if !exchange_config.enabled {
                info!(exchange = %name, "Skipping disabled exchange");
                continue;
            }

            let id = ExchangeId::from_str(name).map_err(ExchangeError::Api)?;
            let base_url = exchange_config.base_url.as_deref();

            let fetcher: Arc<dyn QuoteFetcher> = match id {
                ExchangeId::Binance => Arc::new(BinanceClient::new(base_url)?),
                ExchangeId::Bybit => Arc::new(BybitClient::new(base_url)?),
                ExchangeId::Kucoin => Arc::new(KucoinClient::new(base_url)?),
            };

            info!(exchange = %id, "Registered exchange client");
            fetchers.push(fetcher);
        }

        Ok(Self::new(fetchers, fetch_timeout))
    }

    /// Exchanges this manager fetches from.
    pub fn exchanges(&self) -> Vec<ExchangeId> {
        self.fetchers.iter().map(|f| f.id()).collect()
    }

    /// Fetches the current quote for every (exchange, pair) combination.
    ///
    /// Returns only the successful quotes; a fetch that errors or exceeds
    /// the timeout contributes nothing for this cycle.
    pub async fn fetch_all(&self, pairs: &[String]) -> Vec<Quote> {
        let mut tasks = Vec::with_capacity(self.fetchers.len() * pairs.len());

        for fetcher in &self.fetchers {
            for pair in pairs {
                let fetcher = Arc::clone(fetcher);
                let pair = pair.clone();
                let timeout = self.fetch_timeout;

                tasks.push(async move {
                    let result = tokio::time::timeout(timeout, fetcher.fetch_quote(&pair))
                        .await
                        .unwrap_or(Err(ExchangeError::Timeout(timeout)));
                    (fetcher.id(), pair, result)
                });
            }
        }

        let mut quotes = Vec::new();
        for (exchange, pair, result) in join_all(tasks).await {
            match result {
                Ok(quote) => quotes.push(quote),
                Err(e) => {
                    warn!(
                        exchange = %exchange,
                        pair = %pair,
                        error = %e,
                        "Quote fetch failed, skipping this cycle"
                    );
                }
            }
        }

        quotes
    }
}

//! Binance public ticker client.

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::domain::{ExchangeId, Quote};

use super::{ExchangeError, QuoteFetcher, Result, pair_to_symbol};

/// Production Binance HTTP API endpoint.
const BASE_URL: &str = "https://api.binance.com";

/// HTTP request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Response from GET /api/v3/ticker/price.
#[derive(Debug, Deserialize)]
struct TickerResponse {
    price: String,
}

/// Client for the Binance spot ticker endpoint.
pub struct BinanceClient {
    http: reqwest::Client,
    base_url: String,
}

impl BinanceClient {
    pub fn new(base_url: Option<&str>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.unwrap_or(BASE_URL).trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl QuoteFetcher for BinanceClient {
    async fn fetch_quote(&self, pair: &str) -> Result<Quote> {
        let symbol = pair_to_symbol(pair);
        let url = format!("{}/api/v3/ticker/price", self.base_url);

        let response = self
            .http
            .get(&url)
            .query(&[("symbol", symbol.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ExchangeError::Api(format!("binance {}: {}", status, body)));
        }

        let ticker: TickerResponse = response.json().await?;
        let price = Decimal::from_str(&ticker.price)
            .map_err(|_| ExchangeError::InvalidPrice(ticker.price.clone()))?;
        if price <= Decimal::ZERO {
            return Err(ExchangeError::InvalidPrice(ticker.price));
        }

        Ok(Quote::new(ExchangeId::Binance, pair, price, Utc::now()))
    }

    fn id(&self) -> ExchangeId {
        ExchangeId::Binance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ticker_response() {
        let json = r#"{"symbol":"BTCUSDT","price":"45123.45000000"}"#;
        let ticker: TickerResponse = serde_json::from_str(json).unwrap();
        assert_eq!(
            Decimal::from_str(&ticker.price).unwrap(),
            Decimal::from_str("45123.45").unwrap()
        );
    }

    #[test]
    fn test_default_base_url() {
        let client = BinanceClient::new(None).unwrap();
        assert_eq!(client.base_url, "https://api.binance.com");
    }

    #[test]
    fn test_base_url_override_strips_trailing_slash() {
        let client = BinanceClient::new(Some("http://localhost:9000/")).unwrap();
        assert_eq!(client.base_url, "http://localhost:9000");
    }
}

//! KuCoin public ticker client.

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::domain::{ExchangeId, Quote};

use super::{ExchangeError, QuoteFetcher, Result, pair_to_dashed_symbol};

/// Production KuCoin HTTP API endpoint.
const BASE_URL: &str = "https://api.kucoin.com";

/// HTTP request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Response envelope from GET /api/v1/market/orderbook/level1.
/// `data` is null for unknown symbols.
#[derive(Debug, Deserialize)]
struct Level1Response {
    code: String,
    data: Option<Level1Data>,
}

#[derive(Debug, Deserialize)]
struct Level1Data {
    price: String,
}

/// Client for the KuCoin level-1 market data endpoint.
pub struct KucoinClient {
    http: reqwest::Client,
    base_url: String,
}

impl KucoinClient {
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
impl QuoteFetcher for KucoinClient {
    async fn fetch_quote(&self, pair: &str) -> Result<Quote> {
        // KuCoin uses dashed symbols: "BTC-USDT".
        let symbol = pair_to_dashed_symbol(pair);
        let url = format!("{}/api/v1/market/orderbook/level1", self.base_url);

        let response = self
            .http
            .get(&url)
            .query(&[("symbol", symbol.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ExchangeError::Api(format!("kucoin {}: {}", status, body)));
        }

        let level1: Level1Response = response.json().await?;
        if level1.code != "200000" {
            return Err(ExchangeError::Api(format!("kucoin code {}", level1.code)));
        }

        let data = level1
            .data
            .ok_or_else(|| ExchangeError::Api(format!("kucoin: no data for {}", symbol)))?;

        let price = Decimal::from_str(&data.price)
            .map_err(|_| ExchangeError::InvalidPrice(data.price.clone()))?;
        if price <= Decimal::ZERO {
            return Err(ExchangeError::InvalidPrice(data.price));
        }

        Ok(Quote::new(ExchangeId::Kucoin, pair, price, Utc::now()))
    }

    fn id(&self) -> ExchangeId {
        ExchangeId::Kucoin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level1_response() {
        let json = r#"{
            "code": "200000",
            "data": {
                "time": 1717243200000,
                "sequence": "123456",
                "price": "44900.5",
                "size": "0.001",
                "bestBid": "44900.4",
                "bestBidSize": "1.2",
                "bestAsk": "44900.6",
                "bestAskSize": "0.8"
            }
        }"#;

        let level1: Level1Response = serde_json::from_str(json).unwrap();
        assert_eq!(level1.code, "200000");
        assert_eq!(level1.data.unwrap().price, "44900.5");
    }

    #[test]
    fn test_parse_null_data_for_unknown_symbol() {
        let json = r#"{"code": "200000", "data": null}"#;
        let level1: Level1Response = serde_json::from_str(json).unwrap();
        assert!(level1.data.is_none());
    }
}

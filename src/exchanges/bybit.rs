//! Bybit public ticker client.

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::domain::{ExchangeId, Quote};

use super::{ExchangeError, QuoteFetcher, Result, pair_to_symbol};

/// Production Bybit HTTP API endpoint.
const BASE_URL: &str = "https://api.bybit.com";

/// HTTP request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Response envelope from GET /v5/market/tickers.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TickersResponse {
    ret_code: i32,
    ret_msg: String,
    result: TickersResult,
}

#[derive(Debug, Deserialize)]
struct TickersResult {
    #[serde(default)]
    list: Vec<Ticker>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Ticker {
    last_price: String,
}

/// Client for the Bybit v5 spot tickers endpoint.
pub struct BybitClient {
    http: reqwest::Client,
    base_url: String,
}

impl BybitClient {
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
impl QuoteFetcher for BybitClient {
    async fn fetch_quote(&self, pair: &str) -> Result<Quote> {
        let symbol = pair_to_symbol(pair);
        let url = format!("{}/v5/market/tickers", self.base_url);

        let response = self
            .http
            .get(&url)
            .query(&[("category", "spot"), ("symbol", symbol.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ExchangeError::Api(format!("bybit {}: {}", status, body)));
        }

        let tickers: TickersResponse = response.json().await?;
        if tickers.ret_code != 0 {
            return Err(ExchangeError::Api(format!(
                "bybit {}: {}",
                tickers.ret_code, tickers.ret_msg
            )));
        }

        let ticker = tickers
            .result
            .list
            .first()
            .ok_or_else(|| ExchangeError::Api(format!("bybit: no ticker for {}", symbol)))?;

        let price = Decimal::from_str(&ticker.last_price)
            .map_err(|_| ExchangeError::InvalidPrice(ticker.last_price.clone()))?;
        if price <= Decimal::ZERO {
            return Err(ExchangeError::InvalidPrice(ticker.last_price.clone()));
        }

        Ok(Quote::new(ExchangeId::Bybit, pair, price, Utc::now()))
    }

    fn id(&self) -> ExchangeId {
        ExchangeId::Bybit
    }
}

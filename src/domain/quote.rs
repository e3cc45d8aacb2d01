//! Price quote domain model.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::ExchangeId;

/// Quote is a single exchange/symbol/price observation for one cycle.
///
/// Quotes are immutable once created; the exchange clients normalize their
/// heterogeneous API responses into this shape at the boundary, so nothing
/// downstream branches on exchange-specific payloads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    /// Exchange the price was observed on.
    pub exchange: ExchangeId,
    /// Trading pair in "BASE/QUOTE" format (e.g., "BTC/USDT").
    pub symbol: String,
    /// Last traded price. Strictly positive.
    pub price: Decimal,
    /// When the quote was fetched.
    pub observed_at: DateTime<Utc>,
}

impl Quote {
    pub fn new(
        exchange: ExchangeId,
        symbol: impl Into<String>,
        price: Decimal,
        observed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            exchange,
            symbol: symbol.into(),
            price,
            observed_at,
        }
    }

    /// Returns how old this quote is relative to `now`.
    /// A quote observed in the future (clock skew) has zero age.
    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        (now - self.observed_at).max(Duration::zero())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_age_of_past_quote() {
        let now = Utc::now();
        let quote = Quote::new(
            ExchangeId::Binance,
            "BTC/USDT",
            Decimal::new(45000, 0),
            now - Duration::seconds(30),
        );
        assert_eq!(quote.age(now), Duration::seconds(30));
    }

    #[test]
    fn test_age_clamps_future_timestamps_to_zero() {
        let now = Utc::now();
        let quote = Quote::new(
            ExchangeId::Bybit,
            "BTC/USDT",
            Decimal::new(45000, 0),
            now + Duration::seconds(5),
        );
        assert_eq!(quote.age(now), Duration::zero());
    }
}

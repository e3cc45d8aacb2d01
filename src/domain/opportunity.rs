//! Arbitrage opportunity domain model.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{ExchangeId, Spread};

/// Opportunity is a qualifying spread turned into a reportable record.
///
/// Created by the filter each cycle; ownership passes to the storage and
/// notification collaborators. The engine itself only keeps the bounded
/// dedup window, never the opportunities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Opportunity {
    /// Trading pair in "BASE/QUOTE" format.
    pub symbol: String,
    /// Exchange to buy on (the cheaper side).
    pub buy_exchange: ExchangeId,
    /// Price on the buy exchange.
    pub buy_price: Decimal,
    /// Exchange to sell on (the more expensive side).
    pub sell_exchange: ExchangeId,
    /// Price on the sell exchange.
    pub sell_price: Decimal,
    /// Raw price difference as a percentage of the buy price.
    pub gross_diff_pct: Decimal,
    /// Difference minus both exchanges' fees. The profitability signal.
    pub net_profit_pct: Decimal,
    /// Timestamp of the cycle that detected this opportunity.
    pub detected_at: DateTime<Utc>,
}

/// DedupKey identifies "the same opportunity" across cycles for alert
/// suppression: same symbol and the same buy/sell exchange direction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DedupKey {
    pub symbol: String,
    pub buy_exchange: ExchangeId,
    pub sell_exchange: ExchangeId,
}

impl Opportunity {
    /// Builds an opportunity from a qualifying spread at the cycle timestamp.
    pub fn from_spread(spread: &Spread, detected_at: DateTime<Utc>) -> Self {
        Self {
            symbol: spread.symbol.clone(),
            buy_exchange: spread.buy_exchange,
            buy_price: spread.buy_price,
            sell_exchange: spread.sell_exchange,
            sell_price: spread.sell_price,
            gross_diff_pct: spread.gross_diff_pct,
            net_profit_pct: spread.net_profit_pct,
            detected_at,
        }
    }

    pub fn dedup_key(&self) -> DedupKey {
        DedupKey {
            symbol: self.symbol.clone(),
            buy_exchange: self.buy_exchange,
            sell_exchange: self.sell_exchange,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn opportunity(symbol: &str, buy: ExchangeId, sell: ExchangeId) -> Opportunity {
        Opportunity {
            symbol: symbol.to_string(),
            buy_exchange: buy,
            buy_price: Decimal::from_str("44900").unwrap(),
            sell_exchange: sell,
            sell_price: Decimal::from_str("45200").unwrap(),
            gross_diff_pct: Decimal::from_str("0.668").unwrap(),
            net_profit_pct: Decimal::from_str("0.468").unwrap(),
            detected_at: Utc::now(),
        }
    }

    #[test]
    fn test_dedup_key_ignores_prices_and_time() {
        let a = opportunity("BTC/USDT", ExchangeId::Binance, ExchangeId::Bybit);
        let mut b = a.clone();
        b.buy_price = Decimal::from_str("44000").unwrap();
        b.detected_at = Utc::now();

        assert_eq!(a.dedup_key(), b.dedup_key());
    }

    #[test]
    fn test_dedup_key_is_directional() {
        let forward = opportunity("BTC/USDT", ExchangeId::Binance, ExchangeId::Bybit);
        let reverse = opportunity("BTC/USDT", ExchangeId::Bybit, ExchangeId::Binance);

        assert_ne!(forward.dedup_key(), reverse.dedup_key());
    }
}

//! Per-exchange trading fee schedule.

use rust_decimal::Decimal;
use std::collections::HashMap;

use super::ExchangeId;

/// Default taker fee used when an exchange has no configured rate: 0.1%.
const DEFAULT_FEE_RATE: Decimal = Decimal::from_parts(1, 0, 0, false, 3);

/// FeeSchedule maps each exchange to its taker fee rate.
///
/// Rates are fractions (0.001 = 0.1%). Loaded once from configuration at
/// startup and read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct FeeSchedule {
    rates: HashMap<ExchangeId, Decimal>,
}

impl FeeSchedule {
    pub fn new(rates: HashMap<ExchangeId, Decimal>) -> Self {
        Self { rates }
    }

    /// Returns the fee rate for an exchange as a fraction.
    /// Falls back to the 0.1% default for exchanges without a configured rate.
    pub fn rate(&self, exchange: ExchangeId) -> Decimal {
        self.rates
            .get(&exchange)
            .copied()
            .unwrap_or(DEFAULT_FEE_RATE)
    }

    /// Returns the fee rate for an exchange as a percentage (0.001 -> 0.1).
    pub fn rate_pct(&self, exchange: ExchangeId) -> Decimal {
        self.rate(exchange) * Decimal::ONE_HUNDRED
    }

    /// Total fee percentage for a buy on one exchange and a sell on another.
    pub fn round_trip_pct(&self, buy: ExchangeId, sell: ExchangeId) -> Decimal {
        self.rate_pct(buy) + self.rate_pct(sell)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_configured_rate_is_returned() {
        let mut rates = HashMap::new();
        rates.insert(ExchangeId::Binance, Decimal::from_str("0.002").unwrap());
        let fees = FeeSchedule::new(rates);

        assert_eq!(fees.rate(ExchangeId::Binance), Decimal::from_str("0.002").unwrap());
        assert_eq!(fees.rate_pct(ExchangeId::Binance), Decimal::from_str("0.2").unwrap());
    }

    #[test]
    fn test_unconfigured_exchange_defaults_to_ten_bps() {
        let fees = FeeSchedule::default();
        assert_eq!(fees.rate(ExchangeId::Kucoin), Decimal::from_str("0.001").unwrap());
        assert_eq!(fees.rate_pct(ExchangeId::Kucoin), Decimal::from_str("0.1").unwrap());
    }

    #[test]
    fn test_round_trip_sums_both_sides() {
        let mut rates = HashMap::new();
        rates.insert(ExchangeId::Binance, Decimal::from_str("0.001").unwrap());
        rates.insert(ExchangeId::Bybit, Decimal::from_str("0.002").unwrap());
        let fees = FeeSchedule::new(rates);

        assert_eq!(
            fees.round_trip_pct(ExchangeId::Binance, ExchangeId::Bybit),
            Decimal::from_str("0.3").unwrap()
        );
    }
}

//! Cross-exchange spread computation.

use rust_decimal::Decimal;

use super::{ExchangeId, FeeSchedule, Quote};

/// Spread is the intermediate result of comparing one buy-side quote with
/// one sell-side quote for the same symbol on two different exchanges.
///
/// Not persisted; the filter turns qualifying spreads into [`Opportunity`]
/// records.
///
/// [`Opportunity`]: super::Opportunity
#[derive(Debug, Clone, PartialEq)]
pub struct Spread {
    pub symbol: String,
    pub buy_exchange: ExchangeId,
    pub sell_exchange: ExchangeId,
    pub buy_price: Decimal,
    pub sell_price: Decimal,
    /// (sell - buy) / buy * 100.
    pub gross_diff_pct: Decimal,
    /// Gross difference minus both exchanges' fee percentages.
    pub net_profit_pct: Decimal,
}

impl Spread {
    /// Computes the spread for buying on `buy` and selling on `sell`.
    ///
    /// Both quotes must be for the same symbol and distinct exchanges;
    /// the calculator upholds this.
    pub fn between(buy: &Quote, sell: &Quote, fees: &FeeSchedule) -> Self {
        debug_assert_eq!(buy.symbol, sell.symbol);
        debug_assert_ne!(buy.exchange, sell.exchange);

        let gross_diff_pct = (sell.price - buy.price) / buy.price * Decimal::ONE_HUNDRED;
        let net_profit_pct = gross_diff_pct - fees.round_trip_pct(buy.exchange, sell.exchange);

        Self {
            symbol: buy.symbol.clone(),
            buy_exchange: buy.exchange,
            sell_exchange: sell.exchange,
            buy_price: buy.price,
            sell_price: sell.price,
            gross_diff_pct,
            net_profit_pct,
        }
    }

    /// Returns true if the spread is profitable after fees.
    pub fn is_profitable(&self) -> bool {
        self.net_profit_pct > Decimal::ZERO
    }
}

//! Spread enumeration across exchange pairs.

use crate::domain::{FeeSchedule, Spread};

use super::aggregator::GroupedQuotes;

/// Computes every ordered cross-exchange spread for the grouped quotes.
///
/// For a symbol quoted by k exchanges this yields exactly k*(k-1) directed
/// spreads: either exchange can be the cheaper side, and only the direction
/// with a positive difference survives the downstream filter. Symbols with a
/// single quote yield nothing. Fees are looked up per exchange, so
/// asymmetric fee structures are reflected in the net profit.
pub fn compute_spreads(grouped: &GroupedQuotes, fees: &FeeSchedule) -> Vec<Spread> {
    let mut spreads = Vec::new();

    for per_exchange in grouped.values() {
        if per_exchange.len() < 2 {
            continue;
        }

        for buy in per_exchange.values() {
            for sell in per_exchange.values() {
                if buy.exchange == sell.exchange {
                    continue;
                }
                spreads.push(Spread::between(buy, sell, fees));
            }
        }
    }

    spreads
}

//! Quote aggregation: one grouping per cycle.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::domain::{ExchangeId, Quote};

/// Quotes grouped by symbol, at most one per (symbol, exchange).
///
/// BTreeMaps keep iteration deterministic, which the downstream ranking
/// relies on.
pub type GroupedQuotes = BTreeMap<String, BTreeMap<ExchangeId, Quote>>;

/// Groups one cycle's quotes by symbol.
///
/// Keeps the most recent quote per (symbol, exchange) when duplicates occur.
/// Quotes with a non-positive price are dropped, as are quotes older than
/// `max_age` when a staleness cutoff is configured. An empty input produces
/// an empty grouping; the cycle then simply yields zero opportunities.
pub fn group_by_symbol(
    quotes: Vec<Quote>,
    max_age: Option<Duration>,
    now: DateTime<Utc>,
) -> GroupedQuotes {
    let mut grouped: GroupedQuotes = BTreeMap::new();

    for quote in quotes {
        if quote.price <= Decimal::ZERO {
            warn!(
                exchange = %quote.exchange,
                symbol = %quote.symbol,
                price = %quote.price,
                "Dropping quote with non-positive price"
            );
            continue;
        }

        if let Some(max_age) = max_age {
            let age = quote.age(now);
            if age > max_age {
                debug!(
                    exchange = %quote.exchange,
                    symbol = %quote.symbol,
                    age_secs = age.num_seconds(),
                    "Dropping stale quote"
                );
                continue;
            }
        }

        let per_exchange = grouped.entry(quote.symbol.clone()).or_default();
        match per_exchange.get(&quote.exchange) {
            Some(existing) if existing.observed_at >= quote.observed_at => {}
            _ => {
                per_exchange.insert(quote.exchange, quote);
            }
        }
    }

    grouped
}

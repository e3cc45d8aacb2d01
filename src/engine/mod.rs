//! Arbitrage opportunity engine.
//!
//! One cycle: aggregate the batch of fresh quotes by symbol, enumerate all
//! ordered cross-exchange spreads, fee-adjust them, then filter, rank and
//! deduplicate into the three output streams (storage, notification,
//! dashboard).

mod aggregator;
mod calculator;
mod dedup;

pub use aggregator::{GroupedQuotes, group_by_symbol};
pub use calculator::compute_spreads;
pub use dedup::DedupWindow;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::time::Duration;
use tracing::debug;

use crate::domain::{FeeSchedule, Opportunity, Quote};

/// Engine parameters, fixed at startup.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Minimum net profit percentage for an opportunity to qualify.
    pub min_profit_threshold: Decimal,
    /// Cooldown between repeat alerts for the same dedup key.
    pub alert_cooldown: Duration,
    /// Profit improvement (percentage points) that re-triggers an alert
    /// inside the cooldown.
    pub re_alert_delta_pct: Decimal,
    /// Length of the ranked view for the dashboard read path.
    pub top_n: usize,
    /// Optional staleness cutoff for incoming quotes.
    pub max_quote_age: Option<Duration>,
}

/// The result of one engine cycle, handed to the collaborators.
#[derive(Debug, Clone, Default)]
pub struct CycleOutput {
    /// Storage stream: every qualifying opportunity, ranked. Deduplication
    /// never gates history.
    pub opportunities: Vec<Opportunity>,
    /// Notification stream: the subset passing the dedup window.
    pub alerts: Vec<Opportunity>,
    /// Dashboard view: the top-N prefix of the ranked list.
    pub ranked: Vec<Opportunity>,
}

/// Engine ingests one batch of quotes per cycle and produces the ordered,
/// deduplicated set of actionable opportunities.
///
/// The rolling dedup window is the only state carried across cycles; the
/// caller must serialize cycles so the window is never touched concurrently.
pub struct Engine {
    fees: FeeSchedule,
    min_profit_threshold: Decimal,
    top_n: usize,
    max_quote_age: Option<chrono::Duration>,
    dedup: DedupWindow,
}

impl Engine {
    pub fn new(config: EngineConfig, fees: FeeSchedule) -> Self {
        let cooldown = chrono::Duration::from_std(config.alert_cooldown)
            .unwrap_or_else(|_| chrono::Duration::seconds(300));
        let max_quote_age = config
            .max_quote_age
            .and_then(|age| chrono::Duration::from_std(age).ok());

        Self {
            fees,
            min_profit_threshold: config.min_profit_threshold,
            top_n: config.top_n,
            max_quote_age,
            dedup: DedupWindow::new(cooldown, config.re_alert_delta_pct),
        }
    }

    /// Runs one detection cycle over the given quotes.
    ///
    /// `now` is the cycle timestamp; it stamps every produced opportunity
    /// and drives dedup-window eviction. An empty or degenerate quote batch
    /// is not an error and produces empty streams.
    pub fn run_cycle(&mut self, quotes: Vec<Quote>, now: DateTime<Utc>) -> CycleOutput {
        self.dedup.evict_expired(now);

        let grouped = group_by_symbol(quotes, self.max_quote_age, now);
        let spreads = compute_spreads(&grouped, &self.fees);

        let mut opportunities: Vec<Opportunity> = spreads
            .iter()
            .filter(|s| s.is_profitable() && s.net_profit_pct >= self.min_profit_threshold)
            .map(|s| Opportunity::from_spread(s, now))
            .collect();

        // Net profit descending; ties by symbol, then buy exchange, for a
        // deterministic order.
        opportunities.sort_by(|a, b| {
            b.net_profit_pct
                .cmp(&a.net_profit_pct)
                .then_with(|| a.symbol.cmp(&b.symbol))
                .then_with(|| a.buy_exchange.cmp(&b.buy_exchange))
        });

        let mut alerts = Vec::new();
        for opp in &opportunities {
            if self.dedup.should_alert(opp, now) {
                self.dedup.mark_alerted(opp, now);
                alerts.push(opp.clone());
            }
        }

        let ranked = opportunities.iter().take(self.top_n).cloned().collect();

        debug!(
            symbols = grouped.len(),
            spreads = spreads.len(),
            opportunities = opportunities.len(),
            alerts = alerts.len(),
            "Cycle computed"
        );

        CycleOutput {
            opportunities,
            alerts,
            ranked,
        }
    }

    /// Number of dedup keys currently tracked (bounded by the cooldown).
    pub fn dedup_len(&self) -> usize {
        self.dedup.len()
    }
}

#[cfg(test)]
mod tests;

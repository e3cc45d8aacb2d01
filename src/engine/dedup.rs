//! Rolling alert-deduplication window.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use std::collections::HashMap;

use crate::domain::{DedupKey, Opportunity};

#[derive(Debug, Clone)]
struct DedupEntry {
    last_profit_pct: Decimal,
    last_alerted: DateTime<Utc>,
}

/// DedupWindow suppresses repeat alerts for an unchanged opportunity.
///
/// Maps dedup keys to the last alerted time and profit. An opportunity is
/// alert-eligible when its key is unseen, its cooldown has expired, or its
/// net profit improved by at least the re-alert delta since the last alert.
/// Entries older than the cooldown are evicted lazily each cycle, keeping
/// the window bounded by the number of recently-alerted (symbol, buy, sell)
/// triples.
///
/// This is the only mutable state the engine owns. It is passed in
/// explicitly so tests can construct a fresh window per case.
#[derive(Debug)]
pub struct DedupWindow {
    entries: HashMap<DedupKey, DedupEntry>,
    cooldown: Duration,
    re_alert_delta_pct: Decimal,
}

impl DedupWindow {
    pub fn new(cooldown: Duration, re_alert_delta_pct: Decimal) -> Self {
        Self {
            entries: HashMap::new(),
            cooldown,
            re_alert_delta_pct,
        }
    }

    /// Drops entries whose cooldown has expired.
    pub fn evict_expired(&mut self, now: DateTime<Utc>) {
        let cooldown = self.cooldown;
        self.entries
            .retain(|_, entry| now - entry.last_alerted <= cooldown);
    }

    /// Returns true if the opportunity should be alerted now.
    pub fn should_alert(&self, opp: &Opportunity, now: DateTime<Utc>) -> bool {
        match self.entries.get(&opp.dedup_key()) {
            None => true,
            Some(entry) => {
                now - entry.last_alerted > self.cooldown
                    || opp.net_profit_pct - entry.last_profit_pct >= self.re_alert_delta_pct
            }
        }
    }

    /// Records that the opportunity was alerted at `now`.
    pub fn mark_alerted(&mut self, opp: &Opportunity, now: DateTime<Utc>) {
        self.entries.insert(
            opp.dedup_key(),
            DedupEntry {
                last_profit_pct: opp.net_profit_pct,
                last_alerted: now,
            },
        );
    }

    /// Number of keys currently tracked.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

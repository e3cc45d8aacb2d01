//! Tests for the arbitrage opportunity engine.

use super::*;
use crate::domain::{ExchangeId, Quote};
use chrono::{TimeZone, Utc};
use std::collections::HashMap;
use std::str::FromStr;

fn ts() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
}

fn quote(exchange: ExchangeId, symbol: &str, price: &str) -> Quote {
    Quote::new(exchange, symbol, Decimal::from_str(price).unwrap(), ts())
}

/// Flat 0.1% fee on every exchange.
fn flat_fees() -> FeeSchedule {
    let rates: HashMap<ExchangeId, Decimal> = ExchangeId::all()
        .into_iter()
        .map(|id| (id, Decimal::from_str("0.001").unwrap()))
        .collect();
    FeeSchedule::new(rates)
}

fn engine_config(threshold: &str) -> EngineConfig {
    EngineConfig {
        min_profit_threshold: Decimal::from_str(threshold).unwrap(),
        alert_cooldown: Duration::from_secs(300),
        re_alert_delta_pct: Decimal::from_str("0.1").unwrap(),
        top_n: 20,
        max_quote_age: None,
    }
}

fn engine(threshold: &str) -> Engine {
    Engine::new(engine_config(threshold), flat_fees())
}

// ==================== Aggregator ====================

#[test]
fn test_aggregator_empty_input_yields_empty_grouping() {
    let grouped = group_by_symbol(vec![], None, ts());
    assert!(grouped.is_empty());
}

#[test]
fn test_aggregator_groups_by_symbol() {
    let quotes = vec![
        quote(ExchangeId::Binance, "BTC/USDT", "45000"),
        quote(ExchangeId::Bybit, "BTC/USDT", "45200"),
        quote(ExchangeId::Binance, "ETH/USDT", "2500"),
    ];

    let grouped = group_by_symbol(quotes, None, ts());

    assert_eq!(grouped.len(), 2);
    assert_eq!(grouped["BTC/USDT"].len(), 2);
    assert_eq!(grouped["ETH/USDT"].len(), 1);
}

#[test]
fn test_aggregator_keeps_newest_duplicate() {
    let older = Quote::new(
        ExchangeId::Binance,
        "BTC/USDT",
        Decimal::from_str("44000").unwrap(),
        ts() - chrono::Duration::seconds(20),
    );
    let newer = quote(ExchangeId::Binance, "BTC/USDT", "45000");

    // Newest wins regardless of input order.
    let grouped = group_by_symbol(vec![newer.clone(), older.clone()], None, ts());
    assert_eq!(grouped["BTC/USDT"][&ExchangeId::Binance].price, newer.price);

    let grouped = group_by_symbol(vec![older, newer.clone()], None, ts());
    assert_eq!(grouped["BTC/USDT"][&ExchangeId::Binance].price, newer.price);
}

#[test]
fn test_aggregator_drops_non_positive_prices() {
    let quotes = vec![
        quote(ExchangeId::Binance, "BTC/USDT", "0"),
        quote(ExchangeId::Bybit, "BTC/USDT", "-1"),
        quote(ExchangeId::Kucoin, "BTC/USDT", "45000"),
    ];

    let grouped = group_by_symbol(quotes, None, ts());
    assert_eq!(grouped["BTC/USDT"].len(), 1);
}

#[test]
fn test_aggregator_staleness_cutoff() {
    let stale = Quote::new(
        ExchangeId::Binance,
        "BTC/USDT",
        Decimal::from_str("44000").unwrap(),
        ts() - chrono::Duration::seconds(600),
    );
    let fresh = quote(ExchangeId::Bybit, "BTC/USDT", "45000");

    let grouped = group_by_symbol(
        vec![stale.clone(), fresh],
        Some(chrono::Duration::seconds(120)),
        ts(),
    );
    assert_eq!(grouped["BTC/USDT"].len(), 1);
    assert!(!grouped["BTC/USDT"].contains_key(&ExchangeId::Binance));

    // Without a cutoff the stale quote is accepted.
    let grouped = group_by_symbol(vec![stale], None, ts());
    assert_eq!(grouped["BTC/USDT"].len(), 1);
}

// ==================== Spread calculator ====================

#[test]
fn test_k_exchanges_yield_k_times_k_minus_one_spreads() {
    let quotes = vec![
        quote(ExchangeId::Binance, "BTC/USDT", "45000"),
        quote(ExchangeId::Bybit, "BTC/USDT", "45200"),
        quote(ExchangeId::Kucoin, "BTC/USDT", "44900"),
    ];

    let grouped = group_by_symbol(quotes, None, ts());
    let spreads = compute_spreads(&grouped, &flat_fees());

    // k = 3 -> 6 directed spreads, at most 3 with positive gross diff.
    assert_eq!(spreads.len(), 6);
    let positive = spreads
        .iter()
        .filter(|s| s.gross_diff_pct > Decimal::ZERO)
        .count();
    assert!(positive <= 3);
    // All three prices are distinct, so exactly half are positive.
    assert_eq!(positive, 3);
}

#[test]
fn test_single_exchange_symbol_yields_zero_spreads() {
    let quotes = vec![quote(ExchangeId::Binance, "ETH/USDT", "2500")];
    let grouped = group_by_symbol(quotes, None, ts());
    let spreads = compute_spreads(&grouped, &flat_fees());
    assert!(spreads.is_empty());
}

#[test]
fn test_net_profit_is_scale_invariant() {
    let base = {
        let grouped = group_by_symbol(
            vec![
                quote(ExchangeId::Binance, "BTC/USDT", "44900"),
                quote(ExchangeId::Bybit, "BTC/USDT", "45200"),
            ],
            None,
            ts(),
        );
        compute_spreads(&grouped, &flat_fees())
    };
    let scaled = {
        let grouped = group_by_symbol(
            vec![
                quote(ExchangeId::Binance, "BTC/USDT", "89800"),
                quote(ExchangeId::Bybit, "BTC/USDT", "90400"),
            ],
            None,
            ts(),
        );
        compute_spreads(&grouped, &flat_fees())
    };

    for (a, b) in base.iter().zip(scaled.iter()) {
        assert_eq!(a.net_profit_pct.round_dp(10), b.net_profit_pct.round_dp(10));
    }
}

#[test]
fn test_asymmetric_fees_affect_direction() {
    let mut rates = HashMap::new();
    rates.insert(ExchangeId::Binance, Decimal::from_str("0.001").unwrap());
    rates.insert(ExchangeId::Bybit, Decimal::from_str("0.003").unwrap());
    let fees = FeeSchedule::new(rates);

    let grouped = group_by_symbol(
        vec![
            quote(ExchangeId::Binance, "BTC/USDT", "44900"),
            quote(ExchangeId::Bybit, "BTC/USDT", "45200"),
        ],
        None,
        ts(),
    );
    let spreads = compute_spreads(&grouped, &fees);

    let forward = spreads
        .iter()
        .find(|s| s.buy_exchange == ExchangeId::Binance)
        .unwrap();
    // gross 0.668% minus 0.1% + 0.3% fees.
    assert_eq!(forward.net_profit_pct.round_dp(3), Decimal::from_str("0.268").unwrap());
}

// ==================== Filter & ranker ====================

#[test]
fn test_reference_scenario_excluded_at_default_threshold() {
    // 44900 vs 45200 at 0.1% fees nets 0.468%, below the 0.5% threshold:
    // absent from both streams.
    let mut engine = engine("0.5");
    let out = engine.run_cycle(
        vec![
            quote(ExchangeId::Binance, "BTC/USDT", "44900"),
            quote(ExchangeId::Bybit, "BTC/USDT", "45200"),
        ],
        ts(),
    );

    assert!(out.opportunities.is_empty());
    assert!(out.alerts.is_empty());
    assert!(out.ranked.is_empty());
}

#[test]
fn test_reference_scenario_included_at_lower_threshold() {
    let mut engine = engine("0.4");
    let out = engine.run_cycle(
        vec![
            quote(ExchangeId::Binance, "BTC/USDT", "44900"),
            quote(ExchangeId::Bybit, "BTC/USDT", "45200"),
        ],
        ts(),
    );

    assert_eq!(out.opportunities.len(), 1);
    let opp = &out.opportunities[0];
    assert_eq!(opp.buy_exchange, ExchangeId::Binance);
    assert_eq!(opp.sell_exchange, ExchangeId::Bybit);
    assert_eq!(opp.gross_diff_pct.round_dp(3), Decimal::from_str("0.668").unwrap());
    assert_eq!(opp.net_profit_pct.round_dp(3), Decimal::from_str("0.468").unwrap());
    assert_eq!(opp.detected_at, ts());

    // First sighting: present in the notification stream too.
    assert_eq!(out.alerts.len(), 1);
    assert_eq!(out.ranked.len(), 1);
}

#[test]
fn test_unprofitable_spreads_are_discarded_even_at_zero_threshold() {
    // 0.2% gross, 0.1% fee per side: net is exactly zero, not profitable.
    let mut engine = engine("0");
    let out = engine.run_cycle(
        vec![
            quote(ExchangeId::Binance, "BTC/USDT", "10000"),
            quote(ExchangeId::Bybit, "BTC/USDT", "10020"),
        ],
        ts(),
    );

    assert!(out.opportunities.is_empty());
}

#[test]
fn test_single_exchange_symbol_produces_no_opportunities() {
    let mut engine = engine("0.4");
    let out = engine.run_cycle(
        vec![
            quote(ExchangeId::Binance, "BTC/USDT", "44900"),
            quote(ExchangeId::Bybit, "BTC/USDT", "45200"),
            quote(ExchangeId::Kucoin, "ETH/USDT", "2500"),
        ],
        ts(),
    );

    assert!(out.opportunities.iter().all(|o| o.symbol == "BTC/USDT"));
}

#[test]
fn test_ranking_is_profit_descending_with_symbol_tiebreak() {
    let mut engine = engine("0.1");
    let out = engine.run_cycle(
        vec![
            // 1% gross on ETH, 0.67% on BTC.
            quote(ExchangeId::Binance, "ETH/USDT", "2500"),
            quote(ExchangeId::Bybit, "ETH/USDT", "2525"),
            quote(ExchangeId::Binance, "BTC/USDT", "44900"),
            quote(ExchangeId::Bybit, "BTC/USDT", "45200"),
            // Same net as BTC: identical prices on a symbol sorting after it.
            quote(ExchangeId::Binance, "LTC/USDT", "44900"),
            quote(ExchangeId::Bybit, "LTC/USDT", "45200"),
        ],
        ts(),
    );

    let order: Vec<&str> = out.opportunities.iter().map(|o| o.symbol.as_str()).collect();
    assert_eq!(order, vec!["ETH/USDT", "BTC/USDT", "LTC/USDT"]);
}

#[test]
fn test_equal_profit_ties_break_by_buy_exchange() {
    let mut engine = engine("0.1");
    let out = engine.run_cycle(
        vec![
            quote(ExchangeId::Binance, "BTC/USDT", "44900"),
            quote(ExchangeId::Bybit, "BTC/USDT", "44900"),
            quote(ExchangeId::Kucoin, "BTC/USDT", "45200"),
        ],
        ts(),
    );

    // Both directions into kucoin net the same; binance sorts first.
    assert_eq!(out.opportunities.len(), 2);
    assert_eq!(out.opportunities[0].buy_exchange, ExchangeId::Binance);
    assert_eq!(out.opportunities[1].buy_exchange, ExchangeId::Bybit);
}

#[test]
fn test_ranked_view_is_truncated_to_top_n() {
    let mut config = engine_config("0.1");
    config.top_n = 1;
    let mut engine = Engine::new(config, flat_fees());

    let out = engine.run_cycle(
        vec![
            quote(ExchangeId::Binance, "ETH/USDT", "2500"),
            quote(ExchangeId::Bybit, "ETH/USDT", "2525"),
            quote(ExchangeId::Binance, "BTC/USDT", "44900"),
            quote(ExchangeId::Bybit, "BTC/USDT", "45200"),
        ],
        ts(),
    );

    // Storage stream is never truncated; only the dashboard view is.
    assert_eq!(out.opportunities.len(), 2);
    assert_eq!(out.ranked.len(), 1);
    assert_eq!(out.ranked[0].symbol, "ETH/USDT");
}

#[test]
fn test_filter_and_rank_is_idempotent() {
    let quotes = vec![
        quote(ExchangeId::Binance, "BTC/USDT", "44900"),
        quote(ExchangeId::Bybit, "BTC/USDT", "45200"),
        quote(ExchangeId::Binance, "ETH/USDT", "2500"),
        quote(ExchangeId::Kucoin, "ETH/USDT", "2525"),
    ];

    let mut engine = engine("0.1");
    let first = engine.run_cycle(quotes.clone(), ts());
    let second = engine.run_cycle(quotes, ts());

    // The storage stream is a pure function of the quote set and timestamp;
    // only the alert subset depends on dedup state.
    assert_eq!(first.opportunities, second.opportunities);
    assert_eq!(first.ranked, second.ranked);
}

// ==================== Deduplication ====================

#[test]
fn test_repeat_opportunity_within_cooldown_is_not_realerted() {
    let quotes = vec![
        quote(ExchangeId::Binance, "BTC/USDT", "44900"),
        quote(ExchangeId::Bybit, "BTC/USDT", "45200"),
    ];

    let mut engine = engine("0.4");
    let first = engine.run_cycle(quotes.clone(), ts());
    assert_eq!(first.alerts.len(), 1);

    // Next cycle, 60s later, same prices: stored again, not alerted again.
    let second = engine.run_cycle(quotes, ts() + chrono::Duration::seconds(60));
    assert_eq!(second.opportunities.len(), 1);
    assert!(second.alerts.is_empty());
}

#[test]
fn test_improved_profit_realerts_within_cooldown() {
    let mut engine = engine("0.4");
    engine.run_cycle(
        vec![
            quote(ExchangeId::Binance, "BTC/USDT", "44900"),
            quote(ExchangeId::Bybit, "BTC/USDT", "45200"),
        ],
        ts(),
    );

    // 45300 lifts net profit from 0.468% to 0.691%, past the 0.1pp delta.
    let second = engine.run_cycle(
        vec![
            quote(ExchangeId::Binance, "BTC/USDT", "44900"),
            quote(ExchangeId::Bybit, "BTC/USDT", "45300"),
        ],
        ts() + chrono::Duration::seconds(60),
    );
    assert_eq!(second.alerts.len(), 1);
}

#[test]
fn test_sub_delta_improvement_stays_suppressed() {
    let mut engine = engine("0.4");
    engine.run_cycle(
        vec![
            quote(ExchangeId::Binance, "BTC/USDT", "44900"),
            quote(ExchangeId::Bybit, "BTC/USDT", "45200"),
        ],
        ts(),
    );

    // 45210 improves net by ~0.02pp, below the 0.1pp re-alert delta.
    let second = engine.run_cycle(
        vec![
            quote(ExchangeId::Binance, "BTC/USDT", "44900"),
            quote(ExchangeId::Bybit, "BTC/USDT", "45210"),
        ],
        ts() + chrono::Duration::seconds(60),
    );
    assert_eq!(second.opportunities.len(), 1);
    assert!(second.alerts.is_empty());
}

#[test]
fn test_alert_fires_again_after_cooldown_expires() {
    let quotes = vec![
        quote(ExchangeId::Binance, "BTC/USDT", "44900"),
        quote(ExchangeId::Bybit, "BTC/USDT", "45200"),
    ];

    let mut engine = engine("0.4");
    engine.run_cycle(quotes.clone(), ts());

    let after_cooldown = engine.run_cycle(quotes, ts() + chrono::Duration::seconds(301));
    assert_eq!(after_cooldown.alerts.len(), 1);
}

#[test]
fn test_opposite_direction_is_a_distinct_dedup_key() {
    let mut engine = engine("0.4");
    engine.run_cycle(
        vec![
            quote(ExchangeId::Binance, "BTC/USDT", "44900"),
            quote(ExchangeId::Bybit, "BTC/USDT", "45200"),
        ],
        ts(),
    );

    // Prices cross over: the profitable direction reverses and alerts fresh.
    let second = engine.run_cycle(
        vec![
            quote(ExchangeId::Binance, "BTC/USDT", "45200"),
            quote(ExchangeId::Bybit, "BTC/USDT", "44900"),
        ],
        ts() + chrono::Duration::seconds(60),
    );
    assert_eq!(second.alerts.len(), 1);
    assert_eq!(second.alerts[0].buy_exchange, ExchangeId::Bybit);
}

#[test]
fn test_expired_entries_are_evicted_lazily() {
    let quotes = vec![
        quote(ExchangeId::Binance, "BTC/USDT", "44900"),
        quote(ExchangeId::Bybit, "BTC/USDT", "45200"),
    ];

    let mut engine = engine("0.4");
    engine.run_cycle(quotes, ts());
    assert_eq!(engine.dedup_len(), 1);

    // A later cycle with no quotes still evicts the stale entry.
    engine.run_cycle(vec![], ts() + chrono::Duration::seconds(301));
    assert_eq!(engine.dedup_len(), 0);
}

#[test]
fn test_dedup_never_gates_the_storage_stream() {
    let quotes = vec![
        quote(ExchangeId::Binance, "BTC/USDT", "44900"),
        quote(ExchangeId::Bybit, "BTC/USDT", "45200"),
    ];

    let mut engine = engine("0.4");
    for i in 0..5 {
        let out = engine.run_cycle(quotes.clone(), ts() + chrono::Duration::seconds(i * 30));
        assert_eq!(out.opportunities.len(), 1, "cycle {}", i);
    }
}

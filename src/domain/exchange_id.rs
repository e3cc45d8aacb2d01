//! Exchange identifiers.

use serde::{Deserialize, Serialize};

/// ExchangeId identifies one of the monitored spot exchanges.
///
/// Variants are declared in lowercase-name order so the derived `Ord`
/// matches ordering by name, which the opportunity ranking relies on for
/// deterministic tie-breaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExchangeId {
    Binance,
    Bybit,
    Kucoin,
}

impl ExchangeId {
    /// Returns the lowercase name used in config, logs and storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            ExchangeId::Binance => "binance",
            ExchangeId::Bybit => "bybit",
            ExchangeId::Kucoin => "kucoin",
        }
    }

    /// All known exchanges.
    pub fn all() -> [ExchangeId; 3] {
        [ExchangeId::Binance, ExchangeId::Bybit, ExchangeId::Kucoin]
    }
}

impl std::fmt::Display for ExchangeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ExchangeId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "binance" => Ok(ExchangeId::Binance),
            "bybit" => Ok(ExchangeId::Bybit),
            "kucoin" => Ok(ExchangeId::Kucoin),
            _ => Err(format!("unknown exchange: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_round_trip_names() {
        for id in ExchangeId::all() {
            assert_eq!(ExchangeId::from_str(id.as_str()).unwrap(), id);
        }
    }

    #[test]
    fn test_from_str_is_case_insensitive() {
        assert_eq!(ExchangeId::from_str("Binance").unwrap(), ExchangeId::Binance);
        assert_eq!(ExchangeId::from_str("KUCOIN").unwrap(), ExchangeId::Kucoin);
    }

    #[test]
    fn test_unknown_exchange_is_rejected() {
        assert!(ExchangeId::from_str("poloniex").is_err());
    }

    #[test]
    fn test_ord_matches_name_order() {
        let mut ids = vec![ExchangeId::Kucoin, ExchangeId::Binance, ExchangeId::Bybit];
        ids.sort();
        let names: Vec<&str> = ids.iter().map(|i| i.as_str()).collect();
        assert_eq!(names, vec!["binance", "bybit", "kucoin"]);
    }
}

//! SQLite implementation of Storage.

use crate::domain::{ExchangeId, Opportunity, Quote};
use crate::storage::{Storage, StorageError};
use async_trait::async_trait;
use chrono::{DateTime, Timelike, Utc};
use rust_decimal::Decimal;
use sha2::{Digest, Sha256};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Row, Sqlite};
use std::str::FromStr;
use tracing::{debug, info};

/// SqliteStorage implements Storage using SQLite.
pub struct SqliteStorage {
    pool: Pool<Sqlite>,
}

/// SqliteStorageConfig holds SQLite storage configuration.
#[derive(Debug, Clone)]
pub struct SqliteStorageConfig {
    /// Path to the SQLite database file.
    pub path: String,
    /// Maximum number of connections in the pool.
    pub max_connections: u32,
}

impl Default for SqliteStorageConfig {
    fn default() -> Self {
        Self {
            path: "opportunities.db".to_string(),
            max_connections: 5,
        }
    }
}

impl SqliteStorage {
    /// Creates a new SQLite storage instance.
    pub async fn new(config: SqliteStorageConfig) -> Result<Self, StorageError> {
        let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", config.path))?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(options)
            .await?;

        let storage = Self { pool };

        storage.migrate().await?;

        info!(path = %config.path, "SQLite storage initialized");
        Ok(storage)
    }

    /// Runs database migrations to create the schema.
    async fn migrate(&self) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS opportunities (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                unique_hash TEXT NOT NULL UNIQUE,
                symbol TEXT NOT NULL,
                buy_exchange TEXT NOT NULL,
                sell_exchange TEXT NOT NULL,
                buy_price TEXT NOT NULL,
                sell_price TEXT NOT NULL,
                gross_diff_pct TEXT NOT NULL,
                net_profit_pct TEXT NOT NULL,
                detected_at TEXT NOT NULL,
                created_at TEXT DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_opportunities_symbol ON opportunities(symbol)")
            .execute(&self.pool)
            .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_opportunities_detected_at ON opportunities(detected_at)",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_opportunities_exchanges ON opportunities(buy_exchange, sell_exchange)",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS price_history (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                exchange TEXT NOT NULL,
                symbol TEXT NOT NULL,
                price TEXT NOT NULL,
                observed_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_price_history_symbol_time ON price_history(symbol, observed_at)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

/// Generates a unique hash for detecting duplicate opportunities.
///
/// An opportunity is unique based on: symbol, buy_exchange, sell_exchange,
/// net_profit_pct (rounded to 2 decimals), and a 5-minute time window.
/// Re-inserting the same opportunity within the window is a no-op.
fn generate_unique_hash(opp: &Opportunity) -> String {
    let profit_rounded = opp.net_profit_pct.round_dp(2).to_string();

    // Round detected_at down to a 5-minute window (16:37 and 16:39 both become 16:35)
    let minute = opp.detected_at.minute();
    let window_minutes = (minute / 5) * 5;
    let time_window = opp
        .detected_at
        .with_minute(window_minutes)
        .and_then(|t| t.with_second(0))
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(opp.detected_at);
    let time_window_str = time_window.format("%Y-%m-%dT%H:%M").to_string();

    let data = format!(
        "{}|{}|{}|{}|{}",
        opp.symbol, opp.buy_exchange, opp.sell_exchange, profit_rounded, time_window_str
    );

    let mut hasher = Sha256::new();
    hasher.update(data.as_bytes());
    let hash = hasher.finalize();

    // Use first 16 bytes for shorter hash
    hex::encode(&hash[..16])
}

#[async_trait]
impl Storage for SqliteStorage {
    async fn save_opportunity(&self, opp: &Opportunity) -> Result<bool, StorageError> {
        let unique_hash = generate_unique_hash(opp);

        let result = sqlx::query(
            r#"
            INSERT INTO opportunities (
                unique_hash, symbol, buy_exchange, sell_exchange,
                buy_price, sell_price, gross_diff_pct, net_profit_pct, detected_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            ON CONFLICT(unique_hash) DO NOTHING
            "#,
        )
        .bind(&unique_hash)
        .bind(&opp.symbol)
        .bind(opp.buy_exchange.as_str())
        .bind(opp.sell_exchange.as_str())
        .bind(opp.buy_price.to_string())
        .bind(opp.sell_price.to_string())
        .bind(opp.gross_diff_pct.to_string())
        .bind(opp.net_profit_pct.to_string())
        .bind(opp.detected_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        let rows_affected = result.rows_affected();

        if rows_affected > 0 {
            debug!(
                symbol = %opp.symbol,
                hash = %unique_hash,
                "Opportunity saved"
            );
        }

        Ok(rows_affected > 0)
    }

    async fn save_quotes(&self, quotes: &[Quote]) -> Result<(), StorageError> {
        for quote in quotes {
            sqlx::query(
                r#"
                INSERT INTO price_history (exchange, symbol, price, observed_at)
                VALUES (?1, ?2, ?3, ?4)
                "#,
            )
            .bind(quote.exchange.as_str())
            .bind(&quote.symbol)
            .bind(quote.price.to_string())
            .bind(quote.observed_at.to_rfc3339())
            .execute(&self.pool)
            .await?;
        }
        Ok(())
    }

    async fn opportunities_for_symbol(
        &self,
        symbol: &str,
    ) -> Result<Vec<Opportunity>, StorageError> {
        let rows = sqlx::query(
            r#"
            SELECT symbol, buy_exchange, sell_exchange, buy_price, sell_price,
                gross_diff_pct, net_profit_pct, detected_at
            FROM opportunities WHERE symbol = ? ORDER BY detected_at DESC
            "#,
        )
        .bind(symbol)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(parse_opportunity_row).collect()
    }

    async fn recent_opportunities(&self, limit: i64) -> Result<Vec<Opportunity>, StorageError> {
        let rows = sqlx::query(
            r#"
            SELECT symbol, buy_exchange, sell_exchange, buy_price, sell_price,
                gross_diff_pct, net_profit_pct, detected_at
            FROM opportunities ORDER BY detected_at DESC LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(parse_opportunity_row).collect()
    }

    async fn count(&self) -> Result<i64, StorageError> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM opportunities")
            .fetch_one(&self.pool)
            .await?;

        let count: i64 = row.try_get("count")?;
        Ok(count)
    }

    async fn close(&self) -> Result<(), StorageError> {
        self.pool.close().await;
        Ok(())
    }
}

/// Parses an opportunity from a database row.
fn parse_opportunity_row(row: &sqlx::sqlite::SqliteRow) -> Result<Opportunity, StorageError> {
    let buy_exchange_str: String = row.try_get("buy_exchange")?;
    let buy_exchange = ExchangeId::from_str(&buy_exchange_str).map_err(StorageError::InvalidData)?;

    let sell_exchange_str: String = row.try_get("sell_exchange")?;
    let sell_exchange =
        ExchangeId::from_str(&sell_exchange_str).map_err(StorageError::InvalidData)?;

    let buy_price = parse_decimal_column(row, "buy_price")?;
    let sell_price = parse_decimal_column(row, "sell_price")?;
    let gross_diff_pct = parse_decimal_column(row, "gross_diff_pct")?;
    let net_profit_pct = parse_decimal_column(row, "net_profit_pct")?;

    let detected_at_str: String = row.try_get("detected_at")?;
    let detected_at = DateTime::parse_from_rfc3339(&detected_at_str)
        .map_err(|e| StorageError::InvalidData(format!("Invalid detected_at: {}", e)))?
        .with_timezone(&Utc);

    Ok(Opportunity {
        symbol: row.try_get("symbol")?,
        buy_exchange,
        buy_price,
        sell_exchange,
        sell_price,
        gross_diff_pct,
        net_profit_pct,
        detected_at,
    })
}

fn parse_decimal_column(
    row: &sqlx::sqlite::SqliteRow,
    column: &str,
) -> Result<Decimal, StorageError> {
    let value: String = row.try_get(column)?;
    Decimal::from_str(&value)
        .map_err(|e| StorageError::InvalidData(format!("Invalid {}: {}", column, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn opportunity(symbol: &str, detected_at: DateTime<Utc>, net: &str) -> Opportunity {
        Opportunity {
            symbol: symbol.to_string(),
            buy_exchange: ExchangeId::Binance,
            buy_price: Decimal::from_str("44900").unwrap(),
            sell_exchange: ExchangeId::Bybit,
            sell_price: Decimal::from_str("45200").unwrap(),
            gross_diff_pct: Decimal::from_str("0.668").unwrap(),
            net_profit_pct: Decimal::from_str(net).unwrap(),
            detected_at,
        }
    }

    async fn open_temp_storage() -> (SqliteStorage, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.db");
        let storage = SqliteStorage::new(SqliteStorageConfig {
            path: path.to_string_lossy().into_owned(),
            max_connections: 1,
        })
        .await
        .unwrap();
        (storage, dir)
    }

    fn ts(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, hour, minute, 0).unwrap()
    }

    #[test]
    fn test_unique_hash_same_window_collides() {
        // 16:37 and 16:39 fall in the same 5-minute window
        let a = opportunity("BTC/USDT", ts(16, 37), "0.468");
        let b = opportunity("BTC/USDT", ts(16, 39), "0.468");
        assert_eq!(generate_unique_hash(&a), generate_unique_hash(&b));
    }

    #[test]
    fn test_unique_hash_different_window_differs() {
        let a = opportunity("BTC/USDT", ts(16, 37), "0.468");
        let b = opportunity("BTC/USDT", ts(16, 42), "0.468");
        assert_ne!(generate_unique_hash(&a), generate_unique_hash(&b));
    }

    #[test]
    fn test_unique_hash_profit_rounding() {
        // 0.468 and 0.472 both round to 0.47 at two decimals
        let a = opportunity("BTC/USDT", ts(16, 37), "0.468");
        let b = opportunity("BTC/USDT", ts(16, 37), "0.472");
        assert_eq!(generate_unique_hash(&a), generate_unique_hash(&b));
    }

    #[tokio::test]
    async fn test_save_and_count() {
        let (storage, _dir) = open_temp_storage().await;

        let saved = storage
            .save_opportunity(&opportunity("BTC/USDT", ts(12, 0), "0.468"))
            .await
            .unwrap();
        assert!(saved);
        assert_eq!(storage.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_in_same_window_not_saved() {
        let (storage, _dir) = open_temp_storage().await;

        let first = storage
            .save_opportunity(&opportunity("BTC/USDT", ts(16, 37), "0.468"))
            .await
            .unwrap();
        let second = storage
            .save_opportunity(&opportunity("BTC/USDT", ts(16, 39), "0.468"))
            .await
            .unwrap();

        assert!(first);
        assert!(!second);
        assert_eq!(storage.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_recent_opportunities_newest_first() {
        let (storage, _dir) = open_temp_storage().await;

        storage
            .save_opportunity(&opportunity("BTC/USDT", ts(10, 0), "0.4"))
            .await
            .unwrap();
        storage
            .save_opportunity(&opportunity("ETH/USDT", ts(11, 0), "0.5"))
            .await
            .unwrap();
        storage
            .save_opportunity(&opportunity("LTC/USDT", ts(12, 0), "0.6"))
            .await
            .unwrap();

        let recent = storage.recent_opportunities(2).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].symbol, "LTC/USDT");
        assert_eq!(recent[1].symbol, "ETH/USDT");
    }

    #[tokio::test]
    async fn test_opportunities_for_symbol_roundtrip() {
        let (storage, _dir) = open_temp_storage().await;

        let original = opportunity("BTC/USDT", ts(12, 0), "0.468");
        storage.save_opportunity(&original).await.unwrap();
        storage
            .save_opportunity(&opportunity("ETH/USDT", ts(12, 0), "0.5"))
            .await
            .unwrap();

        let found = storage.opportunities_for_symbol("BTC/USDT").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0], original);
    }

    #[tokio::test]
    async fn test_save_quotes() {
        let (storage, _dir) = open_temp_storage().await;

        let quotes = vec![
            Quote::new(
                ExchangeId::Binance,
                "BTC/USDT",
                Decimal::from_str("44900").unwrap(),
                ts(12, 0),
            ),
            Quote::new(
                ExchangeId::Bybit,
                "BTC/USDT",
                Decimal::from_str("45200").unwrap(),
                ts(12, 0),
            ),
        ];

        storage.save_quotes(&quotes).await.unwrap();

        let row = sqlx::query("SELECT COUNT(*) as count FROM price_history")
            .fetch_one(&storage.pool)
            .await
            .unwrap();
        let count: i64 = row.try_get("count").unwrap();
        assert_eq!(count, 2);
    }
}

//! Storage interfaces and implementations for persisting scan results.

mod sqlite;

pub use sqlite::{SqliteStorage, SqliteStorageConfig};

use crate::domain::{Opportunity, Quote};
use async_trait::async_trait;

/// Storage persists the two append-only streams a scan cycle produces:
/// every profitable opportunity, and the raw quotes behind it.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Persists an opportunity.
    /// Returns true if it was saved, false if an equivalent row already exists.
    async fn save_opportunity(&self, opp: &Opportunity) -> Result<bool, StorageError>;

    /// Appends a batch of quotes to the price history.
    async fn save_quotes(&self, quotes: &[Quote]) -> Result<(), StorageError>;

    /// Retrieves stored opportunities for one trading pair, newest first.
    async fn opportunities_for_symbol(&self, symbol: &str)
    -> Result<Vec<Opportunity>, StorageError>;

    /// Retrieves the most recently detected opportunities, newest first.
    async fn recent_opportunities(&self, limit: i64) -> Result<Vec<Opportunity>, StorageError>;

    /// Total number of stored opportunities.
    async fn count(&self) -> Result<i64, StorageError>;

    /// Closes the storage connection.
    async fn close(&self) -> Result<(), StorageError>;
}

/// StorageError represents errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

//! Monitor error types.

/// Monitor error type.
#[derive(Debug, thiserror::Error)]
pub enum BotError {
    #[error("monitor is already running")]
    AlreadyRunning,
    #[error("config error: {0}")]
    Config(String),
    #[error("exchange error: {0}")]
    Exchange(String),
    #[error("storage error: {0}")]
    Storage(String),
}

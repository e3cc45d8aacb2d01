#![allow(dead_code)]

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::fmt;
use std::time::Duration;

use crate::domain::ExchangeId;

/// Notification event kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventType {
    /// An arbitrage opportunity cleared the alert gate.
    Alert,
    /// Something went wrong in a component.
    Error,
    /// The monitor started.
    Startup,
    /// The monitor stopped.
    Shutdown,
    /// Periodic statistics summary.
    Summary,
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventType::Alert => write!(f, "alert"),
            EventType::Error => write!(f, "error"),
            EventType::Startup => write!(f, "startup"),
            EventType::Shutdown => write!(f, "shutdown"),
            EventType::Summary => write!(f, "summary"),
        }
    }
}

/// Payload for an opportunity alert.
#[derive(Debug, Clone)]
pub struct AlertData {
    pub pair: String,
    pub buy_exchange: ExchangeId,
    pub sell_exchange: ExchangeId,
    pub buy_price: Decimal,
    pub sell_price: Decimal,
    pub gross_diff_pct: Decimal,
    pub net_profit_pct: Decimal,
    pub detected_at: DateTime<Utc>,
}

/// Payload for a component error.
#[derive(Debug, Clone)]
pub struct ErrorData {
    pub component: String,
    pub message: String,
    pub error: Option<String>,
}

/// Payload for the startup event.
#[derive(Debug, Clone)]
pub struct StartupData {
    pub version: String,
    pub exchanges: Vec<String>,
    pub pairs: Vec<String>,
}

/// Payload for the shutdown event.
#[derive(Debug, Clone)]
pub struct ShutdownData {
    pub reason: String,
    pub uptime: Duration,
    pub graceful: bool,
}

/// Payload for the periodic summary.
#[derive(Debug, Clone)]
pub struct SummaryData {
    pub uptime: Duration,
    pub scan_cycles: u64,
    pub quotes_received: u64,
    pub opportunities_found: u64,
    pub alerts_sent: u64,
    pub skipped_cycles: u64,
}

#[derive(Debug, Clone)]
pub enum EventData {
    Alert(AlertData),
    Error(ErrorData),
    Startup(StartupData),
    Shutdown(ShutdownData),
    Summary(SummaryData),
}

/// A notification event.
#[derive(Debug, Clone)]
pub struct Event {
    pub event_type: EventType,
    pub timestamp: DateTime<Utc>,
    pub data: EventData,
}

impl Event {
    pub fn new(event_type: EventType, data: EventData) -> Self {
        Self {
            event_type,
            timestamp: Utc::now(),
            data,
        }
    }

    pub fn alert(data: AlertData) -> Self {
        Self::new(EventType::Alert, EventData::Alert(data))
    }

    pub fn error(data: ErrorData) -> Self {
        Self::new(EventType::Error, EventData::Error(data))
    }

    pub fn startup(data: StartupData) -> Self {
        Self::new(EventType::Startup, EventData::Startup(data))
    }

    pub fn shutdown(data: ShutdownData) -> Self {
        Self::new(EventType::Shutdown, EventData::Shutdown(data))
    }

    pub fn summary(data: SummaryData) -> Self {
        Self::new(EventType::Summary, EventData::Summary(data))
    }
}

/// Delivery sink for notification events.
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    /// Sends the event and waits for delivery.
    async fn send(&self, event: &Event) -> Result<(), NotificationError>;

    /// Queues the event for delivery without blocking.
    fn send_async(&self, event: Event);

    /// Whether this sink wants events of the given type.
    fn is_enabled(&self, event_type: EventType) -> bool;

    /// Flushes and shuts the sink down.
    async fn close(&self) -> Result<(), NotificationError>;
}

/// Notification delivery error.
#[derive(Debug, Clone)]
pub struct NotificationError {
    pub message: String,
}

impl fmt::Display for NotificationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NotificationError: {}", self.message)
    }
}

impl std::error::Error for NotificationError {}

impl NotificationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// NoopNotifier swallows everything. Used when notifications are disabled.
pub struct NoopNotifier;

impl NoopNotifier {
    pub fn new() -> Self {
        Self
    }
}

impl Default for NoopNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl Notifier for NoopNotifier {
    async fn send(&self, _event: &Event) -> Result<(), NotificationError> {
        Ok(())
    }

    fn send_async(&self, _event: Event) {}

    fn is_enabled(&self, _event_type: EventType) -> bool {
        false
    }

    async fn close(&self) -> Result<(), NotificationError> {
        Ok(())
    }
}

// === Formatting ===

/// Formats an opportunity alert.
pub fn format_alert(data: &AlertData) -> String {
    let pair_tag = format_pair_tag(&data.pair);

    format!(
        "🔔 *Arbitrage opportunity*\n\n\
         💰 Net profit: *{}%* (gross {}%)\n\n\
         Pair: {} #{}\n\
         Buy: {} @ ${}\n\
         Sell: {} @ ${}\n\n\
         ⏰ {}",
        data.net_profit_pct.round_dp(3),
        data.gross_diff_pct.round_dp(3),
        data.pair,
        pair_tag,
        data.buy_exchange,
        data.buy_price,
        data.sell_exchange,
        data.sell_price,
        data.detected_at.format("%H:%M:%S UTC")
    )
}

/// Formats a component error.
pub fn format_error(data: &ErrorData) -> String {
    let error_str = data
        .error
        .as_ref()
        .map(|e| format!("\nError: {}", e))
        .unwrap_or_default();

    format!(
        "⚠️ *Error*\n\n\
         Component: {}\n\
         Message: {}{}\n\n\
         ⏰ {}",
        data.component,
        data.message,
        error_str,
        Utc::now().format("%H:%M:%S UTC")
    )
}

/// Formats the startup event.
pub fn format_startup(data: &StartupData) -> String {
    format!(
        "🤖 *Monitor started*\n\n\
         Version: {}\n\
         Exchanges: {}\n\
         Pairs: {}\n\n\
         ⏰ {}",
        data.version,
        data.exchanges.join(", "),
        data.pairs.join(", "),
        Utc::now().format("%H:%M:%S UTC")
    )
}

/// Formats the shutdown event.
pub fn format_shutdown(data: &ShutdownData) -> String {
    let status = if data.graceful {
        "✅ Graceful"
    } else {
        "⚠️ Forced"
    };

    format!(
        "🛑 *Monitor stopped*\n\n\
         Reason: {}\n\
         Status: {}\n\
         Uptime: {}\n\n\
         ⏰ {}",
        data.reason,
        status,
        format_duration(data.uptime),
        Utc::now().format("%H:%M:%S UTC")
    )
}

/// Formats the periodic summary.
pub fn format_summary(data: &SummaryData) -> String {
    format!(
        "📊 *Scan summary*\n\n\
         ⏱ Uptime: {}\n\
         🔄 Scan cycles: {}\n\
         📡 Quotes received: {}\n\n\
         📈 Opportunities found: {}\n\
         🔔 Alerts sent: {}\n\
         ⏭ Skipped cycles: {}\n\n\
         ⏰ {}",
        format_duration(data.uptime),
        add_thousand_separators(data.scan_cycles),
        add_thousand_separators(data.quotes_received),
        data.opportunities_found,
        data.alerts_sent,
        data.skipped_cycles,
        Utc::now().format("%H:%M:%S UTC")
    )
}

/// Formats any event into message text.
pub fn format_event(event: &Event) -> String {
    match &event.data {
        EventData::Alert(data) => format_alert(data),
        EventData::Error(data) => format_error(data),
        EventData::Startup(data) => format_startup(data),
        EventData::Shutdown(data) => format_shutdown(data),
        EventData::Summary(data) => format_summary(data),
    }
}

// === Helpers ===

/// Converts a pair to hashtag form ("BTC/USDT" -> "BTC\_USDT").
/// Underscore escaped for Telegram Markdown compatibility.
fn format_pair_tag(pair: &str) -> String {
    pair.replace('/', "\\_")
}

fn format_duration(d: Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{}s", secs)
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else if secs < 86400 {
        format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
    } else {
        format!("{}d {}h", secs / 86400, (secs % 86400) / 3600)
    }
}

fn add_thousand_separators(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}

#[cfg(test)]
#[path = "tests.rs"]
mod tests;

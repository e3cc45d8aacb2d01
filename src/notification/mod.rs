//! Notification stream.
//!
//! Events describe what happened (an alert-worthy opportunity, a lifecycle
//! transition, an error, a periodic summary); the [`Notifier`] trait hides
//! where they go. Telegram is the only production sink.

mod notifier;
mod telegram;

pub use notifier::{
    AlertData, ErrorData, Event, EventData, EventType, NoopNotifier, NotificationError, Notifier,
    ShutdownData, StartupData, SummaryData, format_event,
};
pub use telegram::{TelegramConfig, TelegramNotifier};

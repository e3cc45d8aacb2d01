//! Domain models for cross-exchange arbitrage monitoring.

mod exchange_id;
mod fees;
mod opportunity;
mod quote;
mod spread;

pub use exchange_id::ExchangeId;
pub use fees::FeeSchedule;
pub use opportunity::{DedupKey, Opportunity};
pub use quote::Quote;
pub use spread::Spread;

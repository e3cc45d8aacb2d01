//! Runtime statistics for the monitor.

/// Counters accumulated over the monitor's lifetime.
#[derive(Debug, Clone, Default)]
pub struct Stats {
    pub scan_cycles: u64,
    pub quotes_received: u64,
    pub opportunities_found: u64,
    pub alerts_sent: u64,
    pub skipped_cycles: u64,
}

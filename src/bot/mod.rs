//! Main monitor implementation.
//!
//! Coordinates the quote manager, the opportunity engine, storage and
//! notifications around a fixed-interval scan loop.

mod config;
mod error;
mod stats;

pub use config::BotConfig;
pub use error::BotError;
pub use stats::Stats;

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use tokio::sync::{Mutex, RwLock};
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use crate::config::Config;
use crate::domain::Opportunity;
use crate::engine::{Engine, EngineConfig};
use crate::exchanges::Manager;
use crate::notification::{
    AlertData, ErrorData, Event, Notifier, ShutdownData, StartupData, SummaryData, TelegramConfig,
    TelegramNotifier,
};
use crate::storage::{SqliteStorage, SqliteStorageConfig, Storage};

const DEFAULT_SUMMARY_INTERVAL: Duration = Duration::from_secs(3600);
const DEFAULT_DB_PATH: &str = "opportunities.db";

/// Monitor that drives the scan loop and fans cycle results out to the
/// storage, notification and dashboard streams.
pub struct Bot {
    cfg: Config,
    manager: Manager,
    // try_lock on this is the single-flight guard: a tick that fires while
    // the previous cycle still holds the engine is skipped, not queued.
    engine: Mutex<Engine>,
    storage: Option<Arc<dyn Storage>>,
    notifier: Option<Arc<dyn Notifier>>,

    scan_interval: Duration,
    summary_interval: Duration,

    // Runtime state
    version: String,
    build_time: String,
    started_at: Mutex<Option<Instant>>,
    running: Mutex<bool>,
    stats: Mutex<Stats>,

    // Dashboard read path: the ranked list from the last completed cycle.
    ranked: RwLock<Vec<Opportunity>>,
}

impl Bot {
    /// Creates a new monitor instance. Fails on any configuration the
    /// engine cannot safely run with.
    pub async fn new(cfg: BotConfig) -> Result<Self, BotError> {
        let app_config = cfg.app_config;
        let arbitrage = app_config.arbitrage.clone().unwrap_or_default();

        let engine_config = EngineConfig {
            min_profit_threshold: arbitrage
                .min_profit_threshold()
                .map_err(|e| BotError::Config(e.to_string()))?,
            alert_cooldown: arbitrage.alert_cooldown_or_default(),
            re_alert_delta_pct: arbitrage
                .re_alert_delta()
                .map_err(|e| BotError::Config(e.to_string()))?,
            top_n: arbitrage.top_n_or_default(),
            max_quote_age: arbitrage.max_quote_age,
        };

        let fees = app_config
            .fee_schedule()
            .map_err(|e| BotError::Config(e.to_string()))?;
        let engine = Engine::new(engine_config, fees);

        let manager = Manager::from_config(&app_config, arbitrage.fetch_timeout_or_default())
            .map_err(|e| BotError::Exchange(e.to_string()))?;

        let storage = Self::build_storage(&app_config).await?;
        let notifier = Self::build_notifier(&app_config);

        let summary_interval = app_config
            .notification
            .as_ref()
            .and_then(|n| n.telegram.as_ref())
            .map(|t| t.summary_interval)
            .filter(|d| !d.is_zero())
            .unwrap_or(DEFAULT_SUMMARY_INTERVAL);

        Ok(Bot {
            scan_interval: arbitrage.scan_interval_or_default(),
            summary_interval,
            cfg: app_config,
            manager,
            engine: Mutex::new(engine),
            storage,
            notifier,
            version: cfg.version,
            build_time: cfg.build_time,
            started_at: Mutex::new(None),
            running: Mutex::new(false),
            stats: Mutex::new(Stats::default()),
            ranked: RwLock::new(Vec::new()),
        })
    }

    async fn build_storage(config: &Config) -> Result<Option<Arc<dyn Storage>>, BotError> {
        let Some(ref storage_config) = config.storage else {
            return Ok(None);
        };
        if !storage_config.enabled {
            return Ok(None);
        }

        let path = storage_config
            .path
            .clone()
            .unwrap_or_else(|| DEFAULT_DB_PATH.to_string());

        let storage = SqliteStorage::new(SqliteStorageConfig {
            path,
            ..SqliteStorageConfig::default()
        })
        .await
        .map_err(|e| BotError::Storage(e.to_string()))?;

        Ok(Some(Arc::new(storage)))
    }

    fn build_notifier(config: &Config) -> Option<Arc<dyn Notifier>> {
        let telegram = config.notification.as_ref()?.telegram.as_ref()?;
        if !telegram.enabled || telegram.bot_token.is_empty() || telegram.chat_id.is_empty() {
            return None;
        }

        let mut telegram_config =
            TelegramConfig::new(telegram.bot_token.clone(), telegram.chat_id.clone());
        telegram_config.notify_alerts = telegram.notify_opportunities;
        telegram_config.notify_errors = telegram.notify_errors;
        telegram_config.notify_summary = telegram.notify_summary;
        if !telegram.error_chat_id.is_empty() {
            telegram_config = telegram_config.with_error_chat_id(telegram.error_chat_id.clone());
        }

        match TelegramNotifier::new(telegram_config) {
            Ok(notifier) => {
                info!("Telegram notifier created");
                Some(Arc::new(notifier))
            }
            Err(e) => {
                warn!(error = %e, "Failed to create Telegram notifier");
                None
            }
        }
    }

    /// Starts the monitor and begins scanning.
    pub async fn start(&self) -> Result<(), BotError> {
        {
            let mut running = self.running.lock().await;
            if *running {
                return Err(BotError::AlreadyRunning);
            }
            *running = true;
        }

        {
            let mut started_at = self.started_at.lock().await;
            *started_at = Some(Instant::now());
        }

        let exchanges: Vec<String> = self
            .manager
            .exchanges()
            .iter()
            .map(|id| id.to_string())
            .collect();

        info!(
            version = %self.version,
            build_time = %self.build_time,
            exchanges = ?exchanges,
            pairs = ?self.cfg.pairs,
            "Starting arbitrage monitor"
        );

        self.send_notification(Event::startup(StartupData {
            version: self.version.clone(),
            exchanges,
            pairs: self.cfg.pairs.clone(),
        }))
        .await;

        self.run_main_loop().await
    }

    /// Gracefully stops the monitor.
    pub async fn stop(&self) -> Result<(), BotError> {
        {
            let mut running = self.running.lock().await;
            if !*running {
                return Ok(());
            }
            *running = false;
        }

        info!("Stopping monitor...");

        let uptime = self.uptime().await;

        self.send_notification(Event::shutdown(ShutdownData {
            reason: "graceful shutdown".to_string(),
            uptime,
            graceful: true,
        }))
        .await;

        if let Some(ref notifier) = self.notifier {
            let _ = notifier.close().await;
        }

        if let Some(ref storage) = self.storage {
            match storage.count().await {
                Ok(total) => info!(total, "Opportunities persisted over this run"),
                Err(e) => warn!(error = %e, "Failed to read opportunity count"),
            }
            if let Err(e) = storage.close().await {
                warn!(error = %e, "Failed to close storage");
            }
        }

        info!(uptime = ?uptime, "Monitor stopped");

        Ok(())
    }

    /// Returns a copy of the current statistics.
    pub async fn stats(&self) -> Stats {
        self.stats.lock().await.clone()
    }

    /// Returns true if the monitor is currently running.
    pub async fn is_running(&self) -> bool {
        *self.running.lock().await
    }

    /// Returns how long the monitor has been running.
    pub async fn uptime(&self) -> Duration {
        self.started_at
            .lock()
            .await
            .map(|s| s.elapsed())
            .unwrap_or(Duration::ZERO)
    }

    /// The ranked opportunity list from the last completed cycle,
    /// newest data first. This is the dashboard read path.
    pub async fn top_opportunities(&self) -> Vec<Opportunity> {
        self.ranked.read().await.clone()
    }

    /// Main scan loop.
    async fn run_main_loop(&self) -> Result<(), BotError> {
        let mut scan_timer = tokio::time::interval(self.scan_interval);
        scan_timer.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut summary_timer = tokio::time::interval(self.summary_interval);
        // The first tick of a tokio interval fires immediately; a summary
        // of all-zero stats is noise.
        summary_timer.tick().await;

        info!(
            scan_interval = ?self.scan_interval,
            summary_interval = ?self.summary_interval,
            "Starting scan loop"
        );

        loop {
            tokio::select! {
                _ = scan_timer.tick() => {
                    if !self.is_running().await {
                        break;
                    }
                    self.scan_cycle().await;
                }
                _ = summary_timer.tick() => {
                    if !self.is_running().await {
                        break;
                    }
                    self.send_summary().await;
                }
            }
        }

        Ok(())
    }

    /// Runs one scan cycle: fetch, compute, persist, alert, publish.
    async fn scan_cycle(&self) {
        // Single-flight: if the previous cycle is still computing, this tick
        // is dropped rather than queued behind it.
        let Ok(mut engine) = self.engine.try_lock() else {
            let mut stats = self.stats.lock().await;
            stats.skipped_cycles += 1;
            warn!("Previous cycle still in progress, skipping tick");
            return;
        };

        let cycle = {
            let mut stats = self.stats.lock().await;
            stats.scan_cycles += 1;
            stats.scan_cycles
        };

        let quotes = self.manager.fetch_all(&self.cfg.pairs).await;

        {
            let mut stats = self.stats.lock().await;
            stats.quotes_received += quotes.len() as u64;
        }

        if let Some(ref storage) = self.storage {
            if let Err(e) = storage.save_quotes(&quotes).await {
                warn!(error = %e, "Failed to persist quotes");
                self.send_error("storage", "Failed to persist quotes", &e.to_string());
            }
        }

        let output = engine.run_cycle(quotes, Utc::now());
        let dedup_keys = engine.dedup_len();
        drop(engine);

        {
            let mut stats = self.stats.lock().await;
            stats.opportunities_found += output.opportunities.len() as u64;
            stats.alerts_sent += output.alerts.len() as u64;
        }

        if let Some(ref storage) = self.storage {
            for opp in &output.opportunities {
                if let Err(e) = storage.save_opportunity(opp).await {
                    warn!(
                        symbol = %opp.symbol,
                        error = %e,
                        "Failed to persist opportunity"
                    );
                }
            }
        }

        if let Some(ref notifier) = self.notifier {
            for alert in &output.alerts {
                notifier.send_async(Event::alert(AlertData {
                    pair: alert.symbol.clone(),
                    buy_exchange: alert.buy_exchange,
                    sell_exchange: alert.sell_exchange,
                    buy_price: alert.buy_price,
                    sell_price: alert.sell_price,
                    gross_diff_pct: alert.gross_diff_pct,
                    net_profit_pct: alert.net_profit_pct,
                    detected_at: alert.detected_at,
                }));
            }
        }

        {
            let mut ranked = self.ranked.write().await;
            *ranked = output.ranked;
        }

        info!(
            cycle,
            opportunities = output.opportunities.len(),
            alerts = output.alerts.len(),
            dedup_keys,
            "Scan cycle completed"
        );
    }

    /// Sends a notification event if a notifier is configured.
    async fn send_notification(&self, event: Event) {
        if let Some(ref notifier) = self.notifier {
            if let Err(e) = notifier.send(&event).await {
                warn!(
                    event_type = %event.event_type,
                    error = %e,
                    "Failed to send notification"
                );
            }
        }
    }

    /// Queues an error event without blocking the cycle.
    fn send_error(&self, component: &str, message: &str, error: &str) {
        if let Some(ref notifier) = self.notifier {
            notifier.send_async(Event::error(ErrorData {
                component: component.to_string(),
                message: message.to_string(),
                error: Some(error.to_string()),
            }));
        }
    }

    /// Sends a periodic summary notification with current stats.
    async fn send_summary(&self) {
        let stats = self.stats().await;
        let uptime = self.uptime().await;

        self.send_notification(Event::summary(SummaryData {
            uptime,
            scan_cycles: stats.scan_cycles,
            quotes_received: stats.quotes_received,
            opportunities_found: stats.opportunities_found,
            alerts_sent: stats.alerts_sent,
            skipped_cycles: stats.skipped_cycles,
        }))
        .await;
    }
}

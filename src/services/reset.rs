//! Midnight reset
//!
//! Background poller that clears the completion tracker when the local
//! calendar date rolls over. A date change is the rising edge: the reset
//! fires exactly once per crossing, never again while the clock stays
//! within the same day. A startup catch-up against the persisted last-open
//! date covers crossings that happened while the process was not running.

use crate::config::{LAST_OPEN_DATE_FORMAT, LAST_OPEN_DATE_KEY, RESET_POLL_INTERVAL_SECS};
use crate::services::CompletionTracker;
use crate::storage::KeyValueStore;
use chrono::{Local, NaiveDate};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// Source of the local calendar date.
///
/// The reset logic consumes only dates; production code injects
/// [`SystemClock`], tests inject a manual clock to simulate the
/// 23:59 to 00:00 crossing deterministically.
pub trait Clock: Send + Sync {
    /// Current local calendar date
    fn today(&self) -> NaiveDate;
}

/// Production clock reading the system's local wall-clock date
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Midnight reset service with background poller
#[derive(Clone)]
pub struct MidnightResetService {
    tracker: Arc<Mutex<CompletionTracker>>,
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    last_seen: Arc<Mutex<NaiveDate>>,
}

impl MidnightResetService {
    pub fn new(
        tracker: Arc<Mutex<CompletionTracker>>,
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let today = clock.today();
        Self {
            tracker,
            store,
            clock,
            last_seen: Arc::new(Mutex::new(today)),
        }
    }

    /// Startup check: if the persisted last-open date differs from today,
    /// the process was not running at midnight and the tracker is cleared
    /// now. Always records today as the new last-open date. All failures
    /// are logged and contained.
    pub async fn catch_up(&self) {
        let today = self.clock.today();

        match self.store.get(LAST_OPEN_DATE_KEY).await {
            Ok(Some(raw)) => match NaiveDate::parse_from_str(raw.trim(), LAST_OPEN_DATE_FORMAT) {
                Ok(last_open) if last_open != today => {
                    let mut tracker = self.tracker.lock().await;
                    let cleared = tracker.len();
                    tracker.reset_all();
                    tracing::info!(
                        "Last open on {}, clearing {} stale completion marks",
                        last_open,
                        cleared
                    );
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!("Unparseable last-open date {:?}: {}", raw, e);
                }
            },
            Ok(None) => {
                tracing::info!("No last-open date recorded, first launch");
            }
            Err(e) => {
                tracing::error!("Failed to read last-open date: {}", e);
            }
        }

        *self.last_seen.lock().await = today;
        self.persist_date(today).await;
    }

    /// Start the background poller
    pub fn start(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            tracing::info!("Starting midnight reset poller");

            let mut interval =
                tokio::time::interval(tokio::time::Duration::from_secs(RESET_POLL_INTERVAL_SECS));

            loop {
                interval.tick().await;
                self.observe_tick().await;
            }
        })
    }

    /// Evaluate one poll tick against the clock
    async fn observe_tick(&self) {
        let today = self.clock.today();

        let mut last_seen = self.last_seen.lock().await;
        if today == *last_seen {
            return;
        }
        *last_seen = today;

        let mut tracker = self.tracker.lock().await;
        let cleared = tracker.len();
        tracker.reset_all();
        drop(tracker);

        tracing::info!(
            "Midnight rollover to {}: cleared {} completion marks",
            today,
            cleared
        );

        self.persist_date(today).await;
    }

    /// Record the given date as the last-open date, log-only on failure
    async fn persist_date(&self, date: NaiveDate) {
        let value = date.format(LAST_OPEN_DATE_FORMAT).to_string();

        if let Err(e) = self.store.set(LAST_OPEN_DATE_KEY, &value).await {
            tracing::error!("Failed to persist last-open date: {}", e);
        }
    }
}

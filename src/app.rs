//! Application facade and bootstrap
//!
//! Owns all services and exposes the contract the presentation layer
//! calls: add, toggle, two-step delete, snapshot, reminder registration.
//! Bootstrap rehydrates the habit list from the store, migrates legacy
//! completion marks, runs the startup catch-up reset, and starts the
//! midnight poller, in that order, before the first snapshot is served.

use crate::error::Result;
use crate::models::{Habit, HabitId, HabitSnapshot};
use crate::services::{
    Clock, CompletionTracker, HabitService, MidnightResetService, NotificationPort,
    ReminderConfig, ReminderService, SystemClock,
};
use crate::storage::KeyValueStore;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use uuid::Uuid;

/// Opaque confirmation token handed out by [`HabitApp::request_delete`]
pub type DeleteToken = Uuid;

/// Central application state holding all services
pub struct HabitApp {
    habits: HabitService,
    tracker: Arc<Mutex<CompletionTracker>>,
    reminders: ReminderService,
    pending_deletes: Mutex<HashMap<DeleteToken, HabitId>>,
    reset_task: JoinHandle<()>,
}

impl HabitApp {
    /// Bootstrap the core over the given store and notification port
    pub async fn bootstrap(
        store: Arc<dyn KeyValueStore>,
        notifications: Arc<dyn NotificationPort>,
    ) -> Result<Self> {
        Self::bootstrap_with_clock(store, notifications, Arc::new(SystemClock)).await
    }

    /// Bootstrap with an injected clock (tests simulate date rollovers)
    pub async fn bootstrap_with_clock(
        store: Arc<dyn KeyValueStore>,
        notifications: Arc<dyn NotificationPort>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        tracing::info!("Initializing habit core");

        let habits = HabitService::new(store.clone());
        let migrated = habits.load().await;

        let tracker = Arc::new(Mutex::new(CompletionTracker::new()));
        {
            let mut tracker = tracker.lock().await;
            for id in migrated {
                tracker.mark_completed(id);
            }
        }

        let reset = MidnightResetService::new(tracker.clone(), store, clock);
        reset.catch_up().await;
        let reset_task = reset.start();

        let reminders = ReminderService::new(notifications).await?;
        reminders.start().await?;

        tracing::info!("Habit core initialized");

        Ok(Self {
            habits,
            tracker,
            reminders,
            pending_deletes: Mutex::new(HashMap::new()),
            reset_task,
        })
    }

    /// Add a habit; empty or whitespace-only text is a silent no-op
    pub async fn add_habit(&self, text: &str) -> Option<Habit> {
        self.habits.add(text).await
    }

    /// Flip today's completion mark for the habit, returning the new state
    pub async fn toggle_habit(&self, id: HabitId) -> bool {
        if !self.habits.contains(id).await {
            tracing::debug!("Toggle of absent habit {} is a no-op", id);
            return false;
        }

        let mut tracker = self.tracker.lock().await;
        tracker.toggle(id)
    }

    /// First step of deletion: returns a confirmation token, or `None` if
    /// the habit does not exist. Nothing is deleted until the presentation
    /// layer's confirmation flow resolves the token.
    pub async fn request_delete(&self, id: HabitId) -> Option<DeleteToken> {
        if !self.habits.contains(id).await {
            tracing::debug!("Delete requested for absent habit {}", id);
            return None;
        }

        let token = Uuid::new_v4();
        self.pending_deletes.lock().await.insert(token, id);

        tracing::info!("Delete of habit {} pending confirmation", id);

        Some(token)
    }

    /// Resolve a pending deletion affirmatively. Unknown or already
    /// consumed tokens are a no-op returning `false`.
    pub async fn confirm_delete(&self, token: DeleteToken) -> bool {
        let id = match self.pending_deletes.lock().await.remove(&token) {
            Some(id) => id,
            None => {
                tracing::debug!("Unknown delete confirmation token {}", token);
                return false;
            }
        };

        let removed = self.habits.remove(id).await;
        if removed {
            self.tracker.lock().await.forget(id);
        }

        removed
    }

    /// Abandon a pending deletion
    pub async fn cancel_delete(&self, token: DeleteToken) -> bool {
        self.pending_deletes.lock().await.remove(&token).is_some()
    }

    /// Ordered snapshot of the list with today's completion marks
    pub async fn get_snapshot(&self) -> Vec<HabitSnapshot> {
        let habits = self.habits.list().await;
        let tracker = self.tracker.lock().await;

        habits
            .into_iter()
            .map(|habit| HabitSnapshot {
                id: habit.id,
                completed_today: tracker.is_completed(habit.id),
                text: habit.text,
            })
            .collect()
    }

    /// Idempotently register the daily reminder; `Ok(false)` means
    /// notification permission is missing and the reminder is inactive
    pub async fn ensure_daily_reminder(&self, config: ReminderConfig) -> Result<bool> {
        self.reminders.ensure_daily_reminder(config).await
    }

    /// Tear down background activity on process exit
    pub async fn shutdown(&self) {
        tracing::info!("Shutting down habit core");

        self.reset_task.abort();

        if let Err(e) = self.reminders.shutdown().await {
            tracing::error!("Failed to shutdown reminder scheduler: {}", e);
        }
    }
}

/// Initialize logging for the host process. Call once before bootstrap.
pub fn init_logging() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "habitkeep=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    struct GrantedPort;

    impl NotificationPort for GrantedPort {
        fn permission_granted(&self) -> bool {
            true
        }

        fn notify(&self, _title: &str, _body: &str, _sound: bool) -> Result<()> {
            Ok(())
        }
    }

    async fn create_test_app() -> HabitApp {
        let store = Arc::new(MemoryStore::new());
        HabitApp::bootstrap(store, Arc::new(GrantedPort))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_toggle_reflects_in_snapshot() {
        let app = create_test_app().await;

        let habit = app.add_habit("Drink water").await.unwrap();

        assert!(app.toggle_habit(habit.id).await);
        let snapshot = app.get_snapshot().await;
        assert!(snapshot[0].completed_today);

        assert!(!app.toggle_habit(habit.id).await);
        let snapshot = app.get_snapshot().await;
        assert!(!snapshot[0].completed_today);
    }

    #[tokio::test]
    async fn test_toggle_absent_habit_is_noop() {
        let app = create_test_app().await;

        assert!(!app.toggle_habit(999).await);
        assert!(app.get_snapshot().await.is_empty());
    }

    #[tokio::test]
    async fn test_delete_requires_confirmation() {
        let app = create_test_app().await;

        let habit = app.add_habit("Read").await.unwrap();
        let token = app.request_delete(habit.id).await.unwrap();

        // Nothing deleted yet.
        assert_eq!(app.get_snapshot().await.len(), 1);

        assert!(app.confirm_delete(token).await);
        assert!(app.get_snapshot().await.is_empty());

        // A consumed token is gone.
        assert!(!app.confirm_delete(token).await);
    }

    #[tokio::test]
    async fn test_cancel_delete_keeps_habit() {
        let app = create_test_app().await;

        let habit = app.add_habit("Read").await.unwrap();
        let token = app.request_delete(habit.id).await.unwrap();

        assert!(app.cancel_delete(token).await);
        assert_eq!(app.get_snapshot().await.len(), 1);

        // The cancelled token cannot be used to delete after all.
        assert!(!app.confirm_delete(token).await);
        assert_eq!(app.get_snapshot().await.len(), 1);
    }

    #[tokio::test]
    async fn test_request_delete_absent_habit() {
        let app = create_test_app().await;

        assert!(app.request_delete(42).await.is_none());
    }

    #[tokio::test]
    async fn test_deleting_completed_habit_drops_its_mark() {
        let app = create_test_app().await;

        let a = app.add_habit("A").await.unwrap();
        let b = app.add_habit("B").await.unwrap();
        app.toggle_habit(a.id).await;
        app.toggle_habit(b.id).await;

        let token = app.request_delete(a.id).await.unwrap();
        app.confirm_delete(token).await;

        let snapshot = app.get_snapshot().await;
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].id, b.id);
        assert!(snapshot[0].completed_today);
        assert_eq!(app.tracker.lock().await.len(), 1);
    }
}

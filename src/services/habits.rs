//! Habit list service
//!
//! The habit list model: an ordered in-memory sequence of habits that is
//! the single source of truth for the session. Every mutation writes the
//! full list back to the persistent store; the store is only read once, at
//! startup, before any mutation path is reachable.

use crate::config::{HABITS_KEY, MAX_HABIT_TEXT_LENGTH};
use crate::models::{Habit, HabitId};
use crate::storage::KeyValueStore;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Mutex;

struct ListState {
    habits: Vec<Habit>,
    next_id: HabitId,
}

/// Service owning the canonical habit list
#[derive(Clone)]
pub struct HabitService {
    store: Arc<dyn KeyValueStore>,
    state: Arc<Mutex<ListState>>,
}

impl HabitService {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            state: Arc::new(Mutex::new(ListState {
                habits: Vec::new(),
                next_id: 1,
            })),
        }
    }

    /// Rehydrate the list from the store.
    ///
    /// An absent key yields the empty list. A corrupt payload leaves the
    /// model at its prior value and is logged, never surfaced to the user.
    /// Returns the ids of records whose legacy `isChecked` flag was set,
    /// so the caller can seed the completion tracker; the flag itself is
    /// cleared and no longer written as `true`.
    pub async fn load(&self) -> Vec<HabitId> {
        let raw = match self.store.get(HABITS_KEY).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                tracing::info!("No persisted habit list, starting empty");
                return Vec::new();
            }
            Err(e) => {
                tracing::error!("Failed to read habit list from store: {}", e);
                return Vec::new();
            }
        };

        let mut habits: Vec<Habit> = match serde_json::from_str(&raw) {
            Ok(habits) => habits,
            Err(e) => {
                tracing::error!("Failed to deserialize habit list, keeping prior state: {}", e);
                return Vec::new();
            }
        };

        // At most one record per id; keep the first occurrence.
        let mut seen = HashSet::new();
        habits.retain(|habit| seen.insert(habit.id));

        let mut migrated = Vec::new();
        for habit in &mut habits {
            if habit.is_checked {
                migrated.push(habit.id);
                habit.is_checked = false;
            }
        }

        let next_id = habits.iter().map(|h| h.id).max().unwrap_or(0) + 1;

        let mut state = self.state.lock().await;
        state.habits = habits;
        state.next_id = next_id;

        tracing::info!(
            "Loaded {} habits ({} with legacy completion marks)",
            state.habits.len(),
            migrated.len()
        );

        migrated
    }

    /// Add a habit with the given label.
    ///
    /// Empty or whitespace-only input is silently rejected, as is input
    /// over the length bound. Returns the new record on success.
    pub async fn add(&self, text: &str) -> Option<Habit> {
        let trimmed = text.trim();

        if trimmed.is_empty() {
            tracing::debug!("Rejecting empty habit text");
            return None;
        }

        if trimmed.chars().count() > MAX_HABIT_TEXT_LENGTH {
            tracing::debug!("Rejecting over-long habit text ({} chars)", trimmed.chars().count());
            return None;
        }

        let mut state = self.state.lock().await;

        let habit = Habit::new(state.next_id, trimmed.to_string());
        state.next_id += 1;
        state.habits.push(habit.clone());

        tracing::info!("Added habit {}: {}", habit.id, habit.text);

        self.persist(&state.habits).await;

        Some(habit)
    }

    /// Remove the habit with the given id. Absent ids are a no-op, not an
    /// error; returns whether a record was removed.
    pub async fn remove(&self, id: HabitId) -> bool {
        let mut state = self.state.lock().await;

        let before = state.habits.len();
        state.habits.retain(|habit| habit.id != id);

        if state.habits.len() == before {
            tracing::debug!("Remove of absent habit {} is a no-op", id);
            return false;
        }

        tracing::info!("Removed habit {}", id);

        self.persist(&state.habits).await;

        true
    }

    /// Whether a habit with the given id exists
    pub async fn contains(&self, id: HabitId) -> bool {
        let state = self.state.lock().await;
        state.habits.iter().any(|habit| habit.id == id)
    }

    /// Cloned snapshot of the ordered list
    pub async fn list(&self) -> Vec<Habit> {
        let state = self.state.lock().await;
        state.habits.clone()
    }

    /// Write the full list through to the store.
    ///
    /// Failures are logged only: the in-memory state stays authoritative
    /// for the session, and the next successful mutation re-persists the
    /// full current state. Called with the state lock held so writes are
    /// issued in mutation order.
    async fn persist(&self, habits: &[Habit]) {
        let payload = match serde_json::to_string(habits) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::error!("Failed to serialize habit list: {}", e);
                return;
            }
        };

        if let Err(e) = self.store.set(HABITS_KEY, &payload).await {
            tracing::error!("Failed to persist habit list: {}", e);
        }
    }
}

//! Completion tracker
//!
//! In-memory set of habit ids marked done for the current day. This is the
//! authoritative "done today" state; it is never persisted, and it is
//! cleared in full at the midnight boundary. The owner serializes access,
//! so the tracker itself is plain synchronous data.

use crate::models::HabitId;
use std::collections::HashSet;

/// Set of habit ids completed today
#[derive(Debug, Default)]
pub struct CompletionTracker {
    completed: HashSet<HabitId>,
}

impl CompletionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip membership of `id`, returning the new state
    pub fn toggle(&mut self, id: HabitId) -> bool {
        if self.completed.remove(&id) {
            false
        } else {
            self.completed.insert(id);
            true
        }
    }

    /// Whether `id` is marked done today
    pub fn is_completed(&self, id: HabitId) -> bool {
        self.completed.contains(&id)
    }

    /// Mark `id` done without toggling. Only the load-time migration of
    /// legacy checked records uses this.
    pub fn mark_completed(&mut self, id: HabitId) {
        self.completed.insert(id);
    }

    /// Drop a mark when its habit is deleted
    pub fn forget(&mut self, id: HabitId) {
        self.completed.remove(&id);
    }

    /// Empty the set. Invoked by the midnight reset, never by user action.
    pub fn reset_all(&mut self) {
        self.completed.clear();
    }

    pub fn len(&self) -> usize {
        self.completed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.completed.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_marks_and_unmarks() {
        let mut tracker = CompletionTracker::new();

        assert!(tracker.toggle(1));
        assert!(tracker.is_completed(1));

        assert!(!tracker.toggle(1));
        assert!(!tracker.is_completed(1));
    }

    #[test]
    fn toggle_twice_restores_original_state() {
        let mut tracker = CompletionTracker::new();
        tracker.mark_completed(2);

        tracker.toggle(1);
        tracker.toggle(1);
        tracker.toggle(2);
        tracker.toggle(2);

        assert!(!tracker.is_completed(1));
        assert!(tracker.is_completed(2));
    }

    #[test]
    fn reset_all_empties_any_size() {
        let mut tracker = CompletionTracker::new();

        tracker.reset_all();
        assert!(tracker.is_empty());

        tracker.mark_completed(1);
        tracker.mark_completed(2);
        tracker.mark_completed(3);
        assert_eq!(tracker.len(), 3);

        tracker.reset_all();
        assert!(tracker.is_empty());
    }

    #[test]
    fn forget_drops_single_mark() {
        let mut tracker = CompletionTracker::new();
        tracker.mark_completed(1);
        tracker.mark_completed(2);

        tracker.forget(1);

        assert!(!tracker.is_completed(1));
        assert!(tracker.is_completed(2));
    }
}

//! Domain models
//!
//! Rust structs for the habit list and the snapshot rows served to the
//! presentation layer. All models use serde; `Habit` doubles as the wire
//! record of the persisted list format.

use serde::{Deserialize, Serialize};

/// Identifier of a habit, unique within the list and immutable once
/// assigned. Ids come from a monotonic counter, not the wall clock.
pub type HabitId = u64;

/// A single tracked habit
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Habit {
    pub id: HabitId,
    /// User-visible label, never empty in a stored record
    pub text: String,
    /// Legacy per-record completion flag. The completion tracker is the
    /// authoritative "done today" state; this field is only read back from
    /// snapshots written by earlier versions (migrated on load) and is
    /// written as `false` so those versions keep parsing the list.
    #[serde(default, rename = "isChecked")]
    pub is_checked: bool,
}

impl Habit {
    pub fn new(id: HabitId, text: String) -> Self {
        Self {
            id,
            text,
            is_checked: false,
        }
    }
}

/// One row of the presentation snapshot: the habit plus its membership in
/// the completion tracker at the time the snapshot was taken.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct HabitSnapshot {
    pub id: HabitId,
    pub text: String,
    pub completed_today: bool,
}

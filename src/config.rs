//! Application configuration constants
//!
//! Central location for store keys, scheduling cadences, and validation
//! boundaries used throughout the crate.

// ===== Persistent Store Keys =====

/// Key holding the serialized habit list (full-snapshot JSON array)
pub const HABITS_KEY: &str = "habits";

/// Key holding the last local date the app was open (`YYYY-MM-DD`)
pub const LAST_OPEN_DATE_KEY: &str = "last_open_date";

// ===== Habit Validation =====

/// Maximum length of a habit label in characters.
/// Longer input is rejected the same way empty input is.
pub const MAX_HABIT_TEXT_LENGTH: usize = 200;

// ===== Midnight Reset =====

/// Cadence of the midnight rollover check in seconds.
/// Must stay at or below 60 so the 00:00 minute is always observed.
pub const RESET_POLL_INTERVAL_SECS: u64 = 60;

/// Format of the persisted last-open date
pub const LAST_OPEN_DATE_FORMAT: &str = "%Y-%m-%d";

// ===== Reminder Defaults =====

/// Default local hour of the daily reminder (20:00)
pub const DEFAULT_REMINDER_HOUR: u32 = 20;

/// Default local minute of the daily reminder
pub const DEFAULT_REMINDER_MINUTE: u32 = 0;

/// Default title of the daily reminder notification
pub const DEFAULT_REMINDER_TITLE: &str = "Once a Day";

/// Default body of the daily reminder notification
pub const DEFAULT_REMINDER_BODY: &str = "Time to check off your habits for today.";

//! Services module
//!
//! Business logic services that coordinate between the facade and storage.

pub mod completion;
pub mod habits;
pub mod reminders;
pub mod reset;

pub use completion::CompletionTracker;
pub use habits::HabitService;
pub use reminders::{NotificationPort, ReminderConfig, ReminderService};
pub use reset::{Clock, MidnightResetService, SystemClock};

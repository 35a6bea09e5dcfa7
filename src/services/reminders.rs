//! Daily reminder scheduling
//!
//! Maintains exactly one recurring local notification per day through the
//! host platform's notification service. Re-registration is idempotent:
//! any previously scheduled job owned by this service is cancelled first,
//! so repeated calls (every app launch) never accumulate duplicate firings.

use crate::config::{
    DEFAULT_REMINDER_BODY, DEFAULT_REMINDER_HOUR, DEFAULT_REMINDER_MINUTE, DEFAULT_REMINDER_TITLE,
};
use crate::error::{AppError, Result};
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio_cron_scheduler::{Job, JobScheduler};
use uuid::Uuid;

/// Platform notification boundary, implemented by the host shell
pub trait NotificationPort: Send + Sync {
    /// Whether the user has granted notification permission
    fn permission_granted(&self) -> bool;

    /// Deliver a notification now
    fn notify(&self, title: &str, body: &str, sound: bool) -> Result<()>;
}

/// Configuration of the recurring daily reminder.
///
/// An explicit value passed per registration; there is no process-global
/// notification state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReminderConfig {
    /// Local hour of day, 0-23
    #[serde(default = "default_reminder_hour")]
    pub hour: u32,
    /// Local minute, 0-59
    #[serde(default = "default_reminder_minute")]
    pub minute: u32,
    #[serde(default = "default_reminder_title")]
    pub title: String,
    #[serde(default = "default_reminder_body")]
    pub body: String,
    /// Whether the notification plays a sound
    #[serde(default)]
    pub sound: bool,
}

fn default_reminder_hour() -> u32 {
    DEFAULT_REMINDER_HOUR
}

fn default_reminder_minute() -> u32 {
    DEFAULT_REMINDER_MINUTE
}

fn default_reminder_title() -> String {
    DEFAULT_REMINDER_TITLE.to_string()
}

fn default_reminder_body() -> String {
    DEFAULT_REMINDER_BODY.to_string()
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            hour: default_reminder_hour(),
            minute: default_reminder_minute(),
            title: default_reminder_title(),
            body: default_reminder_body(),
            sound: false,
        }
    }
}

impl ReminderConfig {
    fn validate(&self) -> Result<()> {
        if self.hour > 23 || self.minute > 59 {
            return Err(AppError::InvalidReminderTime {
                hour: self.hour,
                minute: self.minute,
            });
        }
        Ok(())
    }

    /// Convert to a six-field cron expression firing once daily
    fn to_cron(&self) -> String {
        format!("0 {} {} * * *", self.minute, self.hour)
    }
}

/// Scheduler service for the daily reminder notification
pub struct ReminderService {
    scheduler: Arc<RwLock<JobScheduler>>,
    port: Arc<dyn NotificationPort>,
    current_job_id: Arc<RwLock<Option<Uuid>>>,
}

impl ReminderService {
    /// Create a new reminder service over the given notification port
    pub async fn new(port: Arc<dyn NotificationPort>) -> Result<Self> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| AppError::Scheduler(format!("Failed to create scheduler: {}", e)))?;

        Ok(Self {
            scheduler: Arc::new(RwLock::new(scheduler)),
            port,
            current_job_id: Arc::new(RwLock::new(None)),
        })
    }

    /// Start the underlying job runner
    pub async fn start(&self) -> Result<()> {
        let scheduler = self.scheduler.read().await;
        scheduler
            .start()
            .await
            .map_err(|e| AppError::Scheduler(format!("Failed to start scheduler: {}", e)))?;
        tracing::info!("Reminder scheduler started");
        Ok(())
    }

    /// Idempotently establish the single recurring daily reminder.
    ///
    /// Any previously registered job is cancelled first. If notification
    /// permission has not been granted this is not an error: the reminder
    /// is simply not scheduled and `Ok(false)` is returned so the
    /// presentation layer can inform the user.
    pub async fn ensure_daily_reminder(&self, config: ReminderConfig) -> Result<bool> {
        config.validate()?;

        self.cancel_reminder().await?;

        if !self.port.permission_granted() {
            tracing::warn!("Notification permission not granted, daily reminder inactive");
            return Ok(false);
        }

        let cron_expr = config.to_cron();
        let port = Arc::clone(&self.port);
        let title = config.title.clone();
        let body = config.body.clone();
        let sound = config.sound;

        // The reminder fires in the host's local time zone.
        let job = Job::new_async_tz(cron_expr.clone(), Local, move |_uuid, _l| {
            let port = Arc::clone(&port);
            let title = title.clone();
            let body = body.clone();
            Box::pin(async move {
                tracing::info!("Delivering daily habit reminder");

                if let Err(e) = port.notify(&title, &body, sound) {
                    tracing::error!("Failed to deliver reminder notification: {}", e);
                }
            })
        })
        .map_err(|e| AppError::Scheduler(format!("Failed to create reminder job: {}", e)))?;

        let job_id = job.guid();

        let scheduler = self.scheduler.write().await;
        scheduler
            .add(job)
            .await
            .map_err(|e| AppError::Scheduler(format!("Failed to schedule reminder job: {}", e)))?;

        let mut current_job = self.current_job_id.write().await;
        *current_job = Some(job_id);

        tracing::info!(
            "Daily reminder scheduled at {:02}:{:02} local ({})",
            config.hour,
            config.minute,
            cron_expr
        );

        Ok(true)
    }

    /// Cancel the scheduled reminder, if any
    pub async fn cancel_reminder(&self) -> Result<()> {
        let mut current_job = self.current_job_id.write().await;

        if let Some(job_id) = *current_job {
            let scheduler = self.scheduler.write().await;
            scheduler
                .remove(&job_id)
                .await
                .map_err(|e| AppError::Scheduler(format!("Failed to remove reminder job: {}", e)))?;

            *current_job = None;
            tracing::info!("Cancelled existing daily reminder");
        }

        Ok(())
    }

    /// Id of the currently registered reminder job, if any
    pub async fn current_job(&self) -> Option<Uuid> {
        *self.current_job_id.read().await
    }

    /// Shutdown the job runner gracefully
    pub async fn shutdown(&self) -> Result<()> {
        let mut scheduler = self.scheduler.write().await;
        scheduler
            .shutdown()
            .await
            .map_err(|e| AppError::Scheduler(format!("Failed to shutdown scheduler: {}", e)))?;
        tracing::info!("Reminder scheduler shutdown");
        Ok(())
    }
}

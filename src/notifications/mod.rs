pub mod memory;
pub mod sqlite;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::Reminder;

pub use memory::MemoryScheduler;
pub use sqlite::SqliteScheduler;

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("Notification permission denied")]
    PermissionDenied,

    #[error("Scheduler failure: {0}")]
    Platform(String),

    #[error("Reminder store error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionState {
    Granted,
    Denied,
}

/// Rejects schedules the platform could not honour.
pub(crate) fn check_schedule(reminder: &Reminder) -> Result<(), SchedulerError> {
    if reminder.schedule.repeats && !reminder.schedule.is_recurring() {
        return Err(SchedulerError::Platform(
            "repeating reminder needs a period".to_string(),
        ));
    }
    Ok(())
}

/// Boundary to the platform's local notification service.
#[async_trait]
pub trait NotificationScheduler: Send + Sync {
    async fn request_permission(&self) -> Result<PermissionState, SchedulerError>;
    /// Scheduling an id that already exists replaces it.
    async fn schedule(&self, reminder: &Reminder) -> Result<(), SchedulerError>;
    /// Unknown ids are ignored.
    async fn cancel(&self, ids: &[i64]) -> Result<(), SchedulerError>;
    async fn list_pending(&self) -> Result<Vec<i64>, SchedulerError>;
    async fn list_delivered(&self) -> Result<Vec<i64>, SchedulerError>;
}

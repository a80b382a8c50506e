use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::clock::Clock;
use crate::models::Reminder;
use crate::notifications::{SchedulerError, SqliteScheduler};

/// Periodically fires due reminders from the persisted reminder table.
pub struct ReminderDispatcher {
    scheduler: Arc<SqliteScheduler>,
    clock: Arc<dyn Clock>,
    interval: Duration,
}

impl ReminderDispatcher {
    pub fn new(scheduler: Arc<SqliteScheduler>, clock: Arc<dyn Clock>, interval_secs: u64) -> Self {
        Self {
            scheduler,
            clock,
            interval: Duration::from_secs(interval_secs),
        }
    }

    /// Runs until the task is dropped or aborted.
    pub async fn start(self) {
        info!("Starting reminder dispatcher (interval: {:?})", self.interval);

        loop {
            tokio::time::sleep(self.interval).await;

            match self.tick().await {
                Ok(fired) => {
                    for reminder in fired {
                        info!("reminder {}: {} | {}", reminder.id, reminder.title, reminder.body);
                    }
                }
                Err(e) => {
                    warn!("Reminder dispatch failed: {:?}", e);
                }
            }
        }
    }

    pub async fn tick(&self) -> Result<Vec<Reminder>, SchedulerError> {
        self.scheduler.fire_due(self.clock.now()).await
    }
}

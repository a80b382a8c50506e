use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::{FromRow, SqlitePool};
use tracing::debug;

use crate::models::{Every, Reminder, ReminderSchedule};

use super::{NotificationScheduler, PermissionState, SchedulerError, check_schedule};

#[derive(Debug, FromRow)]
struct ReminderRow {
    id: i64,
    title: String,
    body: String,
    fire_at: NaiveDateTime,
    repeats: bool,
    every: Option<Every>,
    delivered_at: Option<NaiveDateTime>,
}

impl From<ReminderRow> for Reminder {
    fn from(row: ReminderRow) -> Self {
        Reminder {
            id: row.id,
            title: row.title,
            body: row.body,
            schedule: ReminderSchedule {
                at: row.fire_at,
                repeats: row.repeats,
                every: row.every,
            },
        }
    }
}

fn is_recurring(row: &ReminderRow) -> bool {
    row.repeats && row.every.is_some()
}

/// Reminders persisted next to the todos so they outlive the process.
///
/// A row is pending while it has a future fire time; once fired it is
/// delivered, and repeating rows are moved forward one period.
pub struct SqliteScheduler {
    db: SqlitePool,
    granted: AtomicBool,
}

impl SqliteScheduler {
    pub fn new(db: SqlitePool) -> Self {
        Self {
            db,
            granted: AtomicBool::new(false),
        }
    }

    async fn fetch_rows(&self) -> Result<Vec<ReminderRow>, SchedulerError> {
        let rows = sqlx::query_as::<_, ReminderRow>(
            "SELECT id, title, body, fire_at, repeats, every, delivered_at FROM reminders ORDER BY id",
        )
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    /// Fires every reminder whose fire time is at or before `now`.
    pub async fn fire_due(&self, now: NaiveDateTime) -> Result<Vec<Reminder>, SchedulerError> {
        let mut fired = Vec::new();

        for row in self.fetch_rows().await? {
            let is_pending = row.delivered_at.is_none() || is_recurring(&row);
            if !is_pending || row.fire_at > now {
                continue;
            }

            let reminder = Reminder::from(row);
            let next = reminder.schedule.next_after(reminder.schedule.at).map(|mut next| {
                // Skip periods missed while the host was not running.
                while next <= now {
                    next = reminder
                        .schedule
                        .next_after(next)
                        .unwrap_or(next + chrono::Duration::days(1));
                }
                next
            });

            sqlx::query("UPDATE reminders SET fire_at = ?, delivered_at = ? WHERE id = ?")
                .bind(next.unwrap_or(reminder.schedule.at))
                .bind(now)
                .bind(reminder.id)
                .execute(&self.db)
                .await?;

            debug!("reminder {} fired, next at {:?}", reminder.id, next);
            fired.push(reminder);
        }

        Ok(fired)
    }

    pub async fn find(&self, id: i64) -> Result<Option<Reminder>, SchedulerError> {
        let row = sqlx::query_as::<_, ReminderRow>(
            "SELECT id, title, body, fire_at, repeats, every, delivered_at FROM reminders WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(row.map(Reminder::from))
    }
}

#[async_trait]
impl NotificationScheduler for SqliteScheduler {
    async fn request_permission(&self) -> Result<PermissionState, SchedulerError> {
        self.granted.store(true, Ordering::SeqCst);
        Ok(PermissionState::Granted)
    }

    async fn schedule(&self, reminder: &Reminder) -> Result<(), SchedulerError> {
        if !self.granted.load(Ordering::SeqCst) {
            return Err(SchedulerError::PermissionDenied);
        }
        check_schedule(reminder)?;

        sqlx::query(
            r#"
            INSERT INTO reminders (id, title, body, fire_at, repeats, every, delivered_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, NULL)
            ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                body = excluded.body,
                fire_at = excluded.fire_at,
                repeats = excluded.repeats,
                every = excluded.every,
                delivered_at = NULL
            "#,
        )
        .bind(reminder.id)
        .bind(&reminder.title)
        .bind(&reminder.body)
        .bind(reminder.schedule.at)
        .bind(reminder.schedule.repeats)
        .bind(reminder.schedule.every)
        .execute(&self.db)
        .await?;

        Ok(())
    }

    async fn cancel(&self, ids: &[i64]) -> Result<(), SchedulerError> {
        for id in ids {
            sqlx::query("DELETE FROM reminders WHERE id = ?")
                .bind(id)
                .execute(&self.db)
                .await?;
        }
        Ok(())
    }

    async fn list_pending(&self) -> Result<Vec<i64>, SchedulerError> {
        Ok(self
            .fetch_rows()
            .await?
            .into_iter()
            .filter(|row| row.delivered_at.is_none() || is_recurring(row))
            .map(|row| row.id)
            .collect())
    }

    async fn list_delivered(&self) -> Result<Vec<i64>, SchedulerError> {
        Ok(self
            .fetch_rows()
            .await?
            .into_iter()
            .filter(|row| row.delivered_at.is_some())
            .map(|row| row.id)
            .collect())
    }
}

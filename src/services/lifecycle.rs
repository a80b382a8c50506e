use std::collections::BTreeSet;

use chrono::{Duration, NaiveDateTime, NaiveTime};
use tracing::{debug, info, warn};

use crate::models::todo::format_due;
use crate::models::{Reminder, ReminderSchedule, Status, Todo};
use crate::notifications::{NotificationScheduler, SchedulerError};

/// Keeps reminders in step with todo status: an urgent todo has exactly one
/// daily reminder keyed by its id, every other todo has none.
#[derive(Debug, Clone, Copy)]
pub struct ReminderPolicy {
    pub reminder_time: NaiveTime,
}

impl ReminderPolicy {
    pub fn new(reminder_time: NaiveTime) -> Self {
        Self { reminder_time }
    }

    /// Today at the reminder time if that is still ahead, else tomorrow.
    pub fn first_trigger(&self, now: NaiveDateTime) -> NaiveDateTime {
        let today = now.date().and_time(self.reminder_time);
        if now < today {
            today
        } else {
            today + Duration::days(1)
        }
    }

    pub fn reminder_for(&self, todo: &Todo, now: NaiveDateTime) -> Reminder {
        Reminder {
            id: todo.id,
            title: reminder_title(todo),
            body: todo.description.clone(),
            schedule: ReminderSchedule::daily_from(self.first_trigger(now)),
        }
    }

    /// Runs after a committed write. `todo` is the row as now stored, or
    /// `None` when it no longer exists. Failures are logged, never returned.
    pub async fn apply(
        &self,
        scheduler: &dyn NotificationScheduler,
        id: i64,
        todo: Option<&Todo>,
        now: NaiveDateTime,
    ) {
        if let Err(e) = cancel_existing(scheduler, id).await {
            warn!("failed to cancel reminder for todo {}: {}", id, e);
        }

        let Some(todo) = todo.filter(|t| t.status == Status::Urgent) else {
            return;
        };

        let reminder = self.reminder_for(todo, now);
        match scheduler.schedule(&reminder).await {
            Ok(()) => info!(
                "scheduled reminder for todo {} at {}",
                todo.id, reminder.schedule.at
            ),
            Err(e) => warn!("failed to schedule reminder for todo {}: {}", todo.id, e),
        }
    }
}

/// Title naming the todo and, when one is set, its due date.
pub fn reminder_title(todo: &Todo) -> String {
    match (todo.due(), todo.due_date.as_deref().map(str::trim)) {
        (Some(date), _) => format!("Urgent: {} (due {})", todo.name, format_due(date)),
        (None, Some(raw)) if !raw.is_empty() => format!("Urgent: {} (due {})", todo.name, raw),
        _ => format!("Urgent: {}", todo.name),
    }
}

/// Cancels the reminder bound to `id` if the scheduler knows about it.
pub async fn cancel_existing(
    scheduler: &dyn NotificationScheduler,
    id: i64,
) -> Result<(), SchedulerError> {
    let pending = scheduler.list_pending().await?;
    let delivered = scheduler.list_delivered().await?;

    if pending.contains(&id) || delivered.contains(&id) {
        scheduler.cancel(&[id]).await?;
        debug!("cancelled reminder for todo {}", id);
    }
    Ok(())
}

/// Cancels every pending or delivered reminder that is not bound to an
/// urgent todo. Returns the cancelled ids.
pub async fn reconcile(
    scheduler: &dyn NotificationScheduler,
    todos: &[Todo],
) -> Result<Vec<i64>, SchedulerError> {
    let urgent: BTreeSet<i64> = todos
        .iter()
        .filter(|t| t.status == Status::Urgent)
        .map(|t| t.id)
        .collect();

    let mut known: BTreeSet<i64> = scheduler.list_pending().await?.into_iter().collect();
    known.extend(scheduler.list_delivered().await?);

    let orphans: Vec<i64> = known.into_iter().filter(|id| !urgent.contains(id)).collect();
    if !orphans.is_empty() {
        scheduler.cancel(&orphans).await?;
        info!("cancelled {} orphaned reminders: {:?}", orphans.len(), orphans);
    }

    Ok(orphans)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::notifications::MemoryScheduler;

    fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, day)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn policy() -> ReminderPolicy {
        ReminderPolicy::new(NaiveTime::from_hms_opt(9, 0, 0).unwrap())
    }

    fn todo(id: i64, status: Status, due_date: Option<&str>) -> Todo {
        Todo {
            id,
            name: "Pay rent".to_string(),
            description: "transfer before noon".to_string(),
            due_date: due_date.map(str::to_string),
            completed_at: None,
            status,
        }
    }

    async fn granted() -> MemoryScheduler {
        let scheduler = MemoryScheduler::new();
        scheduler.request_permission().await.unwrap();
        scheduler
    }

    #[test]
    fn first_trigger_is_today_before_nine() {
        assert_eq!(policy().first_trigger(at(1, 8, 59)), at(1, 9, 0));
        assert_eq!(policy().first_trigger(at(1, 0, 0)), at(1, 9, 0));
    }

    #[test]
    fn first_trigger_is_tomorrow_from_nine_on() {
        assert_eq!(policy().first_trigger(at(1, 9, 0)), at(2, 9, 0));
        assert_eq!(policy().first_trigger(at(1, 23, 30)), at(2, 9, 0));

        let april_first = NaiveDate::from_ymd_opt(2025, 4, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        assert_eq!(policy().first_trigger(at(31, 12, 0)), april_first);
    }

    #[test]
    fn title_mentions_due_date_when_set() {
        assert_eq!(
            reminder_title(&todo(1, Status::Urgent, Some("2025-03-01"))),
            "Urgent: Pay rent (due 01/03/2025)"
        );
        assert_eq!(reminder_title(&todo(1, Status::Urgent, None)), "Urgent: Pay rent");
        assert_eq!(reminder_title(&todo(1, Status::Urgent, Some(""))), "Urgent: Pay rent");
    }

    #[test]
    fn reminder_repeats_daily_with_description_body() {
        let reminder = policy().reminder_for(&todo(7, Status::Urgent, None), at(1, 10, 0));
        assert_eq!(reminder.id, 7);
        assert_eq!(reminder.body, "transfer before noon");
        assert_eq!(reminder.schedule, ReminderSchedule::daily_from(at(2, 9, 0)));
    }

    #[tokio::test]
    async fn urgent_is_rescheduled_not_duplicated() {
        let scheduler = granted().await;
        let urgent = todo(1, Status::Urgent, None);

        policy().apply(&scheduler, 1, Some(&urgent), at(1, 8, 0)).await;
        policy().apply(&scheduler, 1, Some(&urgent), at(1, 10, 0)).await;

        assert_eq!(scheduler.active_count(1), 1);
        assert_eq!(scheduler.reminder(1).unwrap().schedule.at, at(2, 9, 0));
    }

    #[tokio::test]
    async fn leaving_urgent_cancels_reminder() {
        let scheduler = granted().await;
        policy()
            .apply(&scheduler, 1, Some(&todo(1, Status::Urgent, None)), at(1, 8, 0))
            .await;
        policy()
            .apply(&scheduler, 1, Some(&todo(1, Status::Completed, None)), at(1, 8, 5))
            .await;
        assert_eq!(scheduler.active_count(1), 0);

        policy()
            .apply(&scheduler, 1, Some(&todo(1, Status::Urgent, None)), at(1, 8, 10))
            .await;
        policy().apply(&scheduler, 1, None, at(1, 8, 15)).await;
        assert_eq!(scheduler.active_count(1), 0);
    }

    #[tokio::test]
    async fn permission_denial_is_not_fatal() {
        let scheduler = MemoryScheduler::denying();
        scheduler.request_permission().await.unwrap();

        policy()
            .apply(&scheduler, 1, Some(&todo(1, Status::Urgent, None)), at(1, 8, 0))
            .await;
        assert_eq!(scheduler.active_count(1), 0);
    }

    #[tokio::test]
    async fn reconcile_cancels_orphans_only() {
        let scheduler = granted().await;
        for id in [1, 2, 3] {
            let reminder = policy().reminder_for(&todo(id, Status::Urgent, None), at(1, 8, 0));
            scheduler.schedule(&reminder).await.unwrap();
        }
        scheduler.deliver(3);

        let todos = vec![
            todo(1, Status::Urgent, None),
            todo(2, Status::Completed, None),
        ];
        let cancelled = reconcile(&scheduler, &todos).await.unwrap();

        assert_eq!(cancelled, vec![2, 3]);
        assert_eq!(scheduler.list_pending().await.unwrap(), vec![1]);
        assert!(scheduler.list_delivered().await.unwrap().is_empty());
    }
}

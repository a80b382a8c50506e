use std::collections::{BTreeMap, BTreeSet};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::models::Reminder;

use super::{NotificationScheduler, PermissionState, SchedulerError, check_schedule};

#[derive(Default)]
struct Inner {
    granted: bool,
    pending: BTreeMap<i64, Reminder>,
    delivered: BTreeSet<i64>,
}

/// In-process scheduler. Nothing ever fires on its own; `deliver` marks a
/// reminder as shown.
pub struct MemoryScheduler {
    allow: bool,
    inner: Mutex<Inner>,
}

impl MemoryScheduler {
    pub fn new() -> Self {
        Self {
            allow: true,
            inner: Mutex::new(Inner::default()),
        }
    }

    /// A scheduler whose permission prompt is always refused.
    pub fn denying() -> Self {
        Self {
            allow: false,
            inner: Mutex::new(Inner::default()),
        }
    }

    pub fn deliver(&self, id: i64) -> bool {
        let mut inner = self.lock();
        if inner.pending.contains_key(&id) {
            inner.delivered.insert(id);
            true
        } else {
            false
        }
    }

    pub fn reminder(&self, id: i64) -> Option<Reminder> {
        self.lock().pending.get(&id).cloned()
    }

    /// Number of pending reminders bound to `id` (0 or 1).
    pub fn active_count(&self, id: i64) -> usize {
        usize::from(self.lock().pending.contains_key(&id))
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for MemoryScheduler {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NotificationScheduler for MemoryScheduler {
    async fn request_permission(&self) -> Result<PermissionState, SchedulerError> {
        let mut inner = self.lock();
        inner.granted = self.allow;
        Ok(if self.allow {
            PermissionState::Granted
        } else {
            PermissionState::Denied
        })
    }

    async fn schedule(&self, reminder: &Reminder) -> Result<(), SchedulerError> {
        let mut inner = self.lock();
        if !inner.granted {
            return Err(SchedulerError::PermissionDenied);
        }
        check_schedule(reminder)?;
        inner.delivered.remove(&reminder.id);
        inner.pending.insert(reminder.id, reminder.clone());
        Ok(())
    }

    async fn cancel(&self, ids: &[i64]) -> Result<(), SchedulerError> {
        let mut inner = self.lock();
        for id in ids {
            inner.pending.remove(id);
            inner.delivered.remove(id);
        }
        Ok(())
    }

    async fn list_pending(&self) -> Result<Vec<i64>, SchedulerError> {
        Ok(self.lock().pending.keys().copied().collect())
    }

    async fn list_delivered(&self) -> Result<Vec<i64>, SchedulerError> {
        Ok(self.lock().delivered.iter().copied().collect())
    }
}

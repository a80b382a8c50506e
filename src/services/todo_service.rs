use std::sync::Arc;

use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::clock::Clock;
use crate::db::repository;
use crate::error::AppError;
use crate::models::{NewTodoRequest, Todo, UpdateTodoRequest};
use crate::notifications::{NotificationScheduler, PermissionState};
use crate::services::lifecycle::{self, ReminderPolicy};

pub const EMPTY_NAME_MESSAGE: &str = "Please enter a name for the task.";

/// Write, then reconcile the todo's reminder, then list again.
///
/// Every mutation returns the full list as re-read from the store.
pub struct TodoService {
    db: SqlitePool,
    scheduler: Arc<dyn NotificationScheduler>,
    clock: Arc<dyn Clock>,
    policy: ReminderPolicy,
}

impl TodoService {
    pub fn new(
        db: SqlitePool,
        scheduler: Arc<dyn NotificationScheduler>,
        clock: Arc<dyn Clock>,
        policy: ReminderPolicy,
    ) -> Self {
        Self {
            db,
            scheduler,
            clock,
            policy,
        }
    }

    pub async fn list(&self) -> Result<Vec<Todo>, AppError> {
        Ok(repository::fetch_todos(&self.db).await?)
    }

    pub async fn create(&self, req: NewTodoRequest) -> Result<Vec<Todo>, AppError> {
        if req.name.trim().is_empty() {
            return Err(AppError::Validation(EMPTY_NAME_MESSAGE.to_string()));
        }

        let todo = repository::insert_todo(&self.db, req).await?;
        info!("created todo {} ({})", todo.id, todo.name);
        self.list().await
    }

    pub async fn update(&self, id: i64, req: UpdateTodoRequest) -> Result<Vec<Todo>, AppError> {
        if !repository::update_todo(&self.db, id, req).await? {
            info!("update skipped, todo {} does not exist", id);
        }
        self.after_status_change(id).await?;
        self.list().await
    }

    pub async fn mark_complete(&self, id: i64) -> Result<Vec<Todo>, AppError> {
        if !repository::complete_todo(&self.db, id).await? {
            info!("complete skipped, todo {} does not exist", id);
        }
        self.after_status_change(id).await?;
        self.list().await
    }

    pub async fn delete(&self, id: i64) -> Result<Vec<Todo>, AppError> {
        repository::delete_todo(&self.db, id).await?;
        self.policy
            .apply(self.scheduler.as_ref(), id, None, self.clock.now())
            .await;
        self.list().await
    }

    /// Reminders of cleared todos are left to the startup sweep.
    pub async fn clear_finished(&self) -> Result<Vec<Todo>, AppError> {
        let removed = repository::clear_finished(&self.db).await?;
        info!("cleared {} finished todos", removed);
        self.list().await
    }

    /// Startup: ask for notification permission, then drop reminders whose
    /// todo is gone or no longer urgent. Scheduler failures are logged only.
    pub async fn start(&self) -> Result<Vec<Todo>, AppError> {
        match self.scheduler.request_permission().await {
            Ok(PermissionState::Granted) => info!("notification permission granted"),
            Ok(PermissionState::Denied) => warn!("notification permission denied"),
            Err(e) => warn!("notification permission request failed: {}", e),
        }

        let todos = self.list().await?;
        if let Err(e) = lifecycle::reconcile(self.scheduler.as_ref(), &todos).await {
            warn!("reminder reconciliation failed: {}", e);
        }
        Ok(todos)
    }

    async fn after_status_change(&self, id: i64) -> Result<(), AppError> {
        let todo = repository::find_todo_by_id(&self.db, id).await?;
        self.policy
            .apply(self.scheduler.as_ref(), id, todo.as_ref(), self.clock.now())
            .await;
        Ok(())
    }
}

use std::sync::Arc;

use sqlx::SqlitePool;
use tracing::{error, info};

use crate::board::{self, BoardState, Group, GroupKey};
use crate::clock::Clock;
use crate::error::AppError;
use crate::models::{NewTodoRequest, Todo, UpdateTodoRequest};
use crate::notifications::NotificationScheduler;
use crate::services::{ReminderPolicy, TodoService};

/// State owned by the presentation layer: the store handle once opened, the
/// todos as last read from it, and which board groups are folded.
pub struct AppState {
    db: Option<SqlitePool>,
    scheduler: Arc<dyn NotificationScheduler>,
    clock: Arc<dyn Clock>,
    policy: ReminderPolicy,
    todos: Vec<Todo>,
    board: BoardState,
}

impl AppState {
    pub fn new(
        scheduler: Arc<dyn NotificationScheduler>,
        clock: Arc<dyn Clock>,
        policy: ReminderPolicy,
    ) -> Self {
        Self {
            db: None,
            scheduler,
            clock,
            policy,
            todos: Vec::new(),
            board: BoardState::default(),
        }
    }

    pub fn connect(&mut self, db: SqlitePool) {
        self.db = Some(db);
    }

    pub fn todos(&self) -> &[Todo] {
        &self.todos
    }

    fn service(&self) -> Result<TodoService, AppError> {
        let db = self.db.clone().ok_or(AppError::StoreUnavailable)?;
        Ok(TodoService::new(
            db,
            self.scheduler.clone(),
            self.clock.clone(),
            self.policy,
        ))
    }

    /// Replaces the held list on success; leaves it untouched on failure.
    fn settle(&mut self, result: Result<Vec<Todo>, AppError>) -> Result<(), AppError> {
        match result {
            Ok(todos) => {
                self.todos = todos;
                Ok(())
            }
            Err(e) => {
                match &e {
                    AppError::Validation(msg) => info!("validation rejected: {}", msg),
                    _ => error!("todo operation failed: {}", e),
                }
                Err(e)
            }
        }
    }

    pub async fn start(&mut self) -> Result<(), AppError> {
        let result = match self.service() {
            Ok(service) => service.start().await,
            Err(e) => Err(e),
        };
        self.settle(result)?;
        info!("loaded {} todos", self.todos.len());
        Ok(())
    }

    pub async fn refresh(&mut self) -> Result<(), AppError> {
        let result = match self.service() {
            Ok(service) => service.list().await,
            Err(e) => Err(e),
        };
        self.settle(result)
    }

    pub async fn add_todo(&mut self, req: NewTodoRequest) -> Result<(), AppError> {
        let result = match self.service() {
            Ok(service) => service.create(req).await,
            Err(e) => Err(e),
        };
        self.settle(result)
    }

    pub async fn update_todo(&mut self, id: i64, req: UpdateTodoRequest) -> Result<(), AppError> {
        let result = match self.service() {
            Ok(service) => service.update(id, req).await,
            Err(e) => Err(e),
        };
        self.settle(result)
    }

    pub async fn complete_todo(&mut self, id: i64) -> Result<(), AppError> {
        let result = match self.service() {
            Ok(service) => service.mark_complete(id).await,
            Err(e) => Err(e),
        };
        self.settle(result)
    }

    pub async fn delete_todo(&mut self, id: i64) -> Result<(), AppError> {
        let result = match self.service() {
            Ok(service) => service.delete(id).await,
            Err(e) => Err(e),
        };
        self.settle(result)
    }

    pub async fn clear_finished(&mut self) -> Result<(), AppError> {
        let result = match self.service() {
            Ok(service) => service.clear_finished().await,
            Err(e) => Err(e),
        };
        self.settle(result)
    }

    pub fn board(&self) -> Vec<Group> {
        board::group_todos(&self.todos)
    }

    pub fn toggle_group(&mut self, key: &GroupKey) -> bool {
        self.board.toggle(key)
    }

    pub fn is_collapsed(&self, key: &GroupKey) -> bool {
        self.board.is_collapsed(key)
    }
}

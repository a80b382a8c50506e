use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::error::AppError;

const DUE_DATE_FORMAT: &str = "%Y-%m-%d";
const DISPLAY_DATE_FORMAT: &str = "%d/%m/%Y";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum Status {
    Waiting,
    InProgress,
    Completed,
    Canceled,
    Urgent,
}

impl Status {
    pub const ALL: [Status; 5] = [
        Status::Waiting,
        Status::InProgress,
        Status::Completed,
        Status::Canceled,
        Status::Urgent,
    ];

    pub fn parse(value: &str) -> Result<Self, AppError> {
        Status::ALL
            .into_iter()
            .find(|status| status.as_str() == value)
            .ok_or_else(|| AppError::InvalidStatus(value.to_string()))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Waiting => "waiting",
            Status::InProgress => "in_progress",
            Status::Completed => "completed",
            Status::Canceled => "canceled",
            Status::Urgent => "urgent",
        }
    }

    /// Sentence shown in the task details panel.
    pub fn describe(&self) -> &'static str {
        match self {
            Status::Waiting => "Task waiting for action.",
            Status::InProgress => "Task in progress.",
            Status::Completed => "Task completed.",
            Status::Canceled => "Task canceled.",
            Status::Urgent => "Task is urgent.",
        }
    }

    /// Finished tasks are the ones removed by "clear finished".
    pub fn is_finished(&self) -> bool {
        matches!(self, Status::Completed | Status::Canceled)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Todo {
    pub id: i64,
    pub name: String,
    pub description: String,
    #[sqlx(rename = "dueDate")]
    pub due_date: Option<String>,
    #[sqlx(rename = "completedAt")]
    pub completed_at: Option<String>,
    pub status: Status,
}

impl Todo {
    /// Parsed due date; empty, absent and malformed values all mean "no date".
    pub fn due(&self) -> Option<NaiveDate> {
        self.due_date.as_deref().and_then(parse_due_date)
    }

    pub fn details(&self) -> TodoDetails {
        TodoDetails {
            name: self.name.clone(),
            description: self.description.clone(),
            status: self.status.describe().to_string(),
            due: self
                .due()
                .map(format_due)
                .unwrap_or_else(|| "No due date".to_string()),
        }
    }
}

/// Read-only projection rendered by the details panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TodoDetails {
    pub name: String,
    pub description: String,
    pub status: String,
    pub due: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewTodoRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub due_date: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateTodoRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub due_date: Option<String>,
    pub status: Status,
}

pub fn parse_due_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(raw, DUE_DATE_FORMAT).ok()
}

pub fn format_due(date: NaiveDate) -> String {
    date.format(DISPLAY_DATE_FORMAT).to_string()
}

/// Blank due dates are stored as NULL.
pub fn normalize_due_date(raw: Option<String>) -> Option<String> {
    raw.map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

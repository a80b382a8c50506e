use serde::Serialize;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::notifications::SchedulerError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database connection is not established")]
    StoreUnavailable,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Scheduler error: {0}")]
    Scheduler(#[from] SchedulerError),

    #[error("Invalid status: {0}")]
    InvalidStatus(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// What the presentation layer shows when an operation is rejected.
#[derive(Debug, Serialize)]
pub struct ErrorAlert {
    pub error: String,
    pub message: String,
}

impl AppError {
    pub fn to_alert(&self) -> ErrorAlert {
        let (kind, message) = match self {
            AppError::Validation(msg) => {
                info!("validation rejected: {}", msg);
                ("validation", msg.clone())
            }
            AppError::InvalidStatus(value) => {
                info!("invalid status rejected: {}", value);
                ("validation", format!("Unknown status: {}", value))
            }
            AppError::StoreUnavailable => {
                error!("database connection is not established");
                ("store", "Database connection is not established.".to_string())
            }
            AppError::Database(e) => {
                error!("database error: {}", e);
                ("store", "Database error occurred".to_string())
            }
            AppError::Migration(e) => {
                error!("migration error: {}", e);
                ("store", "Database error occurred".to_string())
            }
            AppError::Scheduler(e) => {
                warn!("scheduler error: {}", e);
                ("scheduler", "Reminder could not be updated".to_string())
            }
            AppError::Config(msg) => {
                error!("configuration error: {}", msg);
                ("config", msg.clone())
            }
        };

        ErrorAlert {
            error: kind.to_string(),
            message,
        }
    }
}

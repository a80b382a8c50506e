use std::env;

use chrono::NaiveTime;

use crate::error::AppError;

const DEFAULT_DATABASE_URL: &str = "sqlite://todos.db";
const DEFAULT_REMINDER_HOUR: u32 = 9;
const DEFAULT_DISPATCH_INTERVAL_SECS: u64 = 60;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database_url: String,
    /// Local wall time at which urgent reminders fire each day.
    pub reminder_time: NaiveTime,
    pub dispatch_interval_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            reminder_time: reminder_time_at(DEFAULT_REMINDER_HOUR)
                .unwrap_or(NaiveTime::MIN),
            dispatch_interval_secs: DEFAULT_DISPATCH_INTERVAL_SECS,
        }
    }
}

impl AppConfig {
    pub fn new_from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key/value source shaped like the process
    /// environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let database_url = lookup("DATABASE_URL")
            .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        let reminder_hour = match lookup("REMINDER_HOUR") {
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .map_err(|_| AppError::Config(format!("REMINDER_HOUR is not a number: {}", raw)))?,
            None => DEFAULT_REMINDER_HOUR,
        };
        let reminder_time = reminder_time_at(reminder_hour)?;

        let dispatch_interval_secs = match lookup("DISPATCH_INTERVAL_SECS") {
            Some(raw) => raw.trim().parse::<u64>().map_err(|_| {
                AppError::Config(format!("DISPATCH_INTERVAL_SECS is not a number: {}", raw))
            })?,
            None => DEFAULT_DISPATCH_INTERVAL_SECS,
        };
        if dispatch_interval_secs == 0 {
            return Err(AppError::Config(
                "DISPATCH_INTERVAL_SECS must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            database_url,
            reminder_time,
            dispatch_interval_secs,
        })
    }
}

pub fn reminder_time_at(hour: u32) -> Result<NaiveTime, AppError> {
    NaiveTime::from_hms_opt(hour, 0, 0)
        .ok_or_else(|| AppError::Config(format!("REMINDER_HOUR must be 0..=23, got {}", hour)))
}

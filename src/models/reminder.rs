use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum Every {
    Day,
}

impl Every {
    pub fn period(&self) -> Duration {
        match self {
            Every::Day => Duration::days(1),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderSchedule {
    /// First fire time, local wall clock.
    pub at: NaiveDateTime,
    pub repeats: bool,
    pub every: Option<Every>,
}

impl ReminderSchedule {
    pub fn daily_from(at: NaiveDateTime) -> Self {
        Self {
            at,
            repeats: true,
            every: Some(Every::Day),
        }
    }

    /// Repeating needs a period; `repeats` alone fires once.
    pub fn is_recurring(&self) -> bool {
        self.repeats && self.every.is_some()
    }

    /// Next fire time after a delivery at `at`, if the schedule repeats.
    pub fn next_after(&self, at: NaiveDateTime) -> Option<NaiveDateTime> {
        if !self.repeats {
            return None;
        }
        self.every.map(|every| at + every.period())
    }
}

/// A local notification bound to a todo id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reminder {
    pub id: i64,
    pub title: String,
    pub body: String,
    pub schedule: ReminderSchedule,
}

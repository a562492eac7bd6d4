use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::macros::string_enum;

/// One clock-in/clock-out record of an employee.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TimeLog {
    pub id: Uuid,
    pub employee_id: String,
    pub shift_id: Option<Uuid>,
    pub clock_in: DateTime<Utc>,
    pub clock_out: Option<DateTime<Utc>>,
    pub status: TimeLogStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TimeLog {
    /// Time between clock-in and clock-out; `None` while still clocked in.
    pub fn worked(&self) -> Option<Duration> {
        self.clock_out.map(|out| out - self.clock_in)
    }
}

string_enum! {
    #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
    #[serde(rename_all = "kebab-case")]
    pub enum TimeLogStatus {
        InProgress => "in-progress",
        Completed => "completed",
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClockInInput {
    /// Defaults to the caller.
    pub employee_id: Option<String>,
    pub shift_id: Option<Uuid>,
    /// Defaults to now.
    pub clock_in: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClockOutInput {
    /// Defaults to now.
    pub clock_out: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeLogFilter {
    pub employee_id: Option<String>,
    pub status: Option<TimeLogStatus>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_log_has_no_worked_time() {
        let now = Utc::now();
        let mut log = TimeLog {
            id: Uuid::new_v4(),
            employee_id: "emp-1".to_string(),
            shift_id: None,
            clock_in: now,
            clock_out: None,
            status: TimeLogStatus::InProgress,
            created_at: now,
            updated_at: now,
        };
        assert_eq!(log.worked(), None);

        log.clock_out = Some(now + Duration::minutes(450));
        log.status = TimeLogStatus::Completed;
        assert_eq!(log.worked(), Some(Duration::minutes(450)));
    }

    #[test]
    fn status_uses_kebab_case() {
        assert_eq!(TimeLogStatus::InProgress.to_string(), "in-progress");
        assert_eq!(
            serde_json::to_string(&TimeLogStatus::Completed).unwrap(),
            "\"completed\""
        );
    }
}

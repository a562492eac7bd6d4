use chrono::{DateTime, Duration, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::macros::string_enum;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Shift {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub employee_id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: ShiftStatus,
    pub recurrence: Option<Recurrence>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftInput {
    /// Client-chosen id; replaying a create with the same id is a no-op.
    pub id: Option<Uuid>,
    pub title: String,
    pub description: Option<String>,
    pub employee_id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: Option<ShiftStatus>,
    pub recurrence: Option<Recurrence>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftFilter {
    pub status: Option<ShiftStatus>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

string_enum! {
    #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
    #[serde(rename_all = "kebab-case")]
    pub enum ShiftStatus {
        Pending => "pending",
        Approved => "approved",
        Rejected => "rejected",
        Completed => "completed",
        InProgress => "in-progress",
        Cancelled => "cancelled",
        Scheduled => "scheduled",
    }
}

impl ShiftStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ShiftStatus::Rejected | ShiftStatus::Completed | ShiftStatus::Cancelled
        )
    }

    /// Whether `target` is reachable from `self` in one step.
    pub fn can_transition_to(&self, target: ShiftStatus) -> bool {
        use ShiftStatus::*;

        match self {
            Pending => matches!(target, Approved | Rejected | Scheduled | Cancelled),
            Approved => matches!(target, Scheduled | InProgress | Completed | Cancelled),
            Scheduled => matches!(target, InProgress | Completed | Cancelled),
            InProgress => matches!(target, Completed | Cancelled),
            Rejected | Completed | Cancelled => false,
        }
    }
}

string_enum! {
    #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
    #[serde(rename_all = "lowercase")]
    pub enum RecurrenceFrequency {
        Daily => "daily",
        Weekly => "weekly",
        Monthly => "monthly",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Recurrence {
    pub frequency: RecurrenceFrequency,
    pub interval: u32,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Occurrence {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

impl Recurrence {
    pub fn validate(&self) -> Result<(), String> {
        if self.interval == 0 {
            return Err("Recurrence interval must be at least 1".to_string());
        }
        Ok(())
    }

    /// Lists the windows of the series starting at the first occurrence,
    /// stopping at `end_date` (inclusive) or after `limit` entries.
    pub fn occurrences(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        limit: usize,
    ) -> Vec<Occurrence> {
        let length = end - start;
        let interval = self.interval.max(1);
        let mut occurrences = Vec::new();

        for step in 0u32.. {
            if occurrences.len() >= limit {
                break;
            }

            let offset = step.saturating_mul(interval);
            let next_start = match self.frequency {
                RecurrenceFrequency::Daily => start.checked_add_signed(Duration::days(offset as i64)),
                RecurrenceFrequency::Weekly => {
                    start.checked_add_signed(Duration::weeks(offset as i64))
                }
                // Anchored to the first start so month-end clamping never drifts
                RecurrenceFrequency::Monthly => start.checked_add_months(Months::new(offset)),
            };

            let Some(next_start) = next_start else {
                break;
            };

            if let Some(end_date) = self.end_date {
                if next_start.date_naive() > end_date {
                    break;
                }
            }

            let Some(end_time) = next_start.checked_add_signed(length) else {
                break;
            };

            occurrences.push(Occurrence {
                start_time: next_start,
                end_time,
            });
        }

        occurrences
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    #[test]
    fn cancelled_is_terminal_and_cannot_be_approved() {
        assert!(ShiftStatus::Cancelled.is_terminal());
        assert!(!ShiftStatus::Cancelled.can_transition_to(ShiftStatus::Approved));
    }

    #[test]
    fn pending_can_be_approved_or_rejected() {
        assert!(ShiftStatus::Pending.can_transition_to(ShiftStatus::Approved));
        assert!(ShiftStatus::Pending.can_transition_to(ShiftStatus::Rejected));
        assert!(!ShiftStatus::Pending.can_transition_to(ShiftStatus::Completed));
    }

    #[test]
    fn no_status_transitions_to_itself() {
        for status in [
            ShiftStatus::Pending,
            ShiftStatus::Approved,
            ShiftStatus::Rejected,
            ShiftStatus::Completed,
            ShiftStatus::InProgress,
            ShiftStatus::Cancelled,
            ShiftStatus::Scheduled,
        ] {
            assert!(!status.can_transition_to(status), "{status} -> {status}");
        }
    }

    #[test]
    fn status_text_matches_wire_format() {
        assert_eq!(ShiftStatus::InProgress.to_string(), "in-progress");
        assert_eq!("IN-PROGRESS".parse::<ShiftStatus>(), Ok(ShiftStatus::InProgress));
        assert_eq!(
            serde_json::to_string(&ShiftStatus::InProgress).unwrap(),
            "\"in-progress\""
        );
        assert!("inProgress".parse::<ShiftStatus>().is_err());
    }

    #[test]
    fn weekly_recurrence_stops_at_end_date() {
        let recurrence = Recurrence {
            frequency: RecurrenceFrequency::Weekly,
            interval: 2,
            end_date: NaiveDate::from_ymd_opt(2024, 7, 1),
        };

        let occurrences = recurrence.occurrences(at(2024, 6, 3, 9), at(2024, 6, 3, 17), 10);

        let starts: Vec<_> = occurrences.iter().map(|o| o.start_time).collect();
        assert_eq!(
            starts,
            vec![at(2024, 6, 3, 9), at(2024, 6, 17, 9), at(2024, 7, 1, 9)]
        );
        assert!(occurrences.iter().all(|o| o.end_time - o.start_time == Duration::hours(8)));
    }

    #[test]
    fn monthly_recurrence_clamps_to_month_end() {
        let recurrence = Recurrence {
            frequency: RecurrenceFrequency::Monthly,
            interval: 1,
            end_date: None,
        };

        let occurrences = recurrence.occurrences(at(2024, 1, 31, 8), at(2024, 1, 31, 12), 3);

        let starts: Vec<_> = occurrences.iter().map(|o| o.start_time).collect();
        assert_eq!(
            starts,
            vec![at(2024, 1, 31, 8), at(2024, 2, 29, 8), at(2024, 3, 31, 8)]
        );
    }

    #[test]
    fn series_stops_before_overflowing_the_calendar() {
        let recurrence = Recurrence {
            frequency: RecurrenceFrequency::Daily,
            interval: 1,
            end_date: None,
        };
        let start = DateTime::<Utc>::MAX_UTC - Duration::days(1) - Duration::hours(4);

        let occurrences = recurrence.occurrences(start, start + Duration::hours(8), 5);

        assert_eq!(occurrences.len(), 1);
        assert_eq!(occurrences[0].start_time, start);
        assert_eq!(occurrences[0].end_time, start + Duration::hours(8));
    }

    #[test]
    fn zero_interval_is_rejected() {
        let recurrence = Recurrence {
            frequency: RecurrenceFrequency::Daily,
            interval: 0,
            end_date: None,
        };
        assert!(recurrence.validate().is_err());
    }
}

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::models::{Recurrence, Shift, ShiftStatus};

// Row shape of the `shifts` table; recurrence is stored as JSON text
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ShiftRow {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub employee_id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: ShiftStatus,
    pub recurrence: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub const SHIFT_COLUMNS: &str = "id, title, description, employee_id, start_time, end_time, status, recurrence, created_at, updated_at";

impl TryFrom<ShiftRow> for Shift {
    type Error = serde_json::Error;

    fn try_from(row: ShiftRow) -> Result<Self, Self::Error> {
        let recurrence = row
            .recurrence
            .as_deref()
            .map(serde_json::from_str::<Recurrence>)
            .transpose()?;

        Ok(Self {
            id: row.id,
            title: row.title,
            description: row.description,
            employee_id: row.employee_id,
            start_time: row.start_time,
            end_time: row.end_time,
            status: row.status,
            recurrence,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

pub fn encode_recurrence(recurrence: Option<&Recurrence>) -> Result<Option<String>, serde_json::Error> {
    recurrence.map(serde_json::to_string).transpose()
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::time_off::ApprovalStatus;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ShiftSwap {
    pub id: Uuid,
    pub original_shift_id: Uuid,
    pub original_employee_id: String,
    pub new_employee_id: String,
    pub status: ApprovalStatus,
    pub reviewed_by: Option<String>,
    pub review_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ShiftSwap {
    pub fn involves(&self, user_id: &str) -> bool {
        self.original_employee_id == user_id || self.new_employee_id == user_id
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftSwapInput {
    pub original_shift_id: Uuid,
    /// Defaults to the caller when omitted.
    pub original_employee_id: Option<String>,
    pub new_employee_id: String,
}

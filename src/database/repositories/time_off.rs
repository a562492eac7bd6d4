use anyhow::Result;
use chrono::{NaiveDate, Utc};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use uuid::Uuid;

use crate::database::models::{ApprovalStatus, RequestFilter, TimeOffRequest};

const TIME_OFF_COLUMNS: &str = "id, employee_id, start_date, end_date, reason, status, reviewed_by, review_notes, created_at, updated_at";

#[derive(Clone)]
pub struct TimeOffRepository {
    pool: SqlitePool,
}

impl TimeOffRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new pending time-off request
    pub async fn create_request(
        &self,
        employee_id: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
        reason: &str,
    ) -> Result<TimeOffRequest> {
        let now = Utc::now();

        let time_off_request = sqlx::query_as::<_, TimeOffRequest>(&format!(
            r#"
            INSERT INTO
                time_off_requests (
                    id,
                    employee_id,
                    start_date,
                    end_date,
                    reason,
                    status,
                    created_at,
                    updated_at
                )
            VALUES
                (?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING
                {TIME_OFF_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(employee_id)
        .bind(start_date)
        .bind(end_date)
        .bind(reason)
        .bind(ApprovalStatus::Pending)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(time_off_request)
    }

    /// Get all time-off requests with optional filtering
    pub async fn find_by_filter(&self, filter: &RequestFilter) -> Result<Vec<TimeOffRequest>> {
        let mut query = QueryBuilder::<Sqlite>::new(format!(
            "SELECT {TIME_OFF_COLUMNS} FROM time_off_requests WHERE 1 = 1"
        ));

        if let Some(employee_id) = &filter.employee_id {
            query.push(" AND employee_id = ").push_bind(employee_id.clone());
        }
        if let Some(status) = filter.status {
            query.push(" AND status = ").push_bind(status);
        }
        query.push(" ORDER BY created_at DESC");

        let requests = query
            .build_query_as::<TimeOffRequest>()
            .fetch_all(&self.pool)
            .await?;

        Ok(requests)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<TimeOffRequest>> {
        let time_off_request = sqlx::query_as::<_, TimeOffRequest>(&format!(
            "SELECT {TIME_OFF_COLUMNS} FROM time_off_requests WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(time_off_request)
    }

    /// Record a review decision while the request is still pending.
    pub async fn review_if_pending(
        &self,
        id: Uuid,
        status: ApprovalStatus,
        reviewed_by: &str,
        notes: Option<&str>,
    ) -> Result<Option<TimeOffRequest>> {
        let time_off_request = sqlx::query_as::<_, TimeOffRequest>(&format!(
            r#"
            UPDATE
                time_off_requests
            SET
                status = ?,
                reviewed_by = ?,
                review_notes = ?,
                updated_at = ?
            WHERE
                id = ? AND status = ?
            RETURNING
                {TIME_OFF_COLUMNS}
            "#
        ))
        .bind(status)
        .bind(reviewed_by)
        .bind(notes)
        .bind(Utc::now())
        .bind(id)
        .bind(ApprovalStatus::Pending)
        .fetch_optional(&self.pool)
        .await?;

        Ok(time_off_request)
    }

    pub async fn delete_if_pending(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM time_off_requests WHERE id = ? AND status = ?")
            .bind(id)
            .bind(ApprovalStatus::Pending)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use uuid::Uuid;

use crate::database::models::{TimeLog, TimeLogFilter, TimeLogStatus};

const TIME_LOG_COLUMNS: &str =
    "id, employee_id, shift_id, clock_in, clock_out, status, created_at, updated_at";

#[derive(Clone)]
pub struct TimeLogRepository {
    pool: SqlitePool,
}

impl TimeLogRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open a log for the employee. Returns `None` when the employee already
    /// has an open log.
    pub async fn clock_in(
        &self,
        employee_id: &str,
        shift_id: Option<Uuid>,
        clock_in: DateTime<Utc>,
    ) -> Result<Option<TimeLog>> {
        let now = Utc::now();

        let time_log = sqlx::query_as::<_, TimeLog>(&format!(
            r#"
            INSERT INTO
                time_logs (
                    id,
                    employee_id,
                    shift_id,
                    clock_in,
                    status,
                    created_at,
                    updated_at
                )
            VALUES
                (?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT DO NOTHING
            RETURNING
                {TIME_LOG_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(employee_id)
        .bind(shift_id)
        .bind(clock_in)
        .bind(TimeLogStatus::InProgress)
        .bind(now)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        Ok(time_log)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<TimeLog>> {
        let time_log = sqlx::query_as::<_, TimeLog>(&format!(
            "SELECT {TIME_LOG_COLUMNS} FROM time_logs WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(time_log)
    }

    pub async fn find_open_for_employee(&self, employee_id: &str) -> Result<Option<TimeLog>> {
        let time_log = sqlx::query_as::<_, TimeLog>(&format!(
            "SELECT {TIME_LOG_COLUMNS} FROM time_logs WHERE employee_id = ? AND status = ?"
        ))
        .bind(employee_id)
        .bind(TimeLogStatus::InProgress)
        .fetch_optional(&self.pool)
        .await?;

        Ok(time_log)
    }

    /// Newest first. `from`/`to` select logs whose clock-in falls in the window.
    pub async fn find_by_filter(&self, filter: &TimeLogFilter) -> Result<Vec<TimeLog>> {
        let mut query = QueryBuilder::<Sqlite>::new(format!(
            "SELECT {TIME_LOG_COLUMNS} FROM time_logs WHERE 1 = 1"
        ));

        if let Some(employee_id) = &filter.employee_id {
            query.push(" AND employee_id = ").push_bind(employee_id.clone());
        }
        if let Some(status) = filter.status {
            query.push(" AND status = ").push_bind(status);
        }
        if let Some(from) = filter.from {
            query.push(" AND clock_in >= ").push_bind(from);
        }
        if let Some(to) = filter.to {
            query.push(" AND clock_in < ").push_bind(to);
        }
        query.push(" ORDER BY clock_in DESC");

        let logs = query
            .build_query_as::<TimeLog>()
            .fetch_all(&self.pool)
            .await?;

        Ok(logs)
    }

    /// Close a log that is still open; `None` means it was closed meanwhile.
    pub async fn clock_out_if_open(
        &self,
        id: Uuid,
        clock_out: DateTime<Utc>,
    ) -> Result<Option<TimeLog>> {
        let time_log = sqlx::query_as::<_, TimeLog>(&format!(
            r#"
            UPDATE
                time_logs
            SET
                clock_out = ?,
                status = ?,
                updated_at = ?
            WHERE
                id = ? AND status = ?
            RETURNING
                {TIME_LOG_COLUMNS}
            "#
        ))
        .bind(clock_out)
        .bind(TimeLogStatus::Completed)
        .bind(Utc::now())
        .bind(id)
        .bind(TimeLogStatus::InProgress)
        .fetch_optional(&self.pool)
        .await?;

        Ok(time_log)
    }
}

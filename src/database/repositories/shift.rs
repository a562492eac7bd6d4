use anyhow::Result;
use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqlitePool, Transaction};
use uuid::Uuid;

use crate::database::{
    models::{Shift, ShiftFilter, ShiftInput, ShiftStatus},
    types::{SHIFT_COLUMNS, ShiftRow, encode_recurrence},
};

#[derive(Clone)]
pub struct ShiftRepository {
    pool: SqlitePool,
}

impl ShiftRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a shift unless one with the same id already exists.
    /// Returns `None` when the id was taken.
    pub async fn create_shift(
        &self,
        id: Uuid,
        input: &ShiftInput,
        status: ShiftStatus,
    ) -> Result<Option<Shift>> {
        let now = Utc::now();
        let recurrence = encode_recurrence(input.recurrence.as_ref())?;

        let row = sqlx::query_as::<_, ShiftRow>(&format!(
            r#"
            INSERT INTO
                shifts (
                    id,
                    title,
                    description,
                    employee_id,
                    start_time,
                    end_time,
                    status,
                    recurrence,
                    created_at,
                    updated_at
                )
            VALUES
                (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT (id) DO NOTHING
            RETURNING
                {SHIFT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&input.title)
        .bind(&input.description)
        .bind(&input.employee_id)
        .bind(input.start_time)
        .bind(input.end_time)
        .bind(status)
        .bind(recurrence)
        .bind(now)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Shift::try_from).transpose()?)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Shift>> {
        let row = sqlx::query_as::<_, ShiftRow>(&format!(
            "SELECT {SHIFT_COLUMNS} FROM shifts WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Shift::try_from).transpose()?)
    }

    pub async fn find_by_employee(&self, employee_id: &str) -> Result<Vec<Shift>> {
        let rows = sqlx::query_as::<_, ShiftRow>(&format!(
            "SELECT {SHIFT_COLUMNS} FROM shifts WHERE employee_id = ? ORDER BY start_time"
        ))
        .bind(employee_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(Shift::try_from)
            .collect::<Result<Vec<_>, _>>()?)
    }

    pub async fn find_by_filter(&self, filter: &ShiftFilter) -> Result<Vec<Shift>> {
        let mut query = QueryBuilder::<Sqlite>::new(format!(
            "SELECT {SHIFT_COLUMNS} FROM shifts WHERE 1 = 1"
        ));

        if let Some(status) = filter.status {
            query.push(" AND status = ").push_bind(status);
        }
        if let Some(from) = filter.from {
            query.push(" AND end_time > ").push_bind(from);
        }
        if let Some(to) = filter.to {
            query.push(" AND start_time < ").push_bind(to);
        }
        query.push(" ORDER BY start_time");

        let rows = query
            .build_query_as::<ShiftRow>()
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(Shift::try_from)
            .collect::<Result<Vec<_>, _>>()?)
    }

    /// Conditional status write; `None` means the row is gone or its status
    /// no longer equals `expected`.
    pub async fn update_status_if(
        &self,
        id: Uuid,
        expected: ShiftStatus,
        status: ShiftStatus,
    ) -> Result<Option<Shift>> {
        let row = sqlx::query_as::<_, ShiftRow>(&format!(
            r#"
            UPDATE
                shifts
            SET
                status = ?,
                updated_at = ?
            WHERE
                id = ? AND status = ?
            RETURNING
                {SHIFT_COLUMNS}
            "#
        ))
        .bind(status)
        .bind(Utc::now())
        .bind(id)
        .bind(expected)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Shift::try_from).transpose()?)
    }

    /// Move a shift to another employee inside the caller's transaction.
    /// Only succeeds while the shift still belongs to `from_employee` and is
    /// not in a terminal status.
    pub async fn reassign_in_tx(
        tx: &mut Transaction<'_, Sqlite>,
        id: Uuid,
        from_employee: &str,
        to_employee: &str,
    ) -> Result<Option<Shift>> {
        let row = sqlx::query_as::<_, ShiftRow>(&format!(
            r#"
            UPDATE
                shifts
            SET
                employee_id = ?,
                updated_at = ?
            WHERE
                id = ?
                AND employee_id = ?
                AND status NOT IN ('rejected', 'completed', 'cancelled')
            RETURNING
                {SHIFT_COLUMNS}
            "#
        ))
        .bind(to_employee)
        .bind(Utc::now())
        .bind(id)
        .bind(from_employee)
        .fetch_optional(&mut **tx)
        .await?;

        Ok(row.map(Shift::try_from).transpose()?)
    }

    pub async fn delete_shift(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM shifts WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

use anyhow::Result;
use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqlitePool, Transaction};
use uuid::Uuid;

use crate::database::models::{ApprovalStatus, RequestFilter, ShiftSwap};

const SWAP_COLUMNS: &str = "id, original_shift_id, original_employee_id, new_employee_id, status, reviewed_by, review_notes, created_at, updated_at";

#[derive(Clone)]
pub struct ShiftSwapRepository {
    pool: SqlitePool,
}

impl ShiftSwapRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new pending shift swap request
    pub async fn create_swap(
        &self,
        original_shift_id: Uuid,
        original_employee_id: &str,
        new_employee_id: &str,
    ) -> Result<ShiftSwap> {
        let now = Utc::now();

        let shift_swap = sqlx::query_as::<_, ShiftSwap>(&format!(
            r#"
            INSERT INTO
                shift_swaps (
                    id,
                    original_shift_id,
                    original_employee_id,
                    new_employee_id,
                    status,
                    created_at,
                    updated_at
                )
            VALUES
                (?, ?, ?, ?, ?, ?, ?)
            RETURNING
                {SWAP_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(original_shift_id)
        .bind(original_employee_id)
        .bind(new_employee_id)
        .bind(ApprovalStatus::Pending)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(shift_swap)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<ShiftSwap>> {
        let shift_swap = sqlx::query_as::<_, ShiftSwap>(&format!(
            "SELECT {SWAP_COLUMNS} FROM shift_swaps WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(shift_swap)
    }

    /// Swaps matching the filter; an employee filter matches either side of the swap.
    pub async fn find_by_filter(&self, filter: &RequestFilter) -> Result<Vec<ShiftSwap>> {
        let mut query = QueryBuilder::<Sqlite>::new(format!(
            "SELECT {SWAP_COLUMNS} FROM shift_swaps WHERE 1 = 1"
        ));

        if let Some(employee_id) = &filter.employee_id {
            query
                .push(" AND (original_employee_id = ")
                .push_bind(employee_id.clone())
                .push(" OR new_employee_id = ")
                .push_bind(employee_id.clone())
                .push(")");
        }
        if let Some(status) = filter.status {
            query.push(" AND status = ").push_bind(status);
        }
        query.push(" ORDER BY created_at DESC");

        let swaps = query
            .build_query_as::<ShiftSwap>()
            .fetch_all(&self.pool)
            .await?;

        Ok(swaps)
    }

    pub async fn has_pending_for_shift(&self, shift_id: Uuid) -> Result<bool> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM shift_swaps WHERE original_shift_id = ? AND status = ?",
        )
        .bind(shift_id)
        .bind(ApprovalStatus::Pending)
        .fetch_one(&self.pool)
        .await?;

        Ok(count > 0)
    }

    /// Fetch a swap inside the caller's transaction.
    pub async fn find_by_id_in_tx(
        tx: &mut Transaction<'_, Sqlite>,
        id: Uuid,
    ) -> Result<Option<ShiftSwap>> {
        let shift_swap = sqlx::query_as::<_, ShiftSwap>(&format!(
            "SELECT {SWAP_COLUMNS} FROM shift_swaps WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?;

        Ok(shift_swap)
    }

    /// Record a review decision while the swap is still pending.
    /// `None` means another reviewer got there first.
    pub async fn review_in_tx(
        tx: &mut Transaction<'_, Sqlite>,
        id: Uuid,
        status: ApprovalStatus,
        reviewed_by: &str,
        notes: Option<&str>,
    ) -> Result<Option<ShiftSwap>> {
        let shift_swap = sqlx::query_as::<_, ShiftSwap>(&format!(
            r#"
            UPDATE
                shift_swaps
            SET
                status = ?,
                reviewed_by = ?,
                review_notes = ?,
                updated_at = ?
            WHERE
                id = ? AND status = ?
            RETURNING
                {SWAP_COLUMNS}
            "#
        ))
        .bind(status)
        .bind(reviewed_by)
        .bind(notes)
        .bind(Utc::now())
        .bind(id)
        .bind(ApprovalStatus::Pending)
        .fetch_optional(&mut **tx)
        .await?;

        Ok(shift_swap)
    }

    pub async fn begin(&self) -> Result<Transaction<'static, Sqlite>> {
        Ok(self.pool.begin().await?)
    }
}

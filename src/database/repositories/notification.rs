use anyhow::Result;
use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::database::models::{Notification, NotificationInput};

const NOTIFICATION_COLUMNS: &str = "id, user_id, title, message, notification_type, read, event_key, created_at, updated_at";

#[derive(Clone)]
pub struct NotificationRepository {
    pool: SqlitePool,
}

impl NotificationRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert one notification. Returns `None` when the recipient already
    /// holds a notification with the same event key.
    pub async fn create_notification(
        &self,
        input: &NotificationInput,
    ) -> Result<Option<Notification>> {
        let now = Utc::now();

        let notification = sqlx::query_as::<_, Notification>(&format!(
            r#"
            INSERT INTO
                notifications (
                    id,
                    user_id,
                    title,
                    message,
                    notification_type,
                    read,
                    event_key,
                    created_at,
                    updated_at
                )
            VALUES
                (?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT DO NOTHING
            RETURNING
                {NOTIFICATION_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(&input.user_id)
        .bind(&input.title)
        .bind(&input.message)
        .bind(input.notification_type)
        .bind(false)
        .bind(&input.event_key)
        .bind(now)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        Ok(notification)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Notification>> {
        let notification = sqlx::query_as::<_, Notification>(&format!(
            "SELECT {NOTIFICATION_COLUMNS} FROM notifications WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(notification)
    }

    /// Newest first.
    pub async fn find_for_user(
        &self,
        user_id: &str,
        unread_only: bool,
        limit: i64,
    ) -> Result<Vec<Notification>> {
        let notifications = sqlx::query_as::<_, Notification>(&format!(
            r#"
            SELECT
                {NOTIFICATION_COLUMNS}
            FROM
                notifications
            WHERE
                user_id = ? AND (? = 0 OR read = 0)
            ORDER BY
                created_at DESC
            LIMIT ?
            "#
        ))
        .bind(user_id)
        .bind(unread_only)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(notifications)
    }

    pub async fn unread_count(&self, user_id: &str) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM notifications WHERE user_id = ? AND read = 0",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    pub async fn mark_as_read(&self, id: Uuid) -> Result<Option<Notification>> {
        let notification = sqlx::query_as::<_, Notification>(&format!(
            r#"
            UPDATE
                notifications
            SET
                read = 1,
                updated_at = ?
            WHERE
                id = ?
            RETURNING
                {NOTIFICATION_COLUMNS}
            "#
        ))
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(notification)
    }

    pub async fn mark_all_as_read(&self, user_id: &str) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE notifications SET read = 1, updated_at = ? WHERE user_id = ? AND read = 0",
        )
        .bind(Utc::now())
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    pub async fn delete_notification(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM notifications WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

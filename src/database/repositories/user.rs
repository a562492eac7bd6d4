use anyhow::Result;
use chrono::Utc;
use sqlx::SqlitePool;

use crate::database::models::{DirectoryUser, UserProfileInput, UserRole, UserStatus};

const USER_COLUMNS: &str =
    "id, email, display_name, role, department, status, push_token, created_at, updated_at";

#[derive(Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert or refresh a directory entry. The role always comes from the
    /// identity provider, so it is overwritten on every sync.
    pub async fn upsert_profile(
        &self,
        id: &str,
        role: UserRole,
        input: &UserProfileInput,
    ) -> Result<DirectoryUser> {
        let now = Utc::now();

        let user = sqlx::query_as::<_, DirectoryUser>(&format!(
            r#"
            INSERT INTO
                users (id, email, display_name, role, department, status, created_at, updated_at)
            VALUES
                (?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT (id) DO UPDATE
            SET
                email = excluded.email,
                display_name = excluded.display_name,
                role = excluded.role,
                department = excluded.department,
                updated_at = excluded.updated_at
            RETURNING
                {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&input.email)
        .bind(&input.display_name)
        .bind(role)
        .bind(&input.department)
        .bind(UserStatus::Active)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<DirectoryUser>> {
        let user = sqlx::query_as::<_, DirectoryUser>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    pub async fn find_all(&self) -> Result<Vec<DirectoryUser>> {
        let users = sqlx::query_as::<_, DirectoryUser>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY display_name"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    pub async fn find_active_ids(&self) -> Result<Vec<String>> {
        let ids = sqlx::query_scalar::<_, String>("SELECT id FROM users WHERE status = ? ORDER BY id")
            .bind(UserStatus::Active)
            .fetch_all(&self.pool)
            .await?;

        Ok(ids)
    }

    pub async fn find_active_ids_by_role(&self, role: UserRole) -> Result<Vec<String>> {
        let ids = sqlx::query_scalar::<_, String>(
            "SELECT id FROM users WHERE status = ? AND role = ? ORDER BY id",
        )
        .bind(UserStatus::Active)
        .bind(role)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }

    pub async fn find_active_ids_by_department(&self, department: &str) -> Result<Vec<String>> {
        let ids = sqlx::query_scalar::<_, String>(
            "SELECT id FROM users WHERE status = ? AND department = ? ORDER BY id",
        )
        .bind(UserStatus::Active)
        .bind(department)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }

    pub async fn find_push_token(&self, id: &str) -> Result<Option<String>> {
        let token = sqlx::query_scalar::<_, Option<String>>(
            "SELECT push_token FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(token.flatten())
    }

    pub async fn set_push_token(
        &self,
        id: &str,
        token: Option<&str>,
    ) -> Result<Option<DirectoryUser>> {
        let user = sqlx::query_as::<_, DirectoryUser>(&format!(
            "UPDATE users SET push_token = ?, updated_at = ? WHERE id = ? RETURNING {USER_COLUMNS}"
        ))
        .bind(token)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    pub async fn set_status(&self, id: &str, status: UserStatus) -> Result<Option<DirectoryUser>> {
        let user = sqlx::query_as::<_, DirectoryUser>(&format!(
            "UPDATE users SET status = ?, updated_at = ? WHERE id = ? RETURNING {USER_COLUMNS}"
        ))
        .bind(status)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }
}

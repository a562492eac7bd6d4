use crate::database::models::{DirectoryUser, UserProfileInput, UserStatus};
use crate::database::repositories::UserRepository;
use crate::error::AppError;
use crate::services::user_context::RequestContext;

/// Local mirror of identity-provider users, used to resolve notification
/// targets and to hold device push tokens.
#[derive(Clone)]
pub struct UserDirectory {
    users: UserRepository,
}

impl UserDirectory {
    pub fn new(users: UserRepository) -> Self {
        Self { users }
    }

    /// Sync the caller's profile. The role is taken from the token claims.
    pub async fn sync_profile(
        &self,
        ctx: &RequestContext,
        input: UserProfileInput,
    ) -> Result<DirectoryUser, AppError> {
        if input.email.trim().is_empty() || input.display_name.trim().is_empty() {
            return Err(AppError::BadRequest(
                "email and displayName are required".to_string(),
            ));
        }

        let input = UserProfileInput {
            department: input.department.or_else(|| ctx.department.clone()),
            ..input
        };

        let user = self
            .users
            .upsert_profile(&ctx.user_id, ctx.role, &input)
            .await?;

        log::debug!("Synced directory entry for {}", user.id);
        Ok(user)
    }

    pub async fn get_profile(&self, ctx: &RequestContext) -> Result<DirectoryUser, AppError> {
        self.users
            .find_by_id(&ctx.user_id)
            .await?
            .ok_or_else(|| profile_missing(ctx))
    }

    pub async fn register_push_token(
        &self,
        ctx: &RequestContext,
        token: &str,
    ) -> Result<DirectoryUser, AppError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(AppError::BadRequest("Push token is required".to_string()));
        }

        self.users
            .set_push_token(&ctx.user_id, Some(token))
            .await?
            .ok_or_else(|| profile_missing(ctx))
    }

    pub async fn clear_push_token(&self, ctx: &RequestContext) -> Result<DirectoryUser, AppError> {
        self.users
            .set_push_token(&ctx.user_id, None)
            .await?
            .ok_or_else(|| profile_missing(ctx))
    }

    pub async fn list_users(&self, ctx: &RequestContext) -> Result<Vec<DirectoryUser>, AppError> {
        ctx.requires_manager()?;
        Ok(self.users.find_all().await?)
    }

    /// Inactive users stop receiving role, department and broadcast notifications.
    pub async fn set_status(
        &self,
        ctx: &RequestContext,
        user_id: &str,
        status: UserStatus,
    ) -> Result<DirectoryUser, AppError> {
        ctx.requires_admin()?;

        let user = self
            .users
            .set_status(user_id, status)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        log::info!("User {} marked {} by {}", user.id, user.status, ctx.user_id);
        Ok(user)
    }
}

fn profile_missing(ctx: &RequestContext) -> AppError {
    AppError::NotFound(format!(
        "No directory profile for {}; sync the profile first",
        ctx.user_id
    ))
}

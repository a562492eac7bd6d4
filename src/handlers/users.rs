use actix_web::{HttpResponse, web};

use crate::AppState;
use crate::database::models::{PushTokenInput, UserProfileInput, UserStatusInput};
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::services::user_context::RequestContext;

pub async fn get_me(
    ctx: RequestContext,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let user = state.directory.get_profile(&ctx).await?;

    Ok(ApiResponse::success(user))
}

/// Sync the caller's directory profile
pub async fn update_me(
    ctx: RequestContext,
    state: web::Data<AppState>,
    input: web::Json<UserProfileInput>,
) -> Result<HttpResponse, AppError> {
    let user = state
        .directory
        .sync_profile(&ctx, input.into_inner())
        .await?;

    Ok(ApiResponse::success(user))
}

pub async fn register_push_token(
    ctx: RequestContext,
    state: web::Data<AppState>,
    input: web::Json<PushTokenInput>,
) -> Result<HttpResponse, AppError> {
    let user = state
        .directory
        .register_push_token(&ctx, &input.token)
        .await?;

    Ok(ApiResponse::success(user))
}

pub async fn clear_push_token(
    ctx: RequestContext,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let user = state.directory.clear_push_token(&ctx).await?;

    Ok(ApiResponse::success(user))
}

pub async fn get_users(
    ctx: RequestContext,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let users = state.directory.list_users(&ctx).await?;

    Ok(ApiResponse::success(users))
}

/// Activate or deactivate a user (admins)
pub async fn update_user_status(
    ctx: RequestContext,
    state: web::Data<AppState>,
    path: web::Path<String>,
    input: web::Json<UserStatusInput>,
) -> Result<HttpResponse, AppError> {
    let user = state
        .directory
        .set_status(&ctx, &path, input.status)
        .await?;

    Ok(ApiResponse::success(user))
}

use actix_web::{HttpResponse, web};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::AppState;
use crate::database::models::NotificationEvent;
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::services::user_context::RequestContext;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboxQuery {
    #[serde(default)]
    pub unread_only: bool,
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkAllReadResponse {
    pub updated: u64,
}

/// List the caller's notifications, newest first
pub async fn get_notifications(
    ctx: RequestContext,
    state: web::Data<AppState>,
    query: web::Query<InboxQuery>,
) -> Result<HttpResponse, AppError> {
    let notifications = state
        .inbox
        .list(&ctx, query.unread_only, query.limit)
        .await?;

    Ok(ApiResponse::success(notifications))
}

pub async fn get_unread_count(
    ctx: RequestContext,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let count = state.inbox.unread_count(&ctx).await?;

    Ok(ApiResponse::success(count))
}

pub async fn mark_as_read(
    ctx: RequestContext,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let notification = state.inbox.mark_as_read(&ctx, path.into_inner()).await?;

    Ok(ApiResponse::success(notification))
}

pub async fn mark_all_as_read(
    ctx: RequestContext,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let updated = state.inbox.mark_all_as_read(&ctx).await?;

    Ok(ApiResponse::success(MarkAllReadResponse { updated }))
}

pub async fn delete_notification(
    ctx: RequestContext,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    state.inbox.delete(&ctx, path.into_inner()).await?;

    Ok(ApiResponse::message("Notification deleted"))
}

/// Fan a manager-authored notification out to a target audience
pub async fn broadcast_notification(
    ctx: RequestContext,
    state: web::Data<AppState>,
    input: web::Json<NotificationEvent>,
) -> Result<HttpResponse, AppError> {
    ctx.requires_manager()?;

    let event = input.into_inner().into_broadcast();
    log::info!(
        "User {} broadcasting '{}' to {:?}",
        ctx.user_id,
        event.title,
        event.target
    );
    let report = state.fanout.fanout(&event).await?;

    Ok(ApiResponse::created(report))
}

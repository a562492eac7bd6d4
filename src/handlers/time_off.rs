use actix_web::{HttpResponse, web};
use serde::Deserialize;
use uuid::Uuid;

use crate::AppState;
use crate::database::models::{Decision, RequestFilter, TimeOffRequestInput};
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::services::user_context::RequestContext;

#[derive(Debug, Default, Deserialize)]
pub struct ReviewRequest {
    #[serde(default)]
    pub notes: Option<String>,
}

/// Submit a time-off request
pub async fn create_time_off_request(
    ctx: RequestContext,
    state: web::Data<AppState>,
    input: web::Json<TimeOffRequestInput>,
) -> Result<HttpResponse, AppError> {
    let request = state
        .approvals
        .submit_time_off(&ctx, input.into_inner())
        .await?;

    Ok(ApiResponse::created(request))
}

/// List time-off requests. Employees only see their own.
pub async fn get_time_off_requests(
    ctx: RequestContext,
    state: web::Data<AppState>,
    query: web::Query<RequestFilter>,
) -> Result<HttpResponse, AppError> {
    let requests = state
        .approvals
        .list_time_off(&ctx, query.into_inner())
        .await?;

    Ok(ApiResponse::success(requests))
}

pub async fn get_time_off_request(
    ctx: RequestContext,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let request = state
        .approvals
        .get_time_off(&ctx, path.into_inner())
        .await?;

    Ok(ApiResponse::success(request))
}

pub async fn approve_time_off_request(
    ctx: RequestContext,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    input: Option<web::Json<ReviewRequest>>,
) -> Result<HttpResponse, AppError> {
    review(ctx, state, path.into_inner(), Decision::Approve, input).await
}

pub async fn reject_time_off_request(
    ctx: RequestContext,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    input: Option<web::Json<ReviewRequest>>,
) -> Result<HttpResponse, AppError> {
    review(ctx, state, path.into_inner(), Decision::Reject, input).await
}

async fn review(
    ctx: RequestContext,
    state: web::Data<AppState>,
    id: Uuid,
    decision: Decision,
    input: Option<web::Json<ReviewRequest>>,
) -> Result<HttpResponse, AppError> {
    let notes = input.and_then(|body| body.into_inner().notes);

    let request = state
        .approvals
        .review_time_off(&ctx, id, decision, notes.as_deref())
        .await?;

    Ok(ApiResponse::success(request))
}

/// Withdraw a pending request
pub async fn withdraw_time_off_request(
    ctx: RequestContext,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    state
        .approvals
        .withdraw_time_off(&ctx, path.into_inner())
        .await?;

    Ok(ApiResponse::message("Time-off request withdrawn"))
}

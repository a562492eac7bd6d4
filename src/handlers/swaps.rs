use actix_web::{HttpResponse, web};
use uuid::Uuid;

use crate::AppState;
use crate::database::models::{Decision, RequestFilter, ShiftSwapInput};
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::handlers::time_off::ReviewRequest;
use crate::services::user_context::RequestContext;

/// Create a new shift swap request
pub async fn create_swap_request(
    ctx: RequestContext,
    state: web::Data<AppState>,
    input: web::Json<ShiftSwapInput>,
) -> Result<HttpResponse, AppError> {
    let swap = state
        .approvals
        .request_swap(&ctx, input.into_inner())
        .await?;

    Ok(ApiResponse::created(swap))
}

pub async fn get_swap_requests(
    ctx: RequestContext,
    state: web::Data<AppState>,
    query: web::Query<RequestFilter>,
) -> Result<HttpResponse, AppError> {
    let swaps = state
        .approvals
        .list_swaps(&ctx, query.into_inner())
        .await?;

    Ok(ApiResponse::success(swaps))
}

pub async fn get_swap_request(
    ctx: RequestContext,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let swap = state.approvals.get_swap(&ctx, path.into_inner()).await?;

    Ok(ApiResponse::success(swap))
}

/// Approve a swap and reassign the shift
pub async fn approve_swap_request(
    ctx: RequestContext,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    input: Option<web::Json<ReviewRequest>>,
) -> Result<HttpResponse, AppError> {
    let notes = input.and_then(|body| body.into_inner().notes);
    let review = state
        .approvals
        .review_swap(&ctx, path.into_inner(), Decision::Approve, notes.as_deref())
        .await?;

    Ok(ApiResponse::success(review))
}

pub async fn reject_swap_request(
    ctx: RequestContext,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    input: Option<web::Json<ReviewRequest>>,
) -> Result<HttpResponse, AppError> {
    let notes = input.and_then(|body| body.into_inner().notes);
    let review = state
        .approvals
        .review_swap(&ctx, path.into_inner(), Decision::Reject, notes.as_deref())
        .await?;

    Ok(ApiResponse::success(review))
}

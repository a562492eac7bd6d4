use actix_web::{HttpResponse, web};
use serde::Deserialize;
use uuid::Uuid;

use crate::AppState;
use crate::database::models::{ShiftFilter, ShiftInput, ShiftStatus};
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::services::user_context::RequestContext;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdateRequest {
    pub status: ShiftStatus,
}

#[derive(Debug, Deserialize)]
pub struct OccurrenceQuery {
    pub limit: Option<usize>,
}

/// Create a new shift
pub async fn create_shift(
    ctx: RequestContext,
    state: web::Data<AppState>,
    input: web::Json<ShiftInput>,
) -> Result<HttpResponse, AppError> {
    let shift = state
        .shift_store
        .create_shift(&ctx, input.into_inner())
        .await?;

    Ok(ApiResponse::created(shift))
}

/// List shifts across all employees (managers)
pub async fn get_shifts(
    ctx: RequestContext,
    state: web::Data<AppState>,
    query: web::Query<ShiftFilter>,
) -> Result<HttpResponse, AppError> {
    let shifts = state.shift_store.list_shifts(&ctx, &query).await?;

    Ok(ApiResponse::success(shifts))
}

pub async fn get_shift(
    ctx: RequestContext,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let shift = state
        .shift_store
        .get_shift(&ctx, path.into_inner())
        .await?;

    Ok(ApiResponse::success(shift))
}

pub async fn get_employee_shifts(
    ctx: RequestContext,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let shifts = state.shift_store.list_by_employee(&ctx, &path).await?;

    Ok(ApiResponse::success(shifts))
}

/// Move a shift through its lifecycle
pub async fn update_shift_status(
    ctx: RequestContext,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    input: web::Json<StatusUpdateRequest>,
) -> Result<HttpResponse, AppError> {
    let shift = state
        .shift_store
        .update_status(&ctx, path.into_inner(), input.status)
        .await?;

    Ok(ApiResponse::success(shift))
}

pub async fn get_shift_occurrences(
    ctx: RequestContext,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    query: web::Query<OccurrenceQuery>,
) -> Result<HttpResponse, AppError> {
    let occurrences = state
        .shift_store
        .occurrences(&ctx, path.into_inner(), query.limit)
        .await?;

    Ok(ApiResponse::success(occurrences))
}

pub async fn delete_shift(
    ctx: RequestContext,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    state
        .shift_store
        .delete_shift(&ctx, path.into_inner())
        .await?;

    Ok(ApiResponse::message("Shift deleted successfully"))
}

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use crate::AppState;
use crate::database::models::{ClockInInput, ClockOutInput, TimeLogFilter};
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::services::user_context::RequestContext;

/// Clock in. An empty body clocks the caller in now.
pub async fn clock_in(
    ctx: RequestContext,
    state: web::Data<AppState>,
    input: Option<web::Json<ClockInInput>>,
) -> Result<HttpResponse, AppError> {
    let input = input.map(|body| body.into_inner()).unwrap_or_default();
    let log = state.time_clock.clock_in(&ctx, input).await?;

    Ok(ApiResponse::created(log))
}

pub async fn clock_out(
    ctx: RequestContext,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    input: Option<web::Json<ClockOutInput>>,
) -> Result<HttpResponse, AppError> {
    let input = input.map(|body| body.into_inner()).unwrap_or_default();
    let log = state
        .time_clock
        .clock_out(&ctx, path.into_inner(), input)
        .await?;

    Ok(ApiResponse::success(log))
}

/// List time logs. Employees only see their own.
pub async fn get_time_logs(
    ctx: RequestContext,
    state: web::Data<AppState>,
    query: web::Query<TimeLogFilter>,
) -> Result<HttpResponse, AppError> {
    let logs = state
        .time_clock
        .list_logs(&ctx, query.into_inner())
        .await?;

    Ok(ApiResponse::success(logs))
}

pub async fn get_current_time_log(
    ctx: RequestContext,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let log = state.time_clock.current_log(&ctx).await?;

    Ok(ApiResponse::success(log))
}

pub async fn get_time_log(
    ctx: RequestContext,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let log = state.time_clock.get_log(&ctx, path.into_inner()).await?;

    Ok(ApiResponse::success(log))
}

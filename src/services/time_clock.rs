use chrono::Utc;
use uuid::Uuid;

use crate::database::models::{ClockInInput, ClockOutInput, TimeLog, TimeLogFilter, TimeLogStatus};
use crate::database::repositories::{ShiftRepository, TimeLogRepository};
use crate::error::AppError;
use crate::services::change_feed::{ChangeEvent, ChangeFeed};
use crate::services::user_context::RequestContext;

/// Employee time tracking: one open log per employee at a time.
#[derive(Clone)]
pub struct TimeClock {
    logs: TimeLogRepository,
    shifts: ShiftRepository,
    feed: ChangeFeed,
}

impl TimeClock {
    pub fn new(logs: TimeLogRepository, shifts: ShiftRepository, feed: ChangeFeed) -> Self {
        Self { logs, shifts, feed }
    }

    /// Open a log. Employees clock in for themselves, managers for anyone.
    pub async fn clock_in(
        &self,
        ctx: &RequestContext,
        input: ClockInInput,
    ) -> Result<TimeLog, AppError> {
        let employee_id = input
            .employee_id
            .map(|id| id.trim().to_string())
            .unwrap_or_else(|| ctx.user_id.clone());
        if employee_id.is_empty() {
            return Err(AppError::BadRequest("employeeId is required".to_string()));
        }
        ctx.requires_same_user(&employee_id)?;

        let now = Utc::now();
        let clock_in = input.clock_in.unwrap_or(now);
        if clock_in > now {
            return Err(AppError::BadRequest(
                "clockIn cannot be in the future".to_string(),
            ));
        }

        if let Some(shift_id) = input.shift_id {
            self.check_shift_link(shift_id, &employee_id).await?;
        }

        let log = self
            .logs
            .clock_in(&employee_id, input.shift_id, clock_in)
            .await?
            .ok_or_else(|| {
                AppError::Conflict(format!("{} is already clocked in", employee_id))
            })?;

        log::info!(
            "{} clocked in at {} (log {}, by {})",
            log.employee_id,
            log.clock_in,
            log.id,
            ctx.user_id
        );
        self.feed.publish(ChangeEvent::TimeLogChanged(log.clone()));

        Ok(log)
    }

    /// Close an open log. The clock-out must come after the clock-in.
    pub async fn clock_out(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        input: ClockOutInput,
    ) -> Result<TimeLog, AppError> {
        let log = self.find_log(id).await?;
        ctx.requires_same_user(&log.employee_id)?;

        if log.status == TimeLogStatus::Completed {
            return Err(AppError::InvalidTransition(
                "Time log is already completed".to_string(),
            ));
        }

        let clock_out = input.clock_out.unwrap_or_else(Utc::now);
        if clock_out <= log.clock_in {
            return Err(AppError::BadRequest(
                "clockOut must be after clockIn".to_string(),
            ));
        }

        let closed = self
            .logs
            .clock_out_if_open(id, clock_out)
            .await?
            .ok_or_else(|| {
                AppError::Conflict(format!("Time log {} was closed concurrently", id))
            })?;

        log::info!(
            "{} clocked out at {} (log {}, by {})",
            closed.employee_id,
            clock_out,
            closed.id,
            ctx.user_id
        );
        self.feed.publish(ChangeEvent::TimeLogChanged(closed.clone()));

        Ok(closed)
    }

    pub async fn get_log(&self, ctx: &RequestContext, id: Uuid) -> Result<TimeLog, AppError> {
        let log = self.find_log(id).await?;
        ctx.requires_same_user(&log.employee_id)?;
        Ok(log)
    }

    /// The caller's open log, if they are clocked in.
    pub async fn current_log(&self, ctx: &RequestContext) -> Result<Option<TimeLog>, AppError> {
        Ok(self.logs.find_open_for_employee(&ctx.user_id).await?)
    }

    pub async fn list_logs(
        &self,
        ctx: &RequestContext,
        mut filter: TimeLogFilter,
    ) -> Result<Vec<TimeLog>, AppError> {
        if !ctx.is_manager_or_admin() {
            filter.employee_id = Some(ctx.user_id.clone());
        }
        if let (Some(from), Some(to)) = (filter.from, filter.to) {
            if from >= to {
                return Err(AppError::BadRequest("'from' must be before 'to'".to_string()));
            }
        }

        Ok(self.logs.find_by_filter(&filter).await?)
    }

    async fn check_shift_link(&self, shift_id: Uuid, employee_id: &str) -> Result<(), AppError> {
        let shift = self
            .shifts
            .find_by_id(shift_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Shift not found".to_string()))?;

        if shift.employee_id != employee_id {
            return Err(AppError::BadRequest(format!(
                "Shift {} is not assigned to {}",
                shift_id, employee_id
            )));
        }
        if shift.status.is_terminal() {
            return Err(AppError::InvalidTransition(format!(
                "Cannot clock in against a {} shift",
                shift.status
            )));
        }
        Ok(())
    }

    async fn find_log(&self, id: Uuid) -> Result<TimeLog, AppError> {
        self.logs
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Time log not found".to_string()))
    }
}

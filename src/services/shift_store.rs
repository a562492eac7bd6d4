use uuid::Uuid;

use crate::database::models::{
    NotificationEvent, NotificationTarget, NotificationType, Occurrence, Shift, ShiftFilter,
    ShiftInput, ShiftStatus,
};
use crate::database::repositories::{ShiftRepository, ShiftSwapRepository};
use crate::error::AppError;
use crate::services::change_feed::{ChangeEvent, ChangeFeed};
use crate::services::notification_fanout::NotificationFanout;
use crate::services::user_context::RequestContext;

pub const DEFAULT_OCCURRENCE_LIMIT: usize = 30;
const MAX_OCCURRENCE_LIMIT: usize = 366;

#[derive(Clone)]
pub struct ShiftStore {
    shifts: ShiftRepository,
    swaps: ShiftSwapRepository,
    fanout: NotificationFanout,
    feed: ChangeFeed,
}

impl ShiftStore {
    pub fn new(
        shifts: ShiftRepository,
        swaps: ShiftSwapRepository,
        fanout: NotificationFanout,
        feed: ChangeFeed,
    ) -> Self {
        Self {
            shifts,
            swaps,
            fanout,
            feed,
        }
    }

    /// Create a shift. Employees may only propose their own shifts, which
    /// always start out pending. Replaying a create with the same id returns
    /// the stored shift unchanged.
    pub async fn create_shift(
        &self,
        ctx: &RequestContext,
        input: ShiftInput,
    ) -> Result<Shift, AppError> {
        validate_shift_input(&input)?;

        let status = if ctx.is_manager_or_admin() {
            let status = input.status.unwrap_or(ShiftStatus::Scheduled);
            if !matches!(
                status,
                ShiftStatus::Pending | ShiftStatus::Approved | ShiftStatus::Scheduled
            ) {
                return Err(AppError::BadRequest(format!(
                    "A shift cannot be created as {}",
                    status
                )));
            }
            status
        } else {
            if input.employee_id != ctx.user_id {
                return Err(AppError::Unauthorized(
                    "Employees can only create their own shifts".to_string(),
                ));
            }
            ShiftStatus::Pending
        };

        let id = input.id.unwrap_or_else(Uuid::new_v4);

        let Some(shift) = self.shifts.create_shift(id, &input, status).await? else {
            return self.replayed_create(id, &input).await;
        };

        log::info!(
            "Shift {} created for {} by {} as {}",
            shift.id,
            shift.employee_id,
            ctx.user_id,
            shift.status
        );
        self.feed.publish(ChangeEvent::ShiftChanged(shift.clone()));

        if shift.employee_id != ctx.user_id {
            self.fanout
                .emit(
                    NotificationEvent::new(
                        NotificationTarget::Users(vec![shift.employee_id.clone()]),
                        "New shift assigned",
                        format!(
                            "You have been assigned \"{}\" starting {}",
                            shift.title,
                            shift.start_time.format("%Y-%m-%d %H:%M UTC")
                        ),
                        NotificationType::Info,
                    )
                    .with_event_key(format!("shift:{}:created", shift.id)),
                )
                .await;
        }

        Ok(shift)
    }

    async fn replayed_create(&self, id: Uuid, input: &ShiftInput) -> Result<Shift, AppError> {
        let existing = self
            .shifts
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::Conflict(format!("Shift {} could not be created", id)))?;

        if existing.employee_id != input.employee_id
            || existing.start_time != input.start_time
            || existing.end_time != input.end_time
        {
            return Err(AppError::Conflict(format!(
                "Shift id {} is already used by a different shift",
                id
            )));
        }

        log::debug!("Shift {} create replayed, returning stored copy", id);
        Ok(existing)
    }

    pub async fn get_shift(&self, ctx: &RequestContext, id: Uuid) -> Result<Shift, AppError> {
        let shift = self.find_shift(id).await?;
        ctx.requires_same_user(&shift.employee_id)?;
        Ok(shift)
    }

    pub async fn list_by_employee(
        &self,
        ctx: &RequestContext,
        employee_id: &str,
    ) -> Result<Vec<Shift>, AppError> {
        ctx.requires_same_user(employee_id)?;
        Ok(self.shifts.find_by_employee(employee_id).await?)
    }

    pub async fn list_shifts(
        &self,
        ctx: &RequestContext,
        filter: &ShiftFilter,
    ) -> Result<Vec<Shift>, AppError> {
        ctx.requires_manager()?;

        if let (Some(from), Some(to)) = (filter.from, filter.to) {
            if from >= to {
                return Err(AppError::BadRequest(
                    "'from' must be earlier than 'to'".to_string(),
                ));
            }
        }

        Ok(self.shifts.find_by_filter(filter).await?)
    }

    /// Move a shift to `target`. Setting the status it already has is a
    /// no-op that triggers no side effects.
    pub async fn update_status(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        target: ShiftStatus,
    ) -> Result<Shift, AppError> {
        let shift = self.find_shift(id).await?;

        if !ctx.is_manager_or_admin() {
            if shift.employee_id != ctx.user_id {
                return Err(AppError::Unauthorized(
                    "Cannot update another employee's shift".to_string(),
                ));
            }
            if !matches!(target, ShiftStatus::InProgress | ShiftStatus::Completed) {
                return Err(AppError::Unauthorized(
                    "Employees can only start or complete their shifts".to_string(),
                ));
            }
        }

        if shift.status == target {
            log::debug!("Shift {} already {}", id, target);
            return Ok(shift);
        }

        if !shift.status.can_transition_to(target) {
            return Err(AppError::InvalidTransition(format!(
                "Cannot move shift from {} to {}",
                shift.status, target
            )));
        }

        let Some(updated) = self
            .shifts
            .update_status_if(id, shift.status, target)
            .await?
        else {
            return self.settle_lost_race(id, target).await;
        };

        log::info!(
            "Shift {} moved from {} to {} by {}",
            id,
            shift.status,
            target,
            ctx.user_id
        );
        self.feed.publish(ChangeEvent::ShiftChanged(updated.clone()));

        self.fanout
            .emit(
                NotificationEvent::new(
                    NotificationTarget::Users(vec![updated.employee_id.clone()]),
                    "Shift updated",
                    format!("Your shift \"{}\" is now {}", updated.title, updated.status),
                    notification_type_for(target),
                )
                .with_event_key(format!("shift:{}:status:{}", updated.id, updated.status)),
            )
            .await;

        Ok(updated)
    }

    /// A concurrent writer got there first. Landing on the same target still
    /// counts as success; anything else is a conflict.
    async fn settle_lost_race(&self, id: Uuid, target: ShiftStatus) -> Result<Shift, AppError> {
        match self.shifts.find_by_id(id).await? {
            Some(current) if current.status == target => {
                log::debug!("Shift {} already moved to {} concurrently", id, target);
                Ok(current)
            }
            _ => Err(AppError::Conflict(format!(
                "Shift {} was modified concurrently",
                id
            ))),
        }
    }

    /// Managers only. A shift referenced by a pending swap cannot be removed.
    pub async fn delete_shift(&self, ctx: &RequestContext, id: Uuid) -> Result<(), AppError> {
        ctx.requires_manager()?;
        let shift = self.find_shift(id).await?;

        if self.swaps.has_pending_for_shift(id).await? {
            return Err(AppError::Conflict(
                "Shift has a pending swap request".to_string(),
            ));
        }

        if !self.shifts.delete_shift(id).await? {
            return Err(AppError::NotFound("Shift not found".to_string()));
        }

        log::info!("Shift {} deleted by {}", id, ctx.user_id);
        self.feed.publish(ChangeEvent::ShiftDeleted {
            id,
            employee_id: shift.employee_id,
        });
        Ok(())
    }

    /// Expand the shift's recurrence. A one-off shift yields its own window.
    pub async fn occurrences(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        limit: Option<usize>,
    ) -> Result<Vec<Occurrence>, AppError> {
        let shift = self.get_shift(ctx, id).await?;
        let limit = limit
            .unwrap_or(DEFAULT_OCCURRENCE_LIMIT)
            .clamp(1, MAX_OCCURRENCE_LIMIT);

        let occurrences = match &shift.recurrence {
            Some(recurrence) => recurrence.occurrences(shift.start_time, shift.end_time, limit),
            None => vec![Occurrence {
                start_time: shift.start_time,
                end_time: shift.end_time,
            }],
        };

        Ok(occurrences)
    }

    async fn find_shift(&self, id: Uuid) -> Result<Shift, AppError> {
        self.shifts
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Shift not found".to_string()))
    }
}

fn validate_shift_input(input: &ShiftInput) -> Result<(), AppError> {
    if input.title.trim().is_empty() {
        return Err(AppError::BadRequest("Shift title is required".to_string()));
    }
    if input.employee_id.trim().is_empty() {
        return Err(AppError::BadRequest("employeeId is required".to_string()));
    }
    if input.end_time <= input.start_time {
        return Err(AppError::BadRequest(
            "endTime must be after startTime".to_string(),
        ));
    }
    if let Some(recurrence) = &input.recurrence {
        recurrence.validate().map_err(AppError::BadRequest)?;
    }
    Ok(())
}

fn notification_type_for(status: ShiftStatus) -> NotificationType {
    match status {
        ShiftStatus::Approved | ShiftStatus::Completed => NotificationType::Success,
        ShiftStatus::Rejected | ShiftStatus::Cancelled => NotificationType::Warning,
        _ => NotificationType::Info,
    }
}

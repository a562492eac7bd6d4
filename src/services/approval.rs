use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::database::models::{
    Decision, NotificationEvent, NotificationTarget, NotificationType, RequestFilter, Shift,
    ShiftSwap, ShiftSwapInput, TimeOffRequest, TimeOffRequestInput, UserRole,
};
use crate::database::repositories::{ShiftRepository, ShiftSwapRepository, TimeOffRepository};
use crate::error::AppError;
use crate::services::change_feed::{ChangeEvent, ChangeFeed};
use crate::services::notification_fanout::NotificationFanout;
use crate::services::user_context::RequestContext;

/// Outcome of reviewing a swap. `shift` is the reassigned shift when approved.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapReview {
    pub swap: ShiftSwap,
    pub shift: Option<Shift>,
}

/// Pending -> approved | rejected lifecycle for time-off and swap requests.
#[derive(Clone)]
pub struct ApprovalWorkflow {
    time_off: TimeOffRepository,
    swaps: ShiftSwapRepository,
    shifts: ShiftRepository,
    fanout: NotificationFanout,
    feed: ChangeFeed,
}

impl ApprovalWorkflow {
    pub fn new(
        time_off: TimeOffRepository,
        swaps: ShiftSwapRepository,
        shifts: ShiftRepository,
        fanout: NotificationFanout,
        feed: ChangeFeed,
    ) -> Self {
        Self {
            time_off,
            swaps,
            shifts,
            fanout,
            feed,
        }
    }

    // Time off

    pub async fn submit_time_off(
        &self,
        ctx: &RequestContext,
        input: TimeOffRequestInput,
    ) -> Result<TimeOffRequest, AppError> {
        let employee_id = input
            .employee_id
            .clone()
            .unwrap_or_else(|| ctx.user_id.clone());

        if employee_id != ctx.user_id && !ctx.is_manager_or_admin() {
            return Err(AppError::Unauthorized(
                "Cannot request time off for another employee".to_string(),
            ));
        }
        if input.end_date < input.start_date {
            return Err(AppError::BadRequest(
                "endDate cannot be before startDate".to_string(),
            ));
        }
        let reason = input.reason.trim();
        if reason.is_empty() {
            return Err(AppError::BadRequest("A reason is required".to_string()));
        }

        let request = self
            .time_off
            .create_request(&employee_id, input.start_date, input.end_date, reason)
            .await?;

        log::info!(
            "Time-off request {} submitted for {} ({} to {})",
            request.id,
            request.employee_id,
            request.start_date,
            request.end_date
        );
        self.feed
            .publish(ChangeEvent::TimeOffChanged(request.clone()));

        self.notify_reviewers(
            "New time-off request",
            format!(
                "{} requested time off from {} to {}",
                request.employee_id, request.start_date, request.end_date
            ),
            format!("time_off:{}:submitted", request.id),
        )
        .await;

        Ok(request)
    }

    pub async fn review_time_off(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        decision: Decision,
        notes: Option<&str>,
    ) -> Result<TimeOffRequest, AppError> {
        ctx.requires_manager()?;

        let request = self.find_time_off(id).await?;
        if request.status.is_terminal() {
            return Err(AppError::InvalidTransition(format!(
                "Time-off request is already {}",
                request.status
            )));
        }

        let target = decision.target_status();
        let reviewed = self
            .time_off
            .review_if_pending(id, target, &ctx.user_id, notes)
            .await?
            .ok_or_else(|| {
                AppError::Conflict("Time-off request was reviewed concurrently".to_string())
            })?;

        log::info!(
            "Time-off request {} {} by {}",
            reviewed.id,
            reviewed.status,
            ctx.user_id
        );
        self.feed
            .publish(ChangeEvent::TimeOffChanged(reviewed.clone()));

        let (title, notification_type) = match decision {
            Decision::Approve => ("Time-off approved", NotificationType::Success),
            Decision::Reject => ("Time-off rejected", NotificationType::Warning),
        };
        self.fanout
            .emit(
                NotificationEvent::new(
                    NotificationTarget::Users(vec![reviewed.employee_id.clone()]),
                    title,
                    format!(
                        "Your time-off request from {} to {} was {}",
                        reviewed.start_date, reviewed.end_date, reviewed.status
                    ),
                    notification_type,
                )
                .with_event_key(format!("time_off:{}:{}", reviewed.id, reviewed.status)),
            )
            .await;

        Ok(reviewed)
    }

    /// Owners and managers can withdraw a request while it is still pending.
    pub async fn withdraw_time_off(&self, ctx: &RequestContext, id: Uuid) -> Result<(), AppError> {
        let request = self.find_time_off(id).await?;
        ctx.requires_same_user(&request.employee_id)?;

        if request.status.is_terminal() {
            return Err(AppError::InvalidTransition(format!(
                "Cannot withdraw a request that is already {}",
                request.status
            )));
        }

        if !self.time_off.delete_if_pending(id).await? {
            return Err(AppError::Conflict(
                "Time-off request was reviewed concurrently".to_string(),
            ));
        }

        log::info!("Time-off request {} withdrawn by {}", id, ctx.user_id);
        self.feed.publish(ChangeEvent::TimeOffWithdrawn {
            id,
            employee_id: request.employee_id,
        });
        Ok(())
    }

    pub async fn get_time_off(
        &self,
        ctx: &RequestContext,
        id: Uuid,
    ) -> Result<TimeOffRequest, AppError> {
        let request = self.find_time_off(id).await?;
        ctx.requires_same_user(&request.employee_id)?;
        Ok(request)
    }

    pub async fn list_time_off(
        &self,
        ctx: &RequestContext,
        filter: RequestFilter,
    ) -> Result<Vec<TimeOffRequest>, AppError> {
        let filter = scope_filter(ctx, filter);
        Ok(self.time_off.find_by_filter(&filter).await?)
    }

    // Shift swaps

    pub async fn request_swap(
        &self,
        ctx: &RequestContext,
        input: ShiftSwapInput,
    ) -> Result<ShiftSwap, AppError> {
        let original_employee_id = input
            .original_employee_id
            .clone()
            .unwrap_or_else(|| ctx.user_id.clone());

        if original_employee_id != ctx.user_id && !ctx.is_manager_or_admin() {
            return Err(AppError::Unauthorized(
                "Employees can only offer their own shifts".to_string(),
            ));
        }
        let new_employee_id = input.new_employee_id.trim();
        if new_employee_id.is_empty() {
            return Err(AppError::BadRequest("newEmployeeId is required".to_string()));
        }
        if new_employee_id == original_employee_id {
            return Err(AppError::BadRequest(
                "Cannot swap a shift with the same employee".to_string(),
            ));
        }

        let shift = self
            .shifts
            .find_by_id(input.original_shift_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Shift not found".to_string()))?;

        if shift.employee_id != original_employee_id {
            return Err(AppError::Conflict(format!(
                "Shift is not assigned to {}",
                original_employee_id
            )));
        }
        if shift.status.is_terminal() {
            return Err(AppError::InvalidTransition(format!(
                "Cannot swap a {} shift",
                shift.status
            )));
        }
        if self.swaps.has_pending_for_shift(shift.id).await? {
            return Err(AppError::Conflict(
                "A swap is already pending for this shift".to_string(),
            ));
        }

        let swap = self
            .swaps
            .create_swap(shift.id, &original_employee_id, new_employee_id)
            .await?;

        log::info!(
            "Swap {} requested for shift {}: {} -> {}",
            swap.id,
            shift.id,
            swap.original_employee_id,
            swap.new_employee_id
        );
        self.feed.publish(ChangeEvent::SwapChanged(swap.clone()));

        self.fanout
            .emit(
                NotificationEvent::new(
                    NotificationTarget::Users(vec![swap.new_employee_id.clone()]),
                    "Shift swap requested",
                    format!(
                        "{} asked you to take over \"{}\" on {}",
                        swap.original_employee_id,
                        shift.title,
                        shift.start_time.format("%Y-%m-%d")
                    ),
                    NotificationType::Info,
                )
                .with_event_key(format!("swap:{}:requested", swap.id)),
            )
            .await;
        self.notify_reviewers(
            "Shift swap awaiting review",
            format!(
                "{} wants to hand \"{}\" to {}",
                swap.original_employee_id, shift.title, swap.new_employee_id
            ),
            format!("swap:{}:submitted", swap.id),
        )
        .await;

        Ok(swap)
    }

    /// Review a pending swap. On approval the swap status and the shift's
    /// assignee change in one transaction: either both commit or neither.
    pub async fn review_swap(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        decision: Decision,
        notes: Option<&str>,
    ) -> Result<SwapReview, AppError> {
        ctx.requires_manager()?;

        let mut tx = self.swaps.begin().await?;

        let swap = ShiftSwapRepository::find_by_id_in_tx(&mut tx, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Swap request not found".to_string()))?;

        if swap.status.is_terminal() {
            return Err(AppError::InvalidTransition(format!(
                "Swap request is already {}",
                swap.status
            )));
        }

        let reviewed = ShiftSwapRepository::review_in_tx(
            &mut tx,
            id,
            decision.target_status(),
            &ctx.user_id,
            notes,
        )
        .await?
        .ok_or_else(|| AppError::Conflict("Swap request was reviewed concurrently".to_string()))?;

        let shift = match decision {
            Decision::Approve => {
                let reassigned = ShiftRepository::reassign_in_tx(
                    &mut tx,
                    swap.original_shift_id,
                    &swap.original_employee_id,
                    &swap.new_employee_id,
                )
                .await?;

                let Some(shift) = reassigned else {
                    tx.rollback().await?;
                    log::warn!(
                        "Swap {} not applied: shift {} is no longer assignable from {}",
                        id,
                        swap.original_shift_id,
                        swap.original_employee_id
                    );
                    return Err(AppError::Conflict(format!(
                        "Shift is no longer assigned to {} or has ended; swap left pending",
                        swap.original_employee_id
                    )));
                };
                Some(shift)
            }
            Decision::Reject => None,
        };

        tx.commit().await?;

        log::info!("Swap {} {} by {}", id, reviewed.status, ctx.user_id);
        self.feed.publish(ChangeEvent::SwapChanged(reviewed.clone()));
        if let Some(shift) = &shift {
            self.feed.publish(ChangeEvent::ShiftChanged(shift.clone()));
        }

        let (title, notification_type) = match decision {
            Decision::Approve => ("Shift swap approved", NotificationType::Success),
            Decision::Reject => ("Shift swap rejected", NotificationType::Warning),
        };
        self.fanout
            .emit(
                NotificationEvent::new(
                    NotificationTarget::Users(vec![
                        reviewed.original_employee_id.clone(),
                        reviewed.new_employee_id.clone(),
                    ]),
                    title,
                    format!(
                        "The swap of shift {} from {} to {} was {}",
                        reviewed.original_shift_id,
                        reviewed.original_employee_id,
                        reviewed.new_employee_id,
                        reviewed.status
                    ),
                    notification_type,
                )
                .with_event_key(format!("swap:{}:{}", reviewed.id, reviewed.status)),
            )
            .await;

        Ok(SwapReview {
            swap: reviewed,
            shift,
        })
    }

    pub async fn get_swap(&self, ctx: &RequestContext, id: Uuid) -> Result<ShiftSwap, AppError> {
        let swap = self
            .swaps
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Swap request not found".to_string()))?;

        if !ctx.is_manager_or_admin() && !swap.involves(&ctx.user_id) {
            return Err(AppError::Unauthorized(
                "Cannot access another employee's swap request".to_string(),
            ));
        }
        Ok(swap)
    }

    pub async fn list_swaps(
        &self,
        ctx: &RequestContext,
        filter: RequestFilter,
    ) -> Result<Vec<ShiftSwap>, AppError> {
        let filter = scope_filter(ctx, filter);
        Ok(self.swaps.find_by_filter(&filter).await?)
    }

    async fn find_time_off(&self, id: Uuid) -> Result<TimeOffRequest, AppError> {
        self.time_off
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Time-off request not found".to_string()))
    }

    async fn notify_reviewers(&self, title: &str, message: String, event_key: String) {
        for role in [UserRole::Manager, UserRole::Admin] {
            self.fanout
                .emit(
                    NotificationEvent::new(
                        NotificationTarget::Role(role),
                        title,
                        message.clone(),
                        NotificationType::Info,
                    )
                    .with_event_key(event_key.clone()),
                )
                .await;
        }
    }
}

/// Employees only ever list their own requests.
fn scope_filter(ctx: &RequestContext, mut filter: RequestFilter) -> RequestFilter {
    if !ctx.is_manager_or_admin() {
        filter.employee_id = Some(ctx.user_id.clone());
    }
    filter
}

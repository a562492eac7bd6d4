use serde::Serialize;
use tokio::sync::broadcast::{self, error::RecvError};
use uuid::Uuid;

use crate::database::models::{Notification, Shift, ShiftSwap, TimeLog, TimeOffRequest};
use crate::services::user_context::RequestContext;

/// A committed change, published after the write that caused it.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum ChangeEvent {
    ShiftChanged(Shift),
    #[serde(rename_all = "camelCase")]
    ShiftDeleted {
        id: Uuid,
        employee_id: String,
    },
    TimeOffChanged(TimeOffRequest),
    #[serde(rename_all = "camelCase")]
    TimeOffWithdrawn {
        id: Uuid,
        employee_id: String,
    },
    SwapChanged(ShiftSwap),
    TimeLogChanged(TimeLog),
    NotificationCreated(Notification),
    NotificationRead(Notification),
    #[serde(rename_all = "camelCase")]
    NotificationsCleared {
        user_id: String,
    },
    #[serde(rename_all = "camelCase")]
    NotificationDeleted {
        id: Uuid,
        user_id: String,
    },
}

impl ChangeEvent {
    pub fn name(&self) -> &'static str {
        match self {
            ChangeEvent::ShiftChanged(_) => "shiftChanged",
            ChangeEvent::ShiftDeleted { .. } => "shiftDeleted",
            ChangeEvent::TimeOffChanged(_) => "timeOffChanged",
            ChangeEvent::TimeOffWithdrawn { .. } => "timeOffWithdrawn",
            ChangeEvent::SwapChanged(_) => "swapChanged",
            ChangeEvent::TimeLogChanged(_) => "timeLogChanged",
            ChangeEvent::NotificationCreated(_) => "notificationCreated",
            ChangeEvent::NotificationRead(_) => "notificationRead",
            ChangeEvent::NotificationsCleared { .. } => "notificationsCleared",
            ChangeEvent::NotificationDeleted { .. } => "notificationDeleted",
        }
    }

    /// Inbox events belong to exactly one user, even for managers.
    fn inbox_owner(&self) -> Option<&str> {
        match self {
            ChangeEvent::NotificationCreated(n) | ChangeEvent::NotificationRead(n) => {
                Some(&n.user_id)
            }
            ChangeEvent::NotificationsCleared { user_id }
            | ChangeEvent::NotificationDeleted { user_id, .. } => Some(user_id),
            _ => None,
        }
    }

    fn involves(&self, user_id: &str) -> bool {
        match self {
            ChangeEvent::ShiftChanged(shift) => shift.employee_id == user_id,
            ChangeEvent::ShiftDeleted { employee_id, .. }
            | ChangeEvent::TimeOffWithdrawn { employee_id, .. } => employee_id == user_id,
            ChangeEvent::TimeOffChanged(request) => request.employee_id == user_id,
            ChangeEvent::SwapChanged(swap) => swap.involves(user_id),
            ChangeEvent::TimeLogChanged(log) => log.employee_id == user_id,
            _ => false,
        }
    }

    pub fn is_visible_to(&self, ctx: &RequestContext) -> bool {
        match self.inbox_owner() {
            Some(owner) => owner == ctx.user_id,
            None => ctx.is_manager_or_admin() || self.involves(&ctx.user_id),
        }
    }

    /// Render as a server-sent event frame.
    pub fn to_sse_frame(&self) -> Option<String> {
        match serde_json::to_string(self) {
            Ok(data) => Some(format!("event: {}\ndata: {}\n\n", self.name(), data)),
            Err(err) => {
                log::error!("Failed to serialize {} event: {}", self.name(), err);
                None
            }
        }
    }
}

#[derive(Clone)]
pub struct ChangeFeed {
    sender: broadcast::Sender<ChangeEvent>,
}

impl ChangeFeed {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn publish(&self, event: ChangeEvent) {
        // No live subscribers is the normal case between client sessions
        if let Err(broadcast::error::SendError(event)) = self.sender.send(event) {
            log::trace!("No subscribers for {} event", event.name());
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    pub fn subscribe(&self, ctx: RequestContext) -> ChangeSubscription {
        log::debug!("User {} subscribed to change feed", ctx.user_id);
        ChangeSubscription {
            receiver: self.sender.subscribe(),
            ctx,
        }
    }
}

/// Receiver filtered to the events a single caller may see.
pub struct ChangeSubscription {
    receiver: broadcast::Receiver<ChangeEvent>,
    ctx: RequestContext,
}

impl ChangeSubscription {
    /// Waits for the next visible event. Returns `None` once the feed is gone.
    pub async fn recv(&mut self) -> Option<ChangeEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) if event.is_visible_to(&self.ctx) => return Some(event),
                Ok(_) => continue,
                Err(RecvError::Lagged(skipped)) => {
                    log::warn!(
                        "Change feed subscriber {} lagged, {} events dropped",
                        self.ctx.user_id,
                        skipped
                    );
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    pub async fn next_frame(&mut self) -> Option<String> {
        loop {
            let event = self.recv().await?;
            if let Some(frame) = event.to_sse_frame() {
                return Some(frame);
            }
        }
    }
}

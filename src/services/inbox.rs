use uuid::Uuid;

use crate::database::models::{Notification, UnreadCount};
use crate::database::repositories::NotificationRepository;
use crate::error::AppError;
use crate::services::change_feed::{ChangeEvent, ChangeFeed};
use crate::services::user_context::RequestContext;

const DEFAULT_PAGE_SIZE: i64 = 50;
const MAX_PAGE_SIZE: i64 = 200;

/// Per-user view over stored notifications. Callers only ever see their own.
#[derive(Clone)]
pub struct NotificationInbox {
    notifications: NotificationRepository,
    feed: ChangeFeed,
}

impl NotificationInbox {
    pub fn new(notifications: NotificationRepository, feed: ChangeFeed) -> Self {
        Self {
            notifications,
            feed,
        }
    }

    pub async fn list(
        &self,
        ctx: &RequestContext,
        unread_only: bool,
        limit: Option<i64>,
    ) -> Result<Vec<Notification>, AppError> {
        let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
        let notifications = self
            .notifications
            .find_for_user(&ctx.user_id, unread_only, limit)
            .await?;

        Ok(notifications)
    }

    pub async fn unread_count(&self, ctx: &RequestContext) -> Result<UnreadCount, AppError> {
        let count = self.notifications.unread_count(&ctx.user_id).await?;
        Ok(UnreadCount { count })
    }

    pub async fn mark_as_read(
        &self,
        ctx: &RequestContext,
        id: Uuid,
    ) -> Result<Notification, AppError> {
        let notification = self.find_owned(ctx, id).await?;
        if notification.read {
            return Ok(notification);
        }

        let updated = self
            .notifications
            .mark_as_read(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Notification not found".to_string()))?;

        self.feed
            .publish(ChangeEvent::NotificationRead(updated.clone()));
        Ok(updated)
    }

    /// Returns the number of notifications that changed state.
    pub async fn mark_all_as_read(&self, ctx: &RequestContext) -> Result<u64, AppError> {
        let updated = self.notifications.mark_all_as_read(&ctx.user_id).await?;

        if updated > 0 {
            self.feed.publish(ChangeEvent::NotificationsCleared {
                user_id: ctx.user_id.clone(),
            });
        }
        Ok(updated)
    }

    pub async fn delete(&self, ctx: &RequestContext, id: Uuid) -> Result<(), AppError> {
        let notification = self.find_owned(ctx, id).await?;

        if !self.notifications.delete_notification(id).await? {
            return Err(AppError::NotFound("Notification not found".to_string()));
        }

        self.feed.publish(ChangeEvent::NotificationDeleted {
            id,
            user_id: notification.user_id,
        });
        Ok(())
    }

    async fn find_owned(&self, ctx: &RequestContext, id: Uuid) -> Result<Notification, AppError> {
        let notification = self
            .notifications
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Notification not found".to_string()))?;

        if notification.user_id != ctx.user_id {
            return Err(AppError::Unauthorized(
                "Cannot access another user's notifications".to_string(),
            ));
        }

        Ok(notification)
    }
}

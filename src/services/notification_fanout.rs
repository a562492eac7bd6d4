use std::collections::HashSet;
use std::sync::Arc;

use crate::database::models::{
    FanoutReport, Notification, NotificationEvent, NotificationInput, NotificationTarget,
};
use crate::database::repositories::{NotificationRepository, UserRepository};
use crate::error::AppError;
use crate::services::change_feed::{ChangeEvent, ChangeFeed};
use crate::services::push::{PushMessage, PushTransport};

enum PushOutcome {
    Delivered,
    Failed,
    NoToken,
}

/// Turns one logical event into per-recipient inbox entries and push attempts.
///
/// Every recipient is written independently: a failed insert for one user
/// never prevents the others, and push failures never undo a stored
/// notification.
#[derive(Clone)]
pub struct NotificationFanout {
    users: UserRepository,
    notifications: NotificationRepository,
    push: Arc<dyn PushTransport>,
    feed: ChangeFeed,
}

impl NotificationFanout {
    pub fn new(
        users: UserRepository,
        notifications: NotificationRepository,
        push: Arc<dyn PushTransport>,
        feed: ChangeFeed,
    ) -> Self {
        Self {
            users,
            notifications,
            push,
            feed,
        }
    }

    /// Explicit user lists are taken as given (deduplicated, order kept);
    /// role, department and all-users targets only reach active users.
    pub async fn resolve_recipients(
        &self,
        target: &NotificationTarget,
    ) -> Result<Vec<String>, AppError> {
        let recipients = match target {
            NotificationTarget::Users(ids) => {
                let mut seen = HashSet::new();
                ids.iter()
                    .map(|id| id.trim())
                    .filter(|id| !id.is_empty() && seen.insert(*id))
                    .map(str::to_string)
                    .collect()
            }
            NotificationTarget::Role(role) => self.users.find_active_ids_by_role(*role).await?,
            NotificationTarget::Department(department) => {
                self.users
                    .find_active_ids_by_department(department)
                    .await?
            }
            NotificationTarget::All => self.users.find_active_ids().await?,
        };

        Ok(recipients)
    }

    pub async fn fanout(&self, event: &NotificationEvent) -> Result<FanoutReport, AppError> {
        if event.title.trim().is_empty() || event.message.trim().is_empty() {
            return Err(AppError::BadRequest(
                "Notification title and message are required".to_string(),
            ));
        }

        let recipients = self.resolve_recipients(&event.target).await?;
        let mut report = FanoutReport::default();

        for user_id in recipients {
            let input = NotificationInput {
                user_id: user_id.clone(),
                title: event.title.clone(),
                message: event.message.clone(),
                notification_type: event.notification_type,
                event_key: event.event_key.clone(),
            };

            match self.notifications.create_notification(&input).await {
                Ok(Some(notification)) => {
                    self.feed
                        .publish(ChangeEvent::NotificationCreated(notification.clone()));

                    match self.deliver_push(&notification).await {
                        PushOutcome::Delivered => report.push_delivered += 1,
                        PushOutcome::Failed => report.push_failed += 1,
                        PushOutcome::NoToken => {}
                    }

                    report.notifications.push(notification);
                }
                Ok(None) => {
                    log::debug!(
                        "User {} already notified for event {:?}",
                        user_id,
                        event.event_key
                    );
                    report.skipped_duplicates.push(user_id);
                }
                Err(err) => {
                    log::error!("Failed to store notification for user {}: {}", user_id, err);
                    report.failed_recipients.push(user_id);
                }
            }
        }

        log::info!(
            "Notification '{}' fanned out: {} stored, {} duplicates, {} failed, {} pushed",
            event.title,
            report.notifications.len(),
            report.skipped_duplicates.len(),
            report.failed_recipients.len(),
            report.push_delivered
        );

        Ok(report)
    }

    /// Fan out as a side effect of a committed change. Errors are logged
    /// and swallowed since the triggering mutation already succeeded.
    pub async fn emit(&self, event: NotificationEvent) -> Option<FanoutReport> {
        match self.fanout(&event).await {
            Ok(report) => Some(report),
            Err(err) => {
                log::warn!("Dropped notification '{}': {}", event.title, err);
                None
            }
        }
    }

    async fn deliver_push(&self, notification: &Notification) -> PushOutcome {
        let token = match self.users.find_push_token(&notification.user_id).await {
            Ok(Some(token)) => token,
            Ok(None) => return PushOutcome::NoToken,
            Err(err) => {
                log::warn!(
                    "Could not look up push token for user {}: {}",
                    notification.user_id,
                    err
                );
                return PushOutcome::Failed;
            }
        };

        let message = PushMessage::from(notification);
        match self.push.deliver(&token, &message).await {
            Ok(()) => PushOutcome::Delivered,
            Err(err) => {
                log::warn!(
                    "Push delivery for notification {} to user {} failed: {}",
                    notification.id,
                    notification.user_id,
                    err
                );
                PushOutcome::Failed
            }
        }
    }
}

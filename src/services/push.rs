use async_trait::async_trait;
use serde::Serialize;
use std::collections::HashMap;

use crate::database::models::Notification;
use crate::error::DeliveryFailure;

/// Payload handed to the push transport for one device token.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PushMessage {
    pub title: String,
    pub body: String,
    /// Collapses repeated deliveries of the same notification on the device.
    pub tag: String,
    pub data: HashMap<String, String>,
}

impl From<&Notification> for PushMessage {
    fn from(notification: &Notification) -> Self {
        let mut data = HashMap::new();
        data.insert("notificationId".to_string(), notification.id.to_string());
        data.insert(
            "type".to_string(),
            notification.notification_type.to_string(),
        );

        Self {
            title: notification.title.clone(),
            body: notification.message.clone(),
            tag: notification.id.to_string(),
            data,
        }
    }
}

/// Token-addressed, best-effort push delivery.
#[async_trait]
pub trait PushTransport: Send + Sync {
    async fn deliver(&self, token: &str, message: &PushMessage) -> Result<(), DeliveryFailure>;
}

/// Transport that only records the delivery in the log. Used when no push
/// provider is configured.
#[derive(Debug, Clone, Default)]
pub struct LogPushTransport;

#[async_trait]
impl PushTransport for LogPushTransport {
    async fn deliver(&self, token: &str, message: &PushMessage) -> Result<(), DeliveryFailure> {
        if token.trim().is_empty() {
            return Err(DeliveryFailure::InvalidToken("empty token".to_string()));
        }

        log::info!(
            "Push notification '{}' (tag {}) queued for token {}",
            message.title,
            message.tag,
            token
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::NotificationType;
    use chrono::Utc;
    use uuid::Uuid;

    fn notification() -> Notification {
        Notification {
            id: Uuid::new_v4(),
            user_id: "emp-1".to_string(),
            title: "Shift updated".to_string(),
            message: "Your shift is now approved".to_string(),
            notification_type: NotificationType::Success,
            read: false,
            event_key: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn message_carries_notification_id_and_type() {
        let notification = notification();
        let message = PushMessage::from(&notification);

        assert_eq!(message.tag, notification.id.to_string());
        assert_eq!(
            message.data.get("notificationId"),
            Some(&notification.id.to_string())
        );
        assert_eq!(message.data.get("type").map(String::as_str), Some("success"));
    }

    #[actix_rt::test]
    async fn log_transport_rejects_blank_tokens() {
        let message = PushMessage::from(&notification());

        assert!(LogPushTransport.deliver("device-token", &message).await.is_ok());
        assert!(matches!(
            LogPushTransport.deliver("  ", &message).await,
            Err(DeliveryFailure::InvalidToken(_))
        ));
    }
}

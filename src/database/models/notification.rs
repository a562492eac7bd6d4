use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::macros::string_enum;
use super::user::UserRole;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: Uuid,
    pub user_id: String,
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    pub read: bool,
    pub event_key: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

string_enum! {
    #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
    #[serde(rename_all = "lowercase")]
    pub enum NotificationType {
        #[default]
        Info => "info",
        Warning => "warning",
        Error => "error",
        Success => "success",
    }
}

/// Who receives a fanned-out notification.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum NotificationTarget {
    Users(Vec<String>),
    Role(UserRole),
    Department(String),
    All,
}

/// One logical event to deliver to every resolved recipient.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationEvent {
    pub target: NotificationTarget,
    pub title: String,
    pub message: String,
    #[serde(rename = "type", default)]
    pub notification_type: NotificationType,
    /// Recipients already holding a notification with this key are skipped.
    pub event_key: Option<String>,
}

impl NotificationEvent {
    pub fn new(
        target: NotificationTarget,
        title: impl Into<String>,
        message: impl Into<String>,
        notification_type: NotificationType,
    ) -> Self {
        Self {
            target,
            title: title.into(),
            message: message.into(),
            notification_type,
            event_key: None,
        }
    }

    pub fn with_event_key(mut self, key: impl Into<String>) -> Self {
        self.event_key = Some(key.into());
        self
    }

    /// Moves a caller-supplied key under the `broadcast:` prefix so it can
    /// never collide with keys used by workflow notifications.
    pub fn into_broadcast(mut self) -> Self {
        self.event_key = self
            .event_key
            .take()
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
            .map(|key| format!("broadcast:{}", key));
        self
    }
}

#[derive(Debug, Clone)]
pub struct NotificationInput {
    pub user_id: String,
    pub title: String,
    pub message: String,
    pub notification_type: NotificationType,
    pub event_key: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FanoutReport {
    pub notifications: Vec<Notification>,
    pub skipped_duplicates: Vec<String>,
    pub failed_recipients: Vec<String>,
    pub push_delivered: usize,
    pub push_failed: usize,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnreadCount {
    pub count: i64,
}

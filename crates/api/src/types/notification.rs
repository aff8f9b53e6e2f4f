//! In-app notifications.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shipdesk_core::{NotificationId, UserId};

/// A notification delivered to the current user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    #[serde(rename = "_id", alias = "id")]
    pub id: NotificationId,
    pub message: String,
    #[serde(default, alias = "isRead")]
    pub read: bool,
    pub created_at: DateTime<Utc>,
    /// Recipient; absent for broadcasts.
    #[serde(default, alias = "userId", alias = "recipient")]
    pub user: Option<UserId>,
}

/// Who a notification is addressed to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationScope {
    /// Every user.
    Broadcast,
    /// One user.
    Targeted(UserId),
}

impl Notification {
    /// Recipient scope derived from the `user` field.
    #[must_use]
    pub fn scope(&self) -> NotificationScope {
        self.user
            .clone()
            .map_or(NotificationScope::Broadcast, NotificationScope::Targeted)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SendNotificationBody<'a> {
    pub message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<&'a UserId>,
}

//! Notification inbox and admin broadcast.

use reqwest::Method;
use shipdesk_core::{NotificationId, UserId};
use tracing::instrument;

use crate::cache::{Mutation, Query};
use crate::client::{BackendClient, NO_ARGS};
use crate::error::ApiError;
use crate::types::notification::SendNotificationBody;
use crate::types::{AccessToken, Ack, Data, Notification};

impl BackendClient {
    /// The current user's notifications, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is malformed.
    #[instrument(skip(self, token))]
    pub async fn my_notifications(
        &self,
        token: &AccessToken,
    ) -> Result<Vec<Notification>, ApiError> {
        let envelope: Data<Vec<Notification>> = self
            .cached_get(
                Query::MyNotifications,
                Some(token),
                "notifications/getMynotification",
                NO_ARGS,
            )
            .await?;
        Ok(envelope.data)
    }

    /// Mark a notification as read.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the request.
    #[instrument(skip(self, token), fields(notification_id = %id))]
    pub async fn mark_notification_read(
        &self,
        token: &AccessToken,
        id: &NotificationId,
    ) -> Result<Ack, ApiError> {
        let builder =
            self.request(Method::PUT, &format!("notifications/{id}/read"), Some(token))?;
        self.mutate(Mutation::MarkNotificationRead, builder).await
    }

    /// Send a notification to one user, or to everyone when `user` is `None`
    /// (admin).
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the notification.
    #[instrument(skip(self, token, message))]
    pub async fn send_notification(
        &self,
        token: &AccessToken,
        message: &str,
        user: Option<&UserId>,
    ) -> Result<Ack, ApiError> {
        let builder = self
            .request(Method::POST, "notifications/send", Some(token))?
            .json(&SendNotificationBody {
                message,
                user_id: user,
            });
        self.mutate(Mutation::SendNotification, builder).await
    }
}

//! Customer notifications: the list, read receipts and the live relay.

use std::convert::Infallible;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    response::{
        IntoResponse, Redirect,
        sse::{Event, KeepAlive, Sse},
    },
};
use futures::{Stream, StreamExt};
use shipdesk_api::{Notification, SocketEvent};
use shipdesk_core::NotificationId;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::AppError;
use crate::filters;
use crate::middleware::RequireUser;
use crate::routes::{Layout, flash_outcome, inline};
use crate::state::AppState;

/// Notification list template.
#[derive(Template, WebTemplate)]
#[template(path = "notifications/index.html")]
pub struct NotificationsTemplate {
    pub layout: Layout,
    pub notifications: Vec<Notification>,
    pub unread: usize,
    pub error: Option<String>,
}

/// List my notifications, newest first.
#[instrument(skip_all)]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    RequireUser(user): RequireUser,
) -> Result<impl IntoResponse, AppError> {
    let (mut notifications, error) = match inline(
        state.backend().my_notifications(&user.token).await,
        "تعذر تحميل الإشعارات",
    )? {
        Ok(list) => (list, None),
        Err(message) => (Vec::new(), Some(message)),
    };
    notifications.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    Ok(NotificationsTemplate {
        layout: Layout::load(&session, Some(&user)).await,
        unread: notifications.iter().filter(|n| !n.read).count(),
        notifications,
        error,
    })
}

/// Mark one notification as read.
#[instrument(skip_all, fields(notification_id = %id))]
pub async fn mark_read(
    State(state): State<AppState>,
    session: Session,
    RequireUser(user): RequireUser,
    Path(id): Path<NotificationId>,
) -> Result<Redirect, AppError> {
    let result = state.backend().mark_notification_read(&user.token, &id).await;
    flash_outcome(&session, result, "تم تعليم الإشعار كمقروء", "تعذر تحديث الإشعار").await?;
    Ok(Redirect::to("/notifications"))
}

/// Relay the user's notification socket to the browser as server-sent events.
///
/// Emits `status` events with the connection state and `notification`
/// events carrying the notification as JSON.
pub async fn stream(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    tracing::debug!(user_id = %user.id, "Opening notification relay");

    let events = state
        .backend()
        .listen(&user.token)
        .filter_map(|event| async move { to_sse(&event).map(Ok) });

    Sse::new(events).keep_alive(KeepAlive::default())
}

fn to_sse(event: &SocketEvent) -> Option<Event> {
    match event {
        SocketEvent::State(state) => Some(Event::default().event("status").data(state.as_str())),
        SocketEvent::Notification(notification) => Event::default()
            .event("notification")
            .json_data(notification)
            .inspect_err(|e| tracing::warn!("Failed to encode notification event: {e}"))
            .ok(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use shipdesk_api::ConnectionState;

    use super::*;

    #[test]
    fn test_state_events_are_named_status() {
        let event = to_sse(&SocketEvent::State(ConnectionState::Connected)).unwrap();
        let rendered = format!("{event:?}");
        assert!(rendered.contains("status"));
    }

    #[test]
    fn test_notifications_are_encoded_as_json() {
        let notification: Notification = serde_json::from_value(serde_json::json!({
            "_id": "n1",
            "message": "وصلت شحنتك",
            "read": false,
            "createdAt": "2026-03-01T10:00:00Z"
        }))
        .unwrap();

        assert!(to_sse(&SocketEvent::Notification(notification)).is_some());
    }
}

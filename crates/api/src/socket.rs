//! Notification socket listener.
//!
//! Connects to the backend WebSocket with the session's bearer token and turns
//! JSON text frames into [`SocketEvent`]s. Every state change and notification
//! is also published on the client's event bus, and each notification
//! invalidates the cached notification list.
//!
//! Reconnection is left to the caller: the stream ends when the socket closes.

use futures::{Stream, StreamExt};
use serde::Deserialize;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::http::header::AUTHORIZATION;
use tracing::{debug, info, warn};

use crate::cache::Tag;
use crate::client::BackendClient;
use crate::error::ApiError;
use crate::events::{ClientEvent, ConnectionState};
use crate::types::{AccessToken, Notification};

/// Something observed on the notification socket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SocketEvent {
    /// The connection changed state.
    State(ConnectionState),
    /// A notification was pushed.
    Notification(Notification),
}

/// A decoded text frame. Unknown frame types are ignored.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
enum Frame {
    Notification(Notification),
    #[serde(other)]
    Other,
}

/// Decode one text frame, returning the notification it carries, if any.
///
/// # Errors
///
/// Returns an error if the frame is not valid JSON or a notification frame
/// does not match the notification schema.
pub fn decode_frame(text: &str) -> Result<Option<Notification>, ApiError> {
    match serde_json::from_str::<Frame>(text) {
        Ok(Frame::Notification(notification)) => Ok(Some(notification)),
        Ok(Frame::Other) => Ok(None),
        Err(e) => Err(ApiError::InvalidResponse {
            status: 0,
            detail: format!("socket frame: {e}"),
        }),
    }
}

impl BackendClient {
    /// Open the notification socket and stream what arrives on it.
    ///
    /// The stream starts with [`ConnectionState::Connecting`] and always ends
    /// with [`ConnectionState::Disconnected`].
    pub fn listen(&self, token: &AccessToken) -> impl Stream<Item = SocketEvent> + Send + use<> {
        let client = self.clone();
        let token = token.clone();

        async_stream::stream! {
            let state = ConnectionState::Connecting;
            client.events().publish(ClientEvent::ConnectionChanged(state));
            yield SocketEvent::State(state);

            let socket = match client.connect_socket(&token).await {
                Ok(socket) => socket,
                Err(e) => {
                    warn!(error = %e, "Notification socket connection failed");
                    let state = ConnectionState::Disconnected;
                    client.events().publish(ClientEvent::ConnectionChanged(state));
                    yield SocketEvent::State(state);
                    return;
                }
            };

            info!("Notification socket connected");
            let state = ConnectionState::Connected;
            client.events().publish(ClientEvent::ConnectionChanged(state));
            yield SocketEvent::State(state);

            let (_sink, mut frames) = socket.split();
            while let Some(frame) = frames.next().await {
                match frame {
                    Ok(Message::Text(text)) => match decode_frame(text.as_str()) {
                        Ok(Some(notification)) => {
                            debug!(notification_id = %notification.id, "Notification received");
                            client.invalidate(&[Tag::Notifications]);
                            client
                                .events()
                                .publish(ClientEvent::NotificationReceived(notification.clone()));
                            yield SocketEvent::Notification(notification);
                        }
                        Ok(None) => {}
                        Err(e) => warn!(error = %e, "Dropping undecodable socket frame"),
                    },
                    Ok(Message::Close(_)) => break,
                    Ok(_) => {}
                    Err(e) => {
                        warn!(error = %e, "Notification socket error");
                        break;
                    }
                }
            }

            info!("Notification socket closed");
            let state = ConnectionState::Disconnected;
            client.events().publish(ClientEvent::ConnectionChanged(state));
            yield SocketEvent::State(state);
        }
    }

    async fn connect_socket(
        &self,
        token: &AccessToken,
    ) -> Result<
        tokio_tungstenite::WebSocketStream<
            tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
        >,
        ApiError,
    > {
        let mut request = self
            .socket_url()
            .as_str()
            .into_client_request()
            .map_err(|e| ApiError::Socket(e.to_string()))?;
        let bearer = HeaderValue::from_str(&format!("Bearer {}", token.expose()))
            .map_err(|e| ApiError::Socket(e.to_string()))?;
        request.headers_mut().insert(AUTHORIZATION, bearer);

        let (socket, _response) = connect_async(request)
            .await
            .map_err(|e| ApiError::Socket(e.to_string()))?;
        Ok(socket)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use axum::Router;
    use axum::extract::WebSocketUpgrade;
    use axum::extract::ws::{Message as AxumMessage, WebSocket};
    use axum::http::HeaderMap;
    use axum::routing::get;
    use url::Url;

    use super::*;
    use crate::client::{BackendConfig, tests::serve};

    #[test]
    fn test_decode_notification_frame() {
        let frame = r#"{"type":"notification","data":{"_id":"n1","message":"تم شحن طلبك","createdAt":"2026-03-01T10:00:00Z"}}"#;
        let notification = decode_frame(frame).unwrap().unwrap();
        assert_eq!(notification.message, "تم شحن طلبك");
        assert!(!notification.read);
    }

    #[test]
    fn test_other_frames_are_ignored() {
        assert!(decode_frame(r#"{"type":"ping"}"#).unwrap().is_none());
        assert!(decode_frame("not json").is_err());
    }

    async fn push(mut socket: WebSocket) {
        let frame = r#"{"type":"notification","data":{"_id":"n1","message":"hello","createdAt":"2026-03-01T10:00:00Z"}}"#;
        socket.send(AxumMessage::Text(frame.into())).await.unwrap();
        socket.send(AxumMessage::Close(None)).await.unwrap();
    }

    #[tokio::test]
    async fn test_listen_streams_states_and_notifications() {
        let router = Router::new().route(
            "/socket",
            get(|ws: WebSocketUpgrade, headers: HeaderMap| async move {
                assert_eq!(headers["authorization"], "Bearer tok");
                ws.on_upgrade(push)
            }),
        );
        let base = serve(router).await;
        let mut config = BackendConfig::new(Url::parse(&base).unwrap()).unwrap();
        config.cache_ttl = Duration::from_secs(60);
        let client = BackendClient::new(config);

        let events: Vec<SocketEvent> = tokio::time::timeout(
            Duration::from_secs(5),
            client.listen(&AccessToken::new("tok")).collect(),
        )
        .await
        .unwrap();

        assert_eq!(events.first(), Some(&SocketEvent::State(ConnectionState::Connecting)));
        assert_eq!(events.get(1), Some(&SocketEvent::State(ConnectionState::Connected)));
        assert!(matches!(events.get(2), Some(SocketEvent::Notification(n)) if n.message == "hello"));
        assert_eq!(events.last(), Some(&SocketEvent::State(ConnectionState::Disconnected)));
    }

    #[tokio::test]
    async fn test_unreachable_socket_disconnects() {
        let mut config = BackendConfig::new(Url::parse("http://127.0.0.1:9/api/").unwrap()).unwrap();
        config.cache_ttl = Duration::from_secs(60);
        let client = BackendClient::new(config);

        let events: Vec<SocketEvent> = client.listen(&AccessToken::new("tok")).collect().await;

        assert_eq!(
            events,
            vec![
                SocketEvent::State(ConnectionState::Connecting),
                SocketEvent::State(ConnectionState::Disconnected),
            ]
        );
    }
}

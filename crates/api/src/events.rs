//! Typed event bus between the client and whoever renders its side effects.
//!
//! The client publishes; pages, background tasks and tests subscribe. A
//! publish with no subscribers is not an error.

use tokio::sync::broadcast;

use crate::cache::Tag;
use crate::types::Notification;

/// Default number of events a slow subscriber may lag behind.
pub const DEFAULT_BUS_CAPACITY: usize = 256;

/// State of the notification socket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionState {
    Connecting,
    Connected,
    Disconnected,
}

impl ConnectionState {
    /// Wire name used in server-sent events.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Disconnected => "disconnected",
        }
    }
}

/// Something the client observed that other parts of the app may react to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientEvent {
    /// The backend rejected the bearer token; the user must sign in again.
    TokenError {
        /// The backend's message, verbatim.
        message: String,
    },
    /// A notification arrived over the socket.
    NotificationReceived(Notification),
    /// The notification socket changed state.
    ConnectionChanged(ConnectionState),
    /// A mutation invalidated cached queries.
    Invalidated(Vec<Tag>),
}

/// Broadcast channel carrying [`ClientEvent`]s.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<ClientEvent>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_BUS_CAPACITY)
    }
}

impl EventBus {
    /// Create a bus buffering up to `capacity` events per subscriber.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publish an event to every current subscriber.
    pub fn publish(&self, event: ClientEvent) {
        // An error only means nobody is listening right now.
        let _ = self.sender.send(event);
    }

    /// Subscribe to events published from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ClientEvent> {
        self.sender.subscribe()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_publish_reaches_every_subscriber() {
        let bus = EventBus::default();
        let mut first = bus.subscribe();
        let mut second = bus.subscribe();

        bus.publish(ClientEvent::TokenError {
            message: "Invalid token".to_string(),
        });

        for rx in [&mut first, &mut second] {
            assert_eq!(
                rx.recv().await.unwrap(),
                ClientEvent::TokenError {
                    message: "Invalid token".to_string()
                }
            );
        }
    }

    #[test]
    fn test_publish_without_subscribers_is_silent() {
        EventBus::new(1).publish(ClientEvent::ConnectionChanged(ConnectionState::Connected));
    }
}

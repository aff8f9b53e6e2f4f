//! Application state shared across handlers.

use std::sync::Arc;

use shipdesk_api::{BackendClient, ClientEvent};
use tokio::sync::broadcast::error::RecvError;

use crate::config::WebConfig;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. Holds the configuration and the backend
/// client; the client owns the query cache and the event bus.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: WebConfig,
    backend: BackendClient,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: WebConfig) -> Self {
        let backend = BackendClient::new(config.backend());

        Self {
            inner: Arc::new(AppStateInner { config, backend }),
        }
    }

    /// Get a reference to the web configuration.
    #[must_use]
    pub fn config(&self) -> &WebConfig {
        &self.inner.config
    }

    /// Get a reference to the backend client.
    #[must_use]
    pub fn backend(&self) -> &BackendClient {
        &self.inner.backend
    }

    /// Log every client event until the bus closes.
    ///
    /// Returns the spawned task's handle.
    pub fn spawn_event_logger(&self) -> tokio::task::JoinHandle<()> {
        let mut events = self.backend().events().subscribe();

        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(ClientEvent::TokenError { message }) => {
                        tracing::info!(%message, "Backend rejected a session token");
                    }
                    Ok(ClientEvent::NotificationReceived(notification)) => {
                        tracing::debug!(notification_id = %notification.id, "Notification relayed");
                    }
                    Ok(ClientEvent::ConnectionChanged(state)) => {
                        tracing::debug!(state = state.as_str(), "Notification socket state");
                    }
                    Ok(ClientEvent::Invalidated(tags)) => {
                        tracing::debug!(?tags, "Query cache invalidated");
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Event logger fell behind");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        })
    }
}

//! Session middleware configuration.
//!
//! Sessions live in memory: the only state they hold is the backend token,
//! the wizard draft and pending toasts, all of which the user can recreate by
//! signing in again.

use axum::{extract::Request, middleware::Next, response::Response};
use tower_sessions::{Expiry, MemoryStore, Session, SessionManagerLayer};

use crate::config::WebConfig;
use crate::error::TokenRejected;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "shipdesk_session";

/// Session expiry time in seconds (7 days).
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Create the session layer with an in-memory store.
#[must_use]
pub fn create_session_layer(config: &WebConfig) -> SessionManagerLayer<MemoryStore> {
    SessionManagerLayer::new(MemoryStore::default())
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.is_secure())
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}

/// Flush the session when a handler reports that the backend rejected its
/// token.
///
/// Must run inside the session layer.
pub async fn token_rejection_middleware(request: Request, next: Next) -> Response {
    let session = request.extensions().get::<Session>().cloned();
    let response = next.run(request).await;

    if response.extensions().get::<TokenRejected>().is_some()
        && let Some(session) = session
        && let Err(e) = session.flush().await
    {
        tracing::error!("Failed to flush session after token rejection: {e}");
    }

    response
}

//! Unified error handling for the web app.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use shipdesk_api::ApiError;
use thiserror::Error;

/// Generic text for failures whose details stay in the logs.
pub const GENERIC_ERROR_MESSAGE: &str = "حدث خطأ غير متوقع، حاول مرة أخرى";

/// Response extension marking that the backend rejected the session's token.
///
/// The session middleware flushes the session when it sees this marker.
#[derive(Debug, Clone, Copy)]
pub struct TokenRejected;

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Backend call failed.
    #[error("Backend error: {0}")]
    Api(#[from] ApiError),

    /// Session store failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User lacks permission.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error page template.
#[derive(Template, WebTemplate)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub status: u16,
    pub message: String,
}

/// Redirect to the login page, showing `message`, after a rejected token.
#[must_use]
pub fn token_rejected_response(message: &str) -> Response {
    let target = format!("/auth/login?error={}", urlencoding::encode(message));
    let mut response = Redirect::to(&target).into_response();
    response.extensions_mut().insert(TokenRejected);
    response
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let Self::Api(ApiError::InvalidToken(message)) = &self {
            tracing::info!("Backend rejected session token, signing out");
            return token_rejected_response(message);
        }

        // Log server errors with Sentry
        if matches!(
            self,
            Self::Session(_)
                | Self::Internal(_)
                | Self::Api(ApiError::Http(_) | ApiError::InvalidResponse { .. })
        ) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = match &self {
            Self::Api(e) if e.is_not_found() => StatusCode::NOT_FOUND,
            Self::Api(_) => StatusCode::BAD_GATEWAY,
            Self::Session(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        };

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Api(e) => e.user_message(GENERIC_ERROR_MESSAGE),
            Self::Session(_) | Self::Internal(_) => GENERIC_ERROR_MESSAGE.to_string(),
            Self::NotFound(what) => format!("غير موجود: {what}"),
            Self::Forbidden(_) => "لا تملك صلاحية الوصول إلى هذه الصفحة".to_string(),
            Self::BadRequest(reason) => reason.clone(),
        };

        (
            status,
            ErrorTemplate {
                status: status.as_u16(),
                message,
            },
        )
            .into_response()
    }
}

/// Set the Sentry user context.
pub fn set_sentry_user(user_id: &str, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

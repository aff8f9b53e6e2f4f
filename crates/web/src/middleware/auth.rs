//! Authentication extractors.
//!
//! The backend is the authority on credentials; these extractors only check
//! whether the session holds a signed-in user and, for the dashboard, whether
//! that user is an admin.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::error::{ErrorTemplate, clear_sentry_user, set_sentry_user};
use crate::models::{CurrentUser, session_keys};

/// Extractor that requires a signed-in user.
///
/// Redirects to the login page when the session has no user.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(RequireUser(user): RequireUser) -> impl IntoResponse {
///     format!("مرحباً {}", user.name)
/// }
/// ```
pub struct RequireUser(pub CurrentUser);

/// Extractor that requires a signed-in admin.
pub struct RequireAdmin(pub CurrentUser);

/// Extractor that optionally gets the current user.
pub struct OptionalUser(pub Option<CurrentUser>);

/// Why an auth extractor refused the request.
pub enum AuthRejection {
    /// No session layer or no signed-in user.
    RedirectToLogin,
    /// Signed in, but not an admin.
    Forbidden,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to("/auth/login").into_response(),
            Self::Forbidden => (
                StatusCode::FORBIDDEN,
                ErrorTemplate {
                    status: StatusCode::FORBIDDEN.as_u16(),
                    message: "لوحة التحكم متاحة للمشرفين فقط".to_string(),
                },
            )
                .into_response(),
        }
    }
}

async fn current_user(parts: &Parts) -> Option<CurrentUser> {
    let session = parts.extensions.get::<Session>()?;
    session
        .get::<CurrentUser>(session_keys::CURRENT_USER)
        .await
        .ok()
        .flatten()
}

impl<S> FromRequestParts<S> for RequireUser
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        current_user(parts)
            .await
            .map(Self)
            .ok_or(AuthRejection::RedirectToLogin)
    }
}

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = current_user(parts)
            .await
            .ok_or(AuthRejection::RedirectToLogin)?;

        if !user.is_admin() {
            tracing::warn!(user_id = %user.id, path = %parts.uri.path(), "Non-admin tried the dashboard");
            return Err(AuthRejection::Forbidden);
        }

        Ok(Self(user))
    }
}

impl<S> FromRequestParts<S> for OptionalUser
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(current_user(parts).await))
    }
}

/// Store the signed-in user in the session.
///
/// The session id is rotated to prevent fixation.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::CURRENT_USER, user).await?;
    set_sentry_user(user.id.as_str(), Some(&user.email));
    Ok(())
}

/// Sign out: drop everything in the session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await?;
    clear_sentry_user();
    Ok(())
}

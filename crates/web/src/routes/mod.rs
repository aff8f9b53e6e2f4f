//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                              - Landing page (signed-in users are sent on)
//! GET  /health                        - Health check
//!
//! # Auth
//! GET  /auth/login                    - Login page
//! POST /auth/login                    - Login action
//! GET  /auth/signup                   - Signup page
//! POST /auth/signup                   - Signup action
//! GET  /auth/forgot-password          - Request a reset code
//! POST /auth/forgot-password
//! GET  /auth/verify-code              - Enter the emailed code
//! POST /auth/verify-code
//! GET  /auth/reset-password           - Choose a new password
//! POST /auth/reset-password
//! POST /auth/logout                   - Logout action
//!
//! # Tracking (public)
//! GET  /tracking                      - Tracking form (?number= looks up directly)
//! POST /tracking                      - Look up a tracking number
//!
//! # Shipments (requires user)
//! GET  /shipments                     - My shipments with statistics (?page=&status=)
//! GET  /shipments/new                 - Wizard, current step
//! POST /shipments/new                 - Wizard action (next, back, reset, preset, refresh)
//! GET  /shipments/{id}                - Shipment detail
//! POST /shipments/{id}/cancel         - Cancel a shipment waiting for pickup
//! POST /shipments/{id}/ship-again     - Seed the wizard from this shipment
//!
//! # Addresses (requires user)
//! GET  /addresses                     - Address book
//! GET  /addresses/new                 - New address form
//! POST /addresses                     - Create address
//! GET  /addresses/{id}/edit           - Edit address form
//! POST /addresses/{id}                - Update address
//! POST /addresses/{id}/delete         - Delete address
//!
//! # Wallet (requires user)
//! GET  /wallet                        - Balance and transfer history
//! POST /wallet/transfer               - Submit a bank transfer receipt (multipart)
//!
//! # Notifications (requires user)
//! GET  /notifications                 - My notifications
//! POST /notifications/{id}/read       - Mark one read
//! GET  /notifications/stream          - Live notifications (SSE)
//!
//! # Admin (requires admin)
//! GET  /admin                         - Dashboard statistics
//! GET  /admin/users                   - Users table
//! POST /admin/users/{id}/active       - Toggle active flag
//! POST /admin/users/{id}/role         - Change role
//! POST /admin/users/{id}/delete       - Delete user
//! GET  /admin/shipments               - Shipments table
//! POST /admin/shipments/{id}/status   - Change status
//! POST /admin/shipments/{id}/delete   - Delete shipment
//! GET  /admin/orders                  - Orders table
//! POST /admin/orders/{id}/status      - Approve or reject
//! GET  /admin/wallets                 - Wallets and pending transfers
//! POST /admin/wallets/{id}/balance    - Add balance
//! POST /admin/transfers/{id}/approve  - Approve bank transfer
//! POST /admin/transfers/{id}/reject   - Reject bank transfer
//! GET  /admin/notifications           - Send notification form
//! POST /admin/notifications           - Send broadcast or targeted notification
//! ```

pub mod addresses;
pub mod admin;
pub mod auth;
pub mod home;
pub mod notifications;
pub mod shipments;
pub mod tracking;
pub mod wallet;
pub mod wizard;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use shipdesk_api::{Ack, ApiError};
use tower_sessions::Session;

use crate::error::AppError;
use crate::models::{CurrentUser, Flash};
use crate::state::AppState;

/// Shared page chrome: navigation and the pending toast.
#[derive(Debug, Clone, Default)]
pub struct Layout {
    pub user_name: Option<String>,
    pub is_admin: bool,
    pub flash: Option<Flash>,
}

impl Layout {
    /// Build the chrome for `user`, consuming any pending toast.
    pub async fn load(session: &Session, user: Option<&CurrentUser>) -> Self {
        Self {
            user_name: user.map(|u| u.name.clone()),
            is_admin: user.is_some_and(CurrentUser::is_admin),
            flash: Flash::take(session).await,
        }
    }
}

/// Split a backend failure into one the page shows inline and one that must
/// end the request.
///
/// A rejected token always ends the request so the session is cleared.
pub(crate) fn inline<T>(
    result: Result<T, ApiError>,
    fallback: &str,
) -> Result<Result<T, String>, AppError> {
    match result {
        Ok(value) => Ok(Ok(value)),
        Err(e @ ApiError::InvalidToken(_)) => Err(e.into()),
        Err(e) => {
            tracing::warn!("Backend call failed: {e}");
            Ok(Err(e.user_message(fallback)))
        }
    }
}

/// Turn a mutation's outcome into a toast for the page redirected to.
pub(crate) async fn flash_outcome(
    session: &Session,
    result: Result<Ack, ApiError>,
    success: &str,
    failure: &str,
) -> Result<(), AppError> {
    let flash = match inline(result, failure)? {
        Ok(_) => Flash::success(success),
        Err(message) => Flash::error(message),
    };
    flash.set(session).await;
    Ok(())
}

/// Query string a dashboard form posts back so the redirect lands on the
/// same table page. Anything that is not a query string is dropped.
pub(crate) fn back_to(path: &str, query: &str) -> String {
    if query.starts_with('?') && !query.contains(['\r', '\n']) {
        format!("{path}{query}")
    } else {
        path.to_string()
    }
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/signup", get(auth::signup_page).post(auth::signup))
        .route(
            "/forgot-password",
            get(auth::forgot_password_page).post(auth::forgot_password),
        )
        .route(
            "/verify-code",
            get(auth::verify_code_page).post(auth::verify_code),
        )
        .route(
            "/reset-password",
            get(auth::reset_password_page).post(auth::reset_password),
        )
        .route("/logout", post(auth::logout))
}

/// Create the shipment routes router, including the wizard.
pub fn shipment_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(shipments::index))
        .route("/new", get(wizard::show).post(wizard::act))
        .route("/{id}", get(shipments::show))
        .route("/{id}/cancel", post(shipments::cancel))
        .route("/{id}/ship-again", post(shipments::ship_again))
}

/// Create the address book routes router.
pub fn address_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(addresses::index).post(addresses::create))
        .route("/new", get(addresses::new_address))
        .route("/{id}", post(addresses::update))
        .route("/{id}/edit", get(addresses::edit))
        .route("/{id}/delete", post(addresses::delete))
}

/// Create the wallet routes router.
pub fn wallet_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(wallet::show))
        .route(
            "/transfer",
            post(wallet::submit_transfer).layer(DefaultBodyLimit::max(wallet::MAX_RECEIPT_BYTES)),
        )
}

/// Create the notification routes router.
pub fn notification_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(notifications::index))
        .route("/stream", get(notifications::stream))
        .route("/{id}/read", post(notifications::mark_read))
}

/// Create the admin dashboard routes router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(admin::dashboard::show))
        .route("/users", get(admin::users::index))
        .route("/users/{id}/active", post(admin::users::toggle_active))
        .route("/users/{id}/role", post(admin::users::change_role))
        .route("/users/{id}/delete", post(admin::users::delete))
        .route("/shipments", get(admin::shipments::index))
        .route("/shipments/{id}/status", post(admin::shipments::change_status))
        .route("/shipments/{id}/delete", post(admin::shipments::delete))
        .route("/orders", get(admin::orders::index))
        .route("/orders/{id}/status", post(admin::orders::change_status))
        .route("/wallets", get(admin::wallets::index))
        .route("/wallets/{id}/balance", post(admin::wallets::add_balance))
        .route("/transfers/{id}/approve", post(admin::wallets::approve_transfer))
        .route("/transfers/{id}/reject", post(admin::wallets::reject_transfer))
        .route(
            "/notifications",
            get(admin::notifications::show).post(admin::notifications::send),
        )
}

/// Create all routes for the web app.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .nest("/auth", auth_routes())
        .route("/tracking", get(tracking::show).post(tracking::lookup))
        .nest("/shipments", shipment_routes())
        .nest("/addresses", address_routes())
        .nest("/wallet", wallet_routes())
        .nest("/notifications", notification_routes())
        .nest("/admin", admin_routes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_back_to_keeps_only_query_strings() {
        assert_eq!(back_to("/admin/users", "?page=2"), "/admin/users?page=2");
        assert_eq!(back_to("/admin/users", ""), "/admin/users");
        assert_eq!(back_to("/admin/users", "//evil.example"), "/admin/users");
        assert_eq!(back_to("/admin/users", "?a\r\nSet-Cookie: x"), "/admin/users");
    }
}

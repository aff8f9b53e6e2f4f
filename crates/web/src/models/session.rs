//! Session-related types.
//!
//! Types stored in the session for authentication state.

use serde::{Deserialize, Serialize};
use shipdesk_api::{AccessToken, User};
use shipdesk_core::{UserId, UserRole};

/// Session-stored user identity.
///
/// Holds the backend's bearer token; every backend call made on the user's
/// behalf uses it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// Backend user id.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Account role.
    pub role: UserRole,
    /// Bearer token issued at login.
    pub token: AccessToken,
}

impl CurrentUser {
    /// Build the session identity from a login response.
    #[must_use]
    pub fn new(user: &User, token: AccessToken) -> Self {
        Self {
            id: user.id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
            token,
        }
    }

    /// Whether the user may use the admin dashboard.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

/// Session keys.
pub mod keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for the in-progress shipment wizard.
    pub const SHIPMENT_WIZARD: &str = "shipment_wizard";

    /// Key for the one-shot draft that seeds the next fresh wizard.
    pub const SHIPMENT_PREFILL: &str = "shipment_prefill";

    /// Key for the toast shown on the next rendered page.
    pub const FLASH: &str = "flash";

    /// Key for the email address going through password reset.
    pub const RESET_EMAIL: &str = "reset_email";

    /// Key for the verified password-reset code.
    pub const RESET_CODE: &str = "reset_code";
}

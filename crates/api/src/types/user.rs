//! User accounts as seen by the customer portal and the admin dashboard.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shipdesk_core::{Money, UserId, UserRole};

use super::address::ClientAddress;

/// A user account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id", alias = "id")]
    pub id: UserId,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub role: UserRole,
    #[serde(default = "active_by_default", alias = "isActive")]
    pub active: bool,
    #[serde(default, alias = "balance")]
    pub wallet_balance: Money,
    #[serde(default)]
    pub addresses: Vec<ClientAddress>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

const fn active_by_default() -> bool {
    true
}

impl User {
    /// Whether the account has admin rights.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

#[derive(Serialize)]
pub(crate) struct UserStatusBody {
    pub active: bool,
}

#[derive(Serialize)]
pub(crate) struct UserRoleBody {
    pub role: UserRole,
}

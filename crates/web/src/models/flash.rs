//! One-shot toast messages carried across a redirect.

use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use super::session::keys;

/// Toast style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashKind {
    Success,
    Error,
}

impl FlashKind {
    /// CSS class suffix.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

/// A toast stored in the session until the next page renders it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub kind: FlashKind,
    pub message: String,
}

impl Flash {
    /// A success toast.
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Success,
            message: message.into(),
        }
    }

    /// An error toast.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Error,
            message: message.into(),
        }
    }

    /// Store this toast for the next page.
    pub async fn set(self, session: &Session) {
        if let Err(e) = session.insert(keys::FLASH, self).await {
            tracing::error!("Failed to store flash message: {e}");
        }
    }

    /// Take the pending toast, if any.
    pub async fn take(session: &Session) -> Option<Self> {
        session.remove::<Self>(keys::FLASH).await.ok().flatten()
    }
}

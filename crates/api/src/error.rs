//! Errors returned by the backend client.

use std::sync::Arc;

use thiserror::Error;

/// Shown when the backend answers with an empty or unreadable body.
pub const INVALID_RESPONSE_MESSAGE: &str = "أعاد الخادم استجابة غير صالحة";

/// Errors that can occur when talking to the shipping backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed before a response arrived.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A transport failure shared by several coalesced callers.
    #[error("Request failed: {0}")]
    Transport(String),

    /// The backend answered with a non-success status.
    #[error("Backend rejected request ({status}): {}", message.as_deref().unwrap_or("no message"))]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// The `message` field of the error body, when present.
        message: Option<String>,
    },

    /// The backend reported that the bearer token is invalid or expired.
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// The body was empty, not JSON, or did not match the expected schema.
    #[error("Invalid response ({status}): {detail}")]
    InvalidResponse {
        /// HTTP status code.
        status: u16,
        /// What failed to parse.
        detail: String,
    },

    /// A configured or derived URL is malformed.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// The notification socket failed.
    #[error("Socket error: {0}")]
    Socket(String),
}

impl ApiError {
    /// User-facing text for this error.
    ///
    /// Prefers the backend's own message, uses a generic text for unreadable
    /// responses, and falls back to `fallback` otherwise.
    #[must_use]
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Rejected {
                message: Some(message),
                ..
            } if !message.trim().is_empty() => message.clone(),
            Self::InvalidToken(message) => message.clone(),
            Self::InvalidResponse { .. } => INVALID_RESPONSE_MESSAGE.to_string(),
            _ => fallback.to_string(),
        }
    }

    /// Whether the backend answered 404.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::Rejected { status: 404, .. })
    }

    /// Recover an owned error from one shared between coalesced cache callers.
    pub(crate) fn from_shared(shared: Arc<Self>) -> Self {
        Arc::try_unwrap(shared).unwrap_or_else(|shared| match shared.as_ref() {
            Self::Rejected { status, message } => Self::Rejected {
                status: *status,
                message: message.clone(),
            },
            Self::InvalidToken(message) => Self::InvalidToken(message.clone()),
            Self::InvalidResponse { status, detail } => Self::InvalidResponse {
                status: *status,
                detail: detail.clone(),
            },
            other => Self::Transport(other.to_string()),
        })
    }
}

/// Whether a backend error message signals a rejected bearer token.
#[must_use]
pub fn is_invalid_token_message(message: &str) -> bool {
    message.to_ascii_lowercase().contains("invalid token")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_prefers_server_text() {
        let err = ApiError::Rejected {
            status: 422,
            message: Some("الرصيد غير كافٍ".to_string()),
        };
        assert_eq!(err.user_message("fallback"), "الرصيد غير كافٍ");
    }

    #[test]
    fn test_user_message_fallbacks() {
        let err = ApiError::Rejected {
            status: 500,
            message: None,
        };
        assert_eq!(err.user_message("fallback"), "fallback");

        let err = ApiError::InvalidResponse {
            status: 200,
            detail: "empty body".to_string(),
        };
        assert_eq!(err.user_message("fallback"), INVALID_RESPONSE_MESSAGE);
    }

    #[test]
    fn test_invalid_token_detection() {
        assert!(is_invalid_token_message("Invalid token"));
        assert!(is_invalid_token_message("jwt: invalid Token provided"));
        assert!(!is_invalid_token_message("Token expired soon"));
    }

    #[test]
    fn test_from_shared_keeps_variant() {
        let shared = Arc::new(ApiError::InvalidToken("Invalid token".to_string()));
        let _other_holder = Arc::clone(&shared);
        assert!(matches!(
            ApiError::from_shared(shared),
            ApiError::InvalidToken(m) if m == "Invalid token"
        ));
    }
}

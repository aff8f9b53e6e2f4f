//! Authentication request and response types.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::user::User;

/// Bearer token issued by the backend at login.
///
/// Stored in the user's server-side session and attached to every request.
/// `Debug` output is redacted.
#[derive(Clone)]
pub struct AccessToken(SecretString);

impl AccessToken {
    /// Wrap a raw token.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(SecretString::from(token.into()))
    }

    /// The raw token, for the `Authorization` header.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AccessToken([REDACTED])")
    }
}

// Sessions are stored server-side, so the token is serialized in the clear.
impl Serialize for AccessToken {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.expose())
    }
}

impl<'de> Deserialize<'de> for AccessToken {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::new)
    }
}

/// Successful login: a token plus the user's profile.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: AccessToken,
    pub user: User,
}

#[derive(Serialize)]
pub(crate) struct LoginBody<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Fields submitted on the signup form.
#[derive(Debug, Clone)]
pub struct Signup {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password: SecretString,
}

#[derive(Serialize)]
pub(crate) struct SignupBody<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub phone: &'a str,
    pub password: &'a str,
}

impl<'a> From<&'a Signup> for SignupBody<'a> {
    fn from(signup: &'a Signup) -> Self {
        Self {
            name: &signup.name,
            email: &signup.email,
            phone: &signup.phone,
            password: signup.password.expose_secret(),
        }
    }
}

#[derive(Serialize)]
pub(crate) struct ForgotPasswordBody<'a> {
    pub email: &'a str,
}

#[derive(Serialize)]
pub(crate) struct VerifyCodeBody<'a> {
    pub email: &'a str,
    pub code: &'a str,
}

#[derive(Serialize)]
pub(crate) struct ResetPasswordBody<'a> {
    pub email: &'a str,
    pub code: &'a str,
    pub password: &'a str,
}

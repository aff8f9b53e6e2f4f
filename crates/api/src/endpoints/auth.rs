//! Signup, login and the password-reset flow.
//!
//! None of these carry a bearer token; login is where the token comes from.

use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};
use tracing::instrument;

use crate::client::BackendClient;
use crate::error::ApiError;
use crate::types::auth::{
    ForgotPasswordBody, LoginBody, ResetPasswordBody, SignupBody, VerifyCodeBody,
};
use crate::types::{Ack, LoginResponse, Signup};

impl BackendClient {
    /// Create an account.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the signup.
    #[instrument(skip(self, signup), fields(email = %signup.email))]
    pub async fn signup(&self, signup: &Signup) -> Result<Ack, ApiError> {
        let request = self
            .request(Method::POST, "auth/signup", None)?
            .json(&SignupBody::from(signup));
        self.send(request).await
    }

    /// Exchange credentials for a bearer token and the user's profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the credentials are rejected.
    #[instrument(skip(self, password))]
    pub async fn login(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<LoginResponse, ApiError> {
        let request = self.request(Method::POST, "auth/login", None)?.json(&LoginBody {
            email,
            password: password.expose_secret(),
        });
        self.send(request).await
    }

    /// Ask the backend to email a password-reset code.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the request.
    #[instrument(skip(self))]
    pub async fn forgot_password(&self, email: &str) -> Result<Ack, ApiError> {
        let request = self
            .request(Method::POST, "auth/forgotpassword", None)?
            .json(&ForgotPasswordBody { email });
        self.send(request).await
    }

    /// Check a password-reset code.
    ///
    /// # Errors
    ///
    /// Returns an error if the code is wrong or expired.
    #[instrument(skip(self, code))]
    pub async fn verify_reset_code(&self, email: &str, code: &str) -> Result<Ack, ApiError> {
        // The backend route really is spelled "verfiypassword".
        let request = self
            .request(Method::POST, "auth/verfiypassword", None)?
            .json(&VerifyCodeBody { email, code });
        self.send(request).await
    }

    /// Set a new password using a verified reset code.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the reset.
    #[instrument(skip(self, code, password))]
    pub async fn reset_password(
        &self,
        email: &str,
        code: &str,
        password: &SecretString,
    ) -> Result<Ack, ApiError> {
        let request = self
            .request(Method::PUT, "auth/resetpassword", None)?
            .json(&ResetPasswordBody {
                email,
                code,
                password: password.expose_secret(),
            });
        self.send(request).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::Json;
    use axum::Router;
    use axum::routing::post;
    use serde_json::{Value, json};

    use crate::client::tests::{client_for, serve};

    #[tokio::test]
    async fn test_login_returns_token_and_profile() {
        let router = Router::new().route(
            "/api/auth/login",
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body["email"], "noura@example.com");
                assert_eq!(body["password"], "hunter22");
                Json(json!({
                    "token": "tok-1",
                    "user": {"_id": "u1", "name": "Noura", "email": "noura@example.com"}
                }))
            }),
        );
        let client = client_for(&serve(router).await);

        let response = client
            .login("noura@example.com", &"hunter22".to_string().into())
            .await
            .unwrap();

        assert_eq!(response.token.expose(), "tok-1");
        assert!(!response.user.is_admin());
    }
}

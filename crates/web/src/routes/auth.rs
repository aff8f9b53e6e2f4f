//! Authentication route handlers.
//!
//! Credentials are checked by the backend. These handlers forward the forms,
//! keep the returned token in the session, and walk the three-step password
//! reset (email, code, new password).

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use secrecy::SecretString;
use serde::Deserialize;
use shipdesk_api::Signup;
use shipdesk_core::{FieldErrors, validation::Validate};
use tower_sessions::Session;

use crate::error::AppError;
use crate::filters;
use crate::middleware::{clear_current_user, set_current_user};
use crate::models::{CurrentUser, session_keys};
use crate::routes::Layout;
use crate::state::AppState;

const MIN_PASSWORD_LEN: usize = 6;
const PASSWORD_LENGTH_MESSAGE: &str = "كلمة المرور يجب أن تكون 6 أحرف على الأقل";
const PASSWORD_MISMATCH_MESSAGE: &str = "كلمتا المرور غير متطابقتين";

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Signup form data.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SignupForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    pub password_confirm: String,
}

impl Validate for SignupForm {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.require("name", &self.name);
        errors.require_email("email", &self.email);
        errors.require_phone("phone", &self.phone);
        check_new_password(&mut errors, &self.password, &self.password_confirm);
        errors.into_result()
    }
}

/// Forgot password form data.
#[derive(Debug, Deserialize)]
pub struct ForgotPasswordForm {
    pub email: String,
}

/// Reset code form data.
#[derive(Debug, Deserialize)]
pub struct VerifyCodeForm {
    pub code: String,
}

/// New password form data.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ResetPasswordForm {
    pub password: String,
    pub password_confirm: String,
}

impl Validate for ResetPasswordForm {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        check_new_password(&mut errors, &self.password, &self.password_confirm);
        errors.into_result()
    }
}

fn check_new_password(errors: &mut FieldErrors, password: &str, confirm: &str) {
    errors.require("password", password);
    if !password.is_empty() && password.chars().count() < MIN_PASSWORD_LEN {
        errors.insert("password", PASSWORD_LENGTH_MESSAGE);
    }
    if password != confirm {
        errors.insert("password_confirm", PASSWORD_MISMATCH_MESSAGE);
    }
}

// =============================================================================
// Query Types
// =============================================================================

/// Query parameters for error/success display.
#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
    pub success: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub layout: Layout,
    pub email: String,
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Signup page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/signup.html")]
pub struct SignupTemplate {
    pub layout: Layout,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub errors: FieldErrors,
    pub error: Option<String>,
}

/// Forgot password page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/forgot_password.html")]
pub struct ForgotPasswordTemplate {
    pub layout: Layout,
    pub error: Option<String>,
}

/// Reset code page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/verify_code.html")]
pub struct VerifyCodeTemplate {
    pub layout: Layout,
    pub email: String,
    pub error: Option<String>,
}

/// New password page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/reset_password.html")]
pub struct ResetPasswordTemplate {
    pub layout: Layout,
    pub errors: FieldErrors,
    pub error: Option<String>,
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page.
pub async fn login_page(session: Session, Query(query): Query<MessageQuery>) -> impl IntoResponse {
    LoginTemplate {
        layout: Layout::load(&session, None).await,
        email: String::new(),
        error: query.error,
        success: query.success,
    }
}

/// Handle login form submission.
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    let email = form.email.trim().to_string();
    let password = SecretString::from(form.password);

    match state.backend().login(&email, &password).await {
        Ok(login) => {
            let user = CurrentUser::new(&login.user, login.token);
            set_current_user(&session, &user).await?;
            tracing::info!(user_id = %user.id, "User signed in");

            let target = if user.is_admin() { "/admin" } else { "/shipments" };
            Ok(Redirect::to(target).into_response())
        }
        Err(e) => {
            tracing::warn!("Login failed: {e}");
            Ok((
                StatusCode::UNAUTHORIZED,
                LoginTemplate {
                    layout: Layout::load(&session, None).await,
                    email,
                    error: Some(e.user_message("تعذر تسجيل الدخول، تحقق من البيانات")),
                    success: None,
                },
            )
                .into_response())
        }
    }
}

/// Handle logout.
pub async fn logout(session: Session) -> Result<Redirect, AppError> {
    clear_current_user(&session).await?;
    Ok(Redirect::to("/auth/login"))
}

// =============================================================================
// Signup Routes
// =============================================================================

/// Display the signup page.
pub async fn signup_page(session: Session) -> impl IntoResponse {
    SignupTemplate {
        layout: Layout::load(&session, None).await,
        name: String::new(),
        email: String::new(),
        phone: String::new(),
        errors: FieldErrors::new(),
        error: None,
    }
}

/// Handle signup form submission.
pub async fn signup(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<SignupForm>,
) -> Response {
    let (errors, error) = match form.validate() {
        Err(errors) => (errors, None),
        Ok(()) => {
            let signup = Signup {
                name: form.name.trim().to_string(),
                email: form.email.trim().to_string(),
                phone: form.phone.trim().to_string(),
                password: SecretString::from(form.password.clone()),
            };
            match state.backend().signup(&signup).await {
                Ok(_) => {
                    let target = format!(
                        "/auth/login?success={}",
                        urlencoding::encode("تم إنشاء الحساب، يمكنك تسجيل الدخول الآن")
                    );
                    return Redirect::to(&target).into_response();
                }
                Err(e) => {
                    tracing::warn!("Signup failed: {e}");
                    (FieldErrors::new(), Some(e.user_message("تعذر إنشاء الحساب")))
                }
            }
        }
    };

    (
        StatusCode::UNPROCESSABLE_ENTITY,
        SignupTemplate {
            layout: Layout::load(&session, None).await,
            name: form.name,
            email: form.email,
            phone: form.phone,
            errors,
            error,
        },
    )
        .into_response()
}

// =============================================================================
// Password Reset Routes
// =============================================================================

/// Display the forgot password page.
pub async fn forgot_password_page(session: Session) -> impl IntoResponse {
    ForgotPasswordTemplate {
        layout: Layout::load(&session, None).await,
        error: None,
    }
}

/// Ask the backend to email a reset code.
pub async fn forgot_password(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<ForgotPasswordForm>,
) -> Result<Response, AppError> {
    let email = form.email.trim().to_string();
    if let Err(e) = state.backend().forgot_password(&email).await {
        tracing::warn!("Forgot password failed: {e}");
        return Ok(ForgotPasswordTemplate {
            layout: Layout::load(&session, None).await,
            error: Some(e.user_message("تعذر إرسال رمز التحقق")),
        }
        .into_response());
    }

    session.insert(session_keys::RESET_EMAIL, &email).await?;
    Ok(Redirect::to("/auth/verify-code").into_response())
}

/// Display the code entry page.
pub async fn verify_code_page(session: Session) -> Result<Response, AppError> {
    let Some(email) = session.get::<String>(session_keys::RESET_EMAIL).await? else {
        return Ok(Redirect::to("/auth/forgot-password").into_response());
    };

    Ok(VerifyCodeTemplate {
        layout: Layout::load(&session, None).await,
        email,
        error: None,
    }
    .into_response())
}

/// Check the emailed code with the backend.
pub async fn verify_code(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<VerifyCodeForm>,
) -> Result<Response, AppError> {
    let Some(email) = session.get::<String>(session_keys::RESET_EMAIL).await? else {
        return Ok(Redirect::to("/auth/forgot-password").into_response());
    };

    let code = form.code.trim().to_string();
    if let Err(e) = state.backend().verify_reset_code(&email, &code).await {
        tracing::warn!("Reset code rejected: {e}");
        return Ok(VerifyCodeTemplate {
            layout: Layout::load(&session, None).await,
            email,
            error: Some(e.user_message("رمز التحقق غير صحيح")),
        }
        .into_response());
    }

    session.insert(session_keys::RESET_CODE, &code).await?;
    Ok(Redirect::to("/auth/reset-password").into_response())
}

/// Display the new password page.
pub async fn reset_password_page(session: Session) -> Result<Response, AppError> {
    if session.get::<String>(session_keys::RESET_CODE).await?.is_none() {
        return Ok(Redirect::to("/auth/forgot-password").into_response());
    }

    Ok(ResetPasswordTemplate {
        layout: Layout::load(&session, None).await,
        errors: FieldErrors::new(),
        error: None,
    }
    .into_response())
}

/// Set the new password.
pub async fn reset_password(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<ResetPasswordForm>,
) -> Result<Response, AppError> {
    let email = session.get::<String>(session_keys::RESET_EMAIL).await?;
    let code = session.get::<String>(session_keys::RESET_CODE).await?;
    let (Some(email), Some(code)) = (email, code) else {
        return Ok(Redirect::to("/auth/forgot-password").into_response());
    };

    let (errors, error) = match form.validate() {
        Err(errors) => (errors, None),
        Ok(()) => {
            let password = SecretString::from(form.password);
            match state.backend().reset_password(&email, &code, &password).await {
                Ok(_) => {
                    session.remove::<String>(session_keys::RESET_EMAIL).await?;
                    session.remove::<String>(session_keys::RESET_CODE).await?;
                    let target = format!(
                        "/auth/login?success={}",
                        urlencoding::encode("تم تغيير كلمة المرور بنجاح")
                    );
                    return Ok(Redirect::to(&target).into_response());
                }
                Err(e) => {
                    tracing::warn!("Password reset failed: {e}");
                    (FieldErrors::new(), Some(e.user_message("تعذر تغيير كلمة المرور")))
                }
            }
        }
    };

    Ok((
        StatusCode::UNPROCESSABLE_ENTITY,
        ResetPasswordTemplate {
            layout: Layout::load(&session, None).await,
            errors,
            error,
        },
    )
        .into_response())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use shipdesk_core::validation::{EMAIL_MESSAGE, REQUIRED_MESSAGE};

    use super::*;

    #[test]
    fn test_signup_reports_every_field() {
        let form = SignupForm {
            email: "nope".to_string(),
            password: "abc".to_string(),
            password_confirm: "abd".to_string(),
            ..SignupForm::default()
        };

        let errors = form.validate().unwrap_err();

        assert_eq!(errors.get("name"), Some(REQUIRED_MESSAGE));
        assert_eq!(errors.get("email"), Some(EMAIL_MESSAGE));
        assert_eq!(errors.get("phone"), Some(REQUIRED_MESSAGE));
        assert_eq!(errors.get("password"), Some(PASSWORD_LENGTH_MESSAGE));
        assert_eq!(errors.get("password_confirm"), Some(PASSWORD_MISMATCH_MESSAGE));
    }

    #[test]
    fn test_reset_password_accepts_matching_passwords() {
        let form = ResetPasswordForm {
            password: "s3cret-pass".to_string(),
            password_confirm: "s3cret-pass".to_string(),
        };
        assert!(form.validate().is_ok());
    }
}

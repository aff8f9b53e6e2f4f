//! Sending notifications to everyone or to one user.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use shipdesk_core::{FieldErrors, UserId, validation::Validate};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::AppError;
use crate::filters;
use crate::middleware::RequireAdmin;
use crate::models::Flash;
use crate::routes::{Layout, inline};
use crate::state::AppState;

/// Notification form data. A blank `user_id` broadcasts.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SendForm {
    pub message: String,
    pub user_id: String,
}

impl SendForm {
    fn recipient(&self) -> Option<UserId> {
        let id = self.user_id.trim();
        (!id.is_empty()).then(|| UserId::new(id))
    }
}

impl Validate for SendForm {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.require("message", &self.message);
        errors.into_result()
    }
}

/// Send notification page template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/notifications.html")]
pub struct SendTemplate {
    pub layout: Layout,
    pub form: SendForm,
    pub errors: FieldErrors,
    pub error: Option<String>,
}

/// Display the send form.
pub async fn show(session: Session, RequireAdmin(admin): RequireAdmin) -> impl IntoResponse {
    SendTemplate {
        layout: Layout::load(&session, Some(&admin)).await,
        form: SendForm::default(),
        errors: FieldErrors::new(),
        error: None,
    }
}

/// Send a broadcast or targeted notification.
#[instrument(skip_all)]
pub async fn send(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(admin): RequireAdmin,
    Form(form): Form<SendForm>,
) -> Result<Response, AppError> {
    let (errors, error) = match form.validate() {
        Err(errors) => (errors, None),
        Ok(()) => {
            let recipient = form.recipient();
            let result = state
                .backend()
                .send_notification(&admin.token, form.message.trim(), recipient.as_ref())
                .await;
            match inline(result, "تعذر إرسال الإشعار")? {
                Ok(_) => {
                    let message = if recipient.is_some() {
                        "تم إرسال الإشعار للمستخدم"
                    } else {
                        "تم إرسال الإشعار لجميع المستخدمين"
                    };
                    Flash::success(message).set(&session).await;
                    return Ok(Redirect::to("/admin/notifications").into_response());
                }
                Err(message) => (FieldErrors::new(), Some(message)),
            }
        }
    };

    Ok((
        StatusCode::UNPROCESSABLE_ENTITY,
        SendTemplate {
            layout: Layout::load(&session, Some(&admin)).await,
            form,
            errors,
            error,
        },
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_user_id_broadcasts() {
        let form = SendForm {
            message: "صيانة مجدولة".to_string(),
            user_id: "  ".to_string(),
        };
        assert!(form.recipient().is_none());
        assert!(form.validate().is_ok());
    }

    #[test]
    fn test_message_is_required() {
        let form = SendForm {
            message: String::new(),
            user_id: "u1".to_string(),
        };
        assert_eq!(form.recipient(), Some(UserId::new("u1")));
        assert!(form.validate().is_err());
    }
}

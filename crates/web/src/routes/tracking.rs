//! Public tracking lookup.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use shipdesk_api::TrackingResult;
use tower_sessions::Session;

use crate::error::AppError;
use crate::filters;
use crate::middleware::OptionalUser;
use crate::routes::{Layout, inline};
use crate::state::AppState;

/// Tracking form data, also accepted as `?number=`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TrackingForm {
    pub number: String,
}

/// Tracking page template.
#[derive(Template, WebTemplate)]
#[template(path = "tracking/show.html")]
pub struct TrackingTemplate {
    pub layout: Layout,
    pub number: String,
    pub result: Option<TrackingResult>,
    pub error: Option<String>,
}

/// Display the tracking form, looking up `?number=` when present.
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    user: OptionalUser,
    Query(form): Query<TrackingForm>,
) -> Result<Response, AppError> {
    render(&state, &session, user, form.number).await
}

/// Handle the tracking form.
pub async fn lookup(
    State(state): State<AppState>,
    session: Session,
    user: OptionalUser,
    Form(form): Form<TrackingForm>,
) -> Result<Response, AppError> {
    render(&state, &session, user, form.number).await
}

async fn render(
    state: &AppState,
    session: &Session,
    OptionalUser(user): OptionalUser,
    number: String,
) -> Result<Response, AppError> {
    let number = number.trim().to_string();
    let mut template = TrackingTemplate {
        layout: Layout::load(session, user.as_ref()).await,
        number,
        result: None,
        error: None,
    };

    if !template.number.is_empty() {
        let token = user.as_ref().map(|u| &u.token);
        match inline(
            state.backend().track(token, &template.number).await,
            "لم يتم العثور على شحنة بهذا الرقم",
        )? {
            Ok(result) => template.result = Some(result),
            Err(message) => template.error = Some(message),
        }
    }

    Ok(template.into_response())
}

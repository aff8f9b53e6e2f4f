//! Landing page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::response::{IntoResponse, Redirect, Response};
use tower_sessions::Session;

use crate::filters;
use crate::middleware::OptionalUser;
use crate::routes::Layout;

/// Landing page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub layout: Layout,
}

/// Send signed-in users to their start page; everyone else sees the landing page.
pub async fn home(session: Session, OptionalUser(user): OptionalUser) -> Response {
    match user {
        Some(user) if user.is_admin() => Redirect::to("/admin").into_response(),
        Some(_) => Redirect::to("/shipments").into_response(),
        None => HomeTemplate {
            layout: Layout::load(&session, None).await,
        }
        .into_response(),
    }
}

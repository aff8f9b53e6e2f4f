//! Dashboard overview.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use shipdesk_api::AdminStats;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::AppError;
use crate::filters;
use crate::middleware::RequireAdmin;
use crate::routes::{Layout, inline};
use crate::state::AppState;

/// Dashboard template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/dashboard.html")]
pub struct DashboardTemplate {
    pub layout: Layout,
    pub stats: Option<AdminStats>,
    pub error: Option<String>,
}

/// Show platform-wide counters.
#[instrument(skip_all)]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(admin): RequireAdmin,
) -> Result<impl IntoResponse, AppError> {
    let (stats, error) = match inline(
        state.backend().admin_stats(&admin.token).await,
        "تعذر تحميل الإحصائيات",
    )? {
        Ok(stats) => (Some(stats), None),
        Err(message) => (None, Some(message)),
    };

    Ok(DashboardTemplate {
        layout: Layout::load(&session, Some(&admin)).await,
        stats,
        error,
    })
}

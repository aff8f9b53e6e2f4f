//! Users table and its row actions.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect},
};
use serde::Deserialize;
use shipdesk_api::User;
use shipdesk_core::{UserId, UserRole};
use tower_sessions::Session;
use tracing::instrument;

use super::{normalize, status_filter};
use crate::components::{FilterOption, Pager, TableColumn, TableState};
use crate::error::AppError;
use crate::filters;
use crate::middleware::RequireAdmin;
use crate::models::Flash;
use crate::routes::{Layout, back_to, flash_outcome, inline};
use crate::state::AppState;

const LIST_PATH: &str = "/admin/users";

const COLUMNS: &[TableColumn] = &[
    TableColumn::new("name", "الاسم"),
    TableColumn::new("email", "البريد الإلكتروني"),
    TableColumn::new("phone", "الجوال"),
    TableColumn::new("role", "الصلاحية"),
    TableColumn::new("balance", "الرصيد"),
    TableColumn::new("active", "الحالة"),
];

/// Form for flipping a user's active flag. Carries the current value.
#[derive(Debug, Deserialize)]
pub struct ToggleActiveForm {
    pub active: bool,
    #[serde(default)]
    pub back: String,
}

/// Form for changing a user's role.
#[derive(Debug, Deserialize)]
pub struct RoleForm {
    pub role: String,
    #[serde(default)]
    pub back: String,
}

/// Form carrying only the table position.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct BackForm {
    pub back: String,
}

/// Users table template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/users.html")]
pub struct UsersTemplate {
    pub layout: Layout,
    pub columns: &'static [TableColumn],
    pub table: TableState,
    pub back: String,
    pub users: Vec<User>,
    pub roles: &'static [UserRole],
    pub pager: Pager,
    pub status_options: Vec<FilterOption>,
    pub error: Option<String>,
}

/// List users.
#[instrument(skip_all)]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(admin): RequireAdmin,
    Query(table): Query<TableState>,
) -> Result<impl IntoResponse, AppError> {
    let table = normalize(table);
    let result = state
        .backend()
        .admin_users(&admin.token, &table.to_list_query())
        .await;

    let (users, pager, error) = match inline(result, "تعذر تحميل المستخدمين")? {
        Ok(page) => (page.data, Pager::new(&table, &page.pagination), None),
        Err(message) => (Vec::new(), Pager::default(), Some(message)),
    };

    Ok(UsersTemplate {
        layout: Layout::load(&session, Some(&admin)).await,
        columns: COLUMNS,
        back: table.query_string(),
        status_options: status_filter(&table.status, [("true", "نشط"), ("false", "موقوف")]),
        table,
        users,
        roles: UserRole::ALL,
        pager,
        error,
    })
}

/// Activate or deactivate a user: sends the opposite of the posted value.
#[instrument(skip_all, fields(user_id = %id))]
pub async fn toggle_active(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<UserId>,
    Form(form): Form<ToggleActiveForm>,
) -> Result<Redirect, AppError> {
    let active = !form.active;
    let result = state.backend().set_user_active(&admin.token, &id, active).await;
    let success = if active {
        "تم تفعيل المستخدم"
    } else {
        "تم إيقاف المستخدم"
    };
    flash_outcome(&session, result, success, "تعذر تحديث حالة المستخدم").await?;
    Ok(Redirect::to(&back_to(LIST_PATH, &form.back)))
}

/// Change a user's role.
#[instrument(skip_all, fields(user_id = %id))]
pub async fn change_role(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<UserId>,
    Form(form): Form<RoleForm>,
) -> Result<Redirect, AppError> {
    match form.role.parse::<UserRole>() {
        Ok(role) => {
            let result = state.backend().set_user_role(&admin.token, &id, role).await;
            flash_outcome(&session, result, "تم تحديث الصلاحية", "تعذر تحديث الصلاحية").await?;
        }
        Err(e) => {
            tracing::warn!("Rejected role change: {e}");
            Flash::error("صلاحية غير معروفة").set(&session).await;
        }
    }
    Ok(Redirect::to(&back_to(LIST_PATH, &form.back)))
}

/// Delete a user.
#[instrument(skip_all, fields(user_id = %id))]
pub async fn delete(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<UserId>,
    Form(form): Form<BackForm>,
) -> Result<Redirect, AppError> {
    if id == admin.id {
        Flash::error("لا يمكنك حذف حسابك").set(&session).await;
        return Ok(Redirect::to(&back_to(LIST_PATH, &form.back)));
    }

    let result = state.backend().delete_user(&admin.token, &id).await;
    flash_outcome(&session, result, "تم حذف المستخدم", "تعذر حذف المستخدم").await?;
    Ok(Redirect::to(&back_to(LIST_PATH, &form.back)))
}

//! Shipments table: status changes and deletion.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect},
};
use serde::Deserialize;
use shipdesk_api::Shipment;
use shipdesk_core::{ShipmentId, ShipmentStatus};
use tower_sessions::Session;
use tracing::instrument;

use super::normalize;
use super::users::BackForm;
use crate::components::{
    FilterOption, Pager, TableColumn, TableState, shipment_status_filter, shipment_status_options,
};
use crate::error::AppError;
use crate::filters;
use crate::middleware::RequireAdmin;
use crate::models::Flash;
use crate::routes::{Layout, back_to, flash_outcome, inline};
use crate::state::AppState;

const LIST_PATH: &str = "/admin/shipments";

/// Shown when a cancel is attempted from any status but ready-for-pickup.
pub const CANCEL_NOT_ALLOWED_MESSAGE: &str = "لا يمكن إلغاء الشحنة إلا إذا كانت جاهزة للاستلام";

/// Flash text when the posted status is the one the shipment already has.
pub const UNCHANGED_MESSAGE: &str = "الشحنة في هذه الحالة بالفعل";

const COLUMNS: &[TableColumn] = &[
    TableColumn::new("tracking", "رقم التتبع"),
    TableColumn::new("sender", "المرسل"),
    TableColumn::new("receiver", "المستلم"),
    TableColumn::new("company", "شركة الشحن"),
    TableColumn::new("price", "السعر"),
    TableColumn::new("created", "التاريخ"),
    TableColumn::new("status", "الحالة"),
];

/// Status change form. `current` is the status the row was rendered with.
#[derive(Debug, Deserialize)]
pub struct StatusForm {
    pub status: String,
    pub current: String,
    #[serde(default)]
    pub back: String,
}

/// A table row: the shipment and its status dropdown.
pub struct ShipmentRow {
    pub shipment: Shipment,
    pub status_options: Vec<FilterOption>,
}

/// Shipments table template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/shipments.html")]
pub struct ShipmentsTemplate {
    pub layout: Layout,
    pub columns: &'static [TableColumn],
    pub table: TableState,
    pub back: String,
    pub rows: Vec<ShipmentRow>,
    pub pager: Pager,
    pub status_options: Vec<FilterOption>,
    pub error: Option<String>,
}

/// List shipments.
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
        .admin_shipments(&admin.token, &table.to_list_query())
        .await;

    let (rows, pager, error) = match inline(result, "تعذر تحميل الشحنات")? {
        Ok(page) => {
            let pager = Pager::new(&table, &page.pagination);
            let rows = page
                .data
                .into_iter()
                .map(|shipment| ShipmentRow {
                    status_options: shipment_status_options(shipment.status),
                    shipment,
                })
                .collect();
            (rows, pager, None)
        }
        Err(message) => (Vec::new(), Pager::default(), Some(message)),
    };

    Ok(ShipmentsTemplate {
        layout: Layout::load(&session, Some(&admin)).await,
        columns: COLUMNS,
        back: table.query_string(),
        status_options: shipment_status_filter(&table.status),
        table,
        rows,
        pager,
        error,
    })
}

/// Parse a status change, refusing transitions the dropdown would not offer.
fn checked_transition(form: &StatusForm) -> Result<ShipmentStatus, &'static str> {
    let next: ShipmentStatus = form.status.parse().map_err(|_| "حالة غير معروفة")?;
    let current: ShipmentStatus = form.current.parse().map_err(|_| "حالة غير معروفة")?;
    if next == current {
        Err(UNCHANGED_MESSAGE)
    } else if current.allows_transition_to(next) {
        Ok(next)
    } else {
        Err(CANCEL_NOT_ALLOWED_MESSAGE)
    }
}

/// Change a shipment's status.
#[instrument(skip_all, fields(shipment_id = %id))]
pub async fn change_status(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<ShipmentId>,
    Form(form): Form<StatusForm>,
) -> Result<Redirect, AppError> {
    match checked_transition(&form) {
        Ok(status) => {
            let result = state
                .backend()
                .set_shipment_status(&admin.token, &id, status)
                .await;
            flash_outcome(&session, result, "تم تحديث حالة الشحنة", "تعذر تحديث حالة الشحنة").await?;
        }
        Err(message) => {
            tracing::warn!(status = %form.status, current = %form.current, "Refused shipment status change");
            Flash::error(message).set(&session).await;
        }
    }
    Ok(Redirect::to(&back_to(LIST_PATH, &form.back)))
}

/// Delete a shipment.
#[instrument(skip_all, fields(shipment_id = %id))]
pub async fn delete(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<ShipmentId>,
    Form(form): Form<BackForm>,
) -> Result<Redirect, AppError> {
    let result = state.backend().delete_shipment(&admin.token, &id).await;
    flash_outcome(&session, result, "تم حذف الشحنة", "تعذر حذف الشحنة").await?;
    Ok(Redirect::to(&back_to(LIST_PATH, &form.back)))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn form(status: &str, current: &str) -> StatusForm {
        StatusForm {
            status: status.to_string(),
            current: current.to_string(),
            back: String::new(),
        }
    }

    #[test]
    fn test_cancel_refused_unless_ready_for_pickup() {
        assert_eq!(
            checked_transition(&form("CANCELED", "IN_TRANSIT")),
            Err(CANCEL_NOT_ALLOWED_MESSAGE)
        );
        assert_eq!(
            checked_transition(&form("CANCELED", "READY_FOR_PICKUP")),
            Ok(ShipmentStatus::Canceled)
        );
    }

    #[test]
    fn test_other_transitions_pass() {
        assert_eq!(
            checked_transition(&form("DELIVERED", "IN_TRANSIT")),
            Ok(ShipmentStatus::Delivered)
        );
        assert!(checked_transition(&form("LOST", "IN_TRANSIT")).is_err());
    }

    #[test]
    fn test_same_status_is_reported_as_unchanged() {
        assert_eq!(
            checked_transition(&form("CANCELED", "CANCELED")),
            Err(UNCHANGED_MESSAGE)
        );
        assert_eq!(
            checked_transition(&form("IN_TRANSIT", "IN_TRANSIT")),
            Err(UNCHANGED_MESSAGE)
        );
    }
}

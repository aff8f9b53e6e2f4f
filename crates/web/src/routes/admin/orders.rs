//! Orders table: approve or reject.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect},
};
use serde::Deserialize;
use shipdesk_api::Order;
use shipdesk_core::{OrderId, OrderStatus};
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

const LIST_PATH: &str = "/admin/orders";

const COLUMNS: &[TableColumn] = &[
    TableColumn::new("customer", "العميل"),
    TableColumn::new("shipment", "الشحنة"),
    TableColumn::new("total", "الإجمالي"),
    TableColumn::new("created", "التاريخ"),
    TableColumn::new("status", "الحالة"),
];

/// Approve/reject form.
#[derive(Debug, Deserialize)]
pub struct OrderStatusForm {
    pub status: String,
    #[serde(default)]
    pub back: String,
}

/// Orders table template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/orders.html")]
pub struct OrdersTemplate {
    pub layout: Layout,
    pub columns: &'static [TableColumn],
    pub table: TableState,
    pub back: String,
    pub orders: Vec<Order>,
    pub pager: Pager,
    pub status_options: Vec<FilterOption>,
    pub error: Option<String>,
}

/// List orders.
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
        .admin_orders(&admin.token, &table.to_list_query())
        .await;

    let (orders, pager, error) = match inline(result, "تعذر تحميل الطلبات")? {
        Ok(page) => (page.data, Pager::new(&table, &page.pagination), None),
        Err(message) => (Vec::new(), Pager::default(), Some(message)),
    };

    Ok(OrdersTemplate {
        layout: Layout::load(&session, Some(&admin)).await,
        columns: COLUMNS,
        back: table.query_string(),
        status_options: status_filter(
            &table.status,
            OrderStatus::ALL.iter().map(|s| (s.as_str(), s.label())),
        ),
        table,
        orders,
        pager,
        error,
    })
}

/// Approve or reject an order.
#[instrument(skip_all, fields(order_id = %id))]
pub async fn change_status(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<OrderId>,
    Form(form): Form<OrderStatusForm>,
) -> Result<Redirect, AppError> {
    match form.status.parse::<OrderStatus>() {
        Ok(status @ (OrderStatus::Approved | OrderStatus::Rejected)) => {
            let result = state.backend().set_order_status(&admin.token, &id, status).await;
            let success = if status == OrderStatus::Approved {
                "تمت الموافقة على الطلب"
            } else {
                "تم رفض الطلب"
            };
            flash_outcome(&session, result, success, "تعذر تحديث الطلب").await?;
        }
        _ => {
            tracing::warn!(status = %form.status, "Rejected order status change");
            Flash::error("حالة غير معروفة").set(&session).await;
        }
    }
    Ok(Redirect::to(&back_to(LIST_PATH, &form.back)))
}

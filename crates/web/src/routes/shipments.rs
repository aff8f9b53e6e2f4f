//! Customer shipment pages.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use shipdesk_api::{Shipment, ShipmentStatistics};
use shipdesk_core::ShipmentId;
use tower_sessions::Session;
use tracing::instrument;

use crate::components::{FilterOption, Pager, TableState, shipment_status_filter};
use crate::error::AppError;
use crate::filters;
use crate::middleware::RequireUser;
use crate::routes::{Layout, flash_outcome, inline};
use crate::state::AppState;
use crate::wizard::{self, ShipmentDraft};

/// Shipments list template.
#[derive(Template, WebTemplate)]
#[template(path = "shipments/index.html")]
pub struct ShipmentsTemplate {
    pub layout: Layout,
    pub stats: Option<ShipmentStatistics>,
    pub shipments: Vec<Shipment>,
    pub pager: Pager,
    pub status_options: Vec<FilterOption>,
    pub error: Option<String>,
}

/// Shipment detail template.
#[derive(Template, WebTemplate)]
#[template(path = "shipments/show.html")]
pub struct ShipmentTemplate {
    pub layout: Layout,
    pub shipment: Shipment,
}

/// List my shipments, with statistics and a status filter.
#[instrument(skip_all, fields(page = table.page))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    RequireUser(user): RequireUser,
    Query(table): Query<TableState>,
) -> Result<impl IntoResponse, AppError> {
    let backend = state.backend();
    let list_query = table.to_list_query();
    let (list, stats) = tokio::join!(
        backend.my_shipments(&user.token, &list_query),
        backend.shipment_statistics(&user.token),
    );

    let stats = inline(stats, "")?.ok();
    let (shipments, pager, error) = match inline(list, "تعذر تحميل الشحنات")? {
        Ok(page) => (page.data, Pager::new(&table, &page.pagination), None),
        Err(message) => (Vec::new(), Pager::default(), Some(message)),
    };

    Ok(ShipmentsTemplate {
        layout: Layout::load(&session, Some(&user)).await,
        stats,
        shipments,
        pager,
        status_options: shipment_status_filter(&table.status),
        error,
    })
}

/// Show one shipment.
#[instrument(skip_all, fields(shipment_id = %id))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    RequireUser(user): RequireUser,
    Path(id): Path<ShipmentId>,
) -> Result<impl IntoResponse, AppError> {
    let shipment = state.backend().shipment(&user.token, &id).await?;

    Ok(ShipmentTemplate {
        layout: Layout::load(&session, Some(&user)).await,
        shipment,
    })
}

/// Cancel a shipment that is waiting for pickup.
#[instrument(skip_all, fields(shipment_id = %id))]
pub async fn cancel(
    State(state): State<AppState>,
    session: Session,
    RequireUser(user): RequireUser,
    Path(id): Path<ShipmentId>,
) -> Result<Redirect, AppError> {
    let result = state.backend().cancel_shipment(&user.token, &id).await;
    flash_outcome(&session, result, "تم إلغاء الشحنة", "تعذر إلغاء الشحنة").await?;
    Ok(Redirect::to("/shipments"))
}

/// Start a new wizard pre-filled from an earlier shipment.
#[instrument(skip_all, fields(shipment_id = %id))]
pub async fn ship_again(
    State(state): State<AppState>,
    session: Session,
    RequireUser(user): RequireUser,
    Path(id): Path<ShipmentId>,
) -> Result<Response, AppError> {
    let shipment = state.backend().shipment(&user.token, &id).await?;
    wizard::queue_prefill(&session, &ShipmentDraft::from_shipment(&shipment)).await?;
    Ok(Redirect::to("/shipments/new").into_response())
}

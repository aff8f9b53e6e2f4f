//! Wallets table, balance top-ups and bank-transfer review.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect},
};
use serde::Deserialize;
use shipdesk_api::{BankTransfer, ListQuery, Wallet};
use shipdesk_core::{Money, TransferId, WalletId};
use tower_sessions::Session;
use tracing::instrument;

use super::normalize;
use super::users::BackForm;
use crate::components::{Pager, TableColumn, TableState};
use crate::error::AppError;
use crate::filters;
use crate::middleware::RequireAdmin;
use crate::models::Flash;
use crate::routes::{Layout, back_to, flash_outcome, inline};
use crate::state::AppState;

const LIST_PATH: &str = "/admin/wallets";

const COLUMNS: &[TableColumn] = &[
    TableColumn::new("owner", "المستخدم"),
    TableColumn::new("email", "البريد الإلكتروني"),
    TableColumn::new("balance", "الرصيد"),
    TableColumn::new("updated", "آخر تحديث"),
];

/// Balance top-up form.
#[derive(Debug, Deserialize)]
pub struct AddBalanceForm {
    pub amount: String,
    #[serde(default)]
    pub note: String,
    #[serde(default)]
    pub back: String,
}

/// Wallets page template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/wallets.html")]
pub struct WalletsTemplate {
    pub layout: Layout,
    pub columns: &'static [TableColumn],
    pub table: TableState,
    pub back: String,
    pub wallets: Vec<Wallet>,
    pub pager: Pager,
    pub transfers: Vec<BankTransfer>,
    pub error: Option<String>,
    pub transfers_error: Option<String>,
}

/// List wallets and the transfers waiting for review.
#[instrument(skip_all)]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(admin): RequireAdmin,
    Query(table): Query<TableState>,
) -> Result<impl IntoResponse, AppError> {
    let table = normalize(table);
    let backend = state.backend();
    let wallets_query = table.to_list_query();
    let transfers_query = ListQuery::first_page();
    let (wallets, transfers) = tokio::join!(
        backend.admin_wallets(&admin.token, &wallets_query),
        backend.pending_transfers(&admin.token, &transfers_query),
    );

    let (wallets, pager, error) = match inline(wallets, "تعذر تحميل المحافظ")? {
        Ok(page) => (page.data, Pager::new(&table, &page.pagination), None),
        Err(message) => (Vec::new(), Pager::default(), Some(message)),
    };
    let (transfers, transfers_error) = match inline(transfers, "تعذر تحميل التحويلات")? {
        Ok(page) => (page.data, None),
        Err(message) => (Vec::new(), Some(message)),
    };

    Ok(WalletsTemplate {
        layout: Layout::load(&session, Some(&admin)).await,
        columns: COLUMNS,
        back: table.query_string(),
        table,
        wallets,
        pager,
        transfers,
        error,
        transfers_error,
    })
}

/// Credit a wallet.
#[instrument(skip_all, fields(wallet_id = %id))]
pub async fn add_balance(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<WalletId>,
    Form(form): Form<AddBalanceForm>,
) -> Result<Redirect, AppError> {
    match Money::parse_positive(&form.amount) {
        Ok(amount) => {
            let note = Some(form.note.trim()).filter(|n| !n.is_empty());
            let result = state
                .backend()
                .add_balance(&admin.token, &id, amount, note)
                .await;
            flash_outcome(&session, result, "تمت إضافة الرصيد", "تعذر إضافة الرصيد").await?;
        }
        Err(e) => {
            tracing::debug!("Rejected top-up amount: {e}");
            Flash::error("يجب إدخال مبلغ أكبر من صفر").set(&session).await;
        }
    }
    Ok(Redirect::to(&back_to(LIST_PATH, &form.back)))
}

/// Approve a bank transfer.
#[instrument(skip_all, fields(transfer_id = %id))]
pub async fn approve_transfer(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<TransferId>,
    Form(form): Form<BackForm>,
) -> Result<Redirect, AppError> {
    let result = state.backend().approve_transfer(&admin.token, &id).await;
    flash_outcome(&session, result, "تمت الموافقة على التحويل", "تعذر اعتماد التحويل").await?;
    Ok(Redirect::to(&back_to(LIST_PATH, &form.back)))
}

/// Reject a bank transfer.
#[instrument(skip_all, fields(transfer_id = %id))]
pub async fn reject_transfer(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<TransferId>,
    Form(form): Form<BackForm>,
) -> Result<Redirect, AppError> {
    let result = state.backend().reject_transfer(&admin.token, &id).await;
    flash_outcome(&session, result, "تم رفض التحويل", "تعذر رفض التحويل").await?;
    Ok(Redirect::to(&back_to(LIST_PATH, &form.back)))
}

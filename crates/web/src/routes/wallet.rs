//! Customer wallet: balance, transfer history and bank-transfer receipts.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Multipart, State},
    response::{IntoResponse, Redirect},
};
use shipdesk_api::{MyWallet, Receipt};
use shipdesk_core::{FieldErrors, Money};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::AppError;
use crate::filters;
use crate::middleware::RequireUser;
use crate::models::Flash;
use crate::routes::{Layout, flash_outcome, inline};
use crate::state::AppState;

/// Largest receipt upload accepted.
pub const MAX_RECEIPT_BYTES: usize = 5 * 1024 * 1024;

const RECEIPT_REQUIRED_MESSAGE: &str = "يجب إرفاق صورة إيصال التحويل";
const RECEIPT_TYPE_MESSAGE: &str = "يجب أن يكون الإيصال صورة أو ملف PDF";

/// Wallet page template.
#[derive(Template, WebTemplate)]
#[template(path = "wallet/show.html")]
pub struct WalletTemplate {
    pub layout: Layout,
    pub wallet: Option<MyWallet>,
    pub error: Option<String>,
}

/// Show the balance and past bank transfers.
#[instrument(skip_all)]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    RequireUser(user): RequireUser,
) -> Result<impl IntoResponse, AppError> {
    let (wallet, error) = match inline(state.backend().my_wallet(&user.token).await, "تعذر تحميل المحفظة")? {
        Ok(wallet) => (Some(wallet), None),
        Err(message) => (None, Some(message)),
    };

    Ok(WalletTemplate {
        layout: Layout::load(&session, Some(&user)).await,
        wallet,
        error,
    })
}

/// Fields of the bank-transfer upload.
#[derive(Debug, Default)]
struct TransferUpload {
    amount: String,
    receipt: Option<Receipt>,
}

impl TransferUpload {
    async fn read(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut upload = Self::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::BadRequest(format!("نموذج غير صالح: {e}")))?
        {
            match field.name() {
                Some("amount") => {
                    upload.amount = field
                        .text()
                        .await
                        .map_err(|e| AppError::BadRequest(e.to_string()))?;
                }
                Some("receipt") => {
                    let file_name = field.file_name().unwrap_or("receipt").to_string();
                    let content_type = field
                        .content_type()
                        .unwrap_or("application/octet-stream")
                        .to_string();
                    let bytes = field
                        .bytes()
                        .await
                        .map_err(|e| AppError::BadRequest(e.to_string()))?;
                    if !bytes.is_empty() {
                        upload.receipt = Some(Receipt {
                            file_name,
                            content_type,
                            bytes: bytes.to_vec(),
                        });
                    }
                }
                _ => {}
            }
        }

        Ok(upload)
    }

    fn validate(self) -> Result<(Money, Receipt), FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.require_positive("amount", &self.amount);

        match &self.receipt {
            None => errors.insert("receipt", RECEIPT_REQUIRED_MESSAGE),
            Some(receipt) if !is_accepted_receipt(&receipt.content_type) => {
                errors.insert("receipt", RECEIPT_TYPE_MESSAGE);
            }
            Some(_) => {}
        }

        match (Money::parse_positive(&self.amount), self.receipt) {
            (Ok(amount), Some(receipt)) if errors.is_empty() => Ok((amount, receipt)),
            _ => Err(errors),
        }
    }
}

fn is_accepted_receipt(content_type: &str) -> bool {
    content_type.starts_with("image/") || content_type == "application/pdf"
}

/// Upload a bank-transfer receipt for admin approval.
#[instrument(skip_all)]
pub async fn submit_transfer(
    State(state): State<AppState>,
    session: Session,
    RequireUser(user): RequireUser,
    multipart: Multipart,
) -> Result<Redirect, AppError> {
    let upload = TransferUpload::read(multipart).await?;

    match upload.validate() {
        Ok((amount, receipt)) => {
            let result = state
                .backend()
                .submit_bank_transfer(&user.token, amount, receipt)
                .await;
            flash_outcome(
                &session,
                result,
                "تم إرسال طلب التحويل وسيتم مراجعته",
                "تعذر إرسال طلب التحويل",
            )
            .await?;
        }
        Err(errors) => {
            let message = errors
                .iter()
                .map(|(_, message)| message)
                .collect::<Vec<_>>()
                .join("، ");
            Flash::error(message).set(&session).await;
        }
    }

    Ok(Redirect::to("/wallet"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use shipdesk_core::validation::POSITIVE_NUMBER_MESSAGE;

    use super::*;

    fn receipt(content_type: &str) -> Receipt {
        Receipt {
            file_name: "r.png".to_string(),
            content_type: content_type.to_string(),
            bytes: vec![1, 2, 3],
        }
    }

    #[test]
    fn test_upload_requires_amount_and_receipt() {
        let errors = TransferUpload {
            amount: "-5".to_string(),
            receipt: None,
        }
        .validate()
        .unwrap_err();

        assert_eq!(errors.get("amount"), Some(POSITIVE_NUMBER_MESSAGE));
        assert_eq!(errors.get("receipt"), Some(RECEIPT_REQUIRED_MESSAGE));
    }

    #[test]
    fn test_upload_rejects_other_file_types() {
        let errors = TransferUpload {
            amount: "100".to_string(),
            receipt: Some(receipt("text/html")),
        }
        .validate()
        .unwrap_err();

        assert_eq!(errors.get("receipt"), Some(RECEIPT_TYPE_MESSAGE));
    }

    #[test]
    fn test_valid_upload() {
        let (amount, receipt) = TransferUpload {
            amount: "250.50".to_string(),
            receipt: Some(receipt("image/png")),
        }
        .validate()
        .unwrap();

        assert_eq!(amount.to_string(), "250.50 ر.س");
        assert_eq!(receipt.file_name, "r.png");
    }
}

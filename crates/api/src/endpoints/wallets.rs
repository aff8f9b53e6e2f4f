//! Wallets: the user's own balance and bank-transfer top-ups, plus the admin
//! side that credits balances and reviews transfers.

use reqwest::Method;
use reqwest::multipart::{Form, Part};
use shipdesk_core::{Money, TransferId, WalletId};
use tracing::instrument;

use crate::cache::{Mutation, Query};
use crate::client::{BackendClient, NO_ARGS};
use crate::error::ApiError;
use crate::types::wallet::AddBalanceBody;
use crate::types::{
    AccessToken, Ack, BankTransfer, Data, ListQuery, MyWallet, Paginated, Receipt, Wallet,
};

impl BackendClient {
    /// The current user's wallet.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is malformed.
    #[instrument(skip(self, token))]
    pub async fn my_wallet(&self, token: &AccessToken) -> Result<MyWallet, ApiError> {
        let envelope: Data<MyWallet> = self
            .cached_get(Query::MyWallet, Some(token), "wallet/my-wallet", NO_ARGS)
            .await?;
        Ok(envelope.data)
    }

    /// Submit a bank transfer with its receipt for admin review.
    ///
    /// Sent as `multipart/form-data`; reqwest sets the boundary.
    ///
    /// # Errors
    ///
    /// Returns an error if the receipt's content type is malformed or the
    /// backend rejects the transfer.
    #[instrument(skip(self, token, receipt), fields(amount = %amount.amount(), file = %receipt.file_name))]
    pub async fn submit_bank_transfer(
        &self,
        token: &AccessToken,
        amount: Money,
        receipt: Receipt,
    ) -> Result<Ack, ApiError> {
        let part = Part::bytes(receipt.bytes)
            .file_name(receipt.file_name)
            .mime_str(&receipt.content_type)?;
        let form = Form::new()
            .text("amount", amount.amount().to_string())
            .part("receipt", part);
        let builder = self
            .request(Method::POST, "wallet/bank-transfer", Some(token))?
            .multipart(form);
        self.mutate(Mutation::SubmitBankTransfer, builder).await
    }

    /// All wallets (admin).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is malformed.
    #[instrument(skip(self, token))]
    pub async fn admin_wallets(
        &self,
        token: &AccessToken,
        query: &ListQuery,
    ) -> Result<Paginated<Wallet>, ApiError> {
        self.cached_get(Query::AdminWallets, Some(token), "admin/wallets", query)
            .await
    }

    /// Credit a wallet (admin).
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the credit.
    #[instrument(skip(self, token), fields(wallet_id = %id, amount = %amount.amount()))]
    pub async fn add_balance(
        &self,
        token: &AccessToken,
        id: &WalletId,
        amount: Money,
        note: Option<&str>,
    ) -> Result<Ack, ApiError> {
        let builder = self
            .request(
                Method::POST,
                &format!("admin/wallets/{id}/add-balance"),
                Some(token),
            )?
            .json(&AddBalanceBody { amount, note });
        self.mutate(Mutation::AddBalance, builder).await
    }

    /// Bank transfers waiting for review (admin).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is malformed.
    #[instrument(skip(self, token))]
    pub async fn pending_transfers(
        &self,
        token: &AccessToken,
        query: &ListQuery,
    ) -> Result<Paginated<BankTransfer>, ApiError> {
        self.cached_get(
            Query::PendingTransfers,
            Some(token),
            "admin/wallets/pending-transfers",
            query,
        )
        .await
    }

    /// Approve a bank transfer, crediting the user's wallet (admin).
    ///
    /// # Errors
    ///
    /// Returns an error if the backend refuses the approval.
    #[instrument(skip(self, token), fields(transfer_id = %id))]
    pub async fn approve_transfer(
        &self,
        token: &AccessToken,
        id: &TransferId,
    ) -> Result<Ack, ApiError> {
        let builder = self.request(
            Method::PUT,
            &format!("admin/wallets/approve-bank-transfer/{id}"),
            Some(token),
        )?;
        self.mutate(Mutation::ApproveTransfer, builder).await
    }

    /// Reject a bank transfer (admin).
    ///
    /// # Errors
    ///
    /// Returns an error if the backend refuses the rejection.
    #[instrument(skip(self, token), fields(transfer_id = %id))]
    pub async fn reject_transfer(
        &self,
        token: &AccessToken,
        id: &TransferId,
    ) -> Result<Ack, ApiError> {
        let builder = self.request(
            Method::PUT,
            &format!("admin/wallets/reject-bank-transfer/{id}"),
            Some(token),
        )?;
        self.mutate(Mutation::RejectTransfer, builder).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::extract::Multipart;
    use axum::routing::post;
    use axum::{Json, Router};
    use rust_decimal::Decimal;
    use serde_json::json;

    use super::*;
    use crate::client::tests::{client_for, serve};

    #[tokio::test]
    async fn test_bank_transfer_is_multipart() {
        let router = Router::new().route(
            "/api/wallet/bank-transfer",
            post(|mut multipart: Multipart| async move {
                let mut fields = Vec::new();
                while let Some(field) = multipart.next_field().await.unwrap() {
                    let name = field.name().unwrap().to_string();
                    let file = field.file_name().map(String::from);
                    let bytes = field.bytes().await.unwrap();
                    fields.push((name, file, bytes.len()));
                }
                assert_eq!(fields.len(), 2);
                assert_eq!(fields[0].0, "amount");
                assert_eq!(fields[1], ("receipt".to_string(), Some("r.png".to_string()), 4));
                Json(json!({"message": "تم إرسال التحويل"}))
            }),
        );
        let client = client_for(&serve(router).await);

        let ack = client
            .submit_bank_transfer(
                &AccessToken::new("tok"),
                Money::new(Decimal::new(15000, 2)),
                Receipt {
                    file_name: "r.png".to_string(),
                    content_type: "image/png".to_string(),
                    bytes: vec![1, 2, 3, 4],
                },
            )
            .await
            .unwrap();

        assert_eq!(ack.message.as_deref(), Some("تم إرسال التحويل"));
    }
}

//! Wallet balances and bank-transfer top-ups.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shipdesk_core::{Money, TransferId, TransferStatus, UserId, WalletId};

/// Owner summary embedded in wallet records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletOwner {
    #[serde(rename = "_id", alias = "id")]
    pub id: UserId,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// A user's wallet, as listed in the admin dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wallet {
    #[serde(rename = "_id", alias = "id")]
    pub id: WalletId,
    pub user: WalletOwner,
    pub balance: Money,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// A bank transfer submitted by a user to top up their wallet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BankTransfer {
    #[serde(rename = "_id", alias = "id")]
    pub id: TransferId,
    #[serde(default)]
    pub user: Option<WalletOwner>,
    pub amount: Money,
    #[serde(default)]
    pub receipt_url: Option<String>,
    #[serde(default)]
    pub status: TransferStatus,
    pub created_at: DateTime<Utc>,
}

/// The current user's wallet with their recent transfers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MyWallet {
    pub balance: Money,
    #[serde(default)]
    pub transfers: Vec<BankTransfer>,
}

/// Receipt file attached to a bank-transfer submission.
#[derive(Debug, Clone)]
pub struct Receipt {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Serialize)]
pub(crate) struct AddBalanceBody<'a> {
    pub amount: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<&'a str>,
}

//! Shipments, their statistics, and the creation payload.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shipdesk_core::{AddressId, CompanyId, Money, PaymentMethod, ShipmentId, ShipmentStatus};

use super::address::default_country;

/// Package dimensions in centimetres.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Dimensions {
    pub length: Decimal,
    pub width: Decimal,
    pub height: Decimal,
}

impl Dimensions {
    /// `"L × W × H سم"` for tables.
    #[must_use]
    pub fn display(&self) -> String {
        format!("{} × {} × {} سم", self.length, self.width, self.height)
    }
}

/// Sender or receiver address as captured on the shipment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressSnapshot {
    #[serde(alias = "fullName", alias = "contactName")]
    pub name: String,
    #[serde(alias = "mobile")]
    pub phone: String,
    pub city: String,
    #[serde(default)]
    pub district: String,
    #[serde(default, alias = "fullAddress")]
    pub details: String,
    #[serde(default = "default_country")]
    pub country: String,
}

/// A shipment owned by the current user (or any user, for admins).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shipment {
    #[serde(rename = "_id", alias = "id")]
    pub id: ShipmentId,
    #[serde(default)]
    pub tracking_number: Option<String>,
    pub sender: AddressSnapshot,
    pub receiver: AddressSnapshot,
    #[serde(default)]
    pub dimensions: Dimensions,
    pub weight: Decimal,
    pub company: String,
    #[serde(default, alias = "shipmentType")]
    pub shipping_type: Option<String>,
    pub price: Money,
    pub status: ShipmentStatus,
    #[serde(default = "one_box")]
    pub box_num: u32,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    pub created_at: DateTime<Utc>,
}

const fn one_box() -> u32 {
    1
}

/// Per-status shipment counts for the current user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShipmentStatistics {
    pub total: u64,
    pub pending: u64,
    pub ready_for_pickup: u64,
    pub in_transit: u64,
    pub delivered: u64,
    pub canceled: u64,
}

/// Body of `POST /shipment/createshipment`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateShipmentRequest {
    pub company: CompanyId,
    pub shipment_type: String,
    pub order: OrderBlock,
    pub dimensions: Dimensions,
}

/// The order block nested in a shipment creation request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderBlock {
    pub customer: CustomerBlock,
    pub client_address: AddressId,
    pub payment_method: PaymentMethod,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cod_amount: Option<Money>,
    pub box_num: u32,
    pub weight: Decimal,
    pub description: String,
}

/// Recipient details nested in the order block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerBlock {
    pub full_name: String,
    pub mobile: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub address: CustomerAddressBlock,
}

/// Recipient address nested in the customer block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerAddressBlock {
    pub city: String,
    pub district: String,
    pub full_address: String,
    pub country: String,
}

#[derive(Serialize)]
pub(crate) struct ShipmentStatusBody {
    pub status: ShipmentStatus,
}

//! Orders awaiting admin approval.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shipdesk_core::{Money, OrderId, OrderStatus, ShipmentId};

/// An order linking a shipment request to a customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(rename = "_id", alias = "id")]
    pub id: OrderId,
    #[serde(default, alias = "shipmentId")]
    pub shipment: Option<ShipmentId>,
    pub customer: OrderCustomer,
    #[serde(default)]
    pub total: Money,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

/// Customer summary embedded in an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderCustomer {
    #[serde(alias = "fullName")]
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, alias = "mobile")]
    pub phone: Option<String>,
}

#[derive(Serialize)]
pub(crate) struct OrderStatusBody {
    pub status: OrderStatus,
}

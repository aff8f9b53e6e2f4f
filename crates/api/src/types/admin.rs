//! Admin dashboard statistics.

use serde::{Deserialize, Serialize};
use shipdesk_core::{Money, ShipmentStatus};

/// Headline numbers for the admin dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AdminStats {
    pub total_users: u64,
    pub total_shipments: u64,
    pub total_orders: u64,
    pub pending_orders: u64,
    pub pending_transfers: u64,
    pub total_revenue: Money,
    pub shipments_by_status: Vec<StatusCount>,
}

/// Shipment count for one status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCount {
    pub status: ShipmentStatus,
    pub count: u64,
}

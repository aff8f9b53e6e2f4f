//! Public shipment tracking.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shipdesk_core::ShipmentStatus;

/// Current status and history of a tracked shipment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingResult {
    pub tracking_number: String,
    pub status: ShipmentStatus,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub events: Vec<TrackingEvent>,
}

/// One checkpoint in a shipment's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingEvent {
    pub description: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(alias = "date")]
    pub at: DateTime<Utc>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TrackingBody<'a> {
    pub tracking_number: &'a str,
}

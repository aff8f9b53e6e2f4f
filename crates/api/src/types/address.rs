//! Client (sender) addresses saved on the backend.

use serde::{Deserialize, Serialize};
use shipdesk_core::AddressId;

/// A saved sender address belonging to the current user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientAddress {
    #[serde(rename = "_id", alias = "id")]
    pub id: AddressId,
    #[serde(alias = "name")]
    pub contact_name: String,
    pub phone: String,
    pub city: String,
    #[serde(default)]
    pub district: String,
    #[serde(default, alias = "address")]
    pub details: String,
    #[serde(default = "default_country")]
    pub country: String,
}

impl ClientAddress {
    /// One-line summary for select boxes: `"Name - City, District"`.
    #[must_use]
    pub fn summary(&self) -> String {
        if self.district.is_empty() {
            format!("{} - {}", self.contact_name, self.city)
        } else {
            format!("{} - {}, {}", self.contact_name, self.city, self.district)
        }
    }
}

/// Body for creating or updating a client address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientAddressInput {
    pub contact_name: String,
    pub phone: String,
    pub city: String,
    pub district: String,
    pub details: String,
    pub country: String,
}

pub(crate) fn default_country() -> String {
    "SA".to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_with_aliases_and_defaults() {
        let json = r#"{"id": "a1", "name": "Warehouse", "phone": "0500000000", "city": "Jeddah"}"#;
        let address: ClientAddress = serde_json::from_str(json).unwrap();
        assert_eq!(address.contact_name, "Warehouse");
        assert_eq!(address.country, "SA");
        assert_eq!(address.summary(), "Warehouse - Jeddah");
    }
}

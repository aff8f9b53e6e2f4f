//! Shipping companies and parcel size presets used by the shipment wizard.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shipdesk_core::{CompanyId, Money, ParcelSizeId, PaymentMethod};

/// A carrier offering one or more shipping types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingCompany {
    #[serde(rename = "_id", alias = "id")]
    pub id: CompanyId,
    pub name: String,
    #[serde(default)]
    pub logo: Option<String>,
    #[serde(default, alias = "shipmentType")]
    pub shipping_types: Vec<ShippingType>,
}

impl ShippingCompany {
    /// Find one of this company's shipping types by name.
    #[must_use]
    pub fn shipping_type(&self, name: &str) -> Option<&ShippingType> {
        self.shipping_types.iter().find(|t| t.name == name)
    }
}

/// A priced service level offered by a company (e.g. "express").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingType {
    #[serde(alias = "type")]
    pub name: String,
    #[serde(alias = "basePrice")]
    pub price: Money,
    #[serde(default)]
    pub cod_fee: Money,
    #[serde(default)]
    pub delivery_days: Option<String>,
}

impl ShippingType {
    /// Estimated price: base price, plus the COD fee when paying on delivery.
    #[must_use]
    pub fn estimate(&self, payment: PaymentMethod) -> Money {
        match payment {
            PaymentMethod::Cod => self.price + self.cod_fee,
            PaymentMethod::Wallet => self.price,
        }
    }
}

/// A predefined box size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParcelSize {
    #[serde(rename = "_id", alias = "id")]
    pub id: ParcelSizeId,
    pub title: String,
    pub length: Decimal,
    pub width: Decimal,
    pub height: Decimal,
    #[serde(default)]
    pub max_weight: Option<Decimal>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_legacy_shipment_type_field_is_accepted() {
        let json = r#"{
            "_id": "c1",
            "name": "Aramex",
            "shipmentType": [{"type": "standard", "price": 20, "codFee": 5}]
        }"#;
        let company: ShippingCompany = serde_json::from_str(json).unwrap();
        let standard = company.shipping_type("standard").unwrap();
        assert_eq!(standard.estimate(PaymentMethod::Wallet), Money::new(Decimal::from(20)));
        assert_eq!(standard.estimate(PaymentMethod::Cod), Money::new(Decimal::from(25)));
    }
}

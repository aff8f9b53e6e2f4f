//! Turning a finished draft into the backend's create-shipment body.

use std::str::FromStr;

use rust_decimal::Decimal;
use shipdesk_api::{
    CreateShipmentRequest, CustomerAddressBlock, CustomerBlock, Dimensions, OrderBlock,
    ShippingCompany,
};
use shipdesk_core::{AddressId, CompanyId, Money, PaymentMethod};

use super::state::ShipmentDraft;

/// A draft field that cannot be sent.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WizardError {
    #[error("missing field: {0}")]
    Missing(&'static str),

    #[error("invalid value for {field}: {value}")]
    Invalid { field: &'static str, value: String },
}

/// Number of boxes to send: anything below one, or unparseable, becomes one.
#[must_use]
pub fn clamp_box_count(raw: &str) -> u32 {
    raw.trim().parse::<u32>().map_or(1, |n| n.max(1))
}

fn required(field: &'static str, value: &str) -> Result<String, WizardError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(WizardError::Missing(field));
    }
    Ok(value.to_string())
}

fn decimal(field: &'static str, value: &str) -> Result<Decimal, WizardError> {
    let raw = required(field, value)?;
    match Decimal::from_str(&raw) {
        Ok(n) if n > Decimal::ZERO => Ok(n),
        _ => Err(WizardError::Invalid { field, value: raw }),
    }
}

fn optional(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Build the request body from a draft.
///
/// `codAmount` is only sent for cash-on-delivery.
///
/// # Errors
///
/// Returns [`WizardError`] for the first field that is missing or malformed.
pub fn build_request(draft: &ShipmentDraft) -> Result<CreateShipmentRequest, WizardError> {
    let payment_method = PaymentMethod::from_str(&required("payment_method", &draft.payment_method)?)
        .map_err(|e| WizardError::Invalid {
            field: "payment_method",
            value: e.value,
        })?;

    let cod_amount = match payment_method {
        PaymentMethod::Cod => Some(
            Money::parse_positive(&draft.cod_amount).map_err(|_| WizardError::Invalid {
                field: "cod_amount",
                value: draft.cod_amount.clone(),
            })?,
        ),
        PaymentMethod::Wallet => None,
    };

    Ok(CreateShipmentRequest {
        company: CompanyId::new(required("company_id", &draft.company_id)?),
        shipment_type: required("shipping_type", &draft.shipping_type)?,
        order: OrderBlock {
            customer: CustomerBlock {
                full_name: required("receiver_name", &draft.receiver_name)?,
                mobile: required("receiver_phone", &draft.receiver_phone)?,
                email: optional(&draft.receiver_email),
                address: CustomerAddressBlock {
                    city: required("receiver_city", &draft.receiver_city)?,
                    district: draft.receiver_district.trim().to_string(),
                    full_address: required("receiver_address", &draft.receiver_address)?,
                    country: draft.receiver_country.trim().to_string(),
                },
            },
            client_address: AddressId::new(required("sender_address_id", &draft.sender_address_id)?),
            payment_method,
            cod_amount,
            box_num: clamp_box_count(&draft.box_num),
            weight: decimal("weight", &draft.weight)?,
            description: draft.description.trim().to_string(),
        },
        dimensions: Dimensions {
            length: decimal("length", &draft.length)?,
            width: decimal("width", &draft.width)?,
            height: decimal("height", &draft.height)?,
        },
    })
}

/// Price shown on the carrier step for the selected company and service.
#[must_use]
pub fn estimate(draft: &ShipmentDraft, companies: &[ShippingCompany]) -> Option<Money> {
    companies
        .iter()
        .find(|c| c.id.as_str() == draft.company_id)?
        .shipping_type(&draft.shipping_type)
        .map(|t| t.estimate(draft.payment()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn complete_draft() -> ShipmentDraft {
        ShipmentDraft {
            sender_address_id: "addr-1".to_string(),
            receiver_name: "Huda".to_string(),
            receiver_phone: "0500000002".to_string(),
            receiver_city: "Dammam".to_string(),
            receiver_district: "Al Faisaliyah".to_string(),
            receiver_address: "King Fahd Rd".to_string(),
            receiver_country: "SA".to_string(),
            length: "30".to_string(),
            width: "20".to_string(),
            height: "10".to_string(),
            weight: "2.5".to_string(),
            description: "Books".to_string(),
            company_id: "smsa".to_string(),
            shipping_type: "express".to_string(),
            payment_method: "wallet".to_string(),
            ..ShipmentDraft::default()
        }
    }

    #[test]
    fn test_clamp_box_count() {
        assert_eq!(clamp_box_count(""), 1);
        assert_eq!(clamp_box_count("0"), 1);
        assert_eq!(clamp_box_count("-3"), 1);
        assert_eq!(clamp_box_count("abc"), 1);
        assert_eq!(clamp_box_count(" 4 "), 4);
    }

    #[test]
    fn test_wallet_payload_shape() {
        let request = build_request(&complete_draft()).unwrap();
        let body = serde_json::to_value(&request).unwrap();

        assert_eq!(body["company"], "smsa");
        assert_eq!(body["shipmentType"], "express");
        assert_eq!(body["order"]["clientAddress"], "addr-1");
        assert_eq!(body["order"]["customer"]["fullName"], "Huda");
        assert_eq!(body["order"]["customer"]["address"]["fullAddress"], "King Fahd Rd");
        assert_eq!(body["order"]["paymentMethod"], "wallet");
        assert_eq!(body["order"]["boxNum"], 1);
        assert!(body["order"].get("codAmount").is_none());
        assert_eq!(body["dimensions"], json!({"length": "30", "width": "20", "height": "10"}));
    }

    #[test]
    fn test_cod_payload_carries_amount() {
        let draft = ShipmentDraft {
            payment_method: "cod".to_string(),
            cod_amount: "150".to_string(),
            box_num: "3".to_string(),
            ..complete_draft()
        };

        let request = build_request(&draft).unwrap();

        assert_eq!(request.order.cod_amount, Some(Money::new(Decimal::from(150))));
        assert_eq!(request.order.box_num, 3);
    }

    #[test]
    fn test_missing_sender_is_reported() {
        let draft = ShipmentDraft {
            sender_address_id: String::new(),
            ..complete_draft()
        };
        assert_eq!(
            build_request(&draft).unwrap_err(),
            WizardError::Missing("sender_address_id")
        );
    }

    #[test]
    fn test_non_positive_weight_is_invalid() {
        let draft = ShipmentDraft {
            weight: "0".to_string(),
            ..complete_draft()
        };
        assert!(matches!(
            build_request(&draft),
            Err(WizardError::Invalid { field: "weight", .. })
        ));
    }
}

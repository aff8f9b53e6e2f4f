//! Status enums for shipments, orders, users and wallet transfers.
//!
//! Every enum here mirrors a closed set of values returned by the backend.
//! `as_str()` yields the wire value (also used in query strings and form
//! fields) and `label()` the Arabic text shown in the interface.

use serde::{Deserialize, Serialize};

/// Error returned when a form or query value names no known status.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} value: {value}")]
pub struct UnknownStatus {
    /// Which enum was being parsed.
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
}

macro_rules! wire_enum {
    ($name:ident, $kind:literal, [$($variant:ident => $wire:literal),+ $(,)?]) => {
        impl $name {
            /// Every variant, in display order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// The value used on the wire and in forms.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $wire),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = UnknownStatus;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($wire => Ok(Self::$variant),)+
                    _ => Err(UnknownStatus {
                        kind: $kind,
                        value: s.to_string(),
                    }),
                }
            }
        }
    };
}

/// Lifecycle status of a shipment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShipmentStatus {
    #[default]
    #[serde(alias = "pending")]
    Pending,
    #[serde(alias = "ready-for-pickup")]
    ReadyForPickup,
    #[serde(alias = "in-transit")]
    InTransit,
    #[serde(alias = "delivered")]
    Delivered,
    #[serde(alias = "canceled", alias = "CANCELLED")]
    Canceled,
}

wire_enum!(ShipmentStatus, "shipment status", [
    Pending => "PENDING",
    ReadyForPickup => "READY_FOR_PICKUP",
    InTransit => "IN_TRANSIT",
    Delivered => "DELIVERED",
    Canceled => "CANCELED",
]);

impl ShipmentStatus {
    /// Arabic display label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "قيد الانتظار",
            Self::ReadyForPickup => "جاهزة للاستلام",
            Self::InTransit => "قيد الشحن",
            Self::Delivered => "تم التوصيل",
            Self::Canceled => "ملغاة",
        }
    }

    /// Whether the shipment may still be canceled.
    ///
    /// Only a shipment waiting for pickup can be canceled.
    #[must_use]
    pub const fn is_cancelable(self) -> bool {
        matches!(self, Self::ReadyForPickup)
    }

    /// Whether an admin may move a shipment from `self` to `next`.
    ///
    /// The single rule: `Canceled` is reachable only from `ReadyForPickup`.
    #[must_use]
    pub const fn allows_transition_to(self, next: Self) -> bool {
        match next {
            Self::Canceled => self.is_cancelable(),
            _ => true,
        }
    }
}

/// Approval status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    #[default]
    #[serde(alias = "pending")]
    Pending,
    #[serde(alias = "approved")]
    Approved,
    #[serde(alias = "rejected")]
    Rejected,
}

wire_enum!(OrderStatus, "order status", [
    Pending => "PENDING",
    Approved => "APPROVED",
    Rejected => "REJECTED",
]);

impl OrderStatus {
    /// Arabic display label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "بانتظار الموافقة",
            Self::Approved => "مقبول",
            Self::Rejected => "مرفوض",
        }
    }
}

/// Status of a bank transfer submitted to top up a wallet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransferStatus {
    #[default]
    #[serde(alias = "pending")]
    Pending,
    #[serde(alias = "approved")]
    Approved,
    #[serde(alias = "rejected")]
    Rejected,
}

wire_enum!(TransferStatus, "transfer status", [
    Pending => "PENDING",
    Approved => "APPROVED",
    Rejected => "REJECTED",
]);

impl TransferStatus {
    /// Arabic display label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "قيد المراجعة",
            Self::Approved => "تمت الموافقة",
            Self::Rejected => "مرفوض",
        }
    }
}

/// Account role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[default]
    User,
    Admin,
}

wire_enum!(UserRole, "user role", [
    User => "user",
    Admin => "admin",
]);

impl UserRole {
    /// Arabic display label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::User => "مستخدم",
            Self::Admin => "مدير",
        }
    }
}

/// How the recipient pays for a shipment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Charged to the sender's wallet.
    #[default]
    Wallet,
    /// Collected from the recipient on delivery.
    Cod,
}

wire_enum!(PaymentMethod, "payment method", [
    Wallet => "wallet",
    Cod => "cod",
]);

impl PaymentMethod {
    /// Arabic display label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Wallet => "الدفع من المحفظة",
            Self::Cod => "الدفع عند الاستلام",
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_only_from_ready_for_pickup() {
        for status in ShipmentStatus::ALL {
            let allowed = status.allows_transition_to(ShipmentStatus::Canceled);
            assert_eq!(allowed, *status == ShipmentStatus::ReadyForPickup, "{status}");
        }
    }

    #[test]
    fn test_other_transitions_unrestricted() {
        assert!(ShipmentStatus::Delivered.allows_transition_to(ShipmentStatus::InTransit));
        assert!(ShipmentStatus::Pending.allows_transition_to(ShipmentStatus::ReadyForPickup));
    }

    #[test]
    fn test_shipment_status_wire_format() {
        let json = serde_json::to_string(&ShipmentStatus::ReadyForPickup).unwrap();
        assert_eq!(json, "\"READY_FOR_PICKUP\"");

        let legacy: ShipmentStatus = serde_json::from_str("\"in-transit\"").unwrap();
        assert_eq!(legacy, ShipmentStatus::InTransit);
    }

    #[test]
    fn test_from_str_rejects_unknown() {
        let err = "LOST".parse::<ShipmentStatus>().unwrap_err();
        assert_eq!(err.kind, "shipment status");
        assert_eq!("admin".parse::<UserRole>().unwrap(), UserRole::Admin);
    }
}

//! Monetary amounts using decimal arithmetic.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Money`] amount from user input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoneyError {
    /// The input is not a decimal number.
    #[error("amount is not a number")]
    Invalid,
    /// The amount must be strictly greater than zero.
    #[error("amount must be greater than zero")]
    NotPositive,
}

/// An amount in the platform currency (Saudi riyal).
///
/// The backend sends amounts either as JSON numbers or numeric strings; both
/// are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    /// Zero riyals.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Wrap a decimal amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Parse an amount typed into a form; it must be strictly positive.
    ///
    /// # Errors
    ///
    /// Returns [`MoneyError::Invalid`] for non-numeric input and
    /// [`MoneyError::NotPositive`] for zero or negative amounts.
    pub fn parse_positive(input: &str) -> Result<Self, MoneyError> {
        let amount = Decimal::from_str(input.trim()).map_err(|_| MoneyError::Invalid)?;
        if amount <= Decimal::ZERO {
            return Err(MoneyError::NotPositive);
        }
        Ok(Self(amount))
    }

    /// Format for display, e.g. `"25.50 ر.س"`.
    #[must_use]
    pub fn display(&self) -> String {
        format!("{:.2} ر.س", self.0.round_dp(2))
    }
}

impl std::ops::Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.display())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_positive() {
        assert_eq!(
            Money::parse_positive(" 25.5 ").unwrap().amount(),
            Decimal::new(255, 1)
        );
        assert_eq!(Money::parse_positive("0"), Err(MoneyError::NotPositive));
        assert_eq!(Money::parse_positive("-3"), Err(MoneyError::NotPositive));
        assert_eq!(Money::parse_positive("abc"), Err(MoneyError::Invalid));
    }

    #[test]
    fn test_display_two_decimals() {
        assert_eq!(Money::new(Decimal::new(255, 1)).display(), "25.50 ر.س");
    }

    #[test]
    fn test_deserialize_number_or_string() {
        let from_number: Money = serde_json::from_str("12.75").unwrap();
        let from_string: Money = serde_json::from_str("\"12.75\"").unwrap();
        assert_eq!(from_number, from_string);
    }
}

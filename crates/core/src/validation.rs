//! Per-field form validation.
//!
//! Forms collect every problem into a [`FieldErrors`] map keyed by field name
//! so templates can show each message next to its input. Nothing is sent to
//! the backend while the map is non-empty.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::{Email, Money};

/// Shown under an empty required field.
pub const REQUIRED_MESSAGE: &str = "هذا الحقل مطلوب";
/// Shown under a malformed email field.
pub const EMAIL_MESSAGE: &str = "البريد الإلكتروني غير صالح";
/// Shown under a non-positive or non-numeric field.
pub const POSITIVE_NUMBER_MESSAGE: &str = "يجب إدخال رقم أكبر من صفر";
/// Shown under a malformed phone field.
pub const PHONE_MESSAGE: &str = "رقم الجوال غير صالح";

/// Validation messages keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    /// An empty error map.
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Record an error for `field`. The first error recorded for a field wins.
    pub fn insert(&mut self, field: &str, message: &str) {
        self.0
            .entry(field.to_string())
            .or_insert_with(|| message.to_string());
    }

    /// The message recorded for `field`, if any.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    /// Whether `field` has an error.
    #[must_use]
    pub fn has(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// Whether no errors were recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of fields with errors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate over `(field, message)` pairs in field order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Merge another map into this one.
    pub fn extend(&mut self, other: Self) {
        for (field, message) in other.0 {
            self.0.entry(field).or_insert(message);
        }
    }

    /// `Ok(())` when empty, otherwise `Err(self)`.
    ///
    /// # Errors
    ///
    /// Returns the map itself when it holds at least one error.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }

    /// Require a non-blank value.
    pub fn require(&mut self, field: &str, value: &str) {
        if value.trim().is_empty() {
            self.insert(field, REQUIRED_MESSAGE);
        }
    }

    /// Require a value that parses as an [`Email`].
    pub fn require_email(&mut self, field: &str, value: &str) {
        if value.trim().is_empty() {
            self.insert(field, REQUIRED_MESSAGE);
        } else if Email::parse(value).is_err() {
            self.insert(field, EMAIL_MESSAGE);
        }
    }

    /// Require a strictly positive decimal number.
    pub fn require_positive(&mut self, field: &str, value: &str) {
        if value.trim().is_empty() {
            self.insert(field, REQUIRED_MESSAGE);
        } else if Money::parse_positive(value).is_err() {
            self.insert(field, POSITIVE_NUMBER_MESSAGE);
        }
    }

    /// Require a phone number: digits with an optional leading `+`, 8 to 15 digits.
    pub fn require_phone(&mut self, field: &str, value: &str) {
        let value = value.trim();
        if value.is_empty() {
            self.insert(field, REQUIRED_MESSAGE);
            return;
        }
        let digits = value.strip_prefix('+').unwrap_or(value);
        let valid = digits.chars().all(|c| c.is_ascii_digit()) && (8..=15).contains(&digits.len());
        if !valid {
            self.insert(field, PHONE_MESSAGE);
        }
    }
}

/// Types that validate themselves into a [`FieldErrors`] map.
pub trait Validate {
    /// Check every field.
    ///
    /// # Errors
    ///
    /// Returns all field errors found.
    fn validate(&self) -> Result<(), FieldErrors>;
}

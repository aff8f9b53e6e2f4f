//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Date part of a timestamp.
///
/// Usage in templates: `{{ shipment.created_at|short_date }}`
#[askama::filter_fn]
pub fn short_date(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(date_part(&value.to_string()).to_string())
}

fn date_part(rendered: &str) -> &str {
    rendered
        .split(['T', ' '])
        .next()
        .unwrap_or(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_part() {
        assert_eq!(date_part("2026-03-01 10:00:00 UTC"), "2026-03-01");
        assert_eq!(date_part("2026-03-01T10:00:00Z"), "2026-03-01");
        assert_eq!(date_part("2026-03-01"), "2026-03-01");
    }
}

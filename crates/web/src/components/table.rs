//! Paginated, filterable dashboard tables.
//!
//! A table's page, search text and status filter live in the query string so
//! a refresh or a shared link shows the same rows. [`TableState`] is the
//! typed form of that query string; [`TableAction`] is how it changes.

use serde::{Deserialize, Serialize};
use shipdesk_api::{ListQuery, Pagination};
use shipdesk_core::ShipmentStatus;

/// Column header for a dashboard table.
#[derive(Debug, Clone)]
pub struct TableColumn {
    pub key: &'static str,
    pub label: &'static str,
}

impl TableColumn {
    #[must_use]
    pub const fn new(key: &'static str, label: &'static str) -> Self {
        Self { key, label }
    }
}

/// One `<option>` of a select.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
    pub disabled: bool,
}

impl FilterOption {
    /// An enabled, unselected option.
    #[must_use]
    pub fn new(value: &str, label: &str) -> Self {
        Self {
            value: value.to_string(),
            label: label.to_string(),
            selected: false,
            disabled: false,
        }
    }

    #[must_use]
    pub const fn selected(mut self, selected: bool) -> Self {
        self.selected = selected;
        self
    }

    #[must_use]
    pub const fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }
}

/// Query-string state of a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableState {
    pub page: u32,
    pub search: String,
    pub status: String,
}

impl Default for TableState {
    fn default() -> Self {
        Self {
            page: 1,
            search: String::new(),
            status: String::new(),
        }
    }
}

/// A change to a table's state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableAction {
    SetPage(u32),
    SetSearch(String),
    SetStatus(String),
}

impl TableState {
    /// Apply a change. A new search or status filter returns to page 1.
    #[must_use]
    pub fn apply(mut self, action: TableAction) -> Self {
        match action {
            TableAction::SetPage(page) => self.page = page.max(1),
            TableAction::SetSearch(search) => {
                self.search = search.trim().to_string();
                self.page = 1;
            }
            TableAction::SetStatus(status) => {
                self.status = status.trim().to_string();
                self.page = 1;
            }
        }
        self
    }

    /// The backend list query for this state.
    #[must_use]
    pub fn to_list_query(&self) -> ListQuery {
        ListQuery::first_page()
            .page(self.page.max(1))
            .search(Some(self.search.as_str()))
            .status(Some(self.status.as_str()))
    }

    /// Query string for this state, e.g. `?page=2&search=ali`.
    #[must_use]
    pub fn query_string(&self) -> String {
        let mut parts = vec![format!("page={}", self.page.max(1))];
        if !self.search.is_empty() {
            parts.push(format!("search={}", urlencoding::encode(&self.search)));
        }
        if !self.status.is_empty() {
            parts.push(format!("status={}", urlencoding::encode(&self.status)));
        }
        format!("?{}", parts.join("&"))
    }

    /// Link to another page, keeping search and filter.
    #[must_use]
    pub fn page_link(&self, page: u32) -> String {
        self.clone().apply(TableAction::SetPage(page)).query_string()
    }
}

/// Previous and next links for a table footer.
#[derive(Debug, Clone, Default)]
pub struct Pager {
    pub current: u32,
    pub total_pages: u32,
    pub total_items: u64,
    pub previous: Option<String>,
    pub next: Option<String>,
}

impl Pager {
    #[must_use]
    pub fn new(state: &TableState, pagination: &Pagination) -> Self {
        Self {
            current: pagination.current_page,
            total_pages: pagination.total_pages,
            total_items: pagination.total_items,
            previous: pagination
                .has_previous()
                .then(|| state.page_link(pagination.current_page.saturating_sub(1))),
            next: pagination
                .has_next()
                .then(|| state.page_link(pagination.current_page + 1)),
        }
    }
}

/// Status filter options for the shipments table, with "all" first.
#[must_use]
pub fn shipment_status_filter(selected: &str) -> Vec<FilterOption> {
    std::iter::once(FilterOption::new("", "كل الحالات").selected(selected.is_empty()))
        .chain(ShipmentStatus::ALL.iter().map(|status| {
            FilterOption::new(status.as_str(), status.label()).selected(status.as_str() == selected)
        }))
        .collect()
}

/// Options for a shipment's status dropdown.
///
/// `CANCELED` is only offered while the shipment is ready for pickup, even
/// when it is the current status.
#[must_use]
pub fn shipment_status_options(current: ShipmentStatus) -> Vec<FilterOption> {
    ShipmentStatus::ALL
        .iter()
        .map(|status| {
            FilterOption::new(status.as_str(), status.label())
                .selected(*status == current)
                .disabled(!current.allows_transition_to(*status))
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_search_and_status_reset_page() {
        let state = TableState::default().apply(TableAction::SetPage(4));
        assert_eq!(state.page, 4);

        let searched = state.clone().apply(TableAction::SetSearch(" ali ".to_string()));
        assert_eq!(searched.page, 1);
        assert_eq!(searched.search, "ali");

        let filtered = state.apply(TableAction::SetStatus("DELIVERED".to_string()));
        assert_eq!(filtered.page, 1);
        assert_eq!(filtered.status, "DELIVERED");
    }

    #[test]
    fn test_page_zero_becomes_one() {
        let state = TableState::default().apply(TableAction::SetPage(0));
        assert_eq!(state.page, 1);
    }

    #[test]
    fn test_query_string_round_trips_through_serde() {
        let state = TableState {
            page: 2,
            search: "أحمد علي".to_string(),
            status: "IN_TRANSIT".to_string(),
        };
        let query = state.query_string();
        assert!(query.starts_with("?page=2&search="));

        let parsed: TableState = parse_query(&query[1..]);
        assert_eq!(parsed, state);
    }

    fn parse_query(query: &str) -> TableState {
        let uri: axum::http::Uri = format!("/?{query}").parse().unwrap();
        axum::extract::Query::<TableState>::try_from_uri(&uri).unwrap().0
    }

    #[test]
    fn test_cancel_only_offered_when_ready_for_pickup() {
        let ready = shipment_status_options(ShipmentStatus::ReadyForPickup);
        let cancel = ready.iter().find(|o| o.value == "CANCELED").unwrap();
        assert!(!cancel.disabled);

        for current in [
            ShipmentStatus::Pending,
            ShipmentStatus::InTransit,
            ShipmentStatus::Delivered,
            ShipmentStatus::Canceled,
        ] {
            let options = shipment_status_options(current);
            let cancel = options.iter().find(|o| o.value == "CANCELED").unwrap();
            assert!(cancel.disabled, "{current}");
        }
    }

    #[test]
    fn test_current_status_is_selected() {
        let options = shipment_status_options(ShipmentStatus::InTransit);
        let selected: Vec<_> = options.iter().filter(|o| o.selected).collect();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].value, "IN_TRANSIT");
        assert!(!selected[0].disabled);
    }

    #[test]
    fn test_status_filter_starts_with_all() {
        let options = shipment_status_filter("");
        assert_eq!(options[0].value, "");
        assert!(options[0].selected);
        assert_eq!(options.len(), ShipmentStatus::ALL.len() + 1);
    }
}

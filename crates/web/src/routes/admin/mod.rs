//! Admin dashboard handlers.
//!
//! Every table keeps its page, search and status filter in the query string.
//! Row actions post a hidden `back` field holding that query string so the
//! redirect after the mutation lands on the same view, which then refetches
//! the list the mutation invalidated.

pub mod dashboard;
pub mod notifications;
pub mod orders;
pub mod shipments;
pub mod users;
pub mod wallets;

use crate::components::{FilterOption, TableAction, TableState};

/// Normalize a table query: blank filters are dropped, page 0 becomes 1.
pub(crate) fn normalize(table: TableState) -> TableState {
    let TableState { page, search, status } = table;
    TableState::default()
        .apply(TableAction::SetSearch(search))
        .apply(TableAction::SetStatus(status))
        .apply(TableAction::SetPage(page))
}

/// Options for a table's status filter, with "all" first.
pub(crate) fn status_filter<'a>(
    selected: &str,
    options: impl IntoIterator<Item = (&'a str, &'a str)>,
) -> Vec<FilterOption> {
    std::iter::once(FilterOption::new("", "الكل").selected(selected.is_empty()))
        .chain(
            options
                .into_iter()
                .map(|(value, label)| FilterOption::new(value, label).selected(value == selected)),
        )
        .collect()
}

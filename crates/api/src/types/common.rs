//! Response envelopes and list queries shared by every resource.

use serde::{Deserialize, Serialize};

/// Default page size for list endpoints.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Single-value envelope: `{ "data": ... }`.
#[derive(Debug, Clone, Deserialize)]
pub struct Data<T> {
    pub data: T,
}

/// Paginated list envelope: `{ "data": [...], "pagination": {...} }`.
#[derive(Debug, Clone, Deserialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    #[serde(default)]
    pub pagination: Pagination,
}

/// Page metadata returned with paginated lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    #[serde(default = "first_page")]
    pub current_page: u32,
    #[serde(default = "first_page")]
    pub total_pages: u32,
    #[serde(default)]
    pub total_items: u64,
}

const fn first_page() -> u32 {
    1
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            current_page: 1,
            total_pages: 1,
            total_items: 0,
        }
    }
}

impl Pagination {
    /// Whether a page exists before the current one.
    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.current_page > 1
    }

    /// Whether a page exists after the current one.
    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.current_page < self.total_pages
    }
}

/// Acknowledgement returned by mutations: `{ "message": "..." }`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Ack {
    #[serde(default)]
    pub message: Option<String>,
}

/// Error body returned by the backend on failure.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}

/// Query parameters accepted by every list endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListQuery {
    pub page: u32,
    pub limit: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
            search: None,
            status: None,
        }
    }
}

impl ListQuery {
    /// First page with the default page size.
    #[must_use]
    pub fn first_page() -> Self {
        Self::default()
    }

    /// Set the page number (pages are 1-based; 0 is treated as 1).
    #[must_use]
    pub fn page(mut self, page: u32) -> Self {
        self.page = page.max(1);
        self
    }

    /// Filter by free-text search; blank input clears the filter.
    #[must_use]
    pub fn search(mut self, search: Option<&str>) -> Self {
        self.search = search
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from);
        self
    }

    /// Filter by status wire value; blank input clears the filter.
    #[must_use]
    pub fn status(mut self, status: Option<&str>) -> Self {
        self.status = status
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from);
        self
    }
}

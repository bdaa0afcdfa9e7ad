//! Pagination types for windowed collection loads.

use serde::{Deserialize, Serialize};

use crate::config::collection::MAX_PAGE_SIZE;

/// Default page size.
const DEFAULT_PAGE_SIZE: u64 = 20;

/// Request parameters for a paginated query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// Page number (1-based).
    #[serde(default = "default_page")]
    pub page: u64,
    /// Number of items per page.
    #[serde(default = "default_page_size")]
    pub page_size: u64,
}

impl PageRequest {
    /// Create a new page request.
    pub fn new(page: u64, page_size: u64) -> Self {
        Self {
            page: page.max(1),
            page_size: page_size.clamp(1, MAX_PAGE_SIZE),
        }
    }

    /// Index of the first record on this page.
    pub fn offset(&self) -> u64 {
        (self.page.saturating_sub(1)) * self.page_size
    }

    /// Maximum number of records on this page.
    pub fn limit(&self) -> u64 {
        self.page_size
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Derived navigation values for one page of a known total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    /// Current page number (1-based).
    pub page: u64,
    /// Number of items per page.
    pub page_size: u64,
    /// Total number of items across all pages.
    pub total_items: u64,
    /// Total number of pages (`0` when there are no items).
    pub total_pages: u64,
    /// Whether a page follows this one.
    pub has_next: bool,
    /// Whether a page precedes this one.
    pub has_previous: bool,
}

impl PageInfo {
    /// Compute navigation values for `request` against `total_items`.
    pub fn new(request: PageRequest, total_items: u64) -> Self {
        Self {
            page: request.page,
            page_size: request.page_size,
            total_items,
            total_pages: total_items.div_ceil(request.page_size),
            has_next: request.offset() + request.page_size < total_items,
            has_previous: request.page > 1,
        }
    }

    /// Number of items that page `page` holds for this total.
    pub fn items_on(&self, page: u64) -> u64 {
        let offset = page.saturating_sub(1) * self.page_size;
        self.total_items.saturating_sub(offset).min(self.page_size)
    }
}

/// Paginated response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResponse<T> {
    /// The items on this page.
    pub items: Vec<T>,
    /// Navigation values.
    #[serde(flatten)]
    pub info: PageInfo,
}

impl<T> PageResponse<T> {
    /// Create a new paginated response.
    pub fn new(items: Vec<T>, request: PageRequest, total_items: u64) -> Self {
        Self {
            items,
            info: PageInfo::new(request, total_items),
        }
    }

    /// Create an empty response.
    pub fn empty(request: PageRequest) -> Self {
        Self::new(Vec::new(), request, 0)
    }
}

fn default_page() -> u64 {
    1
}

fn default_page_size() -> u64 {
    DEFAULT_PAGE_SIZE
}

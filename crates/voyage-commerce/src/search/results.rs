//! Search results and pagination.

use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Pagination info.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Pagination {
    /// Current page (1-indexed).
    pub page: usize,
    /// Items per page.
    pub page_size: usize,
    /// Total number of matching items.
    pub total: usize,
    /// `ceil(total / page_size)`; zero when nothing matched.
    pub total_pages: usize,
    /// Whether there's a next page.
    pub has_next: bool,
    /// Whether there's a previous page.
    pub has_prev: bool,
}

impl Pagination {
    /// Create pagination info. `page` and `page_size` are floored at 1.
    pub fn new(page: usize, page_size: usize, total: usize) -> Self {
        let page = page.max(1);
        let page_size = page_size.max(1);
        let total_pages = total.div_ceil(page_size);

        Self {
            page,
            page_size,
            total,
            total_pages,
            has_next: page < total_pages,
            has_prev: page > 1,
        }
    }

    /// Everything on one page, for catalogs without pagination.
    pub fn single_page(total: usize) -> Self {
        Self::new(1, total.max(1), total)
    }

    /// Index range of the current page within the full result list.
    ///
    /// Pages past the end yield an empty range.
    pub fn range(&self) -> Range<usize> {
        let start = (self.page - 1).saturating_mul(self.page_size).min(self.total);
        let end = self.page.saturating_mul(self.page_size).min(self.total);
        start..end
    }

    /// Get page numbers for display (e.g., [3, 4, 5, 6, 7]).
    pub fn page_numbers(&self, max_visible: usize) -> Vec<usize> {
        if self.total_pages <= max_visible {
            return (1..=self.total_pages).collect();
        }
        if max_visible == 0 {
            return Vec::new();
        }

        let half = max_visible / 2;
        let start = self.page.saturating_sub(half).max(1);
        let end = (start + max_visible - 1).min(self.total_pages);
        let start = (end + 1).saturating_sub(max_visible).max(1);

        (start..=end).collect()
    }

    /// Check if on first page.
    pub fn is_first(&self) -> bool {
        self.page == 1
    }

    /// Check if on last page.
    pub fn is_last(&self) -> bool {
        self.page >= self.total_pages
    }

    /// Get start item number (1-indexed), 0 when the page is empty.
    pub fn start_item(&self) -> usize {
        let range = self.range();
        if range.is_empty() {
            0
        } else {
            range.start + 1
        }
    }

    /// Get end item number.
    pub fn end_item(&self) -> usize {
        self.range().end
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(1, 24, 0)
    }
}

/// Search results container.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResults<T> {
    /// The items on the current page, in sorted order.
    pub items: Vec<T>,
    /// Pagination info.
    pub pagination: Pagination,
    /// Option counts per discrete facet.
    pub facets: Vec<FacetCounts>,
}

impl<T> SearchResults<T> {
    /// Create new search results.
    pub fn new(items: Vec<T>, pagination: Pagination) -> Self {
        Self {
            items,
            pagination,
            facets: Vec::new(),
        }
    }

    /// Set facets.
    pub fn with_facets(mut self, facets: Vec<FacetCounts>) -> Self {
        self.facets = facets;
        self
    }

    /// Nothing matched the current filters: the "no results" state.
    pub fn is_empty(&self) -> bool {
        self.pagination.total == 0
    }

    /// Get number of items in this page.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Map the items, e.g. to owned copies.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> SearchResults<U> {
        SearchResults {
            items: self.items.into_iter().map(f).collect(),
            pagination: self.pagination,
            facets: self.facets,
        }
    }
}

/// Options of one discrete facet.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FacetCounts {
    /// Facet key (e.g., "category").
    pub key: String,
    /// Display name.
    pub label: String,
    pub values: Vec<FacetValue>,
}

/// A single facet value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FacetValue {
    /// The value.
    pub value: String,
    /// Number of catalog items with this value.
    pub count: usize,
    /// Whether currently selected.
    pub selected: bool,
}

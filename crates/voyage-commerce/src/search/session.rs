//! Search page state with a synchronously derived view.
//!
//! Every mutation commits a new [`SearchState`] and re-derives the visible
//! list before returning, so readers never observe a view that is stale
//! relative to the state.

use crate::error::CommerceError;
use crate::search::{CatalogConfig, FacetCounts, Filter, Pagination, SearchResults, SearchState, SortOption};
use std::sync::Arc;

/// One search page over one catalog.
pub struct SearchSession<T> {
    config: Arc<CatalogConfig<T>>,
    items: Arc<[T]>,
    state: SearchState,
    view: Vec<usize>,
    pagination: Pagination,
    revision: u64,
}

impl<T> SearchSession<T> {
    pub fn new(config: Arc<CatalogConfig<T>>, items: impl Into<Arc<[T]>>) -> Self {
        let state = config.default_state();
        let mut session = Self {
            config,
            items: items.into(),
            state,
            view: Vec::new(),
            pagination: Pagination::default(),
            revision: 0,
        };
        session.derive();
        session
    }

    /// Start from an existing state, e.g. one restored from a URL.
    pub fn with_state(mut self, state: SearchState) -> Self {
        self.commit(state);
        self
    }

    pub fn config(&self) -> &CatalogConfig<T> {
        &self.config
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn state(&self) -> &SearchState {
        &self.state
    }

    /// Number of committed state changes.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn pagination(&self) -> Pagination {
        self.pagination
    }

    /// Set one filter dimension. Returns false for unknown facets and for
    /// selections equal to the current one.
    pub fn set_filter(&mut self, key: &str, filter: Filter) -> bool {
        if self.config.find_facet(key).is_none() {
            tracing::warn!(catalog = self.config.name(), facet = key, "unknown filter ignored");
            return false;
        }
        let mut next = self.state.clone();
        next.put_filter(key.to_string(), filter);
        next.page = 1;
        self.commit(next)
    }

    /// Parse raw control input and set it.
    pub fn set_filter_input(&mut self, key: &str, raw: &str) -> Result<bool, CommerceError> {
        let filter = self.config.parse_filter(key, raw)?;
        Ok(self.set_filter(key, filter))
    }

    pub fn clear_filter(&mut self, key: &str) -> bool {
        if !self.state.filters.contains_key(key) {
            return false;
        }
        let mut next = self.state.clone();
        next.filters.remove(key);
        next.page = 1;
        self.commit(next)
    }

    pub fn set_sort(&mut self, sort: SortOption) -> bool {
        let mut next = self.state.clone();
        next.sort = sort;
        next.page = 1;
        self.commit(next)
    }

    /// Go to `page`, clamped to the pages that exist.
    pub fn set_page(&mut self, page: usize) -> bool {
        let last = self.pagination.total_pages.max(1);
        let mut next = self.state.clone();
        next.page = page.clamp(1, last);
        self.commit(next)
    }

    pub fn next_page(&mut self) -> bool {
        self.pagination.has_next && self.set_page(self.state.page + 1)
    }

    pub fn prev_page(&mut self) -> bool {
        self.pagination.has_prev && self.set_page(self.state.page - 1)
    }

    pub fn set_page_size(&mut self, page_size: usize) -> bool {
        let mut next = self.state.clone();
        next.page_size = page_size.max(1);
        next.page = 1;
        self.commit(next)
    }

    /// Swap in freshly loaded catalog data. Filters and sort are kept.
    pub fn replace_items(&mut self, items: impl Into<Arc<[T]>>) {
        self.items = items.into();
        self.state.page = 1;
        self.revision += 1;
        self.derive();
    }

    /// Clear every filter and return to page 1 in a single commit.
    pub fn reset_filters(&mut self) -> bool {
        let mut next = self.state.clone();
        next.filters.clear();
        next.page = 1;
        self.commit(next)
    }

    fn commit(&mut self, next: SearchState) -> bool {
        if next == self.state {
            return false;
        }
        self.state = next;
        self.revision += 1;
        self.derive();
        true
    }

    fn derive(&mut self) {
        self.view = self.config.ordered_indices(&self.items, &self.state);
        self.pagination = self
            .config
            .pagination(self.view.len(), self.state.page, self.state.page_size);
        tracing::debug!(
            catalog = self.config.name(),
            revision = self.revision,
            matched = self.view.len(),
            page = self.pagination.page,
            "search view derived"
        );
    }

    /// The visible page.
    pub fn results(&self) -> SearchResults<&T> {
        let range = self.pagination.range();
        let items = self.view[range].iter().map(|&i| &self.items[i]).collect();
        SearchResults::new(items, self.pagination).with_facets(self.facet_counts())
    }

    /// Number of items matching the current filters, across all pages.
    pub fn total(&self) -> usize {
        self.view.len()
    }

    /// Nothing matches: the page shows its "no results" state.
    pub fn is_empty_result(&self) -> bool {
        self.view.is_empty()
    }

    pub fn facet_counts(&self) -> Vec<FacetCounts> {
        self.config.facet_counts(&self.items, &self.state)
    }
}

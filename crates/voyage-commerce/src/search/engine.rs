//! The filter, sort, paginate pipeline shared by every catalog.

use crate::error::CommerceError;
use crate::search::{
    Facet, FacetCounts, Filter, Pagination, SearchResults, SearchState, SortOption, SortRegistry,
};
use std::collections::BTreeMap;
use std::fmt;

/// Default page size for paginated catalogs.
pub const DEFAULT_PAGE_SIZE: usize = 12;

/// How one catalog exposes its items to search.
pub struct CatalogConfig<T> {
    name: &'static str,
    facets: Vec<Facet<T>>,
    sorts: SortRegistry<T>,
    default_page_size: usize,
    paginated: bool,
}

impl<T> CatalogConfig<T> {
    /// A catalog that shows every match on one page.
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            facets: Vec::new(),
            sorts: SortRegistry::new(),
            default_page_size: DEFAULT_PAGE_SIZE,
            paginated: false,
        }
    }

    pub fn facet(mut self, facet: Facet<T>) -> Self {
        if self.facets.iter().any(|f| f.key() == facet.key()) {
            tracing::warn!(catalog = self.name, facet = facet.key(), "duplicate facet replaced");
            self.facets.retain(|f| f.key() != facet.key());
        }
        self.facets.push(facet);
        self
    }

    pub fn sorts(mut self, sorts: SortRegistry<T>) -> Self {
        self.sorts = sorts;
        self
    }

    /// Split results into pages of `page_size`.
    pub fn paginated(mut self, page_size: usize) -> Self {
        self.paginated = true;
        self.default_page_size = page_size.max(1);
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is_paginated(&self) -> bool {
        self.paginated
    }

    pub fn default_page_size(&self) -> usize {
        self.default_page_size
    }

    pub fn facets(&self) -> &[Facet<T>] {
        &self.facets
    }

    pub fn find_facet(&self, key: &str) -> Option<&Facet<T>> {
        self.facets.iter().find(|f| f.key() == key)
    }

    pub fn sort_options(&self) -> Vec<SortOption> {
        self.sorts.options()
    }

    /// Initial state: no filters, relevance order, page 1.
    pub fn default_state(&self) -> SearchState {
        SearchState::new(self.default_page_size)
    }

    /// Parse raw control input for the facet named `key`.
    pub fn parse_filter(&self, key: &str, raw: &str) -> Result<Filter, CommerceError> {
        let facet = self.find_facet(key).ok_or_else(|| CommerceError::InvalidFilter {
            facet: key.to_string(),
            reason: format!("catalog {} has no such filter", self.name),
        })?;
        facet.parse_filter(raw)
    }

    fn active<'f>(&'f self, filters: &'f BTreeMap<String, Filter>) -> Vec<(&'f Facet<T>, &'f Filter)> {
        filters
            .iter()
            .filter(|(_, filter)| filter.is_active())
            .filter_map(|(key, filter)| match self.find_facet(key) {
                Some(facet) => Some((facet, filter)),
                None => {
                    tracing::warn!(catalog = self.name, facet = %key, "unknown filter ignored");
                    None
                }
            })
            .collect()
    }

    /// Conjunction of all active filters, in catalog order.
    pub fn filter_items<'a>(&self, items: &'a [T], filters: &BTreeMap<String, Filter>) -> Vec<&'a T> {
        let active = self.active(filters);
        items
            .iter()
            .filter(|item| active.iter().all(|(facet, filter)| facet.matches(item, filter)))
            .collect()
    }

    /// Stable sort; `Relevance` keeps the incoming order.
    pub fn sort_items<'a>(&self, mut items: Vec<&'a T>, sort: SortOption) -> Vec<&'a T> {
        self.sorts.sort(&mut items, sort);
        items
    }

    /// Slice out the requested page. Non-paginated catalogs return one page.
    pub fn paginate<'a>(&self, items: Vec<&'a T>, page: usize, page_size: usize) -> SearchResults<&'a T> {
        let pagination = self.pagination(items.len(), page, page_size);
        let range = pagination.range();
        let page_items = items
            .into_iter()
            .skip(range.start)
            .take(range.len())
            .collect();
        SearchResults::new(page_items, pagination)
    }

    pub(crate) fn pagination(&self, total: usize, page: usize, page_size: usize) -> Pagination {
        if self.paginated {
            Pagination::new(page, page_size, total)
        } else {
            Pagination::single_page(total)
        }
    }

    /// Matching item positions in display order.
    pub(crate) fn ordered_indices(&self, items: &[T], state: &SearchState) -> Vec<usize> {
        let active = self.active(&state.filters);
        let mut indices: Vec<usize> = items
            .iter()
            .enumerate()
            .filter(|(_, item)| active.iter().all(|(facet, filter)| facet.matches(item, filter)))
            .map(|(i, _)| i)
            .collect();
        if let Some(cmp) = self.sorts.comparator(state.sort) {
            indices.sort_by(|&a, &b| cmp(&items[a], &items[b]));
        }
        indices
    }

    /// Option counts for every discrete facet, over the whole catalog.
    pub fn facet_counts(&self, items: &[T], state: &SearchState) -> Vec<FacetCounts> {
        self.facets
            .iter()
            .filter_map(|facet| {
                let values = facet.options(items, state.filter(facet.key()));
                (!values.is_empty()).then(|| FacetCounts {
                    key: facet.key().to_string(),
                    label: facet.label().to_string(),
                    values,
                })
            })
            .collect()
    }

    /// Filter, sort and paginate `items` for `state`. The source is untouched.
    pub fn derive<'a>(&self, items: &'a [T], state: &SearchState) -> SearchResults<&'a T> {
        let filtered = self.filter_items(items, &state.filters);
        let sorted = self.sort_items(filtered, state.sort);
        tracing::debug!(
            catalog = self.name,
            matched = sorted.len(),
            sort = %state.sort,
            page = state.page,
            "derived view"
        );
        self.paginate(sorted, state.page, state.page_size)
            .with_facets(self.facet_counts(items, state))
    }
}

impl<T> fmt::Debug for CatalogConfig<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CatalogConfig")
            .field("name", &self.name)
            .field("facets", &self.facets)
            .field("sorts", &self.sorts)
            .field("default_page_size", &self.default_page_size)
            .field("paginated", &self.paginated)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Plan {
        name: &'static str,
        cpu: &'static str,
        location: &'static str,
        price: f64,
    }

    fn plans() -> Vec<Plan> {
        vec![
            Plan { name: "Nano", cpu: "1 vCPU", location: "US", price: 5.0 },
            Plan { name: "Micro", cpu: "2 vCPU", location: "EU", price: 10.0 },
            Plan { name: "Small", cpu: "2 vCPU", location: "US", price: 20.0 },
            Plan { name: "Medium", cpu: "4 vCPU", location: "US", price: 10.0 },
            Plan { name: "Large", cpu: "8 vCPU", location: "EU", price: 80.0 },
        ]
    }

    fn config() -> CatalogConfig<Plan> {
        CatalogConfig::new("vps")
            .facet(Facet::exact("cpu", "CPU", |p: &Plan| p.cpu))
            .facet(Facet::exact("location", "Location", |p: &Plan| p.location))
            .facet(Facet::at_most("price", "Max price", |p: &Plan| p.price))
            .sorts(
                SortRegistry::new()
                    .ascending(SortOption::PriceAsc, |p: &Plan| p.price)
                    .descending(SortOption::PriceDesc, |p: &Plan| p.price),
            )
    }

    fn names(results: &SearchResults<&Plan>) -> Vec<&'static str> {
        results.items.iter().map(|p| p.name).collect()
    }

    #[test]
    fn test_filters_are_a_conjunction() {
        let plans = plans();
        let state = SearchState::default()
            .with_filter("location", Filter::equals("US"))
            .with_filter("price", Filter::at_most(10.0));
        let results = config().derive(&plans, &state);
        assert_eq!(names(&results), vec!["Nano", "Medium"]);
        assert_eq!(results.pagination.total, 2);
    }

    #[test]
    fn test_relevance_keeps_catalog_order() {
        let plans = plans();
        let results = config().derive(&plans, &SearchState::default());
        assert_eq!(names(&results), vec!["Nano", "Micro", "Small", "Medium", "Large"]);
    }

    #[test]
    fn test_price_sort_is_stable() {
        let plans = plans();
        let state = SearchState::default().with_sort(SortOption::PriceAsc);
        let results = config().derive(&plans, &state);
        assert_eq!(names(&results), vec!["Nano", "Micro", "Medium", "Small", "Large"]);
    }

    #[test]
    fn test_unknown_filter_is_ignored() {
        let plans = plans();
        let state = SearchState::default().with_filter("gpu", Filter::equals("A100"));
        assert_eq!(config().derive(&plans, &state).pagination.total, 5);
    }

    #[test]
    fn test_pagination_slices_sorted_matches() {
        let plans = plans();
        let config = config().paginated(2);
        let state = config.default_state().with_sort(SortOption::PriceDesc).with_page(2);
        let results = config.derive(&plans, &state);
        assert_eq!(names(&results), vec!["Micro", "Medium"]);
        assert_eq!(results.pagination.total_pages, 3);

        let past_end = config.derive(&plans, &state.clone().with_page(7));
        assert!(past_end.items.is_empty());
        assert_eq!(past_end.pagination.total, 5);
    }

    #[test]
    fn test_unpaginated_catalog_ignores_page() {
        let plans = plans();
        let state = SearchState::default().with_page(3);
        let results = config().derive(&plans, &state);
        assert_eq!(results.len(), 5);
        assert_eq!(results.pagination.total_pages, 1);
    }

    #[test]
    fn test_no_matches() {
        let plans = plans();
        let state = SearchState::default().with_filter("cpu", Filter::equals("64 vCPU"));
        let results = config().derive(&plans, &state);
        assert!(results.is_empty());
        assert_eq!(results.pagination.total_pages, 0);
    }

    #[test]
    fn test_facet_counts() {
        let plans = plans();
        let state = SearchState::default().with_filter("location", Filter::equals("EU"));
        let counts = config().facet_counts(&plans, &state);
        assert_eq!(counts.len(), 2);
        let location = &counts[1];
        assert_eq!(location.key, "location");
        assert!(location.values.iter().any(|v| v.value == "EU" && v.count == 2 && v.selected));
    }

    #[test]
    fn test_parse_filter_unknown_key() {
        assert!(config().parse_filter("gpu", "A100").is_err());
        assert_eq!(config().parse_filter("price", "15").unwrap(), Filter::AtMost(15.0));
    }
}

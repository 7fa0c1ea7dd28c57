//! Sort options, comparator registry, and the search state a page holds.

use crate::search::Filter;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

/// Sort options for search results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortOption {
    /// Catalog order as delivered (identity).
    #[default]
    Relevance,
    /// Sort by price, low to high.
    PriceAsc,
    /// Sort by price, high to low.
    PriceDesc,
    /// Sort by name A-Z.
    NameAsc,
    /// Sort by name Z-A.
    NameDesc,
    /// Sort by newest first.
    Newest,
    /// Sort by oldest first.
    Oldest,
    /// Sort by highest rated.
    Rating,
    /// Sort by most booked.
    Popularity,
    /// Sort by shortest duration.
    Duration,
}

impl SortOption {
    pub const ALL: [SortOption; 10] = [
        SortOption::Relevance,
        SortOption::PriceAsc,
        SortOption::PriceDesc,
        SortOption::NameAsc,
        SortOption::NameDesc,
        SortOption::Newest,
        SortOption::Oldest,
        SortOption::Rating,
        SortOption::Popularity,
        SortOption::Duration,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortOption::Relevance => "relevance",
            SortOption::PriceAsc => "price_asc",
            SortOption::PriceDesc => "price_desc",
            SortOption::NameAsc => "name_asc",
            SortOption::NameDesc => "name_desc",
            SortOption::Newest => "newest",
            SortOption::Oldest => "oldest",
            SortOption::Rating => "rating",
            SortOption::Popularity => "popularity",
            SortOption::Duration => "duration",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        let s = s.trim().to_lowercase().replace('-', "_");
        Self::ALL.into_iter().find(|o| o.as_str() == s)
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            SortOption::Relevance => "Relevance",
            SortOption::PriceAsc => "Price: Low to High",
            SortOption::PriceDesc => "Price: High to Low",
            SortOption::NameAsc => "Name: A-Z",
            SortOption::NameDesc => "Name: Z-A",
            SortOption::Newest => "Newest",
            SortOption::Oldest => "Oldest",
            SortOption::Rating => "Highest Rated",
            SortOption::Popularity => "Most Popular",
            SortOption::Duration => "Shortest First",
        }
    }
}

impl fmt::Display for SortOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

type Comparator<T> = Box<dyn Fn(&T, &T) -> Ordering + Send + Sync>;

/// Comparators a catalog supports, keyed by sort option.
///
/// `Relevance` is always available and never reorders.
pub struct SortRegistry<T> {
    comparators: BTreeMap<SortOption, Comparator<T>>,
}

impl<T> SortRegistry<T> {
    pub fn new() -> Self {
        Self {
            comparators: BTreeMap::new(),
        }
    }

    /// Register a comparator for an option, replacing any previous one.
    pub fn register<F>(mut self, option: SortOption, cmp: F) -> Self
    where
        F: Fn(&T, &T) -> Ordering + Send + Sync + 'static,
    {
        if option == SortOption::Relevance {
            tracing::warn!("relevance order is fixed; comparator ignored");
            return self;
        }
        self.comparators.insert(option, Box::new(cmp));
        self
    }

    /// Smallest key first.
    pub fn ascending<F>(self, option: SortOption, key: F) -> Self
    where
        F: Fn(&T) -> f64 + Send + Sync + 'static,
    {
        self.register(option, move |a, b| key(a).total_cmp(&key(b)))
    }

    /// Largest key first.
    pub fn descending<F>(self, option: SortOption, key: F) -> Self
    where
        F: Fn(&T) -> f64 + Send + Sync + 'static,
    {
        self.register(option, move |a, b| key(b).total_cmp(&key(a)))
    }

    /// Case-insensitive lexicographic order.
    pub fn alphabetical<F>(self, option: SortOption, key: F, descending: bool) -> Self
    where
        F: Fn(&T) -> &str + Send + Sync + 'static,
    {
        self.register(option, move |a, b| {
            let ord = compare_ignore_case(key(a), key(b));
            if descending {
                ord.reverse()
            } else {
                ord
            }
        })
    }

    /// Options offered to the shopper, `Relevance` first.
    pub fn options(&self) -> Vec<SortOption> {
        std::iter::once(SortOption::Relevance)
            .chain(self.comparators.keys().copied())
            .collect()
    }

    pub fn supports(&self, option: SortOption) -> bool {
        option == SortOption::Relevance || self.comparators.contains_key(&option)
    }

    /// Comparator for an option; None means keep the current order.
    pub fn comparator(&self, option: SortOption) -> Option<&(dyn Fn(&T, &T) -> Ordering + Send + Sync)> {
        if option == SortOption::Relevance {
            return None;
        }
        let cmp = self.comparators.get(&option);
        if cmp.is_none() {
            tracing::warn!(sort = %option, "sort option not supported; keeping catalog order");
        }
        cmp.map(|c| c.as_ref())
    }

    /// Stable sort of `items` by `option`.
    pub fn sort(&self, items: &mut [&T], option: SortOption) {
        if let Some(cmp) = self.comparator(option) {
            items.sort_by(|a, b| cmp(a, b));
        }
    }
}

impl<T> Default for SortRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for SortRegistry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.options()).finish()
    }
}

fn compare_ignore_case(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
}

/// What a search page currently has selected.
///
/// Only active filters are stored, so an empty map is the unfiltered state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchState {
    /// Active filters keyed by facet key.
    #[serde(default)]
    pub filters: BTreeMap<String, Filter>,
    #[serde(default)]
    pub sort: SortOption,
    /// Current page (1-indexed).
    pub page: usize,
    /// Items per page.
    pub page_size: usize,
}

impl SearchState {
    pub fn new(page_size: usize) -> Self {
        Self {
            filters: BTreeMap::new(),
            sort: SortOption::Relevance,
            page: 1,
            page_size: page_size.max(1),
        }
    }

    /// Set a filter; inactive selections remove the dimension.
    pub fn with_filter(mut self, key: impl Into<String>, filter: Filter) -> Self {
        self.put_filter(key.into(), filter);
        self
    }

    pub fn with_sort(mut self, sort: SortOption) -> Self {
        self.sort = sort;
        self
    }

    pub fn with_page(mut self, page: usize) -> Self {
        self.page = page.max(1);
        self
    }

    pub(crate) fn put_filter(&mut self, key: String, filter: Filter) {
        if filter.is_active() {
            self.filters.insert(key, filter);
        } else {
            self.filters.remove(&key);
        }
    }

    pub fn filter(&self, key: &str) -> &Filter {
        static ANY: Filter = Filter::Any;
        self.filters.get(key).unwrap_or(&ANY)
    }

    pub fn has_active_filters(&self) -> bool {
        !self.filters.is_empty()
    }
}

impl Default for SearchState {
    fn default() -> Self {
        Self::new(24)
    }
}

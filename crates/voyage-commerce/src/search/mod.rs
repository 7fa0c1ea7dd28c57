//! Search module.
//!
//! One filter, sort and paginate pipeline that every catalog page configures
//! with its own facets and comparators.

mod debounce;
mod engine;
mod filter;
mod query;
mod results;
mod session;

pub use debounce::{Debouncer, DEFAULT_DEBOUNCE};
pub use engine::{CatalogConfig, DEFAULT_PAGE_SIZE};
pub use filter::{Facet, FacetKind, Field, Filter};
pub use query::{SearchState, SortOption, SortRegistry};
pub use results::{FacetCounts, FacetValue, Pagination, SearchResults};
pub use session::SearchSession;

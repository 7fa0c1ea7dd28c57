//! Storefront core for Voyage: the session cart and the catalog search engine.
//!
//! - **Cart**: line items merged by `(id, variant)`, quantities, promo codes,
//!   derived totals, and JSON snapshots
//! - **Search**: faceted filters, sort orders, pagination, and a debouncer
//!   for typed queries, shared by every catalog page
//! - **Catalog**: cars, VPS plans, tours, visas, software licenses, and shop
//!   products
//!
//! # Example
//!
//! ```rust
//! use voyage_commerce::prelude::*;
//!
//! let cart = CartStore::new();
//! let tent = NewCartItem::new("tent-2p", "Trail Tent", Money::from_decimal(150.0, Currency::USD));
//! cart.add_to_cart(tent.clone());
//! cart.add_to_cart(tent);
//!
//! let totals = cart.totals(&PricingPolicy::default()).unwrap();
//! // 300.00 subtotal ships free; tax is 5%.
//! assert_eq!(totals.total, Money::from_decimal(315.0, Currency::USD));
//! ```

pub mod error;
pub mod ids;
pub mod money;

pub mod cart;
pub mod catalog;
pub mod search;

pub use error::CommerceError;
pub use ids::*;
pub use money::{format_currency, Currency, Money};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::CommerceError;
    pub use crate::ids::*;
    pub use crate::money::{format_currency, Currency, Money};

    // Cart
    pub use crate::cart::{
        AppliedPromo, BookingDetails, CartItem, CartSnapshot, CartStore, CartTotals, LineKey,
        NewCartItem, PricingPolicy, Promo, PromoKind, PromoTable,
    };

    // Catalog
    pub use crate::catalog::{Car, CatalogKind, License, Listing, Product, Tour, Visa, VpsPlan};

    // Search
    pub use crate::search::{
        CatalogConfig, Debouncer, Facet, Filter, Pagination, SearchResults, SearchSession,
        SearchState, SortOption,
    };
}

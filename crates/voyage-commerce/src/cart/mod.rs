//! Shopping cart module.
//!
//! Contains the session cart store, line items, pricing, promo codes, and
//! snapshot persistence.

mod item;
mod pricing;
mod promo;
mod snapshot;
mod store;

pub use item::{parse_quantity, BookingDetails, CartItem, LineKey, NewCartItem, MAX_QUANTITY_PER_ITEM};
pub use pricing::{CartTotals, LineTotal, PricingPolicy};
pub use promo::{AppliedPromo, Promo, PromoKind, PromoTable};
pub use snapshot::{CartSnapshot, SNAPSHOT_VERSION};
pub use store::{CartState, CartStore};

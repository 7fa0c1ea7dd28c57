//! Catalog module.
//!
//! Concrete listing records for each storefront page and the search
//! configuration each page uses.

mod hosting;
mod product;
mod software;
mod travel;

pub use hosting::VpsPlan;
pub use product::{Product, ProductVariant, PRODUCTS_PER_PAGE};
pub use software::License;
pub use travel::{Car, Tour, Visa};

use crate::cart::NewCartItem;
use crate::error::CommerceError;
use crate::ids::ItemId;
use crate::money::Currency;
use crate::search::CatalogConfig;
use chrono::{Datelike, NaiveDate};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The storefront's catalogs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogKind {
    Cars,
    Vps,
    Tours,
    Visas,
    Licenses,
    Products,
}

impl CatalogKind {
    pub const ALL: [CatalogKind; 6] = [
        CatalogKind::Cars,
        CatalogKind::Vps,
        CatalogKind::Tours,
        CatalogKind::Visas,
        CatalogKind::Licenses,
        CatalogKind::Products,
    ];

    /// Path segment used by the catalog API.
    pub fn as_str(&self) -> &'static str {
        match self {
            CatalogKind::Cars => "cars",
            CatalogKind::Vps => "vps",
            CatalogKind::Tours => "tours",
            CatalogKind::Visas => "visas",
            CatalogKind::Licenses => "licenses",
            CatalogKind::Products => "products",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "cars" | "car" => Some(CatalogKind::Cars),
            "vps" | "servers" => Some(CatalogKind::Vps),
            "tours" | "tour" => Some(CatalogKind::Tours),
            "visas" | "visa" => Some(CatalogKind::Visas),
            "licenses" | "license" | "software" => Some(CatalogKind::Licenses),
            "products" | "product" | "shop" => Some(CatalogKind::Products),
            _ => None,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            CatalogKind::Cars => "Car Rentals",
            CatalogKind::Vps => "VPS Hosting",
            CatalogKind::Tours => "Tours",
            CatalogKind::Visas => "Visa Services",
            CatalogKind::Licenses => "Software Licenses",
            CatalogKind::Products => "Shop",
        }
    }

    /// Whether the page debounces its free-text search box.
    pub fn debounces_search(&self) -> bool {
        matches!(self, CatalogKind::Tours)
    }
}

impl fmt::Display for CatalogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A record one catalog page lists and can put in the cart.
pub trait Listing: DeserializeOwned + Serialize + Send + Sync + 'static {
    const KIND: CatalogKind;

    fn id(&self) -> &ItemId;

    fn name(&self) -> &str;

    /// List price in major units, as delivered by the API.
    fn price(&self) -> f64;

    /// Short secondary line for listings (brand, location, ...).
    fn summary(&self) -> String;

    /// Facets and sort orders of this catalog.
    fn config() -> CatalogConfig<Self>;

    /// The "Add to Cart" / "Book" action.
    fn to_cart_item(&self, currency: Currency) -> NewCartItem;
}

/// Parse a JSON array of listings.
pub fn parse_listings<T: Listing>(json: &str) -> Result<Vec<T>, CommerceError> {
    let items: Vec<T> = serde_json::from_str(json)?;
    tracing::debug!(catalog = %T::KIND, count = items.len(), "parsed listings");
    Ok(items)
}

/// Sort key for dates; undated records sort as oldest.
pub(crate) fn date_key(date: Option<NaiveDate>) -> f64 {
    date.map_or(f64::MIN, |d| f64::from(d.num_days_from_ce()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_kind_round_trip() {
        for kind in CatalogKind::ALL {
            assert_eq!(CatalogKind::from_str(kind.as_str()), Some(kind));
        }
        assert_eq!(CatalogKind::from_str("Software"), Some(CatalogKind::Licenses));
        assert_eq!(CatalogKind::from_str("boats"), None);
    }

    #[test]
    fn test_only_tours_debounce() {
        let debounced: Vec<_> = CatalogKind::ALL
            .into_iter()
            .filter(CatalogKind::debounces_search)
            .collect();
        assert_eq!(debounced, vec![CatalogKind::Tours]);
    }

    #[test]
    fn test_date_key_orders_undated_last() {
        let d = NaiveDate::from_ymd_opt(2024, 5, 1);
        assert!(date_key(d) > date_key(None));
    }

    #[test]
    fn test_parse_listings_rejects_garbage() {
        assert!(matches!(
            parse_listings::<Car>("{\"not\": \"an array\"}"),
            Err(CommerceError::Serialization(_))
        ));
    }
}

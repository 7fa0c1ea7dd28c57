//! Software licenses.

use crate::cart::NewCartItem;
use crate::catalog::{CatalogKind, Listing};
use crate::ids::ItemId;
use crate::money::{Currency, Money};
use crate::search::{CatalogConfig, Facet, SortOption, SortRegistry};
use serde::{Deserialize, Serialize};

/// A license for a software product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct License {
    pub id: ItemId,
    pub name: String,
    pub vendor: String,
    pub category: String,
    /// Windows, macOS, Linux, Cross-platform...
    pub platform: String,
    pub price: f64,
    #[serde(default)]
    pub rating: f64,
    /// Edition sold, e.g. "Pro" or "Team (5 seats)".
    #[serde(default)]
    pub edition: Option<String>,
}

impl Listing for License {
    const KIND: CatalogKind = CatalogKind::Licenses;

    fn id(&self) -> &ItemId {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn price(&self) -> f64 {
        self.price
    }

    fn summary(&self) -> String {
        format!("{} · {} · {}", self.vendor, self.category, self.platform)
    }

    fn config() -> CatalogConfig<Self> {
        CatalogConfig::new("licenses")
            .facet(Facet::multi_select("category", "Category", |l: &License| l.category.as_str()))
            .facet(Facet::exact("platform", "Platform", |l: &License| l.platform.as_str()))
            .facet(Facet::range("price", "Price", |l: &License| l.price))
            .facet(Facet::at_least("rating", "Rating", |l: &License| l.rating))
            .facet(
                Facet::search("q", "Search", |l: &License| l.name.as_str())
                    .also(|l: &License| l.vendor.as_str()),
            )
            .sorts(
                SortRegistry::new()
                    .ascending(SortOption::PriceAsc, |l: &License| l.price)
                    .descending(SortOption::PriceDesc, |l: &License| l.price)
                    .descending(SortOption::Rating, |l: &License| l.rating)
                    .alphabetical(SortOption::NameAsc, |l: &License| l.name.as_str(), false),
            )
    }

    fn to_cart_item(&self, currency: Currency) -> NewCartItem {
        let item = NewCartItem::new(self.id.clone(), self.name.clone(), Money::from_decimal(self.price, currency));
        match &self.edition {
            Some(edition) => item.with_variant(edition.to_lowercase().replace(' ', "-"), edition.clone()),
            None => item,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::{Filter, SearchState};

    fn licenses() -> Vec<License> {
        vec![
            License {
                id: ItemId::new("l1"),
                name: "PhotoForge".to_string(),
                vendor: "Pixel Labs".to_string(),
                category: "Design".to_string(),
                platform: "macOS".to_string(),
                price: 149.0,
                rating: 4.6,
                edition: Some("Pro".to_string()),
            },
            License {
                id: ItemId::new("l2"),
                name: "codeRunner".to_string(),
                vendor: "Acme".to_string(),
                category: "Development".to_string(),
                platform: "Windows".to_string(),
                price: 59.0,
                rating: 4.1,
                edition: None,
            },
        ]
    }

    #[test]
    fn test_search_covers_vendor() {
        let licenses = licenses();
        let state = SearchState::default().with_filter("q", Filter::contains("pixel"));
        let results = License::config().derive(&licenses, &state);
        assert_eq!(results.items[0].id.as_str(), "l1");
    }

    #[test]
    fn test_name_sort_ignores_case() {
        let licenses = licenses();
        let state = SearchState::default().with_sort(SortOption::NameAsc);
        let results = License::config().derive(&licenses, &state);
        assert_eq!(results.items[0].name, "codeRunner");
    }

    #[test]
    fn test_edition_becomes_variant() {
        let item = licenses()[0].to_cart_item(Currency::USD);
        assert_eq!(item.variant_id.as_ref().map(|v| v.as_str()), Some("pro"));
        assert!(licenses()[1].to_cart_item(Currency::USD).variant_id.is_none());
    }
}

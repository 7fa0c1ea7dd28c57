//! VPS hosting plans.

use crate::cart::{BookingDetails, NewCartItem};
use crate::catalog::{CatalogKind, Listing};
use crate::ids::ItemId;
use crate::money::{Currency, Money};
use crate::search::{CatalogConfig, Facet, SortOption, SortRegistry};
use serde::{Deserialize, Serialize};

/// A virtual server plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VpsPlan {
    pub id: ItemId,
    pub name: String,
    /// CPU label as shown on the plan card, e.g. "4 vCPU".
    pub cpu: String,
    pub ram_gb: f64,
    #[serde(default)]
    pub storage: Option<String>,
    /// Datacenter location.
    pub location: String,
    /// Monthly price.
    pub price: f64,
    #[serde(default)]
    pub popularity: u32,
}

impl Listing for VpsPlan {
    const KIND: CatalogKind = CatalogKind::Vps;

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
        match &self.storage {
            Some(storage) => format!("{} · {} GB RAM · {} · {}", self.cpu, self.ram_gb, storage, self.location),
            None => format!("{} · {} GB RAM · {}", self.cpu, self.ram_gb, self.location),
        }
    }

    fn config() -> CatalogConfig<Self> {
        CatalogConfig::new("vps")
            .facet(Facet::exact("cpu", "CPU", |p: &VpsPlan| p.cpu.as_str()))
            .facet(Facet::exact("location", "Location", |p: &VpsPlan| p.location.as_str()))
            .facet(Facet::at_most("price", "Max price", |p: &VpsPlan| p.price))
            .facet(Facet::at_least("ram", "Min RAM (GB)", |p: &VpsPlan| p.ram_gb))
            .sorts(
                SortRegistry::new()
                    .ascending(SortOption::PriceAsc, |p: &VpsPlan| p.price)
                    .descending(SortOption::PriceDesc, |p: &VpsPlan| p.price)
                    .descending(SortOption::Popularity, |p: &VpsPlan| f64::from(p.popularity)),
            )
    }

    /// One line per plan and datacenter; billed monthly.
    fn to_cart_item(&self, currency: Currency) -> NewCartItem {
        NewCartItem::new(self.id.clone(), self.name.clone(), Money::from_decimal(self.price, currency))
            .with_variant(self.location.to_lowercase(), self.location.clone())
            .with_details(BookingDetails {
                duration: Some("monthly".to_string()),
                ..BookingDetails::default()
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::CartStore;
    use crate::search::{Filter, SearchState};

    fn plans() -> Vec<VpsPlan> {
        serde_json::from_str(
            r#"[
                {"id": "s1", "name": "Starter", "cpu": "1 vCPU", "ramGb": 1, "location": "Frankfurt", "price": 4.5, "popularity": 90},
                {"id": "s2", "name": "Standard", "cpu": "2 vCPU", "ramGb": 4, "location": "Frankfurt", "price": 12, "popularity": 300},
                {"id": "s3", "name": "Standard", "cpu": "2 vCPU", "ramGb": 4, "location": "Singapore", "price": 14, "popularity": 120}
            ]"#,
        )
        .unwrap()
    }

    #[test]
    fn test_cpu_and_location_are_exact() {
        let plans = plans();
        let state = SearchState::default()
            .with_filter("cpu", Filter::equals("2 vCPU"))
            .with_filter("location", Filter::equals("Frankfurt"));
        let results = VpsPlan::config().derive(&plans, &state);
        assert_eq!(results.len(), 1);
        assert_eq!(results.items[0].id.as_str(), "s2");

        let state = SearchState::default().with_filter("cpu", Filter::equals("2 vcpu"));
        assert!(VpsPlan::config().derive(&plans, &state).is_empty());
    }

    #[test]
    fn test_popularity_sort() {
        let plans = plans();
        let state = SearchState::default().with_sort(SortOption::Popularity);
        let results = VpsPlan::config().derive(&plans, &state);
        assert_eq!(results.items[0].id.as_str(), "s2");
    }

    #[test]
    fn test_same_plan_in_two_locations_is_two_lines() {
        let plan = &plans()[1];
        let cart = CartStore::new();
        cart.add_to_cart(plan.to_cart_item(Currency::USD));
        let mut moved = plan.clone();
        moved.location = "Singapore".to_string();
        cart.add_to_cart(moved.to_cart_item(Currency::USD));
        cart.add_to_cart(plan.to_cart_item(Currency::USD));

        assert_eq!(cart.line_count(), 2);
        assert_eq!(cart.item_count(), 3);
    }
}

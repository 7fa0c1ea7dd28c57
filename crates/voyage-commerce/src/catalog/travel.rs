//! Travel listings: car rentals, tours and visa services.

use crate::cart::{BookingDetails, NewCartItem};
use crate::catalog::{date_key, CatalogKind, Listing};
use crate::ids::ItemId;
use crate::money::{Currency, Money};
use crate::search::{CatalogConfig, Facet, SortOption, SortRegistry};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A rental car offer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Car {
    pub id: ItemId,
    pub name: String,
    pub brand: String,
    /// Economy, SUV, Luxury...
    pub category: String,
    pub location: String,
    /// Price per day.
    pub price: f64,
    pub seats: u32,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub transmission: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    /// Rental length the booking form defaults to.
    #[serde(default = "default_rental_days")]
    pub days: u32,
}

fn default_rental_days() -> u32 {
    1
}

impl Listing for Car {
    const KIND: CatalogKind = CatalogKind::Cars;

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
        format!("{} {} · {} seats · {}", self.brand, self.category, self.seats, self.location)
    }

    fn config() -> CatalogConfig<Self> {
        CatalogConfig::new("cars")
            .facet(Facet::exact("brand", "Brand", |c: &Car| c.brand.as_str()))
            .facet(Facet::multi_select("category", "Category", |c: &Car| c.category.as_str()))
            .facet(Facet::range("price", "Price per day", |c: &Car| c.price))
            .facet(Facet::at_least("seats", "Seats", |c: &Car| f64::from(c.seats)))
            .facet(Facet::at_least("rating", "Rating", |c: &Car| c.rating))
            .facet(
                Facet::search("q", "Search", |c: &Car| c.name.as_str())
                    .also(|c: &Car| c.brand.as_str())
                    .also(|c: &Car| c.location.as_str()),
            )
            .sorts(
                SortRegistry::new()
                    .ascending(SortOption::PriceAsc, |c: &Car| c.price)
                    .descending(SortOption::PriceDesc, |c: &Car| c.price)
                    .descending(SortOption::Rating, |c: &Car| c.rating)
                    .alphabetical(SortOption::NameAsc, |c: &Car| c.name.as_str(), false),
            )
    }

    /// Per-day rate times rental days, booked as one line.
    fn to_cart_item(&self, currency: Currency) -> NewCartItem {
        let days = self.days.max(1);
        let total = self.price * f64::from(days);
        let mut item = NewCartItem::new(self.id.clone(), self.name.clone(), Money::from_decimal(total, currency))
            .with_details(BookingDetails {
                days: Some(days),
                passengers: Some(self.seats),
                provider: Some(self.brand.clone()),
                ..BookingDetails::default()
            });
        if let Some(image) = &self.image {
            item = item.with_image(image.clone());
        }
        item
    }
}

/// A guided tour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tour {
    pub id: ItemId,
    pub name: String,
    pub destination: String,
    pub category: String,
    /// Price per traveler.
    pub price: f64,
    #[serde(default)]
    pub rating: f64,
    /// Length in days.
    pub duration_days: u32,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    /// When the tour was listed.
    #[serde(default)]
    pub listed_on: Option<NaiveDate>,
    #[serde(default)]
    pub image: Option<String>,
}

impl Listing for Tour {
    const KIND: CatalogKind = CatalogKind::Tours;

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
        format!("{} · {} days · {}", self.destination, self.duration_days, self.category)
    }

    fn config() -> CatalogConfig<Self> {
        CatalogConfig::new("tours")
            .facet(Facet::multi_select("category", "Category", |t: &Tour| t.category.as_str()))
            .facet(Facet::range("price", "Price", |t: &Tour| t.price))
            .facet(Facet::at_least("rating", "Rating", |t: &Tour| t.rating))
            .facet(Facet::at_most("duration", "Max days", |t: &Tour| f64::from(t.duration_days)))
            .facet(
                Facet::search("q", "Search", |t: &Tour| t.name.as_str())
                    .also(|t: &Tour| t.destination.as_str()),
            )
            .sorts(
                SortRegistry::new()
                    .ascending(SortOption::PriceAsc, |t: &Tour| t.price)
                    .descending(SortOption::PriceDesc, |t: &Tour| t.price)
                    .descending(SortOption::Rating, |t: &Tour| t.rating)
                    .ascending(SortOption::Duration, |t: &Tour| f64::from(t.duration_days))
                    .descending(SortOption::Newest, |t: &Tour| date_key(t.listed_on)),
            )
    }

    /// Departures on different dates are separate cart lines.
    fn to_cart_item(&self, currency: Currency) -> NewCartItem {
        let mut item = NewCartItem::new(self.id.clone(), self.name.clone(), Money::from_decimal(self.price, currency))
            .with_details(BookingDetails {
                days: Some(self.duration_days),
                travelers: Some(1),
                selected_date: self.start_date,
                duration: Some(format!("{} days", self.duration_days)),
                ..BookingDetails::default()
            });
        if let Some(date) = self.start_date {
            item = item.with_variant(date.to_string(), format!("Departs {}", date.format("%b %-d, %Y")));
        }
        if let Some(image) = &self.image {
            item = item.with_image(image.clone());
        }
        item
    }
}

/// A visa application service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Visa {
    pub id: ItemId,
    pub name: String,
    pub country: String,
    /// Tourist, Business, Transit...
    #[serde(rename = "type")]
    pub visa_type: String,
    /// Service fee.
    pub price: f64,
    /// Typical processing time in days.
    pub processing_days: u32,
    /// Applications placed, for "most popular".
    #[serde(default)]
    pub popularity: u32,
}

impl Listing for Visa {
    const KIND: CatalogKind = CatalogKind::Visas;

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
        format!("{} {} · ~{} days", self.country, self.visa_type, self.processing_days)
    }

    fn config() -> CatalogConfig<Self> {
        CatalogConfig::new("visas")
            .facet(Facet::exact("country", "Country", |v: &Visa| v.country.as_str()))
            .facet(Facet::multi_select("type", "Visa type", |v: &Visa| v.visa_type.as_str()))
            .facet(Facet::at_most("processing", "Max processing days", |v: &Visa| {
                f64::from(v.processing_days)
            }))
            .facet(Facet::at_most("price", "Max price", |v: &Visa| v.price))
            .facet(
                Facet::search("q", "Search", |v: &Visa| v.name.as_str())
                    .also(|v: &Visa| v.country.as_str()),
            )
            .sorts(
                SortRegistry::new()
                    .ascending(SortOption::PriceAsc, |v: &Visa| v.price)
                    .descending(SortOption::PriceDesc, |v: &Visa| v.price)
                    .descending(SortOption::Popularity, |v: &Visa| f64::from(v.popularity)),
            )
    }

    fn to_cart_item(&self, currency: Currency) -> NewCartItem {
        NewCartItem::new(self.id.clone(), self.name.clone(), Money::from_decimal(self.price, currency))
            .with_variant(self.visa_type.to_lowercase(), format!("{} visa", self.visa_type))
            .with_details(BookingDetails {
                duration: Some(format!("{} days processing", self.processing_days)),
                provider: Some(self.country.clone()),
                ..BookingDetails::default()
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::{Filter, SearchState};

    fn cars() -> Vec<Car> {
        serde_json::from_str(
            r#"[
                {"id": 1, "name": "Corolla", "brand": "Toyota", "category": "Economy", "location": "Lisbon", "price": 35, "seats": 5, "rating": 4.2},
                {"id": 2, "name": "X5", "brand": "BMW", "category": "SUV", "location": "Porto", "price": 120, "seats": 7, "rating": 4.8},
                {"id": 3, "name": "Yaris", "brand": "Toyota", "category": "Economy", "location": "Porto", "price": 30, "seats": 4, "rating": 4.0, "days": 3}
            ]"#,
        )
        .unwrap()
    }

    #[test]
    fn test_car_filters() {
        let cars = cars();
        let config = Car::config();
        let state = SearchState::default()
            .with_filter("brand", Filter::equals("Toyota"))
            .with_filter("seats", Filter::at_least(5.0));
        let names: Vec<_> = config.derive(&cars, &state).items.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Corolla"]);

        let state = SearchState::default().with_filter("q", Filter::contains("porto"));
        assert_eq!(config.derive(&cars, &state).pagination.total, 2);
    }

    #[test]
    fn test_car_booking_uses_rental_days() {
        let cars = cars();
        let item = cars[2].to_cart_item(Currency::USD);
        assert_eq!(item.id.as_str(), "3");
        assert_eq!(item.price, Money::new(9000, Currency::USD));
        assert_eq!(item.details.days, Some(3));
    }

    #[test]
    fn test_tour_departures_are_variants() {
        let tour: Tour = serde_json::from_str(
            r#"{"id": "t1", "name": "Alps Trek", "destination": "Chamonix", "category": "adventure",
                "price": 899.5, "durationDays": 6, "startDate": "2025-07-14"}"#,
        )
        .unwrap();
        let item = tour.to_cart_item(Currency::EUR);
        assert_eq!(item.variant_id.as_ref().map(|v| v.as_str()), Some("2025-07-14"));
        assert_eq!(item.variant_label.as_deref(), Some("Departs Jul 14, 2025"));
        assert_eq!(item.price, Money::new(89950, Currency::EUR));
    }

    #[test]
    fn test_tour_duration_sort() {
        let tours: Vec<Tour> = serde_json::from_str(
            r#"[
                {"id": 1, "name": "Long", "destination": "Peru", "category": "trek", "price": 10, "durationDays": 9},
                {"id": 2, "name": "Short", "destination": "Rome", "category": "food", "price": 10, "durationDays": 1}
            ]"#,
        )
        .unwrap();
        let state = SearchState::default().with_sort(SortOption::Duration);
        let results = Tour::config().derive(&tours, &state);
        assert_eq!(results.items[0].name, "Short");
    }

    #[test]
    fn test_visa_type_field_name() {
        let visa: Visa = serde_json::from_str(
            r#"{"id": 9, "name": "Japan eVisa", "country": "Japan", "type": "Tourist", "price": 45, "processingDays": 5}"#,
        )
        .unwrap();
        assert_eq!(visa.visa_type, "Tourist");
        let item = visa.to_cart_item(Currency::USD);
        assert_eq!(item.variant_id.as_ref().map(|v| v.as_str()), Some("tourist"));
    }
}

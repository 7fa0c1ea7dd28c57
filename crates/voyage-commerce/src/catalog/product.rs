//! Shop products and their variants.

use crate::cart::NewCartItem;
use crate::catalog::{date_key, CatalogKind, Listing};
use crate::ids::{ItemId, VariantId};
use crate::money::{Currency, Money};
use crate::search::{CatalogConfig, Facet, SortOption, SortRegistry};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Products per page in the shop grid.
pub const PRODUCTS_PER_PAGE: usize = 12;

/// A product in the shop.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ItemId,
    pub name: String,
    pub category: String,
    /// Base price.
    pub price: f64,
    /// Compare-at price, for showing discounts.
    #[serde(default)]
    pub compare_at_price: Option<f64>,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub created_at: Option<NaiveDate>,
    #[serde(default)]
    pub variants: Vec<ProductVariant>,
}

impl Product {
    pub fn has_variants(&self) -> bool {
        !self.variants.is_empty()
    }

    pub fn variant(&self, id: &VariantId) -> Option<&ProductVariant> {
        self.variants.iter().find(|v| &v.id == id)
    }

    /// Check if this product is on sale (has a higher compare-at price).
    pub fn is_on_sale(&self) -> bool {
        self.compare_at_price.is_some_and(|cap| cap > self.price)
    }

    /// Calculate the discount percentage if on sale.
    pub fn discount_percentage(&self) -> Option<f64> {
        self.compare_at_price
            .filter(|&cap| cap > self.price && cap > 0.0)
            .map(|cap| (cap - self.price) / cap * 100.0)
    }

    /// Cart line for one variant; the variant's own price wins when set.
    pub fn variant_cart_item(&self, id: &VariantId, currency: Currency) -> Option<NewCartItem> {
        let variant = self.variant(id)?;
        let price = variant.price.unwrap_or(self.price);
        let mut item = NewCartItem::new(self.id.clone(), self.name.clone(), Money::from_decimal(price, currency))
            .with_variant(variant.id.clone(), variant.label.clone());
        if let Some(image) = &self.image {
            item = item.with_image(image.clone());
        }
        Some(item)
    }
}

impl Listing for Product {
    const KIND: CatalogKind = CatalogKind::Products;

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
        match self.discount_percentage() {
            Some(off) => format!("{} · {:.0}% off", self.category, off),
            None => self.category.clone(),
        }
    }

    fn config() -> CatalogConfig<Self> {
        CatalogConfig::new("products")
            .facet(Facet::multi_select("category", "Category", |p: &Product| p.category.as_str()))
            .facet(Facet::range("price", "Price", |p: &Product| p.price))
            .facet(Facet::at_least("rating", "Rating", |p: &Product| p.rating))
            .facet(Facet::search("q", "Search", |p: &Product| p.name.as_str()).also(|p: &Product| {
                p.description.as_deref().unwrap_or_default()
            }))
            .sorts(
                SortRegistry::new()
                    .ascending(SortOption::PriceAsc, |p: &Product| p.price)
                    .descending(SortOption::PriceDesc, |p: &Product| p.price)
                    .descending(SortOption::Rating, |p: &Product| p.rating)
                    .descending(SortOption::Newest, |p: &Product| date_key(p.created_at))
                    .alphabetical(SortOption::NameAsc, |p: &Product| p.name.as_str(), false),
            )
            .paginated(PRODUCTS_PER_PAGE)
    }

    /// Base product; the first variant is preselected when there are any.
    fn to_cart_item(&self, currency: Currency) -> NewCartItem {
        if let Some(item) = self
            .variants
            .first()
            .and_then(|v| self.variant_cart_item(&v.id, currency))
        {
            return item;
        }
        let item = NewCartItem::new(self.id.clone(), self.name.clone(), Money::from_decimal(self.price, currency));
        match &self.image {
            Some(image) => item.with_image(image.clone()),
            None => item,
        }
    }
}

/// A product variant (e.g., size/color combination).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductVariant {
    pub id: VariantId,
    /// Variant name (e.g., "Large / Blue").
    pub label: String,
    /// Overrides the product price when present.
    #[serde(default)]
    pub price: Option<f64>,
}

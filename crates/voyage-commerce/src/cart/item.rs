//! Cart line items and the merge-by-key rule.

use crate::ids::{ItemId, VariantId};
use crate::money::Money;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Maximum quantity allowed per line item.
pub const MAX_QUANTITY_PER_ITEM: u32 = 9999;

/// Uniqueness key of a cart line.
///
/// A line without a variant is distinct from every line with one, even when
/// the item ids agree.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LineKey {
    pub id: ItemId,
    pub variant_id: Option<VariantId>,
}

impl LineKey {
    pub fn new(id: impl Into<ItemId>, variant_id: Option<VariantId>) -> Self {
        Self {
            id: id.into(),
            variant_id,
        }
    }

    /// Whether this key addresses the given id/variant pair.
    pub fn matches(&self, id: &ItemId, variant_id: Option<&VariantId>) -> bool {
        &self.id == id && self.variant_id.as_ref() == variant_id
    }
}

impl std::fmt::Display for LineKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.variant_id {
            Some(variant) => write!(f, "{}#{}", self.id, variant),
            None => write!(f, "{}", self.id),
        }
    }
}

/// Booking metadata carried along with a line.
///
/// The cart never reads these; they are kept so the checkout page can show
/// what was booked.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BookingDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nights: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guests: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub passengers: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub travelers: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check_in_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check_out_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
}

impl BookingDetails {
    pub fn is_empty(&self) -> bool {
        self == &BookingDetails::default()
    }
}

/// A line in the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    /// Catalog entity (car, flight, hotel, tour, product...).
    pub id: ItemId,
    /// Configuration of the entity, e.g. a package tier or room type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant_id: Option<VariantId>,
    /// Display name of the variant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant_label: Option<String>,
    /// Display name.
    pub name: String,
    /// Image URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Unit price captured when the line was first added.
    pub price: Money,
    /// Quantity, always at least 1.
    pub qty: u32,
    #[serde(default, skip_serializing_if = "BookingDetails::is_empty")]
    pub details: BookingDetails,
}

impl CartItem {
    pub fn key(&self) -> LineKey {
        LineKey::new(self.id.clone(), self.variant_id.clone())
    }

    pub fn matches(&self, id: &ItemId, variant_id: Option<&VariantId>) -> bool {
        &self.id == id && self.variant_id.as_ref() == variant_id
    }

    /// `price * qty`, or None on overflow.
    pub fn line_total(&self) -> Option<Money> {
        self.price.try_multiply(i64::from(self.qty))
    }
}

/// An "Add to Cart" / "Book" request: a cart line without a settled quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCartItem {
    pub id: ItemId,
    #[serde(default)]
    pub variant_id: Option<VariantId>,
    #[serde(default)]
    pub variant_label: Option<String>,
    pub name: String,
    #[serde(default)]
    pub image: Option<String>,
    pub price: Money,
    /// Missing means 1.
    #[serde(default)]
    pub qty: Option<u32>,
    #[serde(default)]
    pub details: BookingDetails,
}

impl NewCartItem {
    pub fn new(id: impl Into<ItemId>, name: impl Into<String>, price: Money) -> Self {
        Self {
            id: id.into(),
            variant_id: None,
            variant_label: None,
            name: name.into(),
            image: None,
            price,
            qty: None,
            details: BookingDetails::default(),
        }
    }

    pub fn with_variant(mut self, variant_id: impl Into<VariantId>, label: impl Into<String>) -> Self {
        self.variant_id = Some(variant_id.into());
        self.variant_label = Some(label.into());
        self
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    pub fn with_qty(mut self, qty: u32) -> Self {
        self.qty = Some(qty);
        self
    }

    pub fn with_details(mut self, details: BookingDetails) -> Self {
        self.details = details;
        self
    }

    pub fn key(&self) -> LineKey {
        LineKey::new(self.id.clone(), self.variant_id.clone())
    }

    /// Quantity this request contributes: defaults to 1, floored at 1.
    pub fn increment(&self) -> u32 {
        self.qty.unwrap_or(1).clamp(1, MAX_QUANTITY_PER_ITEM)
    }

    pub fn into_item(self) -> CartItem {
        let qty = self.increment();
        CartItem {
            id: self.id,
            variant_id: self.variant_id,
            variant_label: self.variant_label,
            name: self.name,
            image: self.image,
            price: self.price,
            qty,
            details: self.details,
        }
    }
}

impl From<CartItem> for NewCartItem {
    fn from(item: CartItem) -> Self {
        Self {
            id: item.id,
            variant_id: item.variant_id,
            variant_label: item.variant_label,
            name: item.name,
            image: item.image,
            price: item.price,
            qty: Some(item.qty),
            details: item.details,
        }
    }
}

/// Outcome of merging one request into a line list.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Merged {
    pub key: LineKey,
    pub qty: u32,
    /// False when the line was already at the quantity limit.
    pub changed: bool,
}

/// Merge a request into a line list.
///
/// An existing line with the same key keeps its display metadata and unit
/// price and only grows its quantity; otherwise the request is appended.
pub(crate) fn merge_into(items: &mut Vec<CartItem>, incoming: NewCartItem) -> Merged {
    let key = incoming.key();
    let increment = incoming.increment();

    if let Some(existing) = items
        .iter_mut()
        .find(|i| i.matches(&key.id, key.variant_id.as_ref()))
    {
        let before = existing.qty;
        existing.qty = before.saturating_add(increment).min(MAX_QUANTITY_PER_ITEM);
        return Merged {
            key,
            qty: existing.qty,
            changed: existing.qty != before,
        };
    }

    let item = incoming.into_item();
    let qty = item.qty;
    items.push(item);
    Merged {
        key,
        qty,
        changed: true,
    }
}

/// Coerce quantity text-field input.
///
/// Returns None for anything that is not a positive integer, so callers can
/// leave the current quantity untouched.
pub fn parse_quantity(input: &str) -> Option<u32> {
    match input.trim().parse::<u32>() {
        Ok(0) | Err(_) => None,
        Ok(n) => Some(n.min(MAX_QUANTITY_PER_ITEM)),
    }
}

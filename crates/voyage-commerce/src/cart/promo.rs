//! Promo codes.
//!
//! Codes are checked against a local table only; there is no server-side
//! validation.

use crate::money::Money;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// What a promo code takes off the order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PromoKind {
    /// Percentage of the subtotal (0.0 - 100.0).
    Percentage { percent: f64 },
    /// Waives the shipping fee.
    FreeShipping,
    /// Fixed amount off, never more than the subtotal.
    Fixed { amount: Money },
}

impl PromoKind {
    /// Discount granted for an order with the given subtotal and shipping fee.
    pub fn discount(&self, subtotal: &Money, shipping: &Money) -> Money {
        match self {
            PromoKind::Percentage { percent } => subtotal.percentage(percent.clamp(0.0, 100.0)),
            PromoKind::FreeShipping => *shipping,
            PromoKind::Fixed { amount } => {
                if amount.currency != subtotal.currency {
                    tracing::warn!(
                        promo_currency = %amount.currency,
                        cart_currency = %subtotal.currency,
                        "fixed promo ignored: currency mismatch"
                    );
                    return Money::zero(subtotal.currency);
                }
                amount.min(*subtotal)
            }
        }
    }
}

/// A promo code definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Promo {
    /// Code as typed by the customer (e.g., "SAVE10").
    pub code: String,
    /// Description for display.
    pub description: String,
    pub kind: PromoKind,
}

impl Promo {
    /// Create a percentage promo.
    pub fn percentage(code: impl Into<String>, description: impl Into<String>, percent: f64) -> Self {
        Self {
            code: code.into(),
            description: description.into(),
            kind: PromoKind::Percentage { percent },
        }
    }

    /// Create a free shipping promo.
    pub fn free_shipping(code: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            description: description.into(),
            kind: PromoKind::FreeShipping,
        }
    }

    /// Create a fixed amount promo.
    pub fn fixed_amount(code: impl Into<String>, description: impl Into<String>, amount: Money) -> Self {
        Self {
            code: code.into(),
            description: description.into(),
            kind: PromoKind::Fixed { amount },
        }
    }
}

/// Table of accepted codes, matched case-insensitively.
#[derive(Debug, Clone, PartialEq)]
pub struct PromoTable {
    promos: BTreeMap<String, Promo>,
}

impl PromoTable {
    /// An empty table that rejects every code.
    pub fn empty() -> Self {
        Self {
            promos: BTreeMap::new(),
        }
    }

    /// Add or replace a promo.
    pub fn insert(&mut self, promo: Promo) {
        self.promos.insert(normalize(&promo.code), promo);
    }

    pub fn with(mut self, promo: Promo) -> Self {
        self.insert(promo);
        self
    }

    pub fn lookup(&self, code: &str) -> Option<&Promo> {
        self.promos.get(&normalize(code))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Promo> {
        self.promos.values()
    }

    pub fn len(&self) -> usize {
        self.promos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.promos.is_empty()
    }
}

impl Default for PromoTable {
    /// The storefront's built-in codes.
    fn default() -> Self {
        Self::empty()
            .with(Promo::percentage("SAVE10", "10% off your order", 10.0))
            .with(Promo::free_shipping("FREESHIP", "Free shipping"))
    }
}

fn normalize(code: &str) -> String {
    code.trim().to_uppercase()
}

/// A promo that has been accepted for a cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppliedPromo {
    pub code: String,
    pub description: String,
    pub kind: PromoKind,
}

impl From<&Promo> for AppliedPromo {
    fn from(promo: &Promo) -> Self {
        Self {
            code: normalize(&promo.code),
            description: promo.description.clone(),
            kind: promo.kind.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Currency;

    fn usd(cents: i64) -> Money {
        Money::new(cents, Currency::USD)
    }

    #[test]
    fn test_default_table() {
        let table = PromoTable::default();
        assert_eq!(table.len(), 2);
        assert!(table.lookup("SAVE10").is_some());
        assert!(table.lookup("save10").is_some());
        assert!(table.lookup(" freeship ").is_some());
        assert!(table.lookup("SAVE20").is_none());
    }

    #[test]
    fn test_percentage_discount() {
        let promo = Promo::percentage("SAVE10", "10% Off", 10.0);
        assert_eq!(promo.kind.discount(&usd(12500), &usd(5000)), usd(1250));
    }

    #[test]
    fn test_free_shipping_discount() {
        let kind = PromoKind::FreeShipping;
        assert_eq!(kind.discount(&usd(12500), &usd(5000)), usd(5000));
        assert_eq!(kind.discount(&usd(25000), &usd(0)), usd(0));
    }

    #[test]
    fn test_fixed_discount_capped() {
        let promo = Promo::fixed_amount("SAVE100", "$100 Off", usd(10000));
        assert_eq!(promo.kind.discount(&usd(5000), &usd(0)), usd(5000));
        assert_eq!(promo.kind.discount(&usd(50000), &usd(0)), usd(10000));
    }

    #[test]
    fn test_fixed_discount_other_currency_is_ignored() {
        let promo = Promo::fixed_amount("EURO", "5 Off", Money::new(500, Currency::EUR));
        assert!(promo.kind.discount(&usd(5000), &usd(0)).is_zero());
    }

    #[test]
    fn test_applied_promo_normalizes_code() {
        let promo = Promo::percentage("welcome", "Welcome", 5.0);
        assert_eq!(AppliedPromo::from(&promo).code, "WELCOME");
    }
}

//! Cart pricing calculations.
//!
//! Totals are derived on demand from the line items and never stored.

use crate::cart::{AppliedPromo, CartItem, LineKey};
use crate::error::CommerceError;
use crate::money::{Currency, Money};
use serde::{Deserialize, Serialize};

/// Shipping and tax rules applied to a cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingPolicy {
    /// Currency every line must be priced in.
    pub currency: Currency,
    /// Orders strictly above this subtotal ship for free.
    pub free_shipping_threshold: Money,
    /// Flat shipping fee below the threshold.
    pub shipping_fee: Money,
    /// Tax rate applied to the subtotal, in percent.
    pub tax_rate_percent: f64,
}

impl PricingPolicy {
    /// Default rules expressed in another currency's units.
    pub fn for_currency(currency: Currency) -> Self {
        Self {
            currency,
            free_shipping_threshold: Money::from_major(200, currency),
            shipping_fee: Money::from_major(50, currency),
            tax_rate_percent: 5.0,
        }
    }

    /// Shipping fee for an order with the given subtotal.
    pub fn shipping_for(&self, subtotal: &Money) -> Money {
        if subtotal.amount_cents > self.free_shipping_threshold.amount_cents {
            Money::zero(self.currency)
        } else {
            self.shipping_fee
        }
    }

    /// Tax due on the given subtotal.
    pub fn tax_for(&self, subtotal: &Money) -> Money {
        subtotal.percentage(self.tax_rate_percent)
    }
}

impl Default for PricingPolicy {
    fn default() -> Self {
        Self::for_currency(Currency::USD)
    }
}

/// Complete pricing breakdown for a cart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartTotals {
    /// Sum of `price * qty` over all lines.
    pub subtotal: Money,
    pub shipping: Money,
    pub tax: Money,
    /// Amount taken off by the applied promo code.
    pub discount: Money,
    /// `subtotal + shipping + tax - discount`.
    pub total: Money,
    /// Sum of quantities.
    pub item_count: u64,
    /// Promo code the discount came from.
    pub promo_code: Option<String>,
    /// Per-line breakdown.
    pub lines: Vec<LineTotal>,
}

impl CartTotals {
    /// Derive totals for a list of lines.
    pub fn compute(
        items: &[CartItem],
        promo: Option<&AppliedPromo>,
        policy: &PricingPolicy,
    ) -> Result<Self, CommerceError> {
        let currency = policy.currency;
        let mut lines = Vec::with_capacity(items.len());

        for item in items {
            if item.price.currency != currency {
                return Err(CommerceError::CurrencyMismatch {
                    expected: currency.code().to_string(),
                    got: item.price.currency.code().to_string(),
                });
            }
            let total = item.line_total().ok_or(CommerceError::Overflow)?;
            lines.push(LineTotal {
                key: item.key(),
                name: item.name.clone(),
                unit_price: item.price,
                qty: item.qty,
                total,
            });
        }

        let subtotal =
            Money::try_sum(lines.iter().map(|l| &l.total), currency).ok_or(CommerceError::Overflow)?;
        let shipping = policy.shipping_for(&subtotal);
        let tax = policy.tax_for(&subtotal);
        let discount = promo
            .map(|p| p.kind.discount(&subtotal, &shipping))
            .unwrap_or_else(|| Money::zero(currency));

        let total = subtotal
            .try_add(&shipping)
            .and_then(|m| m.try_add(&tax))
            .and_then(|m| m.try_subtract(&discount))
            .ok_or(CommerceError::Overflow)?;

        Ok(Self {
            subtotal,
            shipping,
            tax,
            discount,
            total,
            item_count: items.iter().map(|i| u64::from(i.qty)).sum(),
            promo_code: promo.map(|p| p.code.clone()),
            lines,
        })
    }

    /// Check if a promo reduced the total.
    pub fn has_discount(&self) -> bool {
        self.discount.is_positive()
    }

    /// Whether the shipping fee was waived by the threshold.
    pub fn ships_free(&self) -> bool {
        self.shipping.is_zero()
    }
}

/// Pricing for a single line.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LineTotal {
    pub key: LineKey,
    pub name: String,
    pub unit_price: Money,
    pub qty: u32,
    /// `unit_price * qty`.
    pub total: Money,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::{NewCartItem, PromoTable};

    fn usd(cents: i64) -> Money {
        Money::new(cents, Currency::USD)
    }

    fn line(id: &str, price: i64, qty: u32) -> CartItem {
        NewCartItem::new(id, id, usd(price)).with_qty(qty).into_item()
    }

    fn save10() -> AppliedPromo {
        AppliedPromo::from(PromoTable::default().lookup("SAVE10").unwrap())
    }

    #[test]
    fn test_worked_example() {
        let items = vec![line("a", 4000, 2), line("b", 4500, 1)];
        let totals = CartTotals::compute(&items, None, &PricingPolicy::default()).unwrap();

        assert_eq!(totals.subtotal, usd(12500));
        assert_eq!(totals.shipping, usd(5000));
        assert_eq!(totals.tax, usd(625));
        assert_eq!(totals.discount, usd(0));
        assert_eq!(totals.total, usd(18125));
        assert_eq!(totals.item_count, 3);
        assert!(!totals.has_discount());
    }

    #[test]
    fn test_worked_example_with_save10() {
        let items = vec![line("a", 4000, 2), line("b", 4500, 1)];
        let promo = save10();
        let totals = CartTotals::compute(&items, Some(&promo), &PricingPolicy::default()).unwrap();

        assert_eq!(totals.discount, usd(1250));
        assert_eq!(totals.total, usd(16875));
        assert_eq!(totals.promo_code.as_deref(), Some("SAVE10"));
    }

    #[test]
    fn test_shipping_threshold_is_strict() {
        let policy = PricingPolicy::default();
        assert_eq!(policy.shipping_for(&usd(20000)), usd(5000));
        assert_eq!(policy.shipping_for(&usd(20001)), usd(0));
    }

    #[test]
    fn test_free_shipping_promo_cancels_fee() {
        let items = vec![line("a", 10000, 1)];
        let promo = AppliedPromo::from(PromoTable::default().lookup("FREESHIP").unwrap());
        let totals = CartTotals::compute(&items, Some(&promo), &PricingPolicy::default()).unwrap();

        assert_eq!(totals.shipping, usd(5000));
        assert_eq!(totals.discount, usd(5000));
        // 100.00 + 5.00 tax
        assert_eq!(totals.total, usd(10500));
    }

    #[test]
    fn test_empty_cart_totals() {
        let totals = CartTotals::compute(&[], None, &PricingPolicy::default()).unwrap();
        assert!(totals.subtotal.is_zero());
        assert_eq!(totals.shipping, usd(5000));
        assert!(totals.lines.is_empty());
    }

    #[test]
    fn test_currency_mismatch() {
        let items = vec![NewCartItem::new("x", "x", Money::new(100, Currency::EUR)).into_item()];
        let err = CartTotals::compute(&items, None, &PricingPolicy::default()).unwrap_err();
        assert!(matches!(err, CommerceError::CurrencyMismatch { .. }));
    }

    #[test]
    fn test_overflow_is_reported() {
        let items = vec![line("a", i64::MAX / 2, 3)];
        let err = CartTotals::compute(&items, None, &PricingPolicy::default()).unwrap_err();
        assert!(matches!(err, CommerceError::Overflow));
    }

    #[test]
    fn test_line_breakdown() {
        let items = vec![line("a", 4000, 2)];
        let totals = CartTotals::compute(&items, None, &PricingPolicy::default()).unwrap();
        assert_eq!(totals.lines[0].total, usd(8000));
        assert_eq!(totals.lines[0].key, LineKey::new("a", None));
    }
}

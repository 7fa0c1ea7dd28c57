//! The session cart.
//!
//! `CartStore` is a cheap, cloneable handle. Clones share one cart; separate
//! `CartStore::new()` calls give fully isolated carts. Consumers observe
//! changes through [`CartStore::subscribe`], which yields a
//! `tokio::sync::watch` receiver notified once per state-changing mutation.

use crate::cart::item::{merge_into, parse_quantity, MAX_QUANTITY_PER_ITEM};
use crate::cart::{
    AppliedPromo, CartItem, CartSnapshot, CartTotals, LineKey, NewCartItem, PricingPolicy,
    PromoTable,
};
use crate::error::CommerceError;
use crate::ids::{CartId, ItemId, VariantId};
use std::sync::Arc;
use tokio::sync::watch;

/// Observable cart contents.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CartState {
    /// Lines in insertion order.
    pub items: Vec<CartItem>,
    /// Promo code entered on the cart page.
    pub promo: Option<AppliedPromo>,
    revision: u64,
}

impl CartState {
    /// Number of state-changing mutations applied so far.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn find_mut(&mut self, id: &ItemId, variant_id: Option<&VariantId>) -> Option<&mut CartItem> {
        self.items.iter_mut().find(|i| i.matches(id, variant_id))
    }
}

/// Shared handle to a session cart.
#[derive(Debug, Clone)]
pub struct CartStore {
    id: CartId,
    state: Arc<watch::Sender<CartState>>,
}

impl CartStore {
    /// Create an empty, isolated cart.
    pub fn new() -> Self {
        Self::with_id(CartId::new("session"))
    }

    /// Create an empty cart with a specific id.
    pub fn with_id(id: CartId) -> Self {
        let (tx, _rx) = watch::channel(CartState::default());
        Self {
            id,
            state: Arc::new(tx),
        }
    }

    pub fn id(&self) -> &CartId {
        &self.id
    }

    /// Receiver that sees every change made through any clone of this handle.
    pub fn subscribe(&self) -> watch::Receiver<CartState> {
        self.state.subscribe()
    }

    /// Apply `f`; notify subscribers and bump the revision only if it reports a change.
    fn mutate(&self, f: impl FnOnce(&mut CartState) -> bool) -> bool {
        self.state.send_if_modified(|state| {
            let changed = f(state);
            if changed {
                state.revision += 1;
            }
            changed
        })
    }

    /// Add an item, merging with an existing line of the same id and variant.
    ///
    /// The merged line keeps the unit price and display data of the first
    /// insertion; only the quantity grows. Adding to a line already at the
    /// quantity limit changes nothing and notifies no one.
    pub fn add_to_cart(&self, item: NewCartItem) -> LineKey {
        let key = item.key();
        self.mutate(|state| {
            let merged = merge_into(&mut state.items, item);
            if merged.changed {
                tracing::debug!(cart = %self.id, line = %merged.key, qty = merged.qty, "added to cart");
            } else {
                tracing::warn!(cart = %self.id, line = %merged.key, "line already at quantity limit");
            }
            merged.changed
        });
        key
    }

    /// Set the quantity of a line.
    ///
    /// Values below 1 are ignored, never deleting the line; values above the
    /// per-line limit are clamped. Returns whether the cart changed.
    pub fn update_qty(&self, id: &ItemId, qty: i64, variant_id: Option<&VariantId>) -> bool {
        if qty < 1 {
            tracing::warn!(cart = %self.id, item = %id, qty, "ignored non-positive quantity");
            return false;
        }
        let qty = u32::try_from(qty)
            .unwrap_or(MAX_QUANTITY_PER_ITEM)
            .min(MAX_QUANTITY_PER_ITEM);

        self.mutate(|state| match state.find_mut(id, variant_id) {
            Some(line) if line.qty != qty => {
                line.qty = qty;
                tracing::debug!(cart = %self.id, item = %id, qty, "updated quantity");
                true
            }
            _ => false,
        })
    }

    /// Set the quantity from raw text-field input; unparseable input is ignored.
    pub fn update_qty_from_input(&self, id: &ItemId, input: &str, variant_id: Option<&VariantId>) -> bool {
        match parse_quantity(input) {
            Some(qty) => self.update_qty(id, i64::from(qty), variant_id),
            None => {
                tracing::warn!(cart = %self.id, item = %id, input, "ignored quantity input");
                false
            }
        }
    }

    /// The "+" button.
    pub fn increment(&self, id: &ItemId, variant_id: Option<&VariantId>) -> bool {
        self.mutate(|state| match state.find_mut(id, variant_id) {
            Some(line) if line.qty < MAX_QUANTITY_PER_ITEM => {
                line.qty += 1;
                true
            }
            _ => false,
        })
    }

    /// The "-" button; disabled at a quantity of 1.
    pub fn decrement(&self, id: &ItemId, variant_id: Option<&VariantId>) -> bool {
        self.mutate(|state| match state.find_mut(id, variant_id) {
            Some(line) if line.qty > 1 => {
                line.qty -= 1;
                true
            }
            _ => false,
        })
    }

    /// Remove exactly the matching line. Returns whether one was removed.
    pub fn remove_from_cart(&self, id: &ItemId, variant_id: Option<&VariantId>) -> bool {
        self.mutate(|state| {
            let len_before = state.items.len();
            state.items.retain(|i| !i.matches(id, variant_id));
            let removed = state.items.len() < len_before;
            if removed {
                tracing::debug!(cart = %self.id, item = %id, "removed from cart");
            }
            removed
        })
    }

    /// Empty the cart and drop any promo code.
    pub fn clear_cart(&self) {
        self.mutate(|state| {
            let had_content = !state.items.is_empty() || state.promo.is_some();
            state.items.clear();
            state.promo = None;
            tracing::debug!(cart = %self.id, "cleared cart");
            had_content
        });
    }

    /// Apply a promo code from the table.
    ///
    /// Unknown codes are rejected without touching the cart.
    pub fn apply_promo(&self, code: &str, table: &PromoTable) -> Result<AppliedPromo, CommerceError> {
        let Some(promo) = table.lookup(code) else {
            tracing::warn!(cart = %self.id, code, "rejected promo code");
            return Err(CommerceError::InvalidPromoCode(code.trim().to_string()));
        };
        let applied = AppliedPromo::from(promo);
        self.mutate(|state| {
            if state.promo.as_ref() == Some(&applied) {
                return false;
            }
            state.promo = Some(applied.clone());
            tracing::debug!(cart = %self.id, code = %applied.code, "applied promo code");
            true
        });
        Ok(applied)
    }

    /// Drop the applied promo code. Returns whether there was one.
    pub fn remove_promo(&self) -> bool {
        self.mutate(|state| state.promo.take().is_some())
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> CartState {
        self.state.borrow().clone()
    }

    pub fn items(&self) -> Vec<CartItem> {
        self.state.borrow().items.clone()
    }

    pub fn get(&self, key: &LineKey) -> Option<CartItem> {
        self.state
            .borrow()
            .items
            .iter()
            .find(|i| i.matches(&key.id, key.variant_id.as_ref()))
            .cloned()
    }

    pub fn promo(&self) -> Option<AppliedPromo> {
        self.state.borrow().promo.clone()
    }

    /// Total item count (sum of quantities).
    pub fn item_count(&self) -> u64 {
        self.state.borrow().items.iter().map(|i| u64::from(i.qty)).sum()
    }

    /// Number of distinct lines.
    pub fn line_count(&self) -> usize {
        self.state.borrow().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.borrow().items.is_empty()
    }

    pub fn revision(&self) -> u64 {
        self.state.borrow().revision
    }

    /// Derived pricing for the current contents.
    pub fn totals(&self, policy: &PricingPolicy) -> Result<CartTotals, CommerceError> {
        let state = self.state.borrow();
        CartTotals::compute(&state.items, state.promo.as_ref(), policy)
    }

    /// Settle the order: compute the final totals and empty the cart.
    ///
    /// Payment is not processed here; callers receive the totals to hand off.
    pub fn checkout(&self, policy: &PricingPolicy) -> Result<CartTotals, CommerceError> {
        if self.is_empty() {
            return Err(CommerceError::EmptyCart);
        }
        let totals = self.totals(policy)?;
        tracing::info!(
            cart = %self.id,
            items = totals.item_count,
            total = %totals.total,
            "checked out"
        );
        self.clear_cart();
        Ok(totals)
    }

    /// Serializable copy of the cart.
    pub fn to_snapshot(&self) -> CartSnapshot {
        let state = self.state.borrow();
        CartSnapshot::new(self.id.clone(), state.items.clone(), state.promo.clone())
    }

    /// Replace the cart with a snapshot in a single notification.
    ///
    /// Snapshot lines are re-merged, so a hand-edited file with duplicate keys
    /// or zero quantities still yields a well-formed cart.
    pub fn restore(&self, snapshot: CartSnapshot) -> Result<(), CommerceError> {
        snapshot.validate()?;
        let mut items = Vec::with_capacity(snapshot.items.len());
        for item in snapshot.items {
            merge_into(&mut items, NewCartItem::from(item));
        }
        self.mutate(|state| {
            state.items = items;
            state.promo = snapshot.promo;
            tracing::debug!(cart = %self.id, lines = state.items.len(), "restored cart");
            true
        });
        Ok(())
    }
}

impl Default for CartStore {
    fn default() -> Self {
        Self::new()
    }
}

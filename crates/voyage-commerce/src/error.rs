//! Commerce error types.

use thiserror::Error;

/// Errors that can occur in storefront operations.
///
/// Cart mutations themselves never fail; these surface from promo lookups,
/// price arithmetic, checkout, and snapshot persistence.
#[derive(Error, Debug)]
pub enum CommerceError {
    /// Promo code not present in the code table.
    #[error("Invalid promo code: {0}")]
    InvalidPromoCode(String),

    /// Filter input that cannot be turned into a predicate.
    #[error("Invalid filter for {facet}: {reason}")]
    InvalidFilter { facet: String, reason: String },

    /// Checkout attempted on an empty cart.
    #[error("Cart is empty")]
    EmptyCart,

    /// Currency mismatch.
    #[error("Currency mismatch: expected {expected}, got {got}")]
    CurrencyMismatch { expected: String, got: String },

    /// Arithmetic overflow.
    #[error("Arithmetic overflow in money calculation")]
    Overflow,

    /// Snapshot could not be restored.
    #[error("Snapshot error: {0}")]
    Snapshot(String),

    /// Filesystem error while reading or writing a snapshot.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

//! Error taxonomy shared by every store implementation and the order service.

use crate::catalog::ProductId;
use std::time::Duration;
use thiserror::Error;

/// Errors produced by domain validation and datastore operations.
///
/// The variants map one-to-one onto HTTP outcomes in `stockroom-web`:
/// validation and insufficient stock are client errors, missing rows are 404,
/// conflicts are 409, and everything else is an opaque 500.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Malformed, missing or non-positive input. Detected before any write.
    #[error("{0}")]
    Validation(String),

    /// A product, order or inventory record does not exist.
    #[error("{resource} {id} not found")]
    NotFound {
        /// Kind of entity that was looked up.
        resource: &'static str,
        /// Identifier that was looked up.
        id: i64,
    },

    /// Uniqueness violation (duplicate SKU) or a lost inventory race.
    #[error("{0}")]
    Conflict(String),

    /// Not enough stock on hand to fulfil the requested quantity.
    #[error("Insufficient stock for product {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        /// Product that cannot be fulfilled.
        product_id: ProductId,
        /// Total quantity requested for this product across the order.
        requested: i64,
        /// Quantity on hand when the check ran.
        available: i32,
    },

    /// Retryable datastore conflict (serialization failure, deadlock,
    /// order-number collision).
    #[error("Transient datastore conflict: {0}")]
    Transient(String),

    /// The operation did not finish within its time budget.
    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),

    /// Any other datastore failure.
    #[error("Database error: {0}")]
    Database(String),
}

impl StoreError {
    /// Shorthand for [`StoreError::NotFound`].
    #[must_use]
    pub const fn not_found(resource: &'static str, id: i64) -> Self {
        Self::NotFound { resource, id }
    }

    /// Shorthand for [`StoreError::Validation`].
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Whether retrying the same unit of work may succeed.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Transient(_))
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        let err = StoreError::not_found("Order", 42);
        assert_eq!(err.to_string(), "Order 42 not found");
    }

    #[test]
    fn test_insufficient_stock_display() {
        let err = StoreError::InsufficientStock {
            product_id: ProductId::new(7),
            requested: 12,
            available: 10,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for product 7: requested 12, available 10"
        );
    }

    #[test]
    fn test_only_transient_is_retryable() {
        assert!(StoreError::Transient("deadlock".into()).is_transient());
        assert!(!StoreError::Conflict("duplicate sku".into()).is_transient());
        assert!(!StoreError::Database("boom".into()).is_transient());
    }
}

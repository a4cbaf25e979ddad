//! Unified error handling for the store core.
//!
//! Provides a single caller-facing [`StoreError`] composed from the
//! per-module error types. Validation and not-found errors always surface
//! unchanged; rate-feed failures are absorbed inside the pricing layer
//! whenever a fallback (stale cache or 1:1 passthrough) exists and only
//! appear here when no fallback is available.

use thiserror::Error;

use copperleaf_core::{CurrencyCode, ItemId, OrderId};

use crate::catalog::CatalogError;
use crate::db::RepositoryError;
use crate::rates::RateFeedError;

/// Caller-facing error type for the store core.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A quantity or delta was zero or negative.
    #[error("quantity must be positive, got {0}")]
    InvalidQuantity(i64),

    /// A monetary amount was negative.
    #[error("amount cannot be negative")]
    NegativeAmount,

    /// Checkout was attempted on a cart with no lines.
    #[error("cart is empty")]
    EmptyCart,

    /// The catalog could not resolve the item.
    #[error("item {0} not found")]
    ItemNotFound(ItemId),

    /// The order does not exist.
    #[error("order {0} not found")]
    OrderNotFound(OrderId),

    /// A currency is absent from an otherwise-valid quote set.
    #[error("unsupported currency: {0}")]
    UnsupportedCurrency(CurrencyCode),

    /// Rate-provider failure with no usable fallback.
    #[error("rate feed error: {0}")]
    RateFeed(#[from] RateFeedError),

    /// Catalog collaborator failure.
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Storage failure; the enclosing transaction was rolled back and the
    /// operation is safe to retry from scratch.
    #[error("operation failed: {0}")]
    Storage(#[from] RepositoryError),
}

/// Result type alias for `StoreError`.
pub type Result<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_display() {
        let err = StoreError::InvalidQuantity(-3);
        assert_eq!(err.to_string(), "quantity must be positive, got -3");

        let err = StoreError::ItemNotFound(ItemId::new(42));
        assert_eq!(err.to_string(), "item 42 not found");

        let err = StoreError::EmptyCart;
        assert_eq!(err.to_string(), "cart is empty");
    }

    #[test]
    fn repository_errors_convert_to_storage() {
        let err: StoreError = RepositoryError::Conflict("cart changed".to_owned()).into();
        assert!(matches!(err, StoreError::Storage(RepositoryError::Conflict(_))));
    }
}

//! # Error Types
//!
//! Domain-specific error types for storefront-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  storefront-core errors (this file)                                    │
//! │  └── CoreError        - Caller-visible placement failures              │
//! │                                                                         │
//! │  storefront-db errors (separate crate)                                 │
//! │  ├── DbError          - Database operation failures                    │
//! │  └── PlaceOrderError  - CoreError + TransactionFailed                  │
//! │                                                                         │
//! │  Flow: CoreError → PlaceOrderError → API response (external)           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (product id, counts)
//! 3. Errors are enum variants, never String
//! 4. Each error variant maps to a user-facing message

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Business rule violations surfaced to the caller of order placement.
///
/// None of these are retryable as-is: retrying the identical request would
/// fail the identical way. The retryable storage-level outcome lives in
/// storefront-db as `PlaceOrderError::TransactionFailed`.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The request was malformed before any business rule applied.
    ///
    /// ## When This Occurs
    /// - Empty item list
    /// - Zero or negative quantity on any entry
    /// - More line entries than [`MAX_ORDER_LINES`](crate::MAX_ORDER_LINES)
    ///
    /// Rejected before any storage access.
    #[error("Invalid request: {reason}")]
    InvalidRequest { reason: String },

    /// A requested product id does not exist.
    #[error("Product {0} not found")]
    ProductNotFound(i64),

    /// A line asked for more units than the product has in stock.
    ///
    /// ## When This Occurs
    /// - Requested quantity exceeds inventory as of this transaction
    /// - A repeated product id already consumed the stock earlier in the
    ///   same request
    /// - A concurrent placement took the last units first
    #[error("Insufficient stock for product {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: i64,
        requested: i64,
        available: i64,
    },
}

impl CoreError {
    /// Creates an InvalidRequest error with the given reason.
    pub fn invalid_request(reason: impl Into<String>) -> Self {
        CoreError::InvalidRequest {
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InsufficientStock {
            product_id: 1,
            requested: 9999,
            available: 50,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for product 1: requested 9999, available 50"
        );

        let err = CoreError::ProductNotFound(42);
        assert_eq!(err.to_string(), "Product 42 not found");
    }

    #[test]
    fn test_invalid_request_helper() {
        let err = CoreError::invalid_request("items must not be empty");
        assert_eq!(err.to_string(), "Invalid request: items must not be empty");
        assert!(matches!(err, CoreError::InvalidRequest { .. }));
    }
}

//! # Error Types
//!
//! Domain-specific error types for caja-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                          Error Types                                │
//! │                                                                     │
//! │  caja-core errors (this file)                                       │
//! │  ├── CoreError        - Business rule violations                    │
//! │  └── ValidationError  - Input validation failures                   │
//! │                                                                     │
//! │  caja-db errors (separate crate)                                    │
//! │  ├── DbError          - Storage failures                            │
//! │  └── WorkflowError    - CoreError ∪ DbError, what workflows return  │
//! │                                                                     │
//! │  Flow: ValidationError → CoreError → WorkflowError → API caller     │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (product id, available stock, etc.)
//! 3. Errors are enum variants, never String
//! 4. Business-rule failures are detected before any mutation commits

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Business rule violations.
///
/// Every variant maps to a client error at the API boundary: the caller sent
/// a well-formed request that the current state of the world rejects.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Product absent, inactive, or belonging to another business.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Referenced sale does not exist.
    #[error("Sale not found: {0}")]
    SaleNotFound(String),

    /// Referenced cash register does not exist.
    #[error("Cash register not found: {0}")]
    RegisterNotFound(String),

    /// Not enough stock to cover the requested quantity.
    ///
    /// Raised by sale creation (stock < quantity) and by manual adjustment
    /// when the delta would drive stock below zero. The caller must lower
    /// the quantity; retrying unchanged cannot succeed.
    #[error("Insufficient stock for product {product_id}: available {available}, requested {requested}")]
    InsufficientStock {
        product_id: String,
        available: i64,
        requested: i64,
    },

    /// Cancelling a sale twice is rejected, not silently absorbed.
    #[error("Sale {0} is already cancelled")]
    SaleAlreadyCancelled(String),

    /// Closing a register twice is rejected.
    #[error("Cash register {0} is already closed")]
    RegisterAlreadyClosed(String),

    /// A user may hold at most one open register per business.
    #[error("User already has an open cash register for this business")]
    RegisterAlreadyOpen,

    /// Only the user who opened a register may close it.
    #[error("Cash register {register_id} belongs to another user")]
    RegisterOwnedByAnotherUser { register_id: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These occur when a request is malformed before any business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid UUID).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
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
    fn test_insufficient_stock_message() {
        let err = CoreError::InsufficientStock {
            product_id: "p-1".to_string(),
            available: 3,
            requested: 5,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for product p-1: available 3, requested 5"
        );
    }

    #[test]
    fn test_state_conflict_messages() {
        assert_eq!(
            CoreError::SaleAlreadyCancelled("s-1".to_string()).to_string(),
            "Sale s-1 is already cancelled"
        );
        assert_eq!(
            CoreError::RegisterAlreadyClosed("r-1".to_string()).to_string(),
            "Cash register r-1 is already closed"
        );
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "items".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
        assert_eq!(core_err.to_string(), "Validation error: items is required");
    }
}

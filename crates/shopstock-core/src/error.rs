//! # Error Types
//!
//! Domain-specific error types for shopstock-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  shopstock-core errors (this file)                                     │
//! │  ├── LedgerError      - Domain rule violations                         │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  shopstock-db errors (separate crate)                                  │
//! │  ├── DbError          - Database operation failures                    │
//! │  └── OpError          - LedgerError | DbError, returned by mutations   │
//! │                                                                         │
//! │  Flow: ValidationError → LedgerError → OpError → caller dialog         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (product name, available stock, etc.)
//! 3. Errors are enum variants, never String
//! 4. Every failure is recoverable by the caller: correct the input and retry

use thiserror::Error;

// =============================================================================
// Ledger Error
// =============================================================================

/// Domain rule violations raised by ledger operations.
///
/// All variants are "fail loud, fail whole": when one of these is raised
/// from a multi-line operation, nothing of that operation was applied.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// A shop or product name collides case-insensitively with an
    /// existing one.
    ///
    /// ## When This Occurs
    /// - Creating a shop with a name that already exists
    /// - Renaming a shop or product onto an existing name
    ///
    /// Backed by a case-insensitive unique index, so the check-then-insert
    /// race of a separate existence query cannot produce duplicates.
    #[error("{entity} name '{name}' already exists")]
    DuplicateName { entity: &'static str, name: String },

    /// Shop deletion refused because ledger history references it.
    ///
    /// ## Reasons
    /// One entry per blocker: sales exist, purchases exist, or total
    /// stock across products is non-zero. No partial deletion occurs.
    #[error("shop {shop_id} cannot be deleted: {}", .reasons.join("; "))]
    DeleteBlocked { shop_id: i64, reasons: Vec<String> },

    /// The authoritative stock check failed at sale commit time.
    ///
    /// ## User Workflow
    /// ```text
    /// Add to cart (qty: 200, snapshot stock: 200)
    ///      │
    ///      ▼
    /// Concurrent sale drains stock to 70
    ///      │
    ///      ▼
    /// record_sale → InsufficientStock { available: 70, requested: 200 }
    ///      │
    ///      ▼
    /// Caller refreshes the stock view and resubmits
    /// ```
    #[error("insufficient stock for {product_name}: available {available}, requested {requested}")]
    InsufficientStock {
        product_name: String,
        available: i64,
        requested: i64,
    },

    /// Validation error (wraps ValidationError).
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These occur when user input doesn't meet requirements. They are raised
/// before any row is written, so the containing operation is never
/// partially applied.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or blank.
    #[error("{field} is required")]
    Required { field: &'static str },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: &'static str },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustBeNonNegative { field: &'static str },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange {
        field: &'static str,
        min: i64,
        max: i64,
    },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with LedgerError.
pub type LedgerResult<T> = Result<T, LedgerError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = LedgerError::InsufficientStock {
            product_name: "Cola".to_string(),
            available: 70,
            requested: 200,
        };
        assert_eq!(
            err.to_string(),
            "insufficient stock for Cola: available 70, requested 200"
        );

        let err = LedgerError::DeleteBlocked {
            shop_id: 3,
            reasons: vec!["sales exist".to_string(), "stock is non-zero".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "shop 3 cannot be deleted: sales exist; stock is non-zero"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required { field: "name" };
        assert_eq!(err.to_string(), "name is required");

        let err = ValidationError::MustBePositive { field: "quantity" };
        assert_eq!(err.to_string(), "quantity must be positive");
    }

    #[test]
    fn test_validation_converts_to_ledger_error() {
        let validation_err = ValidationError::Required { field: "name" };
        let ledger_err: LedgerError = validation_err.into();
        assert!(matches!(ledger_err, LedgerError::Validation(_)));
    }
}

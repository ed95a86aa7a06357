//! # Validation Module
//!
//! Input validation rules for ledger operations.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Caller (form / cart assembly)                                │
//! │  ├── Basic format checks, stock-snapshot pre-check                     │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE (inside the recording transaction)               │
//! │  ├── Non-blank names, positive quantities, non-negative prices         │
//! │  └── First violation aborts the whole batch - nothing committed        │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── CHECK (quantity >= 0) on stock                                    │
//! │  ├── Case-insensitive UNIQUE indexes on names                          │
//! │  └── Foreign key constraints                                           │
//! │                                                                         │
//! │  Defense in depth: multiple layers catch different errors              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::{MAX_LINE_QUANTITY, MAX_PRICE_CENTS};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a shop name.
///
/// ## Rules
/// - Must not be blank
/// - Must be at most 100 characters
///
/// ## Returns
/// The trimmed name.
pub fn validate_shop_name(name: &str) -> ValidationResult<&str> {
    validate_name(name, "shop name", 100)
}

/// Validates a product name.
///
/// ## Rules
/// - Must not be blank
/// - Must be at most 200 characters
///
/// ## Returns
/// The trimmed name.
///
/// ## Example
/// ```rust
/// use shopstock_core::validation::validate_product_name;
///
/// assert_eq!(validate_product_name("  Cola ").unwrap(), "Cola");
/// assert!(validate_product_name("   ").is_err());
/// ```
pub fn validate_product_name(name: &str) -> ValidationResult<&str> {
    validate_name(name, "product name", 200)
}

fn validate_name<'a>(
    name: &'a str,
    field: &'static str,
    max: usize,
) -> ValidationResult<&'a str> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required { field });
    }

    if name.chars().count() > max {
        return Err(ValidationError::TooLong { field, max });
    }

    Ok(name)
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a line quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed [`MAX_LINE_QUANTITY`]
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive { field: "quantity" });
    }

    if qty > MAX_LINE_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity",
            min: 1,
            max: MAX_LINE_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a price in cents.
///
/// ## Rules
/// - Must be non-negative (>= 0)
/// - Zero is allowed (free or promotional items)
/// - Must not exceed [`MAX_PRICE_CENTS`], which together with the
///   quantity cap keeps quantity × price inside i64
///
/// ## Example
/// ```rust
/// use shopstock_core::validation::validate_price_cents;
///
/// assert!(validate_price_cents(350).is_ok());
/// assert!(validate_price_cents(0).is_ok());
/// assert!(validate_price_cents(-1).is_err());
/// ```
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::MustBeNonNegative { field: "price" });
    }

    if cents > MAX_PRICE_CENTS {
        return Err(ValidationError::OutOfRange {
            field: "price",
            min: 0,
            max: MAX_PRICE_CENTS,
        });
    }

    Ok(())
}

/// Validates a manual stock override quantity.
///
/// ## Rules
/// - Must be non-negative (>= 0); zero empties the shelf, which is fine
pub fn validate_stock_quantity(qty: i64) -> ValidationResult<()> {
    if qty < 0 {
        return Err(ValidationError::MustBeNonNegative { field: "quantity" });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

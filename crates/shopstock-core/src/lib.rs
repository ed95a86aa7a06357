//! # shopstock-core: Pure Business Logic for the Shopstock Ledger
//!
//! This crate is the **heart** of Shopstock. It contains the domain types
//! and business rules of the inventory ledger as pure code with zero I/O
//! dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Shopstock Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              Callers (UI forms, reporting views)                │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ shopstock-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │   cart    │  │ validation│  │   │
//! │  │   │  Purchase │  │   Money   │  │   Cart    │  │   rules   │  │   │
//! │  │   │   Sale    │  │  (cents)  │  │ CartLine  │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                shopstock-db (Database Layer)                    │   │
//! │  │        SQLite queries, migrations, transactional recorders      │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain records (Shop, Product, Purchase, Sale, ...)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`cart`] - Sale cart with the best-effort stock pre-check
//! - [`error`] - Domain error taxonomy
//! - [`validation`] - Input validation rules
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in cents (i64) to avoid float errors
//! 4. **Explicit Errors**: All errors are typed, never strings or panics

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod error;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use shopstock_core::Money` instead of
// `use shopstock_core::money::Money`

pub use cart::{Cart, CartLine};
pub use error::{LedgerError, LedgerResult, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum line items allowed in a single purchase batch or sale invoice.
///
/// ## Business Reason
/// Prevents runaway carts and keeps one ledger transaction a reasonable size.
pub const MAX_BATCH_LINES: usize = 100;

/// Maximum quantity of a single line item.
///
/// ## Business Reason
/// Prevents accidental over-entry (e.g., typing 100000 instead of 100).
pub const MAX_LINE_QUANTITY: i64 = 999_999;

/// Maximum unit price of a single line item, in cents ($1,000,000.00).
///
/// ## Business Reason
/// Prevents accidental over-entry, and bounds line totals:
/// MAX_LINE_QUANTITY × MAX_PRICE_CENTS stays far inside i64 range, so
/// quantity × price arithmetic can never overflow.
pub const MAX_PRICE_CENTS: i64 = 100_000_000;

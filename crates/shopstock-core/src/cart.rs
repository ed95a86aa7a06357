//! # Sale Cart
//!
//! In-memory cart assembled by the sale form before the invoice is saved.
//!
//! ## Two-Phase Stock Check
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Phase 1: cart assembly (THIS MODULE, best-effort UX check)            │
//! │                                                                         │
//! │  Cart::add(product, qty, stock_snapshot)                               │
//! │       │                                                                 │
//! │       ├── running qty for the product > snapshot? → reject early       │
//! │       └── else merge into the existing line                            │
//! │                                                                         │
//! │  Phase 2: commit (shopstock-db SaleRepository, AUTHORITATIVE)          │
//! │                                                                         │
//! │  record_sale re-checks stock inside the transaction with a             │
//! │  compare-and-swap decrement. Stock may have moved between the two      │
//! │  phases; last-check-wins at commit time, never at cart-add time.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, LedgerResult};
use crate::money::Money;
use crate::validation::{validate_price_cents, validate_quantity};
use crate::MAX_BATCH_LINES;

/// One line of a sale cart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: i64,
    pub name: String,
    pub price_cents: i64,
    pub quantity: i64,
}

impl CartLine {
    /// Line subtotal: quantity × unit price.
    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.price_cents).multiply_quantity(self.quantity)
    }
}

/// A sale cart. Merges repeated products into one line and rejects
/// quantities exceeding the stock snapshot captured when the form loaded.
#[derive(Debug, Clone, Default)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Creates an empty cart.
    pub fn new() -> Self {
        Cart { lines: Vec::new() }
    }

    /// Adds `qty` of a product, merging with an existing line for the
    /// same product.
    ///
    /// `stock_snapshot` is the on-hand quantity the caller read when the
    /// form loaded. The running line quantity may not exceed it; this is
    /// a UX courtesy, the commit-time re-check is the authority.
    pub fn add(
        &mut self,
        product_id: i64,
        name: &str,
        price_cents: i64,
        qty: i64,
        stock_snapshot: i64,
    ) -> LedgerResult<()> {
        validate_quantity(qty)?;
        validate_price_cents(price_cents)?;

        if let Some(line) = self.lines.iter_mut().find(|l| l.product_id == product_id) {
            let new_qty = line.quantity + qty;
            if new_qty > stock_snapshot {
                return Err(LedgerError::InsufficientStock {
                    product_name: line.name.clone(),
                    available: stock_snapshot,
                    requested: new_qty,
                });
            }
            line.quantity = new_qty;
            return Ok(());
        }

        if qty > stock_snapshot {
            return Err(LedgerError::InsufficientStock {
                product_name: name.to_string(),
                available: stock_snapshot,
                requested: qty,
            });
        }

        if self.lines.len() >= MAX_BATCH_LINES {
            return Err(crate::error::ValidationError::OutOfRange {
                field: "cart lines",
                min: 1,
                max: MAX_BATCH_LINES as i64,
            }
            .into());
        }

        self.lines.push(CartLine {
            product_id,
            name: name.to_string(),
            price_cents,
            quantity: qty,
        });
        Ok(())
    }

    /// Removes the line at `index`; out-of-range indexes are ignored.
    pub fn remove(&mut self, index: usize) {
        if index < self.lines.len() {
            self.lines.remove(index);
        }
    }

    /// Empties the cart.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Returns the cart lines in entry order.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Sum of all line totals.
    pub fn total(&self) -> Money {
        self.lines.iter().map(CartLine::line_total).sum()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

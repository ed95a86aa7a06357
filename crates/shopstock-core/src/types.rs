//! # Domain Types
//!
//! Core domain records of the Shopstock ledger.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  Reference data         Mutable projection      Append-only history    │
//! │  ┌───────────────┐      ┌───────────────┐      ┌───────────────────┐   │
//! │  │  Shop         │      │  StockLevel   │      │  Purchase         │   │
//! │  │  Product      │      │  (product,    │      │  Sale + SaleItem  │   │
//! │  │               │      │   shop) → qty │      │  AuditLogEntry    │   │
//! │  └───────────────┘      └───────────────┘      └───────────────────┘   │
//! │                                                                         │
//! │  StockLevel is the ONLY mutable aggregate: it materializes             │
//! │  Σ purchases − Σ sale items (+ manual adjustments) for O(1) reads,     │
//! │  and the recorders keep it synchronized transactionally.               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identity
//! Every entity carries a surrogate `i64` key assigned by the store in
//! insertion order. "Most recent" tie-breaks (last purchase price, last
//! sale price, point-in-time cost) lean on that ordering.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Actor
// =============================================================================

/// The identity attributed to a mutating ledger call.
///
/// The ledger does not authenticate or authorize; actors arrive from the
/// caller (login subsystem) fully formed and are used only for audit
/// attribution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Actor {
    pub user_id: i64,
    pub username: String,
}

impl Actor {
    pub fn new(user_id: i64, username: impl Into<String>) -> Self {
        Actor {
            user_id,
            username: username.into(),
        }
    }
}

// =============================================================================
// Catalog
// =============================================================================

/// A shop in the single-location chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Shop {
    pub shop_id: i64,
    pub shop_name: String,
}

/// A product in the catalog.
///
/// Product master data carries no prices: prices are transactional,
/// captured per purchase and sale line.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    pub product_id: i64,
    pub name: String,
}

/// A product joined with its on-hand quantity at one shop.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct ShopProduct {
    pub product_id: i64,
    pub name: String,
    pub quantity: i64,
}

// =============================================================================
// Stock
// =============================================================================

/// Current on-hand quantity of a product at a shop.
///
/// Absence of a row means zero stock, not an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct StockLevel {
    pub product_id: i64,
    pub shop_id: i64,
    pub quantity: i64,
}

// =============================================================================
// Purchase
// =============================================================================

/// One immutable stock-in event at a given unit cost.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Purchase {
    pub purchase_id: i64,
    pub product_id: i64,
    pub shop_id: i64,
    pub quantity: i64,
    /// Unit cost in cents at time of purchase.
    pub price_cents: i64,
    /// quantity × price, frozen at record time.
    pub total_cents: i64,
    /// Date-only granularity; the point-in-time cost join compares dates.
    pub date: NaiveDate,
}

impl Purchase {
    /// Returns the unit cost as Money.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Returns the purchase total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

/// Input line for recording a purchase: free-text product name,
/// resolved case-insensitively (create-if-absent) inside the recording
/// transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseLine {
    pub name: String,
    pub quantity: i64,
    pub price_cents: i64,
}

impl PurchaseLine {
    pub fn new(name: impl Into<String>, quantity: i64, price_cents: i64) -> Self {
        PurchaseLine {
            name: name.into(),
            quantity,
            price_cents,
        }
    }
}

// =============================================================================
// Sale
// =============================================================================

/// An invoice header. Created together with ≥1 [`SaleItem`]s in one
/// transaction; immutable once committed (no amendment or void).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Sale {
    pub sale_id: i64,
    pub shop_id: i64,
    pub date: DateTime<Utc>,
    pub grand_total_cents: i64,
}

impl Sale {
    /// Returns the invoice grand total as Money.
    #[inline]
    pub fn grand_total(&self) -> Money {
        Money::from_cents(self.grand_total_cents)
    }
}

/// An invoice line.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SaleItem {
    pub sale_item_id: i64,
    pub sale_id: i64,
    pub product_id: i64,
    pub quantity: i64,
    pub price_per_unit_cents: i64,
    pub line_total_cents: i64,
}

impl SaleItem {
    /// Returns the unit price as Money.
    #[inline]
    pub fn price_per_unit(&self) -> Money {
        Money::from_cents(self.price_per_unit_cents)
    }

    /// Returns the line total as Money.
    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.line_total_cents)
    }
}

/// An invoice line joined with its product name, for detail views.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SaleItemDetail {
    pub product_id: i64,
    pub product_name: String,
    pub quantity: i64,
    pub price_per_unit_cents: i64,
    pub line_total_cents: i64,
}

// =============================================================================
// Reporting
// =============================================================================

/// Per-product profit aggregate over a date window.
///
/// The cost basis of every sold unit is the point-in-time purchase price:
/// the most recent purchase at or before the sale's date (0 when none).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct ProductProfit {
    pub product_id: i64,
    pub product_name: String,
    pub qty_sold: i64,
    pub sale_total_cents: i64,
    pub purchase_cost_cents: i64,
}

impl ProductProfit {
    /// Total profit: sale total − point-in-time purchase cost.
    #[inline]
    pub fn total_profit_cents(&self) -> i64 {
        self.sale_total_cents - self.purchase_cost_cents
    }

    /// Average profit per unit sold. `None` when nothing was sold.
    pub fn profit_per_unit_cents(&self) -> Option<f64> {
        if self.qty_sold == 0 {
            return None;
        }
        Some(self.total_profit_cents() as f64 / self.qty_sold as f64)
    }
}

/// One week's rollup of sales vs point-in-time purchase cost.
///
/// `week` is the shifted bucket label, e.g. `2026-W35` (the week boundary
/// is offset by −2 days before the week number is computed).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct WeeklyProfit {
    pub week: String,
    pub total_sales_cents: i64,
    pub purchase_cost_cents: i64,
}

impl WeeklyProfit {
    /// Profit for the week: sales − cost.
    #[inline]
    pub fn profit_cents(&self) -> i64 {
        self.total_sales_cents - self.purchase_cost_cents
    }
}

// =============================================================================
// Audit
// =============================================================================

/// Kinds of mutating ledger operations recorded in the audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    ShopCreate,
    ShopRename,
    ShopDelete,
    ProductRename,
    PurchaseAdd,
    SaleAdd,
    StockAdjust,
}

impl AuditAction {
    /// Canonical string stored in the audit log.
    pub const fn as_str(&self) -> &'static str {
        match self {
            AuditAction::ShopCreate => "SHOP_CREATE",
            AuditAction::ShopRename => "SHOP_RENAME",
            AuditAction::ShopDelete => "SHOP_DELETE",
            AuditAction::ProductRename => "PRODUCT_RENAME",
            AuditAction::PurchaseAdd => "PURCHASE_ADD",
            AuditAction::SaleAdd => "SALE_ADD",
            AuditAction::StockAdjust => "STOCK_ADJUST",
        }
    }
}

/// One immutable audit trail entry.
///
/// Written by every mutating ledger operation and never read back by the
/// ledger itself; the viewer is an external collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct AuditLogEntry {
    pub audit_id: i64,
    pub user_id: i64,
    pub username: String,
    pub action: String,
    pub entity_type: String,
    pub entity_id: Option<i64>,
    pub shop_id: Option<i64>,
    pub product_id: Option<i64>,
    pub details: Option<String>,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================

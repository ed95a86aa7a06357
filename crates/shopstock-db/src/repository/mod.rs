//! # Repository Module
//!
//! Database repository implementations for the Shopstock ledger.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern Explained                         │
//! │                                                                         │
//! │  The Repository pattern abstracts database access behind a clean API.  │
//! │                                                                         │
//! │  Caller                                                                 │
//! │       │                                                                 │
//! │       │  db.sales().record_sale(shop_id, cart.lines(), &actor)         │
//! │       ▼                                                                 │
//! │  SaleRepository                                                        │
//! │  ├── opens ONE transaction                                             │
//! │  ├── CAS stock decrements + header + line inserts + audit entries      │
//! │  └── commits, or any error rolls the whole invoice back                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Transaction-scoped helpers (`*_in` associated functions taking a
//! `&mut SqliteConnection`) let the recorders compose catalog, stock,
//! and audit writes on one shared transaction.
//!
//! ## Available Repositories
//!
//! - [`catalog::CatalogRepository`] - Shop and product registry
//! - [`stock::StockRepository`] - Stock quantities and adjustments
//! - [`purchase::PurchaseRepository`] - Purchase recording and price queries
//! - [`sale::SaleRepository`] - Invoice recording and sale queries
//! - [`report::ReportRepository`] - Profit reports and weekly rollups
//! - [`audit::AuditRepository`] - Audit trail writes and lookups

pub mod audit;
pub mod catalog;
pub mod purchase;
pub mod report;
pub mod sale;
pub mod stock;

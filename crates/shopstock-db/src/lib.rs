//! # shopstock-db: Database Layer for the Shopstock Ledger
//!
//! This crate provides persistent storage for the inventory ledger.
//! It uses SQLite for local storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Shopstock Data Flow                              │
//! │                                                                         │
//! │  Caller (purchase form, sale form, report view)                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  shopstock-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │ catalog stock │    │  (embedded)  │  │   │
//! │  │   │               │◄───│ purchase sale │    │              │  │   │
//! │  │   │ SqlitePool    │    │ report audit  │    │ 001_init.sql │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database file (single local store)                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Transaction discipline
//!
//! Every mutating ledger operation (record a purchase batch, record an
//! invoice, manual stock override, shop create/delete) runs inside ONE
//! transaction: all of its statements commit together or the whole
//! operation rolls back. Reporting queries run outside any write
//! transaction.
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database and operation error types
//! - [`repository`] - Repository implementations per ledger component
//!
//! ## Usage
//!
//! ```rust,ignore
//! use shopstock_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/shopstock.db")).await?;
//!
//! let shop_id = db.catalog().create_shop("Downtown", &actor).await?;
//! db.purchases().record_purchase(shop_id, &lines, &actor).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult, OpError, OpResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::audit::AuditRepository;
pub use repository::catalog::CatalogRepository;
pub use repository::purchase::PurchaseRepository;
pub use repository::report::ReportRepository;
pub use repository::sale::SaleRepository;
pub use repository::stock::StockRepository;

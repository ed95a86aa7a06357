//! # Stock Repository
//!
//! On-hand quantities per (product, shop). A missing row reads as zero;
//! rows are materialized lazily by the first write that touches them.
//!
//! The recorders (purchases, sales) never set quantities directly. They
//! go through the transaction-scoped helpers here:
//!
//! ```text
//!   purchase line  --> increase_in      (upsert, quantity += delta)
//!   sale line      --> try_decrease_in  (guarded decrement, may refuse)
//!   manual adjust  --> set_quantity     (absolute value, audited)
//! ```
//!
//! `try_decrease_in` is a compare-and-swap: the `quantity >= delta` guard
//! sits inside the UPDATE itself, so a concurrent sale can never push a
//! quantity below zero regardless of what the caller read beforehand.

use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbResult, OpResult};
use crate::repository::audit::AuditRepository;
use shopstock_core::{validation, Actor, AuditAction, StockLevel};

/// Repository for per-shop stock quantities.
#[derive(Debug, Clone)]
pub struct StockRepository {
    pool: SqlitePool,
}

impl StockRepository {
    /// Creates a new StockRepository.
    pub fn new(pool: SqlitePool) -> Self {
        StockRepository { pool }
    }

    /// Returns the on-hand quantity for a product at a shop.
    ///
    /// A (product, shop) pair with no stock row reads as zero.
    pub async fn quantity(&self, product_id: i64, shop_id: i64) -> DbResult<i64> {
        let mut conn = self.pool.acquire().await?;
        Self::quantity_in(&mut conn, product_id, shop_id).await
    }

    /// Returns every stock row for a shop, including zero quantities.
    pub async fn levels_for_shop(&self, shop_id: i64) -> DbResult<Vec<StockLevel>> {
        let levels = sqlx::query_as::<_, StockLevel>(
            r#"
            SELECT product_id, shop_id, quantity
            FROM stock
            WHERE shop_id = ?1
            ORDER BY product_id
            "#,
        )
        .bind(shop_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(levels)
    }

    /// Sets an absolute quantity for a product at a shop (manual correction).
    ///
    /// Upserts the stock row and appends a STOCK_ADJUST audit entry recording
    /// the old and new values, both on one transaction.
    pub async fn set_quantity(
        &self,
        product_id: i64,
        shop_id: i64,
        quantity: i64,
        actor: &Actor,
    ) -> OpResult<()> {
        validation::validate_stock_quantity(quantity)?;

        let mut tx = self.pool.begin().await?;

        let old = Self::quantity_in(&mut tx, product_id, shop_id).await?;

        sqlx::query(
            r#"
            INSERT INTO stock (product_id, shop_id, quantity)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(product_id, shop_id) DO UPDATE SET quantity = excluded.quantity
            "#,
        )
        .bind(product_id)
        .bind(shop_id)
        .bind(quantity)
        .execute(&mut *tx)
        .await?;

        AuditRepository::append_in(
            &mut tx,
            actor,
            AuditAction::StockAdjust,
            "stock",
            None,
            Some(shop_id),
            Some(product_id),
            &format!("quantity {old} -> {quantity}"),
        )
        .await?;

        tx.commit().await?;

        debug!(product_id, shop_id, old, new = quantity, "stock adjusted");
        Ok(())
    }

    /// Reads a quantity on the caller's transaction; missing row is zero.
    pub(crate) async fn quantity_in(
        conn: &mut SqliteConnection,
        product_id: i64,
        shop_id: i64,
    ) -> DbResult<i64> {
        let quantity: Option<i64> = sqlx::query_scalar(
            "SELECT quantity FROM stock WHERE product_id = ?1 AND shop_id = ?2",
        )
        .bind(product_id)
        .bind(shop_id)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(quantity.unwrap_or(0))
    }

    /// Adds `delta` units on the caller's transaction, creating the stock
    /// row if it does not exist yet.
    pub(crate) async fn increase_in(
        conn: &mut SqliteConnection,
        product_id: i64,
        shop_id: i64,
        delta: i64,
    ) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO stock (product_id, shop_id, quantity)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(product_id, shop_id) DO UPDATE SET quantity = quantity + excluded.quantity
            "#,
        )
        .bind(product_id)
        .bind(shop_id)
        .bind(delta)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    /// Removes `delta` units on the caller's transaction, but only if at
    /// least that many are on hand. Returns whether the decrement happened.
    pub(crate) async fn try_decrease_in(
        conn: &mut SqliteConnection,
        product_id: i64,
        shop_id: i64,
        delta: i64,
    ) -> DbResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE stock
            SET quantity = quantity - ?3
            WHERE product_id = ?1 AND shop_id = ?2 AND quantity >= ?3
            "#,
        )
        .bind(product_id)
        .bind(shop_id)
        .bind(delta)
        .execute(&mut *conn)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

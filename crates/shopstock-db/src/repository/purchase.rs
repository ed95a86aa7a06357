//! # Purchase Repository
//!
//! Append-only restock ledger. Recording a batch of purchase lines is
//! one transaction end to end:
//!
//! ```text
//!   for each line:
//!     validate --> find-or-create product --> INSERT purchase
//!              --> stock += quantity --> PURCHASE_ADD audit entry
//!   commit (any failure rolls the whole batch back)
//! ```
//!
//! Purchases are never updated or deleted; the row's `total_cents` is
//! frozen at insert so later price edits can never rewrite history.
//! Two price lookups feed the purchase form: the most recent unit price
//! for a product at a shop, and the all-time weighted average.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult, OpResult};
use crate::repository::audit::AuditRepository;
use crate::repository::catalog::CatalogRepository;
use crate::repository::stock::StockRepository;
use shopstock_core::{
    validation, Actor, AuditAction, Money, Purchase, PurchaseLine, ValidationError,
    MAX_BATCH_LINES,
};

/// Repository for the append-only purchase ledger.
#[derive(Debug, Clone)]
pub struct PurchaseRepository {
    pool: SqlitePool,
}

impl PurchaseRepository {
    /// Creates a new PurchaseRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PurchaseRepository { pool }
    }

    /// Records a batch of purchase lines for a shop, dated today.
    ///
    /// The whole batch is atomic: the first invalid line aborts it with
    /// nothing written and no stock moved. New product names register as
    /// part of the same transaction. Returns the new purchase ids in
    /// line order.
    pub async fn record_purchase(
        &self,
        shop_id: i64,
        lines: &[PurchaseLine],
        actor: &Actor,
    ) -> OpResult<Vec<i64>> {
        if lines.is_empty() {
            return Err(ValidationError::Required { field: "lines" }.into());
        }
        if lines.len() > MAX_BATCH_LINES {
            return Err(ValidationError::OutOfRange {
                field: "lines",
                min: 1,
                max: MAX_BATCH_LINES as i64,
            }
            .into());
        }

        let today = Utc::now().date_naive();
        let mut tx = self.pool.begin().await?;

        let shop_exists: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM shops WHERE shop_id = ?1")
                .bind(shop_id)
                .fetch_one(&mut *tx)
                .await?;
        if shop_exists == 0 {
            return Err(DbError::not_found("Shop", shop_id).into());
        }

        let mut purchase_ids = Vec::with_capacity(lines.len());

        for line in lines {
            let name = validation::validate_product_name(&line.name)?;
            validation::validate_quantity(line.quantity)?;
            validation::validate_price_cents(line.price_cents)?;

            let product_id = CatalogRepository::find_or_create_in(&mut tx, name).await?;
            let before = StockRepository::quantity_in(&mut tx, product_id, shop_id).await?;
            let total_cents = line.quantity * line.price_cents;

            let result = sqlx::query(
                r#"
                INSERT INTO purchases
                    (product_id, shop_id, quantity, price_cents, total_cents, date)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
            )
            .bind(product_id)
            .bind(shop_id)
            .bind(line.quantity)
            .bind(line.price_cents)
            .bind(total_cents)
            .bind(today)
            .execute(&mut *tx)
            .await?;
            let purchase_id = result.last_insert_rowid();

            StockRepository::increase_in(&mut tx, product_id, shop_id, line.quantity).await?;

            AuditRepository::append_in(
                &mut tx,
                actor,
                AuditAction::PurchaseAdd,
                "purchase",
                Some(purchase_id),
                Some(shop_id),
                Some(product_id),
                &format!(
                    "{name} x{} @ {} (stock {before} -> {})",
                    line.quantity,
                    Money::from_cents(line.price_cents),
                    before + line.quantity,
                ),
            )
            .await?;

            debug!(purchase_id, product_id, quantity = line.quantity, "purchase line recorded");
            purchase_ids.push(purchase_id);
        }

        tx.commit().await?;

        info!(shop_id, lines = lines.len(), "purchase batch recorded");
        Ok(purchase_ids)
    }

    /// Returns a shop's purchase history, newest first.
    pub async fn purchases_for_shop(&self, shop_id: i64) -> DbResult<Vec<Purchase>> {
        let purchases = sqlx::query_as::<_, Purchase>(
            r#"
            SELECT purchase_id, product_id, shop_id, quantity, price_cents, total_cents, date
            FROM purchases
            WHERE shop_id = ?1
            ORDER BY purchase_id DESC
            "#,
        )
        .bind(shop_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(purchases)
    }

    /// Returns the unit price of the most recently recorded purchase for
    /// a product at a shop, or `None` if it has never been bought there.
    ///
    /// "Most recent" is insertion order, not purchase date.
    pub async fn last_price(&self, product_id: i64, shop_id: i64) -> DbResult<Option<i64>> {
        let price: Option<i64> = sqlx::query_scalar(
            r#"
            SELECT price_cents FROM purchases
            WHERE product_id = ?1 AND shop_id = ?2
            ORDER BY purchase_id DESC
            LIMIT 1
            "#,
        )
        .bind(product_id)
        .bind(shop_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(price)
    }

    /// Returns the all-time quantity-weighted average unit price in
    /// cents for a product at a shop, or `None` with no purchases.
    pub async fn average_price(&self, product_id: i64, shop_id: i64) -> DbResult<Option<f64>> {
        let avg: Option<f64> = sqlx::query_scalar(
            r#"
            SELECT CAST(SUM(quantity * price_cents) AS REAL) / SUM(quantity)
            FROM purchases
            WHERE product_id = ?1 AND shop_id = ?2
            "#,
        )
        .bind(product_id)
        .bind(shop_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(avg)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

//! # Sale Repository
//!
//! Append-only sale invoices. An invoice is a header plus one item row
//! per distinct product, written in a single transaction:
//!
//! ```text
//!   INSERT header (grand total frozen at Σ line totals)
//!   for each line:
//!     stock CAS-decrement --> refused? fail the WHOLE invoice
//!     INSERT sale_item --> SALE_ADD audit entry
//!   commit
//! ```
//!
//! The stock decrement carries its own `quantity >= ?` guard, so the
//! availability any cart was built against is advisory only; the
//! decrement at commit time is the authority, and a shortfall on any
//! line rolls back the header, the other lines, and their stock moves.

use chrono::{NaiveDate, Utc};
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult, OpResult};
use crate::repository::audit::AuditRepository;
use crate::repository::stock::StockRepository;
use shopstock_core::{
    validation, Actor, AuditAction, CartLine, LedgerError, Money, Sale, SaleItemDetail,
    ValidationError, MAX_BATCH_LINES,
};

/// Repository for the append-only sale ledger.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Records a sale invoice for a shop, dated now. Returns the sale id.
    ///
    /// Atomic over the whole cart: any invalid line or stock shortfall
    /// leaves no header, no items, and no stock movement.
    pub async fn record_sale(
        &self,
        shop_id: i64,
        lines: &[CartLine],
        actor: &Actor,
    ) -> OpResult<i64> {
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
        for line in lines {
            validation::validate_quantity(line.quantity)?;
            validation::validate_price_cents(line.price_cents)?;
        }

        let now = Utc::now();
        let grand_total: Money = lines.iter().map(CartLine::line_total).sum();

        let mut tx = self.pool.begin().await?;

        let shop_exists: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM shops WHERE shop_id = ?1")
                .bind(shop_id)
                .fetch_one(&mut *tx)
                .await?;
        if shop_exists == 0 {
            return Err(DbError::not_found("Shop", shop_id).into());
        }

        let result = sqlx::query(
            "INSERT INTO sales (shop_id, date, grand_total_cents) VALUES (?1, ?2, ?3)",
        )
        .bind(shop_id)
        .bind(now)
        .bind(grand_total.cents())
        .execute(&mut *tx)
        .await?;
        let sale_id = result.last_insert_rowid();

        for line in lines {
            let before =
                StockRepository::quantity_in(&mut tx, line.product_id, shop_id).await?;
            let decremented =
                StockRepository::try_decrease_in(&mut tx, line.product_id, shop_id, line.quantity)
                    .await?;
            if !decremented {
                // Rolls back the header and any earlier lines on drop.
                return Err(LedgerError::InsufficientStock {
                    product_name: line.name.clone(),
                    available: before,
                    requested: line.quantity,
                }
                .into());
            }

            sqlx::query(
                r#"
                INSERT INTO sale_items
                    (sale_id, product_id, quantity, price_per_unit_cents, line_total_cents)
                VALUES (?1, ?2, ?3, ?4, ?5)
                "#,
            )
            .bind(sale_id)
            .bind(line.product_id)
            .bind(line.quantity)
            .bind(line.price_cents)
            .bind(line.line_total().cents())
            .execute(&mut *tx)
            .await?;

            AuditRepository::append_in(
                &mut tx,
                actor,
                AuditAction::SaleAdd,
                "sale",
                Some(sale_id),
                Some(shop_id),
                Some(line.product_id),
                &format!(
                    "{} x{} @ {} (stock {before} -> {})",
                    line.name,
                    line.quantity,
                    Money::from_cents(line.price_cents),
                    before - line.quantity,
                ),
            )
            .await?;

            debug!(sale_id, product_id = line.product_id, quantity = line.quantity, "sale line recorded");
        }

        tx.commit().await?;

        info!(sale_id, shop_id, grand_total = grand_total.cents(), "sale recorded");
        Ok(sale_id)
    }

    /// Returns an invoice header by id.
    pub async fn get_sale(&self, sale_id: i64) -> DbResult<Sale> {
        sqlx::query_as::<_, Sale>(
            "SELECT sale_id, shop_id, date, grand_total_cents FROM sales WHERE sale_id = ?1",
        )
        .bind(sale_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("Sale", sale_id))
    }

    /// Returns an invoice's lines with product names, ordered by name.
    pub async fn items(&self, sale_id: i64) -> DbResult<Vec<SaleItemDetail>> {
        let items = sqlx::query_as::<_, SaleItemDetail>(
            r#"
            SELECT si.product_id, p.name AS product_name, si.quantity,
                   si.price_per_unit_cents, si.line_total_cents
            FROM sale_items si
            JOIN products p ON p.product_id = si.product_id
            WHERE si.sale_id = ?1
            ORDER BY p.name
            "#,
        )
        .bind(sale_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Returns the unit price this product most recently sold for at a
    /// shop, or `None` if it has never been sold there.
    ///
    /// "Most recent" is insertion order, not sale date.
    pub async fn last_price(&self, product_id: i64, shop_id: i64) -> DbResult<Option<i64>> {
        let price: Option<i64> = sqlx::query_scalar(
            r#"
            SELECT si.price_per_unit_cents
            FROM sale_items si
            JOIN sales s ON s.sale_id = si.sale_id
            WHERE si.product_id = ?1 AND s.shop_id = ?2
            ORDER BY si.sale_item_id DESC
            LIMIT 1
            "#,
        )
        .bind(product_id)
        .bind(shop_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(price)
    }

    /// Returns a shop's invoices dated within the inclusive day window,
    /// newest first. Comparison is by calendar day, not timestamp.
    pub async fn sales_between(
        &self,
        shop_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> DbResult<Vec<Sale>> {
        let sales = sqlx::query_as::<_, Sale>(
            r#"
            SELECT sale_id, shop_id, date, grand_total_cents
            FROM sales
            WHERE shop_id = ?1 AND date(date) BETWEEN date(?2) AND date(?3)
            ORDER BY sale_id DESC
            "#,
        )
        .bind(shop_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        Ok(sales)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OpError;
    use crate::pool::{Database, DbConfig};
    use shopstock_core::PurchaseLine;

    fn actor() -> Actor {
        Actor::new(1, "cashier")
    }

    /// One shop stocked with Cola x10 @ $1.50 and Chips x5 @ $0.90.
    async fn setup() -> (Database, i64, i64, i64) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let shop_id = db.catalog().create_shop("Downtown", &actor()).await.unwrap();
        db.purchases()
            .record_purchase(
                shop_id,
                &[
                    PurchaseLine::new("Cola", 10, 150),
                    PurchaseLine::new("Chips", 5, 90),
                ],
                &actor(),
            )
            .await
            .unwrap();
        let cola = db.catalog().find_or_create_product("Cola").await.unwrap();
        let chips = db.catalog().find_or_create_product("Chips").await.unwrap();
        (db, shop_id, cola, chips)
    }

    fn line(product_id: i64, name: &str, price_cents: i64, quantity: i64) -> CartLine {
        CartLine {
            product_id,
            name: name.to_string(),
            price_cents,
            quantity,
        }
    }

    #[tokio::test]
    async fn test_record_sale_decrements_stock_and_totals() {
        let (db, shop_id, cola, chips) = setup().await;

        // Scenario B: two-line invoice.
        let sale_id = db
            .sales()
            .record_sale(
                shop_id,
                &[line(cola, "Cola", 250, 3), line(chips, "Chips", 120, 2)],
                &actor(),
            )
            .await
            .unwrap();

        let sale = db.sales().get_sale(sale_id).await.unwrap();
        assert_eq!(sale.grand_total_cents, 3 * 250 + 2 * 120);

        assert_eq!(db.stock().quantity(cola, shop_id).await.unwrap(), 7);
        assert_eq!(db.stock().quantity(chips, shop_id).await.unwrap(), 3);

        let items = db.sales().items(sale_id).await.unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].product_name, "Chips");
        assert_eq!(items[0].line_total_cents, 240);
        assert_eq!(items[1].product_name, "Cola");
        assert_eq!(items[1].line_total_cents, 750);
    }

    #[tokio::test]
    async fn test_insufficient_stock_fails_whole_invoice() {
        let (db, shop_id, cola, chips) = setup().await;

        // Scenario C: second line asks for more than on hand.
        let err = db
            .sales()
            .record_sale(
                shop_id,
                &[line(cola, "Cola", 250, 3), line(chips, "Chips", 120, 6)],
                &actor(),
            )
            .await
            .unwrap_err();
        match err {
            OpError::Domain(LedgerError::InsufficientStock {
                product_name,
                available,
                requested,
            }) => {
                assert_eq!(product_name, "Chips");
                assert_eq!(available, 5);
                assert_eq!(requested, 6);
            }
            other => panic!("expected InsufficientStock, got {other:?}"),
        }

        // The passing first line rolled back too.
        assert_eq!(db.stock().quantity(cola, shop_id).await.unwrap(), 10);
        assert_eq!(db.stock().quantity(chips, shop_id).await.unwrap(), 5);
        let today = Utc::now().date_naive();
        assert!(db
            .sales()
            .sales_between(shop_id, today, today)
            .await
            .unwrap()
            .is_empty());
        assert!(db
            .audit()
            .recent(10, None, Some("SALE_ADD"), None)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_selling_exactly_on_hand_reaches_zero() {
        let (db, shop_id, cola, _) = setup().await;

        db.sales()
            .record_sale(shop_id, &[line(cola, "Cola", 250, 10)], &actor())
            .await
            .unwrap();
        assert_eq!(db.stock().quantity(cola, shop_id).await.unwrap(), 0);

        // And one more unit is refused.
        assert!(db
            .sales()
            .record_sale(shop_id, &[line(cola, "Cola", 250, 1)], &actor())
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_rejects_empty_and_invalid_lines() {
        let (db, shop_id, cola, _) = setup().await;

        assert!(db.sales().record_sale(shop_id, &[], &actor()).await.is_err());
        assert!(db
            .sales()
            .record_sale(shop_id, &[line(cola, "Cola", 250, 0)], &actor())
            .await
            .is_err());
        assert!(db
            .sales()
            .record_sale(shop_id, &[line(cola, "Cola", -1, 1)], &actor())
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_last_price_and_sales_between() {
        let (db, shop_id, cola, _) = setup().await;

        assert_eq!(db.sales().last_price(cola, shop_id).await.unwrap(), None);

        db.sales()
            .record_sale(shop_id, &[line(cola, "Cola", 240, 1)], &actor())
            .await
            .unwrap();
        db.sales()
            .record_sale(shop_id, &[line(cola, "Cola", 260, 1)], &actor())
            .await
            .unwrap();

        assert_eq!(db.sales().last_price(cola, shop_id).await.unwrap(), Some(260));

        let today = Utc::now().date_naive();
        let sales = db.sales().sales_between(shop_id, today, today).await.unwrap();
        assert_eq!(sales.len(), 2);
        // Newest first.
        assert!(sales[0].sale_id > sales[1].sale_id);

        let past = db
            .sales()
            .sales_between(
                shop_id,
                NaiveDate::from_ymd_opt(2000, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2000, 12, 31).unwrap(),
            )
            .await
            .unwrap();
        assert!(past.is_empty());
    }

    #[tokio::test]
    async fn test_stock_reconciliation() {
        let (db, shop_id, cola, _) = setup().await;

        db.sales()
            .record_sale(shop_id, &[line(cola, "Cola", 250, 4)], &actor())
            .await
            .unwrap();
        db.purchases()
            .record_purchase(shop_id, &[PurchaseLine::new("Cola", 6, 155)], &actor())
            .await
            .unwrap();
        db.sales()
            .record_sale(shop_id, &[line(cola, "Cola", 250, 2)], &actor())
            .await
            .unwrap();

        // With no manual adjustments, on hand = purchased - sold.
        assert_eq!(
            db.stock().quantity(cola, shop_id).await.unwrap(),
            (10 + 6) - (4 + 2)
        );
    }
}

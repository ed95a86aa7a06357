//! # Report Repository
//!
//! Read-only profitability queries over the sale and purchase ledgers.
//!
//! Both reports price every sold unit at the shop's most recent purchase
//! for that product dated at or before the sale's own date:
//!
//! ```text
//!   sale line (date D) --> purchases for same product & shop
//!                          with date(purchase) <= date(D)
//!                          ORDER BY date DESC, purchase_id DESC  <- same-day ties
//!                          LIMIT 1        (missing: cost 0)
//! ```
//!
//! Later purchases never rewrite earlier sales, so a report over a
//! closed window is stable no matter what is recorded afterwards.
//!
//! Week keys use `strftime('%Y-W%W', date(sale, '-2 days'))`; the
//! two-day shift moves the week boundary so weekend trade lands in the
//! preceding business week.

use chrono::NaiveDate;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use shopstock_core::{ProductProfit, WeeklyProfit};

/// Correlated lookup for the unit cost in effect when a sale happened.
/// `si` is the sale_items row, `s` its sales header.
const POINT_IN_TIME_COST: &str = r#"COALESCE((
    SELECT pr.price_cents FROM purchases pr
    WHERE pr.product_id = si.product_id
      AND pr.shop_id = s.shop_id
      AND date(pr.date) <= date(s.date)
    ORDER BY date(pr.date) DESC, pr.purchase_id DESC
    LIMIT 1
), 0)"#;

/// Repository for profit reporting.
#[derive(Debug, Clone)]
pub struct ReportRepository {
    pool: SqlitePool,
}

impl ReportRepository {
    /// Creates a new ReportRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ReportRepository { pool }
    }

    /// Per-product profit for a shop over an inclusive day window,
    /// ordered by product name. An empty window yields an empty vec.
    pub async fn profit_report(
        &self,
        shop_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> DbResult<Vec<ProductProfit>> {
        let rows = sqlx::query_as::<_, ProductProfit>(&format!(
            r#"
            SELECT si.product_id,
                   p.name AS product_name,
                   SUM(si.quantity) AS qty_sold,
                   SUM(si.line_total_cents) AS sale_total_cents,
                   SUM(si.quantity * {POINT_IN_TIME_COST}) AS purchase_cost_cents
            FROM sale_items si
            JOIN sales s ON s.sale_id = si.sale_id
            JOIN products p ON p.product_id = si.product_id
            WHERE s.shop_id = ?1
              AND date(s.date) BETWEEN date(?2) AND date(?3)
            GROUP BY si.product_id, p.name
            ORDER BY p.name
            "#
        ))
        .bind(shop_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        debug!(shop_id, products = rows.len(), "profit report built");
        Ok(rows)
    }

    /// Weekly totals for a shop, newest week first. With no range the
    /// whole ledger is rolled up.
    pub async fn weekly_profit(
        &self,
        shop_id: i64,
        range: Option<(NaiveDate, NaiveDate)>,
    ) -> DbResult<Vec<WeeklyProfit>> {
        let sql = format!(
            r#"
            SELECT strftime('%Y-W%W', date(s.date, '-2 days')) AS week,
                   SUM(si.line_total_cents) AS total_sales_cents,
                   SUM(si.quantity * {POINT_IN_TIME_COST}) AS purchase_cost_cents
            FROM sale_items si
            JOIN sales s ON s.sale_id = si.sale_id
            WHERE s.shop_id = ?1
              AND (?2 IS NULL OR date(s.date) >= date(?2))
              AND (?3 IS NULL OR date(s.date) <= date(?3))
            GROUP BY week
            ORDER BY week DESC
            "#
        );

        let (start, end) = match range {
            Some((start, end)) => (Some(start), Some(end)),
            None => (None, None),
        };

        let rows = sqlx::query_as::<_, WeeklyProfit>(&sql)
            .bind(shop_id)
            .bind(start)
            .bind(end)
            .fetch_all(&self.pool)
            .await?;

        debug!(shop_id, weeks = rows.len(), "weekly rollup built");
        Ok(rows)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use chrono::Utc;
    use shopstock_core::{Actor, CartLine, PurchaseLine};

    fn actor() -> Actor {
        Actor::new(1, "admin")
    }

    fn line(product_id: i64, name: &str, price_cents: i64, quantity: i64) -> CartLine {
        CartLine {
            product_id,
            name: name.to_string(),
            price_cents,
            quantity,
        }
    }

    /// Rewrites a purchase's date; recorders always stamp today, so
    /// history-dependent cases shift rows into the past afterwards.
    async fn backdate_purchase(db: &Database, purchase_id: i64, date: &str) {
        sqlx::query("UPDATE purchases SET date = ?1 WHERE purchase_id = ?2")
            .bind(date)
            .bind(purchase_id)
            .execute(db.pool())
            .await
            .unwrap();
    }

    async fn backdate_sale(db: &Database, sale_id: i64, date: &str) {
        sqlx::query("UPDATE sales SET date = ?1 WHERE sale_id = ?2")
            .bind(date)
            .bind(sale_id)
            .execute(db.pool())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_profit_report_basic() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let shop_id = db.catalog().create_shop("Downtown", &actor()).await.unwrap();

        db.purchases()
            .record_purchase(shop_id, &[PurchaseLine::new("Cola", 10, 150)], &actor())
            .await
            .unwrap();
        let cola = db.catalog().find_or_create_product("Cola").await.unwrap();

        db.sales()
            .record_sale(shop_id, &[line(cola, "Cola", 250, 4)], &actor())
            .await
            .unwrap();

        let today = Utc::now().date_naive();
        let report = db.reports().profit_report(shop_id, today, today).await.unwrap();
        assert_eq!(report.len(), 1);
        let row = &report[0];
        assert_eq!(row.product_name, "Cola");
        assert_eq!(row.qty_sold, 4);
        assert_eq!(row.sale_total_cents, 1000);
        assert_eq!(row.purchase_cost_cents, 600);
        assert_eq!(row.total_profit_cents(), 400);
        assert_eq!(row.profit_per_unit_cents(), Some(100.0));
    }

    #[tokio::test]
    async fn test_point_in_time_cost_ignores_later_purchases() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let shop_id = db.catalog().create_shop("Downtown", &actor()).await.unwrap();

        // Scenario D: purchase @100, sale, purchase @300, sale.
        let p1 = db
            .purchases()
            .record_purchase(shop_id, &[PurchaseLine::new("Cola", 10, 100)], &actor())
            .await
            .unwrap()[0];
        backdate_purchase(&db, p1, "2026-08-01").await;
        let cola = db.catalog().find_or_create_product("Cola").await.unwrap();

        let s1 = db
            .sales()
            .record_sale(shop_id, &[line(cola, "Cola", 250, 2)], &actor())
            .await
            .unwrap();
        backdate_sale(&db, s1, "2026-08-02T12:00:00Z").await;

        let p2 = db
            .purchases()
            .record_purchase(shop_id, &[PurchaseLine::new("Cola", 10, 300)], &actor())
            .await
            .unwrap()[0];
        backdate_purchase(&db, p2, "2026-08-03").await;

        let s2 = db
            .sales()
            .record_sale(shop_id, &[line(cola, "Cola", 250, 2)], &actor())
            .await
            .unwrap();
        backdate_sale(&db, s2, "2026-08-04T12:00:00Z").await;

        let start = NaiveDate::from_ymd_opt(2026, 8, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2026, 8, 31).unwrap();
        let report = db.reports().profit_report(shop_id, start, end).await.unwrap();
        assert_eq!(report.len(), 1);
        // First sale costed at 100/unit, second at 300/unit.
        assert_eq!(report[0].purchase_cost_cents, 2 * 100 + 2 * 300);
        assert_eq!(report[0].sale_total_cents, 1000);
        assert_eq!(report[0].total_profit_cents(), 1000 - 800);
    }

    #[tokio::test]
    async fn test_same_day_tie_breaks_to_latest_purchase() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let shop_id = db.catalog().create_shop("Downtown", &actor()).await.unwrap();

        // Two purchases on the same day; the higher purchase_id wins.
        let ids = db
            .purchases()
            .record_purchase(
                shop_id,
                &[
                    PurchaseLine::new("Cola", 5, 110),
                    PurchaseLine::new("Cola", 5, 130),
                ],
                &actor(),
            )
            .await
            .unwrap();
        assert!(ids[1] > ids[0]);
        let cola = db.catalog().find_or_create_product("Cola").await.unwrap();

        db.sales()
            .record_sale(shop_id, &[line(cola, "Cola", 200, 1)], &actor())
            .await
            .unwrap();

        let today = Utc::now().date_naive();
        let report = db.reports().profit_report(shop_id, today, today).await.unwrap();
        assert_eq!(report[0].purchase_cost_cents, 130);
    }

    #[tokio::test]
    async fn test_missing_purchase_history_costs_zero() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let shop_id = db.catalog().create_shop("Downtown", &actor()).await.unwrap();
        let cola = db.catalog().find_or_create_product("Cola").await.unwrap();
        db.stock()
            .set_quantity(cola, shop_id, 5, &actor())
            .await
            .unwrap();

        db.sales()
            .record_sale(shop_id, &[line(cola, "Cola", 250, 2)], &actor())
            .await
            .unwrap();

        let today = Utc::now().date_naive();
        let report = db.reports().profit_report(shop_id, today, today).await.unwrap();
        assert_eq!(report[0].purchase_cost_cents, 0);
        assert_eq!(report[0].total_profit_cents(), 500);
    }

    #[tokio::test]
    async fn test_empty_window_yields_empty_report() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let shop_id = db.catalog().create_shop("Downtown", &actor()).await.unwrap();

        let start = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2000, 12, 31).unwrap();
        assert!(db
            .reports()
            .profit_report(shop_id, start, end)
            .await
            .unwrap()
            .is_empty());
        assert!(db
            .reports()
            .weekly_profit(shop_id, Some((start, end)))
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_weekly_rollup_buckets_and_order() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let shop_id = db.catalog().create_shop("Downtown", &actor()).await.unwrap();

        let p = db
            .purchases()
            .record_purchase(shop_id, &[PurchaseLine::new("Cola", 20, 100)], &actor())
            .await
            .unwrap()[0];
        backdate_purchase(&db, p, "2026-07-01").await;
        let cola = db.catalog().find_or_create_product("Cola").await.unwrap();

        // Wednesdays two weeks apart.
        let s1 = db
            .sales()
            .record_sale(shop_id, &[line(cola, "Cola", 200, 3)], &actor())
            .await
            .unwrap();
        backdate_sale(&db, s1, "2026-07-08T10:00:00Z").await;
        let s2 = db
            .sales()
            .record_sale(shop_id, &[line(cola, "Cola", 200, 5)], &actor())
            .await
            .unwrap();
        backdate_sale(&db, s2, "2026-07-22T10:00:00Z").await;

        let weeks = db.reports().weekly_profit(shop_id, None).await.unwrap();
        assert_eq!(weeks.len(), 2);
        // Newest week first.
        assert!(weeks[0].week > weeks[1].week);
        assert_eq!(weeks[0].total_sales_cents, 1000);
        assert_eq!(weeks[0].purchase_cost_cents, 500);
        assert_eq!(weeks[0].profit_cents(), 500);
        assert_eq!(weeks[1].total_sales_cents, 600);
        assert_eq!(weeks[1].profit_cents(), 300);
    }

    #[tokio::test]
    async fn test_weekly_boundary_shift_groups_monday_with_prior_week() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let shop_id = db.catalog().create_shop("Downtown", &actor()).await.unwrap();
        let cola = db.catalog().find_or_create_product("Cola").await.unwrap();
        db.stock()
            .set_quantity(cola, shop_id, 10, &actor())
            .await
            .unwrap();

        // 2026-07-20 is a Monday; shifting -2 days lands on Saturday the
        // 18th, so it buckets with the preceding Sunday the 19th.
        let s1 = db
            .sales()
            .record_sale(shop_id, &[line(cola, "Cola", 200, 1)], &actor())
            .await
            .unwrap();
        backdate_sale(&db, s1, "2026-07-19T10:00:00Z").await;
        let s2 = db
            .sales()
            .record_sale(shop_id, &[line(cola, "Cola", 200, 1)], &actor())
            .await
            .unwrap();
        backdate_sale(&db, s2, "2026-07-20T10:00:00Z").await;

        let weeks = db.reports().weekly_profit(shop_id, None).await.unwrap();
        assert_eq!(weeks.len(), 1);
        assert_eq!(weeks[0].total_sales_cents, 400);
    }
}

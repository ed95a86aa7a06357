//! # Catalog Repository
//!
//! Shops and the single shared product catalog.
//!
//! Both namespaces are case-insensitively unique, enforced by NOCASE
//! unique indexes; the index violation is remapped to the domain
//! `DuplicateName` error so races between two concurrent creates
//! collapse to the same outcome as a pre-checked collision.
//!
//! ```text
//!   create_shop ----> shops row
//!                 \-> stock fan-out: one zero row per existing product
//!                 \-> SHOP_CREATE audit entry
//!
//!   delete_shop ----> refused while sales, purchases, or stock remain
//! ```
//!
//! Products are never deleted; `find_or_create_product` is the only way
//! a product comes into existence, so recording a purchase for a new
//! name is enough to register it.

use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};

use crate::error::{DbError, DbResult, OpError, OpResult};
use crate::repository::audit::AuditRepository;
use shopstock_core::{validation, Actor, AuditAction, LedgerError, Product, Shop, ShopProduct};

/// Repository for shop and product catalog operations.
#[derive(Debug, Clone)]
pub struct CatalogRepository {
    pool: SqlitePool,
}

impl CatalogRepository {
    /// Creates a new CatalogRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CatalogRepository { pool }
    }

    // =========================================================================
    // Shops
    // =========================================================================

    /// Returns all shops ordered by name.
    pub async fn list_shops(&self) -> DbResult<Vec<Shop>> {
        let shops = sqlx::query_as::<_, Shop>(
            "SELECT shop_id, shop_name FROM shops ORDER BY shop_name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(shops)
    }

    /// Returns a shop by id.
    pub async fn get_shop(&self, shop_id: i64) -> DbResult<Shop> {
        sqlx::query_as::<_, Shop>("SELECT shop_id, shop_name FROM shops WHERE shop_id = ?1")
            .bind(shop_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Shop", shop_id))
    }

    /// Creates a shop and fans out a zero-quantity stock row for every
    /// product already in the catalog, so stock reads for the new shop
    /// never have to special-case missing rows.
    pub async fn create_shop(&self, name: &str, actor: &Actor) -> OpResult<i64> {
        let name = validation::validate_shop_name(name)?;

        let mut tx = self.pool.begin().await?;

        let result = sqlx::query("INSERT INTO shops (shop_name) VALUES (?1)")
            .bind(name)
            .execute(&mut *tx)
            .await
            .map_err(|e| OpError::from(e).name_collision("shop", name))?;
        let shop_id = result.last_insert_rowid();

        // SQLite wants a WHERE clause before ON CONFLICT on INSERT ... SELECT.
        sqlx::query(
            r#"
            INSERT INTO stock (product_id, shop_id, quantity)
            SELECT product_id, ?1, 0 FROM products WHERE true
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(shop_id)
        .execute(&mut *tx)
        .await?;

        AuditRepository::append_in(
            &mut tx,
            actor,
            AuditAction::ShopCreate,
            "shop",
            Some(shop_id),
            Some(shop_id),
            None,
            name,
        )
        .await?;

        tx.commit().await?;

        info!(shop_id, name, "shop created");
        Ok(shop_id)
    }

    /// Returns whether a shop name is already taken, case-insensitively,
    /// ignoring `exclude` (the shop being renamed).
    pub async fn exists_name(&self, name: &str, exclude: Option<i64>) -> DbResult<bool> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM shops
            WHERE shop_name = ?1 AND (?2 IS NULL OR shop_id != ?2)
            "#,
        )
        .bind(name.trim())
        .bind(exclude)
        .fetch_one(&self.pool)
        .await?;

        Ok(count > 0)
    }

    /// Renames a shop. Refuses names already taken (case-insensitively)
    /// by another shop.
    pub async fn rename_shop(&self, shop_id: i64, new_name: &str, actor: &Actor) -> OpResult<()> {
        let new_name = validation::validate_shop_name(new_name)?;

        let mut tx = self.pool.begin().await?;

        let old = sqlx::query_scalar::<_, String>(
            "SELECT shop_name FROM shops WHERE shop_id = ?1",
        )
        .bind(shop_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| DbError::not_found("Shop", shop_id))?;

        sqlx::query("UPDATE shops SET shop_name = ?1 WHERE shop_id = ?2")
            .bind(new_name)
            .bind(shop_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| OpError::from(e).name_collision("shop", new_name))?;

        AuditRepository::append_in(
            &mut tx,
            actor,
            AuditAction::ShopRename,
            "shop",
            Some(shop_id),
            Some(shop_id),
            None,
            &format!("{old} -> {new_name}"),
        )
        .await?;

        tx.commit().await?;

        debug!(shop_id, old, new = new_name, "shop renamed");
        Ok(())
    }

    /// Returns the reasons a shop cannot be deleted right now, in the
    /// order sales, purchases, remaining stock. Empty means deletable.
    pub async fn delete_blockers(&self, shop_id: i64) -> DbResult<Vec<String>> {
        let mut conn = self.pool.acquire().await?;
        Self::delete_blockers_in(&mut conn, shop_id).await
    }

    /// Deletes a shop and its (all-zero) stock rows.
    ///
    /// Refused with `DeleteBlocked` while any sale or purchase references
    /// the shop or any of its stock quantities is still positive, so the
    /// ledger's history always resolves to a shop that existed.
    pub async fn delete_shop(&self, shop_id: i64, actor: &Actor) -> OpResult<()> {
        let mut tx = self.pool.begin().await?;

        let name = sqlx::query_scalar::<_, String>(
            "SELECT shop_name FROM shops WHERE shop_id = ?1",
        )
        .bind(shop_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| DbError::not_found("Shop", shop_id))?;

        let reasons = Self::delete_blockers_in(&mut tx, shop_id).await?;
        if !reasons.is_empty() {
            return Err(LedgerError::DeleteBlocked { shop_id, reasons }.into());
        }

        sqlx::query("DELETE FROM stock WHERE shop_id = ?1")
            .bind(shop_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM shops WHERE shop_id = ?1")
            .bind(shop_id)
            .execute(&mut *tx)
            .await?;

        AuditRepository::append_in(
            &mut tx,
            actor,
            AuditAction::ShopDelete,
            "shop",
            Some(shop_id),
            Some(shop_id),
            None,
            &name,
        )
        .await?;

        tx.commit().await?;

        info!(shop_id, name, "shop deleted");
        Ok(())
    }

    async fn delete_blockers_in(
        conn: &mut SqliteConnection,
        shop_id: i64,
    ) -> DbResult<Vec<String>> {
        let mut reasons = Vec::new();

        let sales: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales WHERE shop_id = ?1")
            .bind(shop_id)
            .fetch_one(&mut *conn)
            .await?;
        if sales > 0 {
            reasons.push(format!("{sales} recorded sale(s)"));
        }

        let purchases: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM purchases WHERE shop_id = ?1")
                .bind(shop_id)
                .fetch_one(&mut *conn)
                .await?;
        if purchases > 0 {
            reasons.push(format!("{purchases} recorded purchase(s)"));
        }

        let on_hand: Option<i64> =
            sqlx::query_scalar("SELECT SUM(quantity) FROM stock WHERE shop_id = ?1")
                .bind(shop_id)
                .fetch_one(&mut *conn)
                .await?;
        let on_hand = on_hand.unwrap_or(0);
        if on_hand > 0 {
            reasons.push(format!("{on_hand} unit(s) still in stock"));
        }

        Ok(reasons)
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// Returns the whole product catalog ordered by name.
    pub async fn list_products(&self) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            "SELECT product_id, name FROM products ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Returns a product by id.
    pub async fn get_product(&self, product_id: i64) -> DbResult<Product> {
        sqlx::query_as::<_, Product>("SELECT product_id, name FROM products WHERE product_id = ?1")
            .bind(product_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Product", product_id))
    }

    /// Returns the catalog joined with a shop's stock quantities,
    /// ordered by product name. Products without a stock row at this
    /// shop read as zero on hand.
    pub async fn products_for_shop(&self, shop_id: i64) -> DbResult<Vec<ShopProduct>> {
        let products = sqlx::query_as::<_, ShopProduct>(
            r#"
            SELECT p.product_id, p.name, COALESCE(st.quantity, 0) AS quantity
            FROM products p
            LEFT JOIN stock st ON st.product_id = p.product_id AND st.shop_id = ?1
            ORDER BY p.name
            "#,
        )
        .bind(shop_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Resolves a product name to its id, registering the name if it is
    /// new. Matching is case-insensitive; the stored spelling is whoever
    /// registered it first.
    pub async fn find_or_create_product(&self, name: &str) -> OpResult<i64> {
        let mut tx = self.pool.begin().await?;
        let product_id = Self::find_or_create_in(&mut tx, name).await?;
        tx.commit().await?;
        Ok(product_id)
    }

    /// Transaction-scoped form of [`find_or_create_product`] used by the
    /// purchase recorder so new names register atomically with the
    /// purchase that introduces them.
    ///
    /// [`find_or_create_product`]: CatalogRepository::find_or_create_product
    pub(crate) async fn find_or_create_in(
        conn: &mut SqliteConnection,
        name: &str,
    ) -> OpResult<i64> {
        let name = validation::validate_product_name(name)?;

        // The name column carries COLLATE NOCASE, so = matches any casing.
        let existing: Option<i64> =
            sqlx::query_scalar("SELECT product_id FROM products WHERE name = ?1")
                .bind(name)
                .fetch_optional(&mut *conn)
                .await?;
        if let Some(product_id) = existing {
            return Ok(product_id);
        }

        let result = sqlx::query("INSERT INTO products (name) VALUES (?1)")
            .bind(name)
            .execute(&mut *conn)
            .await;

        match result {
            Ok(r) => {
                let product_id = r.last_insert_rowid();
                debug!(product_id, name, "product registered");
                Ok(product_id)
            }
            // Lost a check-then-insert race to a concurrent writer: the
            // unique index fired, so the row exists now. Resolve to it
            // instead of failing the caller's batch.
            Err(e) => {
                let err = OpError::from(e);
                if matches!(err, OpError::Db(DbError::UniqueViolation { .. })) {
                    let product_id: Option<i64> =
                        sqlx::query_scalar("SELECT product_id FROM products WHERE name = ?1")
                            .bind(name)
                            .fetch_optional(&mut *conn)
                            .await?;
                    if let Some(product_id) = product_id {
                        debug!(product_id, name, "product registered concurrently");
                        return Ok(product_id);
                    }
                }
                Err(err.name_collision("product", name))
            }
        }
    }

    /// Renames a product everywhere it appears; history and reports pick
    /// the new spelling up through their joins.
    pub async fn rename_product(
        &self,
        product_id: i64,
        new_name: &str,
        actor: &Actor,
    ) -> OpResult<()> {
        let new_name = validation::validate_product_name(new_name)?;

        let mut tx = self.pool.begin().await?;

        let old = sqlx::query_scalar::<_, String>(
            "SELECT name FROM products WHERE product_id = ?1",
        )
        .bind(product_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| DbError::not_found("Product", product_id))?;

        sqlx::query("UPDATE products SET name = ?1 WHERE product_id = ?2")
            .bind(new_name)
            .bind(product_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| OpError::from(e).name_collision("product", new_name))?;

        AuditRepository::append_in(
            &mut tx,
            actor,
            AuditAction::ProductRename,
            "product",
            Some(product_id),
            None,
            Some(product_id),
            &format!("{old} -> {new_name}"),
        )
        .await?;

        tx.commit().await?;

        debug!(product_id, old, new = new_name, "product renamed");
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    fn actor() -> Actor {
        Actor::new(1, "admin")
    }

    #[tokio::test]
    async fn test_create_and_list_shops() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        db.catalog().create_shop("Westside", &actor()).await.unwrap();
        db.catalog().create_shop("Downtown", &actor()).await.unwrap();

        let shops = db.catalog().list_shops().await.unwrap();
        assert_eq!(shops.len(), 2);
        // Ordered by name.
        assert_eq!(shops[0].shop_name, "Downtown");
        assert_eq!(shops[1].shop_name, "Westside");
    }

    #[tokio::test]
    async fn test_duplicate_shop_name_case_insensitive() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.catalog().create_shop("Downtown", &actor()).await.unwrap();

        let err = db
            .catalog()
            .create_shop("  downtown ", &actor())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            OpError::Domain(LedgerError::DuplicateName { entity: "shop", .. })
        ));
    }

    #[tokio::test]
    async fn test_shop_name_trimmed_and_validated() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let shop_id = db.catalog().create_shop("  Downtown  ", &actor()).await.unwrap();
        assert_eq!(db.catalog().get_shop(shop_id).await.unwrap().shop_name, "Downtown");

        assert!(db.catalog().create_shop("   ", &actor()).await.is_err());
    }

    #[tokio::test]
    async fn test_new_shop_gets_zero_stock_for_existing_products() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.catalog().find_or_create_product("Cola").await.unwrap();
        db.catalog().find_or_create_product("Chips").await.unwrap();

        let shop_id = db.catalog().create_shop("Downtown", &actor()).await.unwrap();

        let levels = db.stock().levels_for_shop(shop_id).await.unwrap();
        assert_eq!(levels.len(), 2);
        assert!(levels.iter().all(|l| l.quantity == 0));
    }

    #[tokio::test]
    async fn test_exists_name_respects_exclude() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let shop_id = db.catalog().create_shop("Downtown", &actor()).await.unwrap();

        assert!(db.catalog().exists_name("downtown", None).await.unwrap());
        assert!(!db
            .catalog()
            .exists_name("downtown", Some(shop_id))
            .await
            .unwrap());
        assert!(!db.catalog().exists_name("Riverside", None).await.unwrap());
    }

    #[tokio::test]
    async fn test_rename_shop() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let shop_id = db.catalog().create_shop("Downtown", &actor()).await.unwrap();

        db.catalog()
            .rename_shop(shop_id, "Riverside", &actor())
            .await
            .unwrap();
        assert_eq!(
            db.catalog().get_shop(shop_id).await.unwrap().shop_name,
            "Riverside"
        );

        // Renaming a shop to its own name (different spacing) is fine,
        // but taking another shop's name is not.
        let other = db.catalog().create_shop("Downtown", &actor()).await.unwrap();
        let err = db
            .catalog()
            .rename_shop(other, "riverside", &actor())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            OpError::Domain(LedgerError::DuplicateName { .. })
        ));
    }

    #[tokio::test]
    async fn test_delete_shop_blocked_then_allowed() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let shop_id = db.catalog().create_shop("Downtown", &actor()).await.unwrap();
        let product_id = db.catalog().find_or_create_product("Cola").await.unwrap();

        db.stock()
            .set_quantity(product_id, shop_id, 5, &actor())
            .await
            .unwrap();

        let err = db.catalog().delete_shop(shop_id, &actor()).await.unwrap_err();
        match err {
            OpError::Domain(LedgerError::DeleteBlocked { reasons, .. }) => {
                assert_eq!(reasons, vec!["5 unit(s) still in stock".to_string()]);
            }
            other => panic!("expected DeleteBlocked, got {other:?}"),
        }

        db.stock()
            .set_quantity(product_id, shop_id, 0, &actor())
            .await
            .unwrap();
        db.catalog().delete_shop(shop_id, &actor()).await.unwrap();
        assert!(db.catalog().get_shop(shop_id).await.is_err());
    }

    #[tokio::test]
    async fn test_find_or_create_product_idempotent() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let a = db.catalog().find_or_create_product("Cola").await.unwrap();
        let b = db.catalog().find_or_create_product("COLA").await.unwrap();
        let c = db.catalog().find_or_create_product("  cola ").await.unwrap();
        assert_eq!(a, b);
        assert_eq!(a, c);

        // First spelling wins.
        assert_eq!(db.catalog().get_product(a).await.unwrap().name, "Cola");
        assert_eq!(db.catalog().list_products().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_find_or_create_resolves_to_one_product() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        // Racing registrations of the same name (any casing) must all
        // land on one catalog row and agree on its id.
        let (cat1, cat2, cat3) = (db.catalog(), db.catalog(), db.catalog());
        let (a, b, c) = tokio::join!(
            cat1.find_or_create_product("Cola"),
            cat2.find_or_create_product("cola"),
            cat3.find_or_create_product("COLA"),
        );
        let (a, b, c) = (a.unwrap(), b.unwrap(), c.unwrap());
        assert_eq!(a, b);
        assert_eq!(b, c);
        assert_eq!(db.catalog().list_products().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_rename_product_collision() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let cola = db.catalog().find_or_create_product("Cola").await.unwrap();
        db.catalog().find_or_create_product("Chips").await.unwrap();

        let err = db
            .catalog()
            .rename_product(cola, "chips", &actor())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            OpError::Domain(LedgerError::DuplicateName {
                entity: "product",
                ..
            })
        ));

        db.catalog()
            .rename_product(cola, "Cola Zero", &actor())
            .await
            .unwrap();
        assert_eq!(
            db.catalog().get_product(cola).await.unwrap().name,
            "Cola Zero"
        );
    }

    #[tokio::test]
    async fn test_products_for_shop_includes_zero_rows() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let shop_id = db.catalog().create_shop("Downtown", &actor()).await.unwrap();
        let cola = db.catalog().find_or_create_product("Cola").await.unwrap();
        db.catalog().find_or_create_product("Chips").await.unwrap();

        db.stock()
            .set_quantity(cola, shop_id, 9, &actor())
            .await
            .unwrap();

        let rows = db.catalog().products_for_shop(shop_id).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name, "Chips");
        assert_eq!(rows[0].quantity, 0);
        assert_eq!(rows[1].name, "Cola");
        assert_eq!(rows[1].quantity, 9);
    }
}

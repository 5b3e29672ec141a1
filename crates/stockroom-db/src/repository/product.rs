//! # Product Repository
//!
//! Database operations for products.
//!
//! ## Stock Updates
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                    Stock Update Strategy                            │
//! │                                                                     │
//! │  ❌ WRONG: read, compute, write back                                │
//! │     SELECT current_stock ... ; UPDATE ... SET current_stock = 7     │
//! │                                                                     │
//! │  ✅ CORRECT: delta update, guarded in SQL                           │
//! │     UPDATE products SET current_stock = current_stock - 3           │
//! │     WHERE id = ? AND current_stock >= 3                             │
//! │                                                                     │
//! │  Zero rows affected means the guard failed; the caller decides      │
//! │  whether that is NotFound or InsufficientStock.                     │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Stock deltas are only applied by the engines, always together with a
//! ledger row in the same transaction.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use stockroom_core::validation::MAX_STOCK;
use stockroom_core::{Product, ValidationError};

const PRODUCT_COLUMNS: &str = r#"
    id, name, category, current_stock, min_stock, max_stock,
    last_price_cents, is_active, created_at, updated_at
"#;

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.products();
/// let product = repo.get_by_id("uuid-here").await?;
/// let reorder = repo.low_stock().await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Gets a product by its ID, active or not.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let mut conn = self.pool.acquire().await?;
        fetch_by_id(&mut conn, id).await
    }

    /// Finds the active product whose name matches case-insensitively.
    pub async fn find_active_by_name(&self, name: &str) -> DbResult<Option<Product>> {
        let mut conn = self.pool.acquire().await?;
        fetch_active_by_name(&mut conn, name).await
    }

    /// Lists active products sorted by name.
    pub async fn list_active(&self) -> DbResult<Vec<Product>> {
        let sql = format!(
            "SELECT {} FROM products WHERE is_active = 1 ORDER BY name",
            PRODUCT_COLUMNS
        );
        let products = sqlx::query_as::<_, Product>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(products)
    }

    /// Active products at or below their reorder threshold.
    ///
    /// Products with `min_stock = 0` are never reported.
    pub async fn low_stock(&self) -> DbResult<Vec<Product>> {
        let sql = format!(
            r#"
            SELECT {} FROM products
            WHERE is_active = 1 AND min_stock > 0 AND current_stock <= min_stock
            ORDER BY current_stock, name
            "#,
            PRODUCT_COLUMNS
        );
        let products = sqlx::query_as::<_, Product>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(products)
    }

    /// Soft-deletes a product by setting is_active = false.
    ///
    /// Ledger rows and PO lines keep referencing it, and the name becomes
    /// free for the resolver to create a new product under.
    pub async fn deactivate(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deactivating product");

        let result = sqlx::query(
            "UPDATE products SET is_active = 0, updated_at = ?2 WHERE id = ?1 AND is_active = 1",
        )
        .bind(id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Counts active products (for diagnostics and the seed tool).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE is_active = 1")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Connection-level operations (usable inside a transaction)
// =============================================================================

pub async fn fetch_by_id(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Product>> {
    let sql = format!("SELECT {} FROM products WHERE id = ?1", PRODUCT_COLUMNS);
    let product = sqlx::query_as::<_, Product>(&sql)
        .bind(id)
        .fetch_optional(conn)
        .await?;
    Ok(product)
}

/// Exact, trimmed, case-insensitive name match among active products.
pub async fn fetch_active_by_name(
    conn: &mut SqliteConnection,
    name: &str,
) -> DbResult<Option<Product>> {
    let sql = format!(
        "SELECT {} FROM products WHERE is_active = 1 AND name_key = ?1 LIMIT 1",
        PRODUCT_COLUMNS
    );
    let product = sqlx::query_as::<_, Product>(&sql)
        .bind(Product::name_key(name))
        .fetch_optional(conn)
        .await?;
    Ok(product)
}

/// Inserts a new product row.
///
/// ## Returns
/// * `Err(DbError::UniqueViolation)` - An active product already has this name
/// * `Err(DbError::ForeignKeyViolation)` - Category does not exist
pub async fn insert(conn: &mut SqliteConnection, product: &Product) -> DbResult<()> {
    debug!(name = %product.name, category = %product.category, "Inserting product");

    sqlx::query(
        r#"
        INSERT INTO products (
            id, name, name_key, category, current_stock, min_stock, max_stock,
            last_price_cents, is_active, created_at, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
        "#,
    )
    .bind(&product.id)
    .bind(&product.name)
    .bind(Product::name_key(&product.name))
    .bind(&product.category)
    .bind(product.current_stock)
    .bind(product.min_stock)
    .bind(product.max_stock)
    .bind(product.last_price_cents)
    .bind(product.is_active)
    .bind(product.created_at)
    .bind(product.updated_at)
    .execute(conn)
    .await?;

    Ok(())
}

/// Adds stock and records the latest unit cost.
///
/// ## Returns
/// * `Err(DbError::NotFound)` - No such product
/// * `Err(Domain(Validation(OutOfRange)))` - Stock would pass [`MAX_STOCK`];
///   nothing changed
pub async fn add_stock(
    conn: &mut SqliteConnection,
    id: &str,
    qty: i64,
    unit_cost_cents: i64,
) -> DbResult<()> {
    debug!(id = %id, qty, "Adding stock");

    // Written as a subtraction so SQLite never overflows into REAL.
    let result = sqlx::query(
        r#"
        UPDATE products
        SET current_stock = current_stock + ?2,
            last_price_cents = ?3,
            updated_at = ?4
        WHERE id = ?1 AND current_stock <= ?5 - ?2
        "#,
    )
    .bind(id)
    .bind(qty)
    .bind(unit_cost_cents)
    .bind(Utc::now())
    .bind(MAX_STOCK)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 1 {
        return Ok(());
    }
    match current_stock(conn, id).await? {
        None => Err(DbError::not_found("Product", id)),
        Some(_) => Err(ValidationError::OutOfRange {
            field: "CurrentStock".to_string(),
            min: 0,
            max: MAX_STOCK,
        }
        .into()),
    }
}

/// Removes stock if at least `qty` is on hand.
///
/// ## Returns
/// * `Ok(true)` - Stock decremented
/// * `Ok(false)` - Product missing or not enough stock; nothing changed
pub async fn try_remove_stock(conn: &mut SqliteConnection, id: &str, qty: i64) -> DbResult<bool> {
    debug!(id = %id, qty, "Removing stock");

    let result = sqlx::query(
        r#"
        UPDATE products
        SET current_stock = current_stock - ?2,
            updated_at = ?3
        WHERE id = ?1 AND current_stock >= ?2
        "#,
    )
    .bind(id)
    .bind(qty)
    .bind(Utc::now())
    .execute(conn)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// Reads the current stock level.
pub async fn current_stock(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<i64>> {
    let stock = sqlx::query_scalar("SELECT current_stock FROM products WHERE id = ?1")
        .bind(id)
        .fetch_optional(conn)
        .await?;
    Ok(stock)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{category, new_id, test_support::memory_db};

    fn product(name: &str, stock: i64, min: i64) -> Product {
        let now = Utc::now();
        Product {
            id: new_id(),
            name: name.to_string(),
            category: "Peripheral".to_string(),
            current_stock: stock,
            min_stock: min,
            max_stock: 100,
            last_price_cents: 0,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_insert_and_find_by_name_case_insensitive() {
        let db = memory_db().await;
        let mouse = product("USB Mouse", 3, 0);
        {
            let mut conn = db.pool().acquire().await.unwrap();
            category::ensure(&mut conn, "Peripheral").await.unwrap();
            insert(&mut conn, &mouse).await.unwrap();
        }

        let found = db.products().find_active_by_name("  usb mouse ").await.unwrap();
        assert_eq!(found.map(|p| p.id), Some(mouse.id.clone()));

        let by_id = db.products().get_by_id(&mouse.id).await.unwrap().unwrap();
        assert_eq!(by_id.current_stock, 3);
    }

    #[tokio::test]
    async fn test_name_match_folds_non_ascii_case() {
        let db = memory_db().await;
        let screen = product("Écran 27", 0, 0);
        let mut conn = db.pool().acquire().await.unwrap();
        category::ensure(&mut conn, "Peripheral").await.unwrap();
        insert(&mut conn, &screen).await.unwrap();

        let found = fetch_active_by_name(&mut conn, "écran 27").await.unwrap();
        assert_eq!(found.map(|p| p.id), Some(screen.id.clone()));

        let err = insert(&mut conn, &product("ÉCRAN 27", 0, 0)).await.unwrap_err();
        assert!(err.is_unique_violation_on("products.name_key"));
    }

    #[tokio::test]
    async fn test_guarded_stock_removal() {
        let db = memory_db().await;
        let cable = product("HDMI Cable", 5, 0);
        let mut conn = db.pool().acquire().await.unwrap();
        category::ensure(&mut conn, "Peripheral").await.unwrap();
        insert(&mut conn, &cable).await.unwrap();

        assert!(try_remove_stock(&mut conn, &cable.id, 5).await.unwrap());
        assert!(!try_remove_stock(&mut conn, &cable.id, 1).await.unwrap());
        assert_eq!(current_stock(&mut conn, &cable.id).await.unwrap(), Some(0));

        add_stock(&mut conn, &cable.id, 2, 799).await.unwrap();
        let reloaded = fetch_by_id(&mut conn, &cable.id).await.unwrap().unwrap();
        assert_eq!(reloaded.current_stock, 2);
        assert_eq!(reloaded.last_price_cents, 799);
    }

    #[tokio::test]
    async fn test_add_stock_stops_at_ceiling() {
        let db = memory_db().await;
        let cable = product("Patch Cable", MAX_STOCK - 1, 0);
        let mut conn = db.pool().acquire().await.unwrap();
        category::ensure(&mut conn, "Peripheral").await.unwrap();
        insert(&mut conn, &cable).await.unwrap();

        let err = add_stock(&mut conn, &cable.id, 2, 100).await.unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(stockroom_core::CoreError::Validation(
                ValidationError::OutOfRange { .. }
            ))
        ));
        assert_eq!(current_stock(&mut conn, &cable.id).await.unwrap(), Some(MAX_STOCK - 1));

        add_stock(&mut conn, &cable.id, 1, 100).await.unwrap();
        assert_eq!(current_stock(&mut conn, &cable.id).await.unwrap(), Some(MAX_STOCK));

        let err = add_stock(&mut conn, "missing", 1, 100).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_low_stock_and_deactivate() {
        let db = memory_db().await;
        let toner = product("Toner", 1, 2);
        let paper = product("Paper", 50, 10);
        {
            let mut conn = db.pool().acquire().await.unwrap();
            category::ensure(&mut conn, "Peripheral").await.unwrap();
            insert(&mut conn, &toner).await.unwrap();
            insert(&mut conn, &paper).await.unwrap();
        }

        let low = db.products().low_stock().await.unwrap();
        assert_eq!(low.len(), 1);
        assert_eq!(low[0].name, "Toner");

        db.products().deactivate(&toner.id).await.unwrap();
        assert!(db.products().low_stock().await.unwrap().is_empty());
        assert_eq!(db.products().count().await.unwrap(), 1);
        assert!(matches!(
            db.products().deactivate(&toner.id).await,
            Err(DbError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_duplicate_active_name_rejected() {
        let db = memory_db().await;
        let mut conn = db.pool().acquire().await.unwrap();
        category::ensure(&mut conn, "Peripheral").await.unwrap();
        insert(&mut conn, &product("Webcam", 0, 0)).await.unwrap();

        let err = insert(&mut conn, &product("WEBCAM", 0, 0)).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }
}

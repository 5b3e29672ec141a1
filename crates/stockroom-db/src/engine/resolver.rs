//! # Product Resolver
//!
//! Decides which catalog product a purchase order line or a manual import
//! refers to, creating one when nothing matches.
//!
//! ```text
//! product_id given?  ── yes ──► that product (NotFound if missing)
//!        │ no
//!        ▼
//! active product named item_name (trimmed, any case)?  ── yes ──► reuse it
//!        │ no
//!        ▼
//! create: category, stock 0, last price = unit cost
//! ```
//!
//! All functions run on the caller's transaction.

use chrono::Utc;
use sqlx::SqliteConnection;
use tracing::info;

use crate::error::DbResult;
use crate::repository::{category, new_id, product, purchase_order};
use stockroom_core::{CoreError, PoDetail, Product, DEFAULT_CATEGORY};

/// Attributes for a product the resolver has to create.
#[derive(Debug, Clone)]
pub struct NewProduct<'a> {
    pub name: &'a str,
    pub category: &'a str,
    pub min_stock: i64,
    pub max_stock: i64,
    pub unit_cost_cents: i64,
}

impl<'a> NewProduct<'a> {
    /// Defaults used for items first seen on a purchase order.
    pub fn from_po_item(name: &'a str, unit_cost_cents: i64) -> Self {
        NewProduct {
            name,
            category: DEFAULT_CATEGORY,
            min_stock: 0,
            max_stock: 0,
            unit_cost_cents,
        }
    }
}

/// Resolves a product by explicit id, else by name, else creates it.
///
/// ## Returns
/// * `Err(Domain(NotFound))` - `product_id` was given but does not exist
pub async fn resolve(
    conn: &mut SqliteConnection,
    product_id: Option<&str>,
    wanted: NewProduct<'_>,
) -> DbResult<Product> {
    if let Some(id) = product_id.map(str::trim).filter(|s| !s.is_empty()) {
        return product::fetch_by_id(&mut *conn, id)
            .await?
            .ok_or_else(|| CoreError::not_found("Product", id).into());
    }

    if let Some(existing) = product::fetch_active_by_name(&mut *conn, wanted.name).await? {
        return Ok(existing);
    }

    create(conn, wanted).await
}

/// Returns the product a PO line is bound to, binding it first if needed.
///
/// The binding is written back to the line so later receipts skip the
/// name lookup.
pub async fn resolve_line(conn: &mut SqliteConnection, line: &PoDetail) -> DbResult<String> {
    if let Some(id) = &line.product_id {
        return Ok(id.clone());
    }

    let product = resolve(
        &mut *conn,
        None,
        NewProduct::from_po_item(&line.item_name, line.unit_cost_cents),
    )
    .await?;
    purchase_order::bind_product(conn, &line.detail_id, &product.id).await?;
    Ok(product.id)
}

async fn create(conn: &mut SqliteConnection, wanted: NewProduct<'_>) -> DbResult<Product> {
    let category = match wanted.category.trim() {
        "" => DEFAULT_CATEGORY,
        name => name,
    };
    category::ensure(&mut *conn, category).await?;

    let now = Utc::now();
    let created = Product {
        id: new_id(),
        name: wanted.name.trim().to_string(),
        category: category.to_string(),
        current_stock: 0,
        min_stock: wanted.min_stock,
        max_stock: wanted.max_stock,
        last_price_cents: wanted.unit_cost_cents,
        is_active: true,
        created_at: now,
        updated_at: now,
    };
    product::insert(conn, &created).await?;

    info!(product_id = %created.id, name = %created.name, category = %created.category, "Created product");
    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::fixtures::{create_po, item};
    use crate::repository::test_support::memory_db;
    use crate::DbError;

    #[tokio::test]
    async fn test_creates_consumable_then_reuses_by_name() {
        let db = memory_db().await;
        let mut conn = db.pool().acquire().await.unwrap();

        let first = resolve(&mut conn, None, NewProduct::from_po_item("Docking Station", 15_000))
            .await
            .unwrap();
        assert_eq!(first.category, DEFAULT_CATEGORY);
        assert_eq!(first.current_stock, 0);
        assert_eq!(first.last_price_cents, 15_000);

        let again = resolve(&mut conn, None, NewProduct::from_po_item(" docking station ", 1))
            .await
            .unwrap();
        assert_eq!(again.id, first.id);
        assert!(category::exists(&mut conn, DEFAULT_CATEGORY).await.unwrap());
    }

    #[tokio::test]
    async fn test_reuses_product_across_non_ascii_case() {
        let db = memory_db().await;
        let mut conn = db.pool().acquire().await.unwrap();

        let first = resolve(&mut conn, None, NewProduct::from_po_item("Écran 27", 30_000))
            .await
            .unwrap();
        let again = resolve(&mut conn, None, NewProduct::from_po_item("écran 27", 30_000))
            .await
            .unwrap();
        assert_eq!(again.id, first.id);
        assert_eq!(again.name, "Écran 27");
    }

    #[tokio::test]
    async fn test_explicit_id_is_authoritative() {
        let db = memory_db().await;
        let mut conn = db.pool().acquire().await.unwrap();
        let monitor = resolve(&mut conn, None, NewProduct::from_po_item("Monitor", 0))
            .await
            .unwrap();

        let by_id = resolve(&mut conn, Some(&monitor.id), NewProduct::from_po_item("Other", 0))
            .await
            .unwrap();
        assert_eq!(by_id.id, monitor.id);

        let err = resolve(&mut conn, Some("missing"), NewProduct::from_po_item("Monitor", 0))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_resolve_line_persists_binding() {
        let db = memory_db().await;
        let po = create_po(&db, "PO-1", &[item("Headset", 2, 4_500)]).await;
        let mut conn = db.pool().acquire().await.unwrap();

        let product_id = resolve_line(&mut conn, &po.lines[0]).await.unwrap();
        let line = purchase_order::fetch_line(&mut conn, &po.lines[0].detail_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(line.product_id.as_deref(), Some(product_id.as_str()));
    }

    #[tokio::test]
    async fn test_custom_category_is_created() {
        let db = memory_db().await;
        let mut conn = db.pool().acquire().await.unwrap();
        let wanted = NewProduct {
            name: "Rack Server",
            category: "Server",
            min_stock: 1,
            max_stock: 4,
            unit_cost_cents: 900_000,
        };

        let created = resolve(&mut conn, None, wanted).await.unwrap();
        assert_eq!(created.category, "Server");
        assert_eq!(created.min_stock, 1);
        assert!(category::exists(&mut conn, "Server").await.unwrap());
    }
}

//! # Purchase Order Repository
//!
//! The purchase order store: headers and line items.
//!
//! ## Editing Window
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  create ──► Open / Pending ──── first invoice ────► Partial/Completed  │
//! │               │      ▲                                                  │
//! │        update │      │                     update  ✗ InvalidState       │
//! │        delete │      │                     delete  ✗ Conflict           │
//! │               ▼      │                                                  │
//! │        (lines replaced wholesale)                                       │
//! │                                                                         │
//! │  Once any invoice references the PO (even a cancelled one) the header  │
//! │  and lines are frozen.                                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Create, update and delete each run in one transaction. Line quantity
//! changes made by receiving and reversal go through the connection-level
//! functions at the bottom of this file.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::repository::{begin_write, commit, invoice, new_id, product};
use stockroom_core::validation::{validate_identifier, validate_purchase_order};
use stockroom_core::{
    CoreError, NewPoItem, PoDetail, PoStatus, PurchaseOrder, PurchaseOrderHeader,
    PurchaseOrderView,
};

const HEADER_COLUMNS: &str = r#"
    po_id, vendor_name, request_date, due_date, requested_by, section,
    budget_no, pr_no, remark, status, created_at, updated_at
"#;

const DETAIL_COLUMNS: &str = r#"
    detail_id, po_id, product_id, item_name, qty_ordered, qty_received,
    unit_cost_cents, line_no
"#;

/// Repository for purchase orders.
#[derive(Debug, Clone)]
pub struct PurchaseOrderRepository {
    pool: SqlitePool,
}

impl PurchaseOrderRepository {
    pub fn new(pool: SqlitePool) -> Self {
        PurchaseOrderRepository { pool }
    }

    /// Creates a purchase order with its lines.
    ///
    /// ## Returns
    /// * `Ok(PurchaseOrderView)` - The stored PO, status Open (or Pending if asked)
    /// * `Err(Domain(DuplicatePurchaseOrder))` - `po_id` already exists
    /// * `Err(Domain(NotFound))` - A line names a product that does not exist
    /// * `Err(Domain(Validation))` - Bad input; nothing was written
    pub async fn create(
        &self,
        header: &PurchaseOrderHeader,
        items: &[NewPoItem],
    ) -> DbResult<PurchaseOrderView> {
        validate_purchase_order(header, items)?;
        let po_id = header.po_id.trim();

        let mut tx = begin_write(&self.pool).await?;

        if fetch_header(&mut *tx, po_id).await?.is_some() {
            return Err(CoreError::DuplicatePurchaseOrder(po_id.to_string()).into());
        }

        let now = Utc::now();
        let order = PurchaseOrder {
            po_id: po_id.to_string(),
            vendor_name: header.vendor_name.trim().to_string(),
            request_date: header.request_date,
            due_date: header.due_date,
            requested_by: header.requested_by.clone(),
            section: header.section.clone(),
            budget_no: header.budget_no.clone(),
            pr_no: header.pr_no.clone(),
            remark: header.remark.clone(),
            status: header.status.unwrap_or_default(),
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO purchase_orders (
                po_id, vendor_name, request_date, due_date, requested_by, section,
                budget_no, pr_no, remark, status, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
        )
        .bind(&order.po_id)
        .bind(&order.vendor_name)
        .bind(order.request_date)
        .bind(order.due_date)
        .bind(&order.requested_by)
        .bind(&order.section)
        .bind(&order.budget_no)
        .bind(&order.pr_no)
        .bind(&order.remark)
        .bind(order.status)
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| match DbError::from(e) {
            err if err.is_unique_violation_on("purchase_orders.po_id") => {
                CoreError::DuplicatePurchaseOrder(order.po_id.clone()).into()
            }
            err => err,
        })?;

        let lines = insert_lines(&mut tx, &order.po_id, items).await?;

        commit(tx).await?;

        info!(po_id = %order.po_id, lines = lines.len(), "Purchase order created");
        Ok(PurchaseOrderView::new(order, lines))
    }

    /// Replaces the header fields and the full line set.
    ///
    /// `header.po_id` is ignored in favour of `po_id`; the identifier
    /// itself cannot be changed.
    ///
    /// ## Returns
    /// * `Err(Domain(NotFound))` - No such PO
    /// * `Err(Domain(InvalidState))` - Not Open/Pending, or invoices exist
    pub async fn update(
        &self,
        po_id: &str,
        header: &PurchaseOrderHeader,
        items: &[NewPoItem],
    ) -> DbResult<PurchaseOrderView> {
        let header = PurchaseOrderHeader {
            po_id: po_id.to_string(),
            ..header.clone()
        };
        validate_purchase_order(&header, items)?;
        let po_id = po_id.trim();

        let mut tx = begin_write(&self.pool).await?;

        let current = fetch_header(&mut *tx, po_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Purchase order", po_id))?;

        if !current.status.is_editable() {
            return Err(CoreError::InvalidState {
                po_id: po_id.to_string(),
                reason: format!("status is {}", current.status),
            }
            .into());
        }
        if invoice::count_for_po(&mut *tx, po_id).await? > 0 {
            return Err(CoreError::InvalidState {
                po_id: po_id.to_string(),
                reason: "invoices have been recorded against it".to_string(),
            }
            .into());
        }

        let now = Utc::now();
        let status = header.status.unwrap_or(current.status);
        sqlx::query(
            r#"
            UPDATE purchase_orders SET
                vendor_name = ?2, request_date = ?3, due_date = ?4,
                requested_by = ?5, section = ?6, budget_no = ?7, pr_no = ?8,
                remark = ?9, status = ?10, updated_at = ?11
            WHERE po_id = ?1
            "#,
        )
        .bind(po_id)
        .bind(header.vendor_name.trim())
        .bind(header.request_date)
        .bind(header.due_date)
        .bind(&header.requested_by)
        .bind(&header.section)
        .bind(&header.budget_no)
        .bind(&header.pr_no)
        .bind(&header.remark)
        .bind(status)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM po_details WHERE po_id = ?1")
            .bind(po_id)
            .execute(&mut *tx)
            .await?;
        let lines = insert_lines(&mut tx, po_id, items).await?;

        let order = fetch_header(&mut *tx, po_id)
            .await?
            .ok_or_else(|| DbError::not_found("Purchase order", po_id))?;

        commit(tx).await?;

        info!(po_id = %po_id, lines = lines.len(), "Purchase order updated");
        Ok(PurchaseOrderView::new(order, lines))
    }

    /// Deletes a purchase order and its lines.
    ///
    /// ## Returns
    /// * `Err(Domain(NotFound))` - No such PO
    /// * `Err(Domain(Conflict))` - Any invoice, active or cancelled, references it
    pub async fn delete(&self, po_id: &str) -> DbResult<()> {
        validate_identifier("PO_ID", po_id)?;

        let mut tx = begin_write(&self.pool).await?;

        if fetch_header(&mut *tx, po_id).await?.is_none() {
            return Err(CoreError::not_found("Purchase order", po_id).into());
        }

        let invoices = invoice::count_for_po(&mut *tx, po_id).await?;
        if invoices > 0 {
            return Err(CoreError::Conflict {
                po_id: po_id.to_string(),
                reason: format!("{} invoice(s) reference it", invoices),
            }
            .into());
        }

        sqlx::query("DELETE FROM po_details WHERE po_id = ?1")
            .bind(po_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM purchase_orders WHERE po_id = ?1")
            .bind(po_id)
            .execute(&mut *tx)
            .await?;

        commit(tx).await?;

        info!(po_id = %po_id, "Purchase order deleted");
        Ok(())
    }

    /// Cancels a purchase order so no further receipts can be booked.
    ///
    /// Rejected while any active invoice exists; cancel those first.
    pub async fn cancel(&self, po_id: &str) -> DbResult<PurchaseOrder> {
        validate_identifier("PO_ID", po_id)?;

        let mut tx = begin_write(&self.pool).await?;

        let current = fetch_header(&mut *tx, po_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Purchase order", po_id))?;

        if current.status == PoStatus::Cancelled {
            return Err(CoreError::InvalidState {
                po_id: po_id.to_string(),
                reason: "already cancelled".to_string(),
            }
            .into());
        }
        let active = invoice::count_active_for_po(&mut *tx, po_id).await?;
        if active > 0 {
            return Err(CoreError::InvalidState {
                po_id: po_id.to_string(),
                reason: format!("{} active invoice(s) must be cancelled first", active),
            }
            .into());
        }

        set_status(&mut *tx, po_id, PoStatus::Cancelled).await?;
        let order = fetch_header(&mut *tx, po_id)
            .await?
            .ok_or_else(|| DbError::not_found("Purchase order", po_id))?;

        commit(tx).await?;

        info!(po_id = %po_id, "Purchase order cancelled");
        Ok(order)
    }

    /// Gets a purchase order with its lines and totals.
    pub async fn get(&self, po_id: &str) -> DbResult<Option<PurchaseOrderView>> {
        let mut conn = self.pool.acquire().await?;
        let Some(header) = fetch_header(&mut conn, po_id).await? else {
            return Ok(None);
        };
        let lines = fetch_lines(&mut conn, po_id).await?;
        Ok(Some(PurchaseOrderView::new(header, lines)))
    }

    /// Lists purchase order headers, newest first, optionally by status.
    pub async fn list(&self, status: Option<PoStatus>) -> DbResult<Vec<PurchaseOrder>> {
        let orders = match status {
            Some(status) => {
                let sql = format!(
                    "SELECT {} FROM purchase_orders WHERE status = ?1 ORDER BY created_at DESC, po_id",
                    HEADER_COLUMNS
                );
                sqlx::query_as::<_, PurchaseOrder>(&sql)
                    .bind(status)
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                let sql = format!(
                    "SELECT {} FROM purchase_orders ORDER BY created_at DESC, po_id",
                    HEADER_COLUMNS
                );
                sqlx::query_as::<_, PurchaseOrder>(&sql)
                    .fetch_all(&self.pool)
                    .await?
            }
        };
        Ok(orders)
    }
}

/// Inserts lines in request order, numbering them from 1.
async fn insert_lines(
    conn: &mut SqliteConnection,
    po_id: &str,
    items: &[NewPoItem],
) -> DbResult<Vec<PoDetail>> {
    let mut lines = Vec::with_capacity(items.len());

    for (idx, item) in items.iter().enumerate() {
        let product_id = item
            .product_id
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());

        if let Some(pid) = product_id {
            if product::fetch_by_id(&mut *conn, pid).await?.is_none() {
                return Err(CoreError::not_found("Product", pid).into());
            }
        }

        let line = PoDetail {
            detail_id: new_id(),
            po_id: po_id.to_string(),
            product_id: product_id.map(str::to_string),
            item_name: item.item_name.trim().to_string(),
            qty_ordered: item.qty_ordered,
            qty_received: 0,
            unit_cost_cents: item.unit_cost_cents,
            line_no: idx as i64 + 1,
        };

        sqlx::query(
            r#"
            INSERT INTO po_details (
                detail_id, po_id, product_id, item_name, qty_ordered,
                qty_received, unit_cost_cents, line_no
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&line.detail_id)
        .bind(&line.po_id)
        .bind(&line.product_id)
        .bind(&line.item_name)
        .bind(line.qty_ordered)
        .bind(line.qty_received)
        .bind(line.unit_cost_cents)
        .bind(line.line_no)
        .execute(&mut *conn)
        .await?;

        lines.push(line);
    }

    debug!(po_id = %po_id, count = lines.len(), "Inserted purchase order lines");
    Ok(lines)
}

// =============================================================================
// Connection-level operations (usable inside a transaction)
// =============================================================================

pub async fn fetch_header(
    conn: &mut SqliteConnection,
    po_id: &str,
) -> DbResult<Option<PurchaseOrder>> {
    let sql = format!("SELECT {} FROM purchase_orders WHERE po_id = ?1", HEADER_COLUMNS);
    let order = sqlx::query_as::<_, PurchaseOrder>(&sql)
        .bind(po_id)
        .fetch_optional(conn)
        .await?;
    Ok(order)
}

/// Lines of a PO in display order.
pub async fn fetch_lines(conn: &mut SqliteConnection, po_id: &str) -> DbResult<Vec<PoDetail>> {
    let sql = format!(
        "SELECT {} FROM po_details WHERE po_id = ?1 ORDER BY line_no",
        DETAIL_COLUMNS
    );
    let lines = sqlx::query_as::<_, PoDetail>(&sql)
        .bind(po_id)
        .fetch_all(conn)
        .await?;
    Ok(lines)
}

pub async fn fetch_line(
    conn: &mut SqliteConnection,
    detail_id: &str,
) -> DbResult<Option<PoDetail>> {
    let sql = format!("SELECT {} FROM po_details WHERE detail_id = ?1", DETAIL_COLUMNS);
    let line = sqlx::query_as::<_, PoDetail>(&sql)
        .bind(detail_id)
        .fetch_optional(conn)
        .await?;
    Ok(line)
}

/// Persists the resolved product binding on a line.
pub async fn bind_product(
    conn: &mut SqliteConnection,
    detail_id: &str,
    product_id: &str,
) -> DbResult<()> {
    sqlx::query("UPDATE po_details SET product_id = ?2 WHERE detail_id = ?1")
        .bind(detail_id)
        .bind(product_id)
        .execute(conn)
        .await?;
    Ok(())
}

/// Adds to `qty_received` only if the result stays within `qty_ordered`.
///
/// ## Returns
/// * `Ok(true)` - Updated
/// * `Ok(false)` - Guard failed; the line is unchanged
pub async fn try_add_received(
    conn: &mut SqliteConnection,
    detail_id: &str,
    qty: i64,
) -> DbResult<bool> {
    let result = sqlx::query(
        r#"
        UPDATE po_details
        SET qty_received = qty_received + ?2
        WHERE detail_id = ?1 AND ?2 <= qty_ordered - qty_received
        "#,
    )
    .bind(detail_id)
    .bind(qty)
    .execute(conn)
    .await?;
    Ok(result.rows_affected() == 1)
}

/// Subtracts from `qty_received` only if the result stays non-negative.
pub async fn try_remove_received(
    conn: &mut SqliteConnection,
    detail_id: &str,
    qty: i64,
) -> DbResult<bool> {
    let result = sqlx::query(
        r#"
        UPDATE po_details
        SET qty_received = qty_received - ?2
        WHERE detail_id = ?1 AND qty_received >= ?2
        "#,
    )
    .bind(detail_id)
    .bind(qty)
    .execute(conn)
    .await?;
    Ok(result.rows_affected() == 1)
}

pub async fn set_status(conn: &mut SqliteConnection, po_id: &str, status: PoStatus) -> DbResult<()> {
    let result =
        sqlx::query("UPDATE purchase_orders SET status = ?2, updated_at = ?3 WHERE po_id = ?1")
            .bind(po_id)
            .bind(status)
            .bind(Utc::now())
            .execute(conn)
            .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found("Purchase order", po_id));
    }
    Ok(())
}

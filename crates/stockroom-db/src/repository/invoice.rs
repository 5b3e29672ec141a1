//! # Invoice Repository
//!
//! Invoices record one receiving event against one purchase order. The
//! invoice number is only unique per PO, so lookups by number may return
//! several rows.

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};

use crate::error::DbResult;
use stockroom_core::{Invoice, InvoiceStatus};

const INVOICE_COLUMNS: &str = r#"
    invoice_id, invoice_no, po_id, receive_date, received_by, status,
    cancelled_by, cancelled_at, created_at
"#;

/// Repository for invoice reads.
#[derive(Debug, Clone)]
pub struct InvoiceRepository {
    pool: SqlitePool,
}

impl InvoiceRepository {
    pub fn new(pool: SqlitePool) -> Self {
        InvoiceRepository { pool }
    }

    pub async fn get(&self, invoice_id: &str) -> DbResult<Option<Invoice>> {
        let mut conn = self.pool.acquire().await?;
        fetch_by_id(&mut conn, invoice_id).await
    }

    /// Invoices carrying this number, optionally restricted to one PO.
    pub async fn find_by_no(&self, invoice_no: &str, po_id: Option<&str>) -> DbResult<Vec<Invoice>> {
        let mut conn = self.pool.acquire().await?;
        find_by_no(&mut conn, invoice_no, po_id).await
    }

    /// All invoices of a PO in the order they were recorded.
    pub async fn list_for_po(&self, po_id: &str) -> DbResult<Vec<Invoice>> {
        let sql = format!(
            "SELECT {} FROM invoices WHERE po_id = ?1 ORDER BY created_at, invoice_no",
            INVOICE_COLUMNS
        );
        let invoices = sqlx::query_as::<_, Invoice>(&sql)
            .bind(po_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(invoices)
    }
}

// =============================================================================
// Connection-level operations (usable inside a transaction)
// =============================================================================

pub async fn fetch_by_id(conn: &mut SqliteConnection, invoice_id: &str) -> DbResult<Option<Invoice>> {
    let sql = format!("SELECT {} FROM invoices WHERE invoice_id = ?1", INVOICE_COLUMNS);
    let invoice = sqlx::query_as::<_, Invoice>(&sql)
        .bind(invoice_id)
        .fetch_optional(conn)
        .await?;
    Ok(invoice)
}

pub async fn find_by_no(
    conn: &mut SqliteConnection,
    invoice_no: &str,
    po_id: Option<&str>,
) -> DbResult<Vec<Invoice>> {
    let invoices = match po_id {
        Some(po_id) => {
            let sql = format!(
                "SELECT {} FROM invoices WHERE invoice_no = ?1 AND po_id = ?2",
                INVOICE_COLUMNS
            );
            sqlx::query_as::<_, Invoice>(&sql)
                .bind(invoice_no)
                .bind(po_id)
                .fetch_all(conn)
                .await?
        }
        None => {
            let sql = format!(
                "SELECT {} FROM invoices WHERE invoice_no = ?1 ORDER BY created_at",
                INVOICE_COLUMNS
            );
            sqlx::query_as::<_, Invoice>(&sql)
                .bind(invoice_no)
                .fetch_all(conn)
                .await?
        }
    };
    Ok(invoices)
}

/// Inserts an invoice row.
///
/// ## Returns
/// * `Err(DbError::UniqueViolation)` - `(po_id, invoice_no)` already recorded
pub async fn insert(conn: &mut SqliteConnection, invoice: &Invoice) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO invoices (
            invoice_id, invoice_no, po_id, receive_date, received_by, status,
            cancelled_by, cancelled_at, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        "#,
    )
    .bind(&invoice.invoice_id)
    .bind(&invoice.invoice_no)
    .bind(&invoice.po_id)
    .bind(invoice.receive_date)
    .bind(&invoice.received_by)
    .bind(invoice.status)
    .bind(&invoice.cancelled_by)
    .bind(invoice.cancelled_at)
    .bind(invoice.created_at)
    .execute(conn)
    .await?;
    Ok(())
}

/// Flips an active invoice to cancelled.
///
/// ## Returns
/// * `Ok(false)` - The invoice was not active; nothing changed
pub async fn mark_cancelled(
    conn: &mut SqliteConnection,
    invoice_id: &str,
    cancelled_by: &str,
    cancelled_at: DateTime<Utc>,
) -> DbResult<bool> {
    let result = sqlx::query(
        r#"
        UPDATE invoices
        SET status = ?2, cancelled_by = ?3, cancelled_at = ?4
        WHERE invoice_id = ?1 AND status = ?5
        "#,
    )
    .bind(invoice_id)
    .bind(InvoiceStatus::Cancelled)
    .bind(cancelled_by)
    .bind(cancelled_at)
    .bind(InvoiceStatus::Active)
    .execute(conn)
    .await?;
    Ok(result.rows_affected() == 1)
}

/// Invoices of any status that reference the PO.
pub async fn count_for_po(conn: &mut SqliteConnection, po_id: &str) -> DbResult<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM invoices WHERE po_id = ?1")
        .bind(po_id)
        .fetch_one(conn)
        .await?;
    Ok(count)
}

pub async fn count_active_for_po(conn: &mut SqliteConnection, po_id: &str) -> DbResult<i64> {
    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM invoices WHERE po_id = ?1 AND status = ?2")
            .bind(po_id)
            .bind(InvoiceStatus::Active)
            .fetch_one(conn)
            .await?;
    Ok(count)
}

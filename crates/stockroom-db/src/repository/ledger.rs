//! # Ledger Repository
//!
//! Append-only stock transaction log. Every change to a product's
//! `current_stock` has exactly one row here, written in the same
//! transaction, so the signed sum of a product's rows equals its stock.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};

use crate::error::DbResult;
use crate::repository::new_id;
use stockroom_core::{StockTransaction, TransactionType};

const LEDGER_COLUMNS: &str = r#"
    trans_id, product_id, trans_type, qty, ref_info, user_id, trans_date,
    invoice_id, detail_id
"#;

/// Repository for ledger reads.
#[derive(Debug, Clone)]
pub struct LedgerRepository {
    pool: SqlitePool,
}

impl LedgerRepository {
    pub fn new(pool: SqlitePool) -> Self {
        LedgerRepository { pool }
    }

    /// History of one product, oldest first.
    pub async fn for_product(&self, product_id: &str) -> DbResult<Vec<StockTransaction>> {
        let sql = format!(
            "SELECT {} FROM stock_transactions WHERE product_id = ?1 ORDER BY trans_date, rowid",
            LEDGER_COLUMNS
        );
        let rows = sqlx::query_as::<_, StockTransaction>(&sql)
            .bind(product_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Rows written by, or written to reverse, one invoice.
    pub async fn for_invoice(&self, invoice_id: &str) -> DbResult<Vec<StockTransaction>> {
        let sql = format!(
            "SELECT {} FROM stock_transactions WHERE invoice_id = ?1 ORDER BY trans_date, rowid",
            LEDGER_COLUMNS
        );
        let rows = sqlx::query_as::<_, StockTransaction>(&sql)
            .bind(invoice_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Signed sum of a product's ledger: IN adds, OUT subtracts.
    pub async fn balance(&self, product_id: &str) -> DbResult<i64> {
        let balance: i64 = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(CASE trans_type WHEN 'IN' THEN qty ELSE -qty END), 0)
            FROM stock_transactions WHERE product_id = ?1
            "#,
        )
        .bind(product_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(balance)
    }
}

/// Fields of a row to append; the id and timestamp are filled in.
#[derive(Debug, Clone)]
pub struct LedgerEntry<'a> {
    pub product_id: &'a str,
    pub trans_type: TransactionType,
    pub qty: i64,
    pub ref_info: &'a str,
    pub user_id: Option<&'a str>,
    pub invoice_id: Option<&'a str>,
    pub detail_id: Option<&'a str>,
}

// =============================================================================
// Connection-level operations (usable inside a transaction)
// =============================================================================

/// Appends one ledger row and returns it.
pub async fn append(
    conn: &mut SqliteConnection,
    entry: LedgerEntry<'_>,
) -> DbResult<StockTransaction> {
    let row = StockTransaction {
        trans_id: new_id(),
        product_id: entry.product_id.to_string(),
        trans_type: entry.trans_type,
        qty: entry.qty,
        ref_info: entry.ref_info.to_string(),
        user_id: entry.user_id.map(str::to_string),
        trans_date: Utc::now(),
        invoice_id: entry.invoice_id.map(str::to_string),
        detail_id: entry.detail_id.map(str::to_string),
    };

    sqlx::query(
        r#"
        INSERT INTO stock_transactions (
            trans_id, product_id, trans_type, qty, ref_info, user_id,
            trans_date, invoice_id, detail_id
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        "#,
    )
    .bind(&row.trans_id)
    .bind(&row.product_id)
    .bind(row.trans_type)
    .bind(row.qty)
    .bind(&row.ref_info)
    .bind(&row.user_id)
    .bind(row.trans_date)
    .bind(&row.invoice_id)
    .bind(&row.detail_id)
    .execute(conn)
    .await?;

    Ok(row)
}

/// The IN rows a receipt wrote for an invoice, in the order written.
pub async fn in_rows_for_invoice(
    conn: &mut SqliteConnection,
    invoice_id: &str,
) -> DbResult<Vec<StockTransaction>> {
    let sql = format!(
        "SELECT {} FROM stock_transactions WHERE invoice_id = ?1 AND trans_type = ?2 ORDER BY rowid",
        LEDGER_COLUMNS
    );
    let rows = sqlx::query_as::<_, StockTransaction>(&sql)
        .bind(invoice_id)
        .bind(TransactionType::In)
        .fetch_all(conn)
        .await?;
    Ok(rows)
}

//! # Reversal Engine
//!
//! Cancels a received invoice. The invoice row stays (status cancelled),
//! and each IN row it produced gets a matching OUT row, so the ledger is
//! never rewritten.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::error::{DbError, DbResult};
use crate::repository::ledger::{self, LedgerEntry};
use crate::repository::{begin_write, commit, invoice, product, purchase_order};
use stockroom_core::status::derive_for_lines;
use stockroom_core::validation::validate_cancel_invoice;
use stockroom_core::{
    cancellation_ref, CancelInvoiceRequest, CoreError, Invoice, LineMovement, Reversal,
    TransactionType, ValidationError,
};

/// Reverses invoices.
#[derive(Debug, Clone)]
pub struct ReversalEngine {
    pool: SqlitePool,
}

impl ReversalEngine {
    pub fn new(pool: SqlitePool) -> Self {
        ReversalEngine { pool }
    }

    /// Cancels an invoice and takes its quantities back out of stock and
    /// off the PO lines.
    ///
    /// ## Returns
    /// * `Ok(Reversal)` - The cancelled invoice, reversed lines, new PO status
    /// * `Err(Domain(NotFound))` - No invoice with that number
    /// * `Err(Domain(Validation(Ambiguous)))` - Number used on several POs and no `po_id` given
    /// * `Err(Domain(AlreadyCancelled))` - Already reversed
    /// * `Err(Domain(InsufficientStock))` - Goods were already withdrawn; nothing changes
    pub async fn cancel_invoice(&self, request: &CancelInvoiceRequest) -> DbResult<Reversal> {
        validate_cancel_invoice(request)?;
        let invoice_no = request.invoice_no.trim();
        let user_id = request.user_id.trim();
        let po_filter = request.po_id.as_deref().map(str::trim);

        let mut tx = begin_write(&self.pool).await?;

        let matches = invoice::find_by_no(&mut *tx, invoice_no, po_filter).await?;
        let target = select_invoice(matches, invoice_no)?;
        if !target.is_active() {
            return Err(CoreError::AlreadyCancelled(invoice_no.to_string()).into());
        }

        let cancelled_at = Utc::now();
        if !invoice::mark_cancelled(&mut *tx, &target.invoice_id, user_id, cancelled_at).await? {
            return Err(CoreError::AlreadyCancelled(invoice_no.to_string()).into());
        }

        let reference = cancellation_ref(invoice_no, &target.po_id);
        let received = ledger::in_rows_for_invoice(&mut *tx, &target.invoice_id).await?;
        let mut movements = Vec::with_capacity(received.len());

        for row in &received {
            if !product::try_remove_stock(&mut *tx, &row.product_id, row.qty).await? {
                let available = product::current_stock(&mut *tx, &row.product_id)
                    .await?
                    .unwrap_or(0);
                warn!(
                    invoice_no = %invoice_no,
                    product_id = %row.product_id,
                    available,
                    requested = row.qty,
                    "Cannot reverse invoice, stock already consumed"
                );
                return Err(CoreError::InsufficientStock {
                    product_id: row.product_id.clone(),
                    available,
                    requested: row.qty,
                }
                .into());
            }

            if let Some(detail_id) = &row.detail_id {
                if !purchase_order::try_remove_received(&mut *tx, detail_id, row.qty).await? {
                    return Err(CoreError::InvalidState {
                        po_id: target.po_id.clone(),
                        reason: format!("line {} has less received than the invoice booked", detail_id),
                    }
                    .into());
                }
            }

            ledger::append(
                &mut *tx,
                LedgerEntry {
                    product_id: &row.product_id,
                    trans_type: TransactionType::Out,
                    qty: row.qty,
                    ref_info: &reference,
                    user_id: Some(user_id),
                    invoice_id: Some(&target.invoice_id),
                    detail_id: row.detail_id.as_deref(),
                },
            )
            .await?;

            movements.push(LineMovement {
                detail_id: row.detail_id.clone().unwrap_or_default(),
                product_id: row.product_id.clone(),
                qty: row.qty,
            });
        }

        let lines = purchase_order::fetch_lines(&mut *tx, &target.po_id).await?;
        let status = derive_for_lines(&lines);
        purchase_order::set_status(&mut *tx, &target.po_id, status).await?;

        let cancelled = invoice::fetch_by_id(&mut *tx, &target.invoice_id)
            .await?
            .ok_or_else(|| DbError::not_found("Invoice", &target.invoice_id))?;

        commit(tx).await?;

        info!(
            po_id = %cancelled.po_id,
            invoice_no = %invoice_no,
            lines = movements.len(),
            status = %status,
            "Invoice cancelled"
        );

        Ok(Reversal {
            invoice: cancelled,
            lines: movements,
            status,
        })
    }
}

/// Picks the single invoice a cancel request refers to.
fn select_invoice(mut matches: Vec<Invoice>, invoice_no: &str) -> DbResult<Invoice> {
    match matches.len() {
        0 => Err(CoreError::not_found("Invoice", invoice_no).into()),
        1 => Ok(matches.remove(0)),
        _ => Err(ValidationError::Ambiguous {
            field: "InvoiceNo".to_string(),
            value: invoice_no.to_string(),
        }
        .into()),
    }
}

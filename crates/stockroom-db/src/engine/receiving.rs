//! # Receiving Engine
//!
//! Books a vendor delivery (one invoice) against a purchase order.
//!
//! The receipt plan is computed in memory from the lines read inside the
//! transaction, then every quantity is re-checked by a guarded UPDATE, so
//! two receipts racing on the same line cannot both pass `qty_ordered`.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};

use super::resolver;
use crate::error::{DbError, DbResult};
use crate::repository::ledger::{self, LedgerEntry};
use crate::repository::{begin_write, commit, invoice, new_id, product, purchase_order};
use stockroom_core::receiving::plan_receipt;
use stockroom_core::status::derive_for_lines;
use stockroom_core::validation::validate_receipt;
use stockroom_core::{
    receipt_ref, CoreError, Invoice, InvoiceStatus, LineMovement, PoStatus, Receipt,
    ReceiptRequest, TransactionType,
};

/// Receives goods into stock.
#[derive(Debug, Clone)]
pub struct ReceivingEngine {
    pool: SqlitePool,
}

impl ReceivingEngine {
    pub fn new(pool: SqlitePool) -> Self {
        ReceivingEngine { pool }
    }

    /// Records an invoice and books its items into stock.
    ///
    /// ## Arguments
    /// * `request` - PO, invoice number, receiving user and delivered items
    ///
    /// ## Returns
    /// * `Ok(Receipt)` - The new invoice, per-line quantities, new PO status
    /// * `Err(Domain(NotFound))` - Unknown PO, line, or product
    /// * `Err(Domain(InvalidState))` - The PO is cancelled
    /// * `Err(Domain(DuplicateInvoice))` - Invoice number already used on this PO
    /// * `Err(Domain(OverReceipt))` - A line would exceed its ordered quantity
    ///
    /// Nothing is written unless the whole delivery is accepted.
    ///
    /// ## Example
    /// ```rust,ignore
    /// let receipt = db.receiving().receive(&ReceiptRequest {
    ///     po_id: "PO-2024-001".into(),
    ///     invoice_no: "INV-7".into(),
    ///     user_id: "bob".into(),
    ///     receive_date: None,
    ///     items: vec![ReceiveItem { detail_id: Some(line_id), product_id: None, qty: 4 }],
    /// }).await?;
    /// assert_eq!(receipt.status, PoStatus::Partial);
    /// ```
    pub async fn receive(&self, request: &ReceiptRequest) -> DbResult<Receipt> {
        validate_receipt(request)?;
        let po_id = request.po_id.trim();
        let invoice_no = request.invoice_no.trim();
        let user_id = request.user_id.trim();

        let mut tx = begin_write(&self.pool).await?;

        let order = purchase_order::fetch_header(&mut *tx, po_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Purchase order", po_id))?;
        if order.status == PoStatus::Cancelled {
            return Err(CoreError::InvalidState {
                po_id: po_id.to_string(),
                reason: "purchase order is cancelled".to_string(),
            }
            .into());
        }

        let lines = purchase_order::fetch_lines(&mut *tx, po_id).await?;
        let plan = plan_receipt(&lines, &request.items)?;
        debug!(po_id = %po_id, planned = plan.len(), "Receipt planned");

        let duplicate = || CoreError::DuplicateInvoice {
            po_id: po_id.to_string(),
            invoice_no: invoice_no.to_string(),
        };
        if !invoice::find_by_no(&mut *tx, invoice_no, Some(po_id))
            .await?
            .is_empty()
        {
            return Err(duplicate().into());
        }

        let now = Utc::now();
        let recorded = Invoice {
            invoice_id: new_id(),
            invoice_no: invoice_no.to_string(),
            po_id: po_id.to_string(),
            receive_date: request.receive_date.unwrap_or_else(|| now.date_naive()),
            received_by: user_id.to_string(),
            status: InvoiceStatus::Active,
            cancelled_by: None,
            cancelled_at: None,
            created_at: now,
        };
        invoice::insert(&mut *tx, &recorded)
            .await
            .map_err(|e| match e {
                e if e.is_unique_violation_on("invoices.invoice_no") => duplicate().into(),
                e => e,
            })?;

        let reference = receipt_ref(invoice_no, po_id);
        let mut movements = Vec::with_capacity(plan.len());

        for planned in &plan {
            let line = lines
                .iter()
                .find(|l| l.detail_id == planned.detail_id)
                .ok_or_else(|| DbError::not_found("Purchase order line", &planned.detail_id))?;

            let product_id = resolver::resolve_line(&mut *tx, line).await?;

            if !purchase_order::try_add_received(&mut *tx, &line.detail_id, planned.qty).await? {
                let current = purchase_order::fetch_line(&mut *tx, &line.detail_id)
                    .await?
                    .unwrap_or_else(|| line.clone());
                return Err(CoreError::OverReceipt {
                    detail_id: line.detail_id.clone(),
                    ordered: current.qty_ordered,
                    received: current.qty_received,
                    requested: planned.qty,
                }
                .into());
            }

            product::add_stock(&mut *tx, &product_id, planned.qty, line.unit_cost_cents).await?;

            ledger::append(
                &mut *tx,
                LedgerEntry {
                    product_id: &product_id,
                    trans_type: TransactionType::In,
                    qty: planned.qty,
                    ref_info: &reference,
                    user_id: Some(user_id),
                    invoice_id: Some(&recorded.invoice_id),
                    detail_id: Some(&line.detail_id),
                },
            )
            .await?;

            movements.push(LineMovement {
                detail_id: line.detail_id.clone(),
                product_id,
                qty: planned.qty,
            });
        }

        let updated = purchase_order::fetch_lines(&mut *tx, po_id).await?;
        let status = derive_for_lines(&updated);
        purchase_order::set_status(&mut *tx, po_id, status).await?;

        commit(tx).await?;

        info!(
            po_id = %po_id,
            invoice_no = %invoice_no,
            lines = movements.len(),
            status = %status,
            "Invoice received"
        );

        Ok(Receipt {
            invoice: recorded,
            lines: movements,
            status,
        })
    }
}

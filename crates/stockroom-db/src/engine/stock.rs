//! # Stock Engine
//!
//! Stock movements that do not come from a purchase order: withdrawals to
//! the floor and manual imports of goods found or transferred in.

use sqlx::SqlitePool;
use tracing::info;

use super::resolver::{self, NewProduct};
use crate::error::DbResult;
use crate::repository::ledger::{self, LedgerEntry};
use crate::repository::{begin_write, commit, product};
use stockroom_core::validation::{validate_manual_import, validate_withdraw};
use stockroom_core::{
    CoreError, ManualImportRequest, TransactionType, WithdrawRequest, DEFAULT_CATEGORY,
    MANUAL_IMPORT_REF,
};

/// Ledger reference used when a withdrawal carries none.
pub const DEFAULT_WITHDRAW_REF: &str = "Withdraw";

/// Withdrawals and manual imports.
#[derive(Debug, Clone)]
pub struct StockEngine {
    pool: SqlitePool,
}

impl StockEngine {
    pub fn new(pool: SqlitePool) -> Self {
        StockEngine { pool }
    }

    /// Takes stock out of the stockroom.
    ///
    /// ## Returns
    /// * `Ok(current_stock)` - Stock left after the withdrawal
    /// * `Err(Domain(NotFound))` - Unknown or deactivated product
    /// * `Err(Domain(InsufficientStock))` - Less than `qty` on hand
    pub async fn withdraw(&self, request: &WithdrawRequest) -> DbResult<i64> {
        validate_withdraw(request)?;
        let product_id = request.product_id.trim();
        let ref_info = match request.ref_info.trim() {
            "" => DEFAULT_WITHDRAW_REF,
            r => r,
        };

        let mut tx = begin_write(&self.pool).await?;

        let item = product::fetch_by_id(&mut *tx, product_id)
            .await?
            .filter(|p| p.is_active)
            .ok_or_else(|| CoreError::not_found("Product", product_id))?;

        if !product::try_remove_stock(&mut *tx, product_id, request.qty).await? {
            return Err(CoreError::InsufficientStock {
                product_id: product_id.to_string(),
                available: item.current_stock,
                requested: request.qty,
            }
            .into());
        }

        ledger::append(
            &mut *tx,
            LedgerEntry {
                product_id,
                trans_type: TransactionType::Out,
                qty: request.qty,
                ref_info,
                user_id: Some(request.user_id.trim()),
                invoice_id: None,
                detail_id: None,
            },
        )
        .await?;

        let remaining = product::current_stock(&mut *tx, product_id)
            .await?
            .unwrap_or_default();

        commit(tx).await?;

        info!(product_id = %product_id, qty = request.qty, remaining, "Stock withdrawn");
        Ok(remaining)
    }

    /// Adds stock outside any purchase order, creating the product if needed.
    ///
    /// An existing active product with the same name (any case) is reused;
    /// its category and thresholds are left alone.
    ///
    /// ## Returns
    /// * `Ok(product_id)` - The product that received the stock
    pub async fn manual_import(&self, request: &ManualImportRequest) -> DbResult<String> {
        validate_manual_import(request)?;
        let category = request
            .category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(DEFAULT_CATEGORY);

        let mut tx = begin_write(&self.pool).await?;

        let item = resolver::resolve(
            &mut *tx,
            None,
            NewProduct {
                name: &request.product_name,
                category,
                min_stock: request.min_stock,
                max_stock: request.max_stock,
                unit_cost_cents: request.unit_cost_cents,
            },
        )
        .await?;

        product::add_stock(&mut *tx, &item.id, request.qty, request.unit_cost_cents).await?;

        ledger::append(
            &mut *tx,
            LedgerEntry {
                product_id: &item.id,
                trans_type: TransactionType::In,
                qty: request.qty,
                ref_info: MANUAL_IMPORT_REF,
                user_id: request.user_id.as_deref(),
                invoice_id: None,
                detail_id: None,
            },
        )
        .await?;

        commit(tx).await?;

        info!(product_id = %item.id, name = %item.name, qty = request.qty, "Manual import");
        Ok(item.id)
    }
}

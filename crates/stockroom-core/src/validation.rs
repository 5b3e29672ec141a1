//! # Validation Module
//!
//! Input validation for every write operation. Runs before a transaction is
//! opened, so a rejected request never touches the database.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP handler                                                 │
//! │  └── JSON shape (deserialization)                                      │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Required fields, lengths                                          │
//! │  └── Quantity and cost ranges                                          │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Engine + SQLite                                              │
//! │  ├── Guarded UPDATEs (qty_received <= qty_ordered, stock >= qty)       │
//! │  ├── UNIQUE (po_id), UNIQUE (po_id, invoice_no)                        │
//! │  └── CHECK constraints                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Field names in messages use the request spelling (`PO_ID`, `Qty`, ...)
//! since that is what callers see.

use crate::error::ValidationError;
use crate::types::{
    CancelInvoiceRequest, ManualImportRequest, NewPoItem, PoStatus, PurchaseOrderHeader,
    ReceiptRequest, WithdrawRequest,
};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest accepted identifier (PO_ID, InvoiceNo, UserID).
pub const MAX_ID_LEN: usize = 64;

/// Longest accepted free-text name.
pub const MAX_NAME_LEN: usize = 200;

/// Largest quantity on one order line, receipt item, withdrawal or import.
pub const MAX_QTY: i64 = 1_000_000_000;

/// Ceiling for on-hand stock and the min/max thresholds.
pub const MAX_STOCK: i64 = 1_000_000_000_000;

/// Largest accepted unit cost, in cents.
pub const MAX_UNIT_COST_CENTS: i64 = 100_000_000_000;

// =============================================================================
// Field Validators
// =============================================================================

/// Validates a required short identifier.
///
/// ## Example
/// ```rust
/// use stockroom_core::validation::validate_identifier;
///
/// assert!(validate_identifier("PO_ID", "PO-2024-001").is_ok());
/// assert!(validate_identifier("PO_ID", "   ").is_err());
/// ```
pub fn validate_identifier(field: &str, value: &str) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.len() > MAX_ID_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_ID_LEN,
        });
    }

    Ok(())
}

/// Validates a required display name (item, vendor, product).
pub fn validate_name(field: &str, value: &str) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.len() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NAME_LEN,
        });
    }

    Ok(())
}

/// Quantities on orders, receipts and withdrawals are in `1..=MAX_QTY`.
pub fn validate_quantity(field: &str, qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }

    if qty > MAX_QTY {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 1,
            max: MAX_QTY,
        });
    }

    Ok(())
}

/// Costs and stock thresholds may be zero but not negative or above `max`.
///
/// ## Example
/// ```rust
/// use stockroom_core::validation::{validate_non_negative, MAX_UNIT_COST_CENTS};
///
/// assert!(validate_non_negative("UnitCost", 0, MAX_UNIT_COST_CENTS).is_ok());
/// assert!(validate_non_negative("UnitCost", -1, MAX_UNIT_COST_CENTS).is_err());
/// ```
pub fn validate_non_negative(field: &str, value: i64, max: i64) -> ValidationResult<()> {
    if !(0..=max).contains(&value) {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max,
        });
    }

    Ok(())
}

// =============================================================================
// Request Validators
// =============================================================================

/// Validates a purchase order header and its lines for create or update.
pub fn validate_purchase_order(
    header: &PurchaseOrderHeader,
    items: &[NewPoItem],
) -> ValidationResult<()> {
    validate_identifier("PO_ID", &header.po_id)?;
    validate_name("VendorName", &header.vendor_name)?;

    if let Some(status) = header.status {
        if !status.is_editable() {
            return Err(ValidationError::InvalidFormat {
                field: "Status".to_string(),
                reason: format!(
                    "a new purchase order must be {} or {}",
                    PoStatus::Open,
                    PoStatus::Pending
                ),
            });
        }
    }

    if let (Some(request), Some(due)) = (header.request_date, header.due_date) {
        if due < request {
            return Err(ValidationError::InvalidFormat {
                field: "DueDate".to_string(),
                reason: "must not be before RequestDate".to_string(),
            });
        }
    }

    if items.is_empty() {
        return Err(ValidationError::Empty {
            field: "Items".to_string(),
        });
    }

    for item in items {
        validate_name("ItemName", &item.item_name)?;
        validate_quantity("QtyOrdered", item.qty_ordered)?;
        validate_non_negative("UnitCost", item.unit_cost_cents, MAX_UNIT_COST_CENTS)?;
    }

    Ok(())
}

/// Validates a delivery before the receiving transaction starts.
///
/// Items with `qty <= 0` are allowed (they are skipped), but at least one
/// item must carry a positive quantity.
pub fn validate_receipt(request: &ReceiptRequest) -> ValidationResult<()> {
    validate_identifier("PO_ID", &request.po_id)?;
    validate_identifier("InvoiceNo", &request.invoice_no)?;
    validate_identifier("UserID", &request.user_id)?;

    if request.items.is_empty() {
        return Err(ValidationError::Empty {
            field: "ItemsReceived".to_string(),
        });
    }

    for item in &request.items {
        if item.qty > 0 {
            validate_quantity("Qty", item.qty)?;
        }
        let has_ref = [&item.detail_id, &item.product_id]
            .iter()
            .any(|r| r.as_deref().is_some_and(|s| !s.trim().is_empty()));
        if !has_ref {
            return Err(ValidationError::Required {
                field: "DetailID or ProductID".to_string(),
            });
        }
    }

    if !request.items.iter().any(|i| i.qty > 0) {
        return Err(ValidationError::MustBePositive {
            field: "Qty".to_string(),
        });
    }

    Ok(())
}

pub fn validate_cancel_invoice(request: &CancelInvoiceRequest) -> ValidationResult<()> {
    validate_identifier("InvoiceNo", &request.invoice_no)?;
    validate_identifier("UserID", &request.user_id)?;
    if let Some(po_id) = &request.po_id {
        validate_identifier("PO_ID", po_id)?;
    }
    Ok(())
}

pub fn validate_withdraw(request: &WithdrawRequest) -> ValidationResult<()> {
    validate_identifier("ProductID", &request.product_id)?;
    validate_quantity("Qty", request.qty)?;
    validate_identifier("UserID", &request.user_id)?;
    Ok(())
}

pub fn validate_manual_import(request: &ManualImportRequest) -> ValidationResult<()> {
    validate_name("ProductName", &request.product_name)?;
    if let Some(category) = &request.category {
        if category.trim().len() > MAX_NAME_LEN {
            return Err(ValidationError::TooLong {
                field: "Category".to_string(),
                max: MAX_NAME_LEN,
            });
        }
    }
    validate_quantity("Qty", request.qty)?;
    validate_non_negative("UnitCost", request.unit_cost_cents, MAX_UNIT_COST_CENTS)?;
    validate_non_negative("MinStock", request.min_stock, MAX_STOCK)?;
    validate_non_negative("MaxStock", request.max_stock, MAX_STOCK)?;
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ReceiveItem;
    use chrono::NaiveDate;

    fn header(po_id: &str) -> PurchaseOrderHeader {
        PurchaseOrderHeader {
            po_id: po_id.to_string(),
            vendor_name: "Acme IT Supply".to_string(),
            ..Default::default()
        }
    }

    fn item(name: &str, qty: i64, cost: i64) -> NewPoItem {
        NewPoItem {
            item_name: name.to_string(),
            product_id: None,
            qty_ordered: qty,
            unit_cost_cents: cost,
        }
    }

    fn receipt(items: Vec<ReceiveItem>) -> ReceiptRequest {
        ReceiptRequest {
            po_id: "PO-1".to_string(),
            invoice_no: "INV-1".to_string(),
            user_id: "alice".to_string(),
            receive_date: None,
            items,
        }
    }

    #[test]
    fn test_validate_purchase_order() {
        assert!(validate_purchase_order(&header("PO-1"), &[item("Laptop", 10, 120_000)]).is_ok());
        assert!(validate_purchase_order(&header(""), &[item("Laptop", 10, 0)]).is_err());
        assert!(validate_purchase_order(&header("PO-1"), &[]).is_err());
        assert!(validate_purchase_order(&header("PO-1"), &[item("", 1, 0)]).is_err());
        assert!(validate_purchase_order(&header("PO-1"), &[item("Mouse", 0, 0)]).is_err());
        assert!(validate_purchase_order(&header("PO-1"), &[item("Mouse", 1, -5)]).is_err());
    }

    #[test]
    fn test_purchase_order_status_and_dates() {
        let mut h = header("PO-1");
        h.status = Some(PoStatus::Completed);
        assert!(validate_purchase_order(&h, &[item("Laptop", 1, 0)]).is_err());

        let mut h = header("PO-1");
        h.request_date = NaiveDate::from_ymd_opt(2024, 3, 10);
        h.due_date = NaiveDate::from_ymd_opt(2024, 3, 1);
        assert!(validate_purchase_order(&h, &[item("Laptop", 1, 0)]).is_err());
    }

    #[test]
    fn test_validate_receipt() {
        let ok = receipt(vec![ReceiveItem {
            detail_id: Some("d1".to_string()),
            product_id: None,
            qty: 4,
        }]);
        assert!(validate_receipt(&ok).is_ok());

        assert!(validate_receipt(&receipt(vec![])).is_err());

        let no_ref = receipt(vec![ReceiveItem {
            detail_id: None,
            product_id: None,
            qty: 4,
        }]);
        assert!(validate_receipt(&no_ref).is_err());

        let all_zero = receipt(vec![ReceiveItem {
            detail_id: Some("d1".to_string()),
            product_id: None,
            qty: 0,
        }]);
        assert!(matches!(
            validate_receipt(&all_zero),
            Err(ValidationError::MustBePositive { .. })
        ));
    }

    #[test]
    fn test_validate_withdraw_and_import() {
        let withdraw = WithdrawRequest {
            product_id: "p1".to_string(),
            qty: 0,
            user_id: "bob".to_string(),
            ref_info: "Desk 12".to_string(),
        };
        assert!(validate_withdraw(&withdraw).is_err());

        let import = ManualImportRequest {
            product_name: "HDMI Cable".to_string(),
            category: None,
            qty: 5,
            unit_cost_cents: 899,
            min_stock: 0,
            max_stock: 50,
            user_id: None,
        };
        assert!(validate_manual_import(&import).is_ok());
        assert!(validate_manual_import(&ManualImportRequest { min_stock: -1, ..import }).is_err());
    }

    #[test]
    fn test_quantities_are_capped() {
        assert!(validate_quantity("Qty", MAX_QTY).is_ok());
        assert!(matches!(
            validate_quantity("Qty", i64::MAX),
            Err(ValidationError::OutOfRange { max: MAX_QTY, .. })
        ));

        let receipt = receipt(vec![ReceiveItem {
            detail_id: Some("d1".to_string()),
            product_id: None,
            qty: i64::MAX,
        }]);
        assert!(matches!(
            validate_receipt(&receipt),
            Err(ValidationError::OutOfRange { .. })
        ));

        let import = ManualImportRequest {
            product_name: "Cable".to_string(),
            category: None,
            qty: i64::MAX,
            unit_cost_cents: 0,
            min_stock: 0,
            max_stock: 0,
            user_id: None,
        };
        assert!(validate_manual_import(&import).is_err());
        assert!(validate_manual_import(&ManualImportRequest {
            qty: 1,
            unit_cost_cents: MAX_UNIT_COST_CENTS + 1,
            ..import
        })
        .is_err());
    }
}

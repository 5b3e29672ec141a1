//! # Domain Types
//!
//! Core domain types used throughout Stockroom.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐ 1   * ┌─────────────────┐ *   0..1 ┌────────────┐ │
//! │  │  PurchaseOrder  │───────│    PoDetail     │──────────│  Product   │ │
//! │  │  ─────────────  │       │  ─────────────  │          │ ────────── │ │
//! │  │  po_id (caller) │       │  detail_id      │          │ id (UUID)  │ │
//! │  │  vendor_name    │       │  qty_ordered    │          │ name       │ │
//! │  │  status         │       │  qty_received   │          │ stock      │ │
//! │  └────────┬────────┘       └────────┬────────┘          └─────┬──────┘ │
//! │         1 │                         │ 0..1                    │ 1      │
//! │         * │                         │                         │        │
//! │  ┌────────┴────────┐ 1   * ┌────────┴─────────────────────────┴──────┐ │
//! │  │     Invoice     │───────│         StockTransaction (ledger)       │ │
//! │  │  invoice_no     │       │  IN / OUT, qty, ref_info, invoice_id    │ │
//! │  │  status         │       └──────────────────────────────────────────┘ │
//! │  └─────────────────┘                                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identity
//! - `PurchaseOrder.po_id` and `Invoice.invoice_no` are supplied by people.
//! - Everything else is keyed by a UUID v4 string generated on insert.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;

// =============================================================================
// Purchase Order Status
// =============================================================================

/// Lifecycle state of a purchase order.
///
/// ```text
///  Open ──receive──► Partial ──receive──► Completed
///   ▲                  │  ▲                  │
///   └────cancel inv────┘  └────cancel inv────┘
///
///  Open / Pending ──cancel PO──► Cancelled
/// ```
///
/// `Pending` is an editable pre-receiving state a PO can be saved in; the
/// status derivation never produces it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
pub enum PoStatus {
    Open,
    Pending,
    Partial,
    Completed,
    Cancelled,
}

impl PoStatus {
    /// Header and lines may only be replaced or deleted in these states.
    #[inline]
    pub fn is_editable(&self) -> bool {
        matches!(self, PoStatus::Open | PoStatus::Pending)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PoStatus::Open => "Open",
            PoStatus::Pending => "Pending",
            PoStatus::Partial => "Partial",
            PoStatus::Completed => "Completed",
            PoStatus::Cancelled => "Cancelled",
        }
    }
}

impl Default for PoStatus {
    fn default() -> Self {
        PoStatus::Open
    }
}

impl fmt::Display for PoStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Case-insensitive, so `?status=partial` works in list filters.
impl FromStr for PoStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "open" => Ok(PoStatus::Open),
            "pending" => Ok(PoStatus::Pending),
            "partial" => Ok(PoStatus::Partial),
            "completed" => Ok(PoStatus::Completed),
            "cancelled" => Ok(PoStatus::Cancelled),
            other => Err(ValidationError::InvalidFormat {
                field: "status".to_string(),
                reason: format!("unknown purchase order status '{}'", other),
            }),
        }
    }
}

// =============================================================================
// Invoice Status
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
pub enum InvoiceStatus {
    Active,
    Cancelled,
}

// =============================================================================
// Transaction Type
// =============================================================================

/// Direction of a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "UPPERCASE"))]
#[serde(rename_all = "UPPERCASE")]
#[ts(export)]
pub enum TransactionType {
    In,
    Out,
}

// =============================================================================
// Product
// =============================================================================

/// A stocked item.
///
/// `current_stock` only changes through ledger operations, each of which
/// appends a [`StockTransaction`] in the same database transaction.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name; the resolver matches on it case-insensitively.
    pub name: String,

    /// Category name from the category table.
    pub category: String,

    /// Units on hand, never negative.
    pub current_stock: i64,

    /// Reorder threshold. Zero disables low-stock reporting.
    pub min_stock: i64,

    pub max_stock: i64,

    /// Unit cost from the most recent receipt or import.
    pub last_price_cents: i64,

    /// Soft delete flag.
    pub is_active: bool,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    #[inline]
    pub fn last_price(&self) -> Money {
        Money::from_cents(self.last_price_cents)
    }

    /// Whether stock has fallen to the reorder threshold.
    pub fn is_low_stock(&self) -> bool {
        self.min_stock > 0 && self.current_stock <= self.min_stock
    }

    /// Key two product names must share to count as the same product:
    /// trimmed, with full Unicode lowercasing.
    ///
    /// ## Example
    /// ```rust
    /// use stockroom_core::Product;
    ///
    /// assert_eq!(Product::name_key("  Écran 27 "), Product::name_key("écran 27"));
    /// ```
    pub fn name_key(name: &str) -> String {
        name.trim().to_lowercase()
    }
}

// =============================================================================
// Purchase Order
// =============================================================================

/// Purchase order header.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct PurchaseOrder {
    /// Human-readable identifier chosen by the requester.
    pub po_id: String,
    pub vendor_name: String,
    #[ts(as = "Option<String>")]
    pub request_date: Option<NaiveDate>,
    #[ts(as = "Option<String>")]
    pub due_date: Option<NaiveDate>,
    pub requested_by: Option<String>,
    pub section: Option<String>,
    pub budget_no: Option<String>,
    pub pr_no: Option<String>,
    pub remark: Option<String>,
    pub status: PoStatus,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// A line item on a purchase order.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct PoDetail {
    pub detail_id: String,
    pub po_id: String,
    /// Bound product; `None` until the first receipt resolves it.
    pub product_id: Option<String>,
    pub item_name: String,
    pub qty_ordered: i64,
    /// Always within `0..=qty_ordered`.
    pub qty_received: i64,
    pub unit_cost_cents: i64,
    /// Display order within the PO.
    pub line_no: i64,
}

impl PoDetail {
    /// Quantity still outstanding.
    #[inline]
    pub fn remaining(&self) -> i64 {
        self.qty_ordered - self.qty_received
    }

    #[inline]
    pub fn is_fully_received(&self) -> bool {
        self.qty_received >= self.qty_ordered
    }

    /// `(ordered, received)` pair fed to status derivation.
    #[inline]
    pub fn quantities(&self) -> (i64, i64) {
        (self.qty_ordered, self.qty_received)
    }

    #[inline]
    pub fn unit_cost(&self) -> Money {
        Money::from_cents(self.unit_cost_cents)
    }

    /// Ordered value of the line.
    pub fn ordered_total(&self) -> Money {
        self.unit_cost().multiply_quantity(self.qty_ordered)
    }

    /// Received value of the line.
    pub fn received_total(&self) -> Money {
        self.unit_cost().multiply_quantity(self.qty_received)
    }
}

/// A purchase order with its lines and derived totals, for read endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PurchaseOrderView {
    #[serde(flatten)]
    pub header: PurchaseOrder,
    pub lines: Vec<PoDetail>,
    pub ordered_total: Money,
    pub received_total: Money,
}

impl PurchaseOrderView {
    pub fn new(header: PurchaseOrder, lines: Vec<PoDetail>) -> Self {
        let ordered_total = lines.iter().map(PoDetail::ordered_total).sum();
        let received_total = lines.iter().map(PoDetail::received_total).sum();
        PurchaseOrderView {
            header,
            lines,
            ordered_total,
            received_total,
        }
    }
}

// =============================================================================
// Invoice
// =============================================================================

/// A supplier delivery recorded against a purchase order.
///
/// Groups exactly the ledger rows it produced (via `invoice_id`).
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Invoice {
    pub invoice_id: String,
    /// Caller-supplied number, unique per purchase order.
    pub invoice_no: String,
    pub po_id: String,
    #[ts(as = "String")]
    pub receive_date: NaiveDate,
    pub received_by: String,
    pub status: InvoiceStatus,
    pub cancelled_by: Option<String>,
    #[ts(as = "Option<String>")]
    pub cancelled_at: Option<DateTime<Utc>>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Invoice {
    #[inline]
    pub fn is_active(&self) -> bool {
        self.status == InvoiceStatus::Active
    }
}

// =============================================================================
// Stock Transaction
// =============================================================================

/// Immutable ledger entry. The sole record of a stock quantity change.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct StockTransaction {
    pub trans_id: String,
    pub product_id: String,
    pub trans_type: TransactionType,
    /// Always positive; direction comes from `trans_type`.
    pub qty: i64,
    pub ref_info: String,
    pub user_id: Option<String>,
    #[ts(as = "String")]
    pub trans_date: DateTime<Utc>,
    /// Set for rows written by receiving or its reversal.
    pub invoice_id: Option<String>,
    pub detail_id: Option<String>,
}

impl StockTransaction {
    /// Quantity with sign applied: IN positive, OUT negative.
    #[inline]
    pub fn signed_qty(&self) -> i64 {
        match self.trans_type {
            TransactionType::In => self.qty,
            TransactionType::Out => -self.qty,
        }
    }
}

/// Ledger reference for stock received under an invoice.
pub fn receipt_ref(invoice_no: &str, po_id: &str) -> String {
    format!("Invoice: {} (PO: {})", invoice_no, po_id)
}

/// Ledger reference for the compensating rows of a cancelled invoice.
pub fn cancellation_ref(invoice_no: &str, po_id: &str) -> String {
    format!("Cancel Invoice: {} (PO: {})", invoice_no, po_id)
}

/// Signed sum of ledger rows; equals `Product.current_stock` when consistent.
pub fn ledger_balance<'a>(rows: impl IntoIterator<Item = &'a StockTransaction>) -> i64 {
    rows.into_iter().map(StockTransaction::signed_qty).sum()
}

// =============================================================================
// Operation Inputs
// =============================================================================

/// Header fields for creating or replacing a purchase order.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PurchaseOrderHeader {
    pub po_id: String,
    pub vendor_name: String,
    #[ts(as = "Option<String>")]
    pub request_date: Option<NaiveDate>,
    #[ts(as = "Option<String>")]
    pub due_date: Option<NaiveDate>,
    pub requested_by: Option<String>,
    pub section: Option<String>,
    pub budget_no: Option<String>,
    pub pr_no: Option<String>,
    pub remark: Option<String>,
    /// Initial status; only Open or Pending are accepted. Defaults to Open.
    pub status: Option<PoStatus>,
}

/// A line to place on a purchase order.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewPoItem {
    pub item_name: String,
    /// Optional catalog binding chosen up front.
    pub product_id: Option<String>,
    pub qty_ordered: i64,
    pub unit_cost_cents: i64,
}

/// One delivered item on an invoice.
///
/// Matched to a PO line by `detail_id`, or by `product_id` when the line
/// reference is absent.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ReceiveItem {
    pub detail_id: Option<String>,
    pub product_id: Option<String>,
    pub qty: i64,
}

/// A delivery to book against a purchase order.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ReceiptRequest {
    pub po_id: String,
    pub invoice_no: String,
    pub user_id: String,
    /// Defaults to today (UTC).
    #[ts(as = "Option<String>")]
    pub receive_date: Option<NaiveDate>,
    pub items: Vec<ReceiveItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CancelInvoiceRequest {
    pub invoice_no: String,
    pub user_id: String,
    /// Disambiguates when the same invoice number exists on several POs.
    pub po_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct WithdrawRequest {
    pub product_id: String,
    pub qty: i64,
    pub user_id: String,
    pub ref_info: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ManualImportRequest {
    pub product_name: String,
    /// Blank falls back to the default category.
    pub category: Option<String>,
    pub qty: i64,
    pub unit_cost_cents: i64,
    pub min_stock: i64,
    pub max_stock: i64,
    pub user_id: Option<String>,
}

// =============================================================================
// Operation Outcomes
// =============================================================================

/// Quantity booked onto a single line by a receipt or reversal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LineMovement {
    pub detail_id: String,
    pub product_id: String,
    pub qty: i64,
}

/// Result of a committed receipt.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Receipt {
    pub invoice: Invoice,
    pub lines: Vec<LineMovement>,
    pub status: PoStatus,
}

/// Result of a committed invoice cancellation.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Reversal {
    pub invoice: Invoice,
    pub lines: Vec<LineMovement>,
    pub status: PoStatus,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn detail(ordered: i64, received: i64, cost: i64) -> PoDetail {
        PoDetail {
            detail_id: "d-1".to_string(),
            po_id: "PO-1".to_string(),
            product_id: None,
            item_name: "Laptop".to_string(),
            qty_ordered: ordered,
            qty_received: received,
            unit_cost_cents: cost,
            line_no: 1,
        }
    }

    fn ledger_row(trans_type: TransactionType, qty: i64) -> StockTransaction {
        StockTransaction {
            trans_id: "t".to_string(),
            product_id: "p".to_string(),
            trans_type,
            qty,
            ref_info: String::new(),
            user_id: None,
            trans_date: Utc::now(),
            invoice_id: None,
            detail_id: None,
        }
    }

    #[test]
    fn test_status_parsing_is_case_insensitive() {
        assert_eq!("partial".parse::<PoStatus>().unwrap(), PoStatus::Partial);
        assert_eq!("Completed".parse::<PoStatus>().unwrap(), PoStatus::Completed);
        assert!("shipped".parse::<PoStatus>().is_err());
    }

    #[test]
    fn test_editable_states() {
        assert!(PoStatus::Open.is_editable());
        assert!(PoStatus::Pending.is_editable());
        assert!(!PoStatus::Partial.is_editable());
        assert!(!PoStatus::Completed.is_editable());
        assert!(!PoStatus::Cancelled.is_editable());
    }

    #[test]
    fn test_detail_totals() {
        let line = detail(10, 4, 1999);
        assert_eq!(line.remaining(), 6);
        assert!(!line.is_fully_received());
        assert_eq!(line.ordered_total().cents(), 19_990);
        assert_eq!(line.received_total().cents(), 7996);
    }

    #[test]
    fn test_view_totals() {
        let header = PurchaseOrder {
            po_id: "PO-1".to_string(),
            vendor_name: "Acme".to_string(),
            request_date: None,
            due_date: None,
            requested_by: None,
            section: None,
            budget_no: None,
            pr_no: None,
            remark: None,
            status: PoStatus::Partial,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let view = PurchaseOrderView::new(header, vec![detail(2, 1, 500), detail(3, 3, 100)]);
        assert_eq!(view.ordered_total.cents(), 1300);
        assert_eq!(view.received_total.cents(), 800);
    }

    #[test]
    fn test_ledger_balance() {
        let rows = vec![
            ledger_row(TransactionType::In, 10),
            ledger_row(TransactionType::Out, 4),
            ledger_row(TransactionType::In, 1),
        ];
        assert_eq!(ledger_balance(&rows), 7);
    }

    #[test]
    fn test_ref_info_format() {
        assert_eq!(receipt_ref("INV-1", "PO-1"), "Invoice: INV-1 (PO: PO-1)");
        assert_eq!(
            cancellation_ref("INV-1", "PO-1"),
            "Cancel Invoice: INV-1 (PO: PO-1)"
        );
    }

    #[test]
    fn test_low_stock() {
        let mut product = Product {
            id: "p".to_string(),
            name: "Toner".to_string(),
            category: "Consumable".to_string(),
            current_stock: 2,
            min_stock: 2,
            max_stock: 20,
            last_price_cents: 0,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert!(product.is_low_stock());
        product.min_stock = 0;
        assert!(!product.is_low_stock());
    }

    #[test]
    fn test_enum_wire_names() {
        assert_eq!(serde_json::to_value(PoStatus::Partial).unwrap(), "Partial");
        assert_eq!(serde_json::to_value(TransactionType::Out).unwrap(), "OUT");
        let parsed: PoStatus = serde_json::from_str("\"Pending\"").unwrap();
        assert_eq!(parsed, PoStatus::Pending);
    }
}

//! # Wire Types
//!
//! Request and response bodies. Field names follow the existing clients
//! (`PO_ID`, `VendorName`, `ItemsReceived`, ...) rather than Rust naming,
//! so every struct here renames explicitly. Money is integer cents.

use axum::extract::{FromRequest, FromRequestParts};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use stockroom_core::{
    CancelInvoiceRequest, Invoice, InvoiceStatus, ManualImportRequest, NewPoItem, PoDetail,
    PoStatus, Product, PurchaseOrder, PurchaseOrderHeader, PurchaseOrderView, ReceiptRequest,
    ReceiveItem, StockTransaction, TransactionType, WithdrawRequest,
};

use crate::error::ApiError;

// =============================================================================
// Extractors
// =============================================================================

/// `Json` whose rejections are answered as [`ApiError`].
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// `Query` whose rejections are answered as [`ApiError`].
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);

// =============================================================================
// Requests
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PurchaseOrderBody {
    #[serde(rename = "PO_ID", default)]
    pub po_id: String,
    pub vendor_name: String,
    #[serde(default)]
    pub request_date: Option<NaiveDate>,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub requested_by: Option<String>,
    #[serde(default)]
    pub section: Option<String>,
    #[serde(default)]
    pub budget_no: Option<String>,
    #[serde(rename = "PR_No", default)]
    pub pr_no: Option<String>,
    #[serde(default)]
    pub remark: Option<String>,
    #[serde(default)]
    pub status: Option<PoStatus>,
    #[serde(default)]
    pub items: Vec<PoItemBody>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PoItemBody {
    pub item_name: String,
    #[serde(rename = "ProductID", default)]
    pub product_id: Option<String>,
    pub qty_ordered: i64,
    #[serde(default)]
    pub unit_cost: i64,
}

impl PurchaseOrderBody {
    pub fn into_parts(self) -> (PurchaseOrderHeader, Vec<NewPoItem>) {
        let header = PurchaseOrderHeader {
            po_id: self.po_id,
            vendor_name: self.vendor_name,
            request_date: self.request_date,
            due_date: self.due_date,
            requested_by: self.requested_by,
            section: self.section,
            budget_no: self.budget_no,
            pr_no: self.pr_no,
            remark: self.remark,
            status: self.status,
        };
        let items = self
            .items
            .into_iter()
            .map(|i| NewPoItem {
                item_name: i.item_name,
                product_id: i.product_id,
                qty_ordered: i.qty_ordered,
                unit_cost_cents: i.unit_cost,
            })
            .collect();
        (header, items)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ReceiveBody {
    #[serde(rename = "PO_ID", default)]
    pub po_id: String,
    #[serde(default)]
    pub invoice_no: String,
    #[serde(default)]
    pub receive_date: Option<NaiveDate>,
    #[serde(default)]
    pub items_received: Vec<ReceiveItemBody>,
    #[serde(rename = "UserID", default)]
    pub user_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReceiveItemBody {
    #[serde(rename = "DetailID", default)]
    pub detail_id: Option<String>,
    #[serde(rename = "ProductID", default)]
    pub product_id: Option<String>,
    #[serde(rename = "Qty")]
    pub qty: i64,
}

impl From<ReceiveBody> for ReceiptRequest {
    fn from(body: ReceiveBody) -> Self {
        ReceiptRequest {
            po_id: body.po_id,
            invoice_no: body.invoice_no,
            user_id: body.user_id,
            receive_date: body.receive_date,
            items: body
                .items_received
                .into_iter()
                .map(|i| ReceiveItem {
                    detail_id: i.detail_id,
                    product_id: i.product_id,
                    qty: i.qty,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CancelInvoiceBody {
    #[serde(rename = "InvoiceNo", default)]
    pub invoice_no: String,
    #[serde(rename = "UserID", default)]
    pub user_id: String,
    #[serde(rename = "PO_ID", default)]
    pub po_id: Option<String>,
}

impl From<CancelInvoiceBody> for CancelInvoiceRequest {
    fn from(body: CancelInvoiceBody) -> Self {
        CancelInvoiceRequest {
            invoice_no: body.invoice_no,
            user_id: body.user_id,
            po_id: body.po_id.filter(|p| !p.trim().is_empty()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WithdrawBody {
    #[serde(rename = "ProductID", default)]
    pub product_id: String,
    #[serde(rename = "Qty")]
    pub qty: i64,
    #[serde(rename = "UserID", default)]
    pub user_id: String,
    #[serde(rename = "RefInfo", default)]
    pub ref_info: String,
}

impl From<WithdrawBody> for WithdrawRequest {
    fn from(body: WithdrawBody) -> Self {
        WithdrawRequest {
            product_id: body.product_id,
            qty: body.qty,
            user_id: body.user_id,
            ref_info: body.ref_info,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ManualImportBody {
    #[serde(default)]
    pub product_name: String,
    #[serde(default)]
    pub category: Option<String>,
    pub qty: i64,
    #[serde(default)]
    pub unit_cost: i64,
    #[serde(default)]
    pub min_stock: i64,
    #[serde(default)]
    pub max_stock: i64,
    #[serde(rename = "UserID", default)]
    pub user_id: Option<String>,
}

impl From<ManualImportBody> for ManualImportRequest {
    fn from(body: ManualImportBody) -> Self {
        ManualImportRequest {
            product_name: body.product_name,
            category: body.category,
            qty: body.qty,
            unit_cost_cents: body.unit_cost,
            min_stock: body.min_stock,
            max_stock: body.max_stock,
            user_id: body.user_id,
        }
    }
}

// =============================================================================
// Command Responses
// =============================================================================

#[derive(Debug, Serialize)]
pub struct Ack {
    pub success: bool,
}

impl Ack {
    pub fn ok() -> Self {
        Ack { success: true }
    }
}

#[derive(Debug, Serialize)]
pub struct PoSaved {
    pub success: bool,
    #[serde(rename = "PO_ID")]
    pub po_id: String,
}

#[derive(Debug, Serialize)]
pub struct Received {
    pub success: bool,
    #[serde(rename = "InvoiceID")]
    pub invoice_id: String,
    #[serde(rename = "Status")]
    pub status: PoStatus,
}

#[derive(Debug, Serialize)]
pub struct InvoiceCancelled {
    pub success: bool,
    #[serde(rename = "Status")]
    pub status: PoStatus,
}

#[derive(Debug, Serialize)]
pub struct Withdrawn {
    pub success: bool,
    #[serde(rename = "CurrentStock")]
    pub current_stock: i64,
}

#[derive(Debug, Serialize)]
pub struct Imported {
    pub success: bool,
    #[serde(rename = "ProductID")]
    pub product_id: String,
}

// =============================================================================
// Read Models
// =============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PurchaseOrderDto {
    #[serde(rename = "PO_ID")]
    pub po_id: String,
    pub vendor_name: String,
    pub request_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub requested_by: Option<String>,
    pub section: Option<String>,
    pub budget_no: Option<String>,
    #[serde(rename = "PR_No")]
    pub pr_no: Option<String>,
    pub remark: Option<String>,
    pub status: PoStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<PoLineDto>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ordered_total: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub received_total: Option<i64>,
}

impl From<PurchaseOrder> for PurchaseOrderDto {
    fn from(po: PurchaseOrder) -> Self {
        PurchaseOrderDto {
            po_id: po.po_id,
            vendor_name: po.vendor_name,
            request_date: po.request_date,
            due_date: po.due_date,
            requested_by: po.requested_by,
            section: po.section,
            budget_no: po.budget_no,
            pr_no: po.pr_no,
            remark: po.remark,
            status: po.status,
            created_at: po.created_at,
            updated_at: po.updated_at,
            items: None,
            ordered_total: None,
            received_total: None,
        }
    }
}

impl From<PurchaseOrderView> for PurchaseOrderDto {
    fn from(view: PurchaseOrderView) -> Self {
        let ordered = view.ordered_total.cents();
        let received = view.received_total.cents();
        PurchaseOrderDto {
            items: Some(view.lines.into_iter().map(PoLineDto::from).collect()),
            ordered_total: Some(ordered),
            received_total: Some(received),
            ..PurchaseOrderDto::from(view.header)
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PoLineDto {
    #[serde(rename = "DetailID")]
    pub detail_id: String,
    pub line_no: i64,
    pub item_name: String,
    #[serde(rename = "ProductID")]
    pub product_id: Option<String>,
    pub qty_ordered: i64,
    pub qty_received: i64,
    pub unit_cost: i64,
}

impl From<PoDetail> for PoLineDto {
    fn from(line: PoDetail) -> Self {
        PoLineDto {
            detail_id: line.detail_id,
            line_no: line.line_no,
            item_name: line.item_name,
            product_id: line.product_id,
            qty_ordered: line.qty_ordered,
            qty_received: line.qty_received,
            unit_cost: line.unit_cost_cents,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct InvoiceDto {
    #[serde(rename = "InvoiceID")]
    pub invoice_id: String,
    pub invoice_no: String,
    #[serde(rename = "PO_ID")]
    pub po_id: String,
    pub receive_date: NaiveDate,
    pub received_by: String,
    pub status: InvoiceStatus,
    pub cancelled_by: Option<String>,
    pub cancelled_at: Option<DateTime<Utc>>,
}

impl From<Invoice> for InvoiceDto {
    fn from(inv: Invoice) -> Self {
        InvoiceDto {
            invoice_id: inv.invoice_id,
            invoice_no: inv.invoice_no,
            po_id: inv.po_id,
            receive_date: inv.receive_date,
            received_by: inv.received_by,
            status: inv.status,
            cancelled_by: inv.cancelled_by,
            cancelled_at: inv.cancelled_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProductDto {
    #[serde(rename = "ProductID")]
    pub product_id: String,
    pub product_name: String,
    pub category: String,
    pub current_stock: i64,
    pub min_stock: i64,
    pub max_stock: i64,
    pub last_price: i64,
    pub is_active: bool,
    pub low_stock: bool,
}

impl From<Product> for ProductDto {
    fn from(p: Product) -> Self {
        let low_stock = p.is_low_stock();
        ProductDto {
            product_id: p.id,
            product_name: p.name,
            category: p.category,
            current_stock: p.current_stock,
            min_stock: p.min_stock,
            max_stock: p.max_stock,
            last_price: p.last_price_cents,
            is_active: p.is_active,
            low_stock,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct TransactionDto {
    #[serde(rename = "TransID")]
    pub trans_id: String,
    #[serde(rename = "ProductID")]
    pub product_id: String,
    pub trans_type: TransactionType,
    pub qty: i64,
    pub ref_info: String,
    #[serde(rename = "UserID")]
    pub user_id: Option<String>,
    pub trans_date: DateTime<Utc>,
    #[serde(rename = "InvoiceID")]
    pub invoice_id: Option<String>,
    #[serde(rename = "DetailID")]
    pub detail_id: Option<String>,
}

impl From<StockTransaction> for TransactionDto {
    fn from(t: StockTransaction) -> Self {
        TransactionDto {
            trans_id: t.trans_id,
            product_id: t.product_id,
            trans_type: t.trans_type,
            qty: t.qty,
            ref_info: t.ref_info,
            user_id: t.user_id,
            trans_date: t.trans_date,
            invoice_id: t.invoice_id,
            detail_id: t.detail_id,
        }
    }
}

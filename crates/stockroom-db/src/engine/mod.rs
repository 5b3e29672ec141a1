//! # Engine Module
//!
//! Multi-table operations. Each public engine method is one unit of work:
//! it validates, opens a transaction, runs guarded writes through the
//! repository functions, and commits. Any error before the commit drops the
//! transaction and SQLite rolls everything back.
//!
//! ## Receipt and Reversal
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  receive(PO-1, INV-7, [Laptop x4])                                      │
//! │       │                                                                 │
//! │       ├─► invoices            + INV-7 (active)                          │
//! │       ├─► resolver            bind "Laptop" to a product if unbound     │
//! │       ├─► products            current_stock += 4                        │
//! │       ├─► po_details          qty_received += 4  (≤ qty_ordered)        │
//! │       ├─► stock_transactions  IN 4  "Invoice: INV-7 (PO: PO-1)"         │
//! │       └─► purchase_orders     status = derive_status(lines)             │
//! │                                                                         │
//! │  cancel_invoice(INV-7)                                                  │
//! │       │                                                                 │
//! │       ├─► invoices            INV-7 → cancelled                         │
//! │       ├─► for each IN row of INV-7:                                     │
//! │       │     products            current_stock -= 4  (≥ 0)               │
//! │       │     po_details          qty_received  -= 4  (≥ 0)               │
//! │       │     stock_transactions  OUT 4 "Cancel Invoice: INV-7 (PO: PO-1)"│
//! │       └─► purchase_orders     status = derive_status(lines)             │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Engines
//!
//! - [`resolver`] - Binds PO lines and imports to catalog products
//! - [`receiving::ReceivingEngine`] - Books deliveries against a PO
//! - [`reversal::ReversalEngine`] - Cancels an invoice and undoes its effects
//! - [`stock::StockEngine`] - Withdrawals and manual imports

pub mod receiving;
pub mod resolver;
pub mod reversal;
pub mod stock;

//! # Repository Module
//!
//! Table-level database access for Stockroom.
//!
//! ## Two Ways In
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Handler / test                         Engine (inside a transaction)   │
//! │       │                                          │                      │
//! │       │ db.products().get_by_id(id)              │ product::fetch_by_id │
//! │       ▼                                          ▼   (&mut *tx, id)     │
//! │  ProductRepository                     free functions taking            │
//! │  (borrows a pooled connection)         &mut SqliteConnection            │
//! │       │                                          │                      │
//! │       └──────────────► same SQL ◄────────────────┘                      │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Repository structs never open a transaction of their own except
//! [`PurchaseOrderRepository`], whose create/update/delete are atomic
//! multi-row writes. Every write transaction starts with [`begin_write`].
//!
//! ## Available Repositories
//!
//! - [`ProductRepository`] - Product catalog reads and soft delete
//! - [`CategoryRepository`] - Category taxonomy
//! - [`PurchaseOrderRepository`] - PO headers and lines (the PO store)
//! - [`InvoiceRepository`] - Invoice lookups
//! - [`LedgerRepository`] - Stock transaction history

pub mod category;
pub mod invoice;
pub mod ledger;
pub mod product;
pub mod purchase_order;

pub use category::CategoryRepository;
pub use invoice::InvoiceRepository;
pub use ledger::LedgerRepository;
pub use product::ProductRepository;
pub use purchase_order::PurchaseOrderRepository;

use sqlx::{Sqlite, SqlitePool, Transaction};

use crate::error::{DbError, DbResult};

/// Opens a transaction holding SQLite's write lock from its first statement.
///
/// A deferred `BEGIN` that reads before writing cannot upgrade a stale WAL
/// snapshot and fails with `database is locked` without consulting the busy
/// timeout. `BEGIN IMMEDIATE` waits on the busy timeout instead, so writers
/// queue up behind each other.
pub(crate) async fn begin_write(pool: &SqlitePool) -> DbResult<Transaction<'static, Sqlite>> {
    pool.begin_with("BEGIN IMMEDIATE")
        .await
        .map_err(|e| DbError::TransactionFailed(e.to_string()))
}

pub(crate) async fn commit(tx: Transaction<'static, Sqlite>) -> DbResult<()> {
    tx.commit()
        .await
        .map_err(|e| DbError::TransactionFailed(e.to_string()))
}

/// Generates a new UUID v4 string identifier.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

//! # stockroom-db: Database Layer for Stockroom
//!
//! SQLite persistence plus the transactional engines that keep purchase
//! orders, invoices and stock consistent.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Stockroom Data Flow                              │
//! │                                                                         │
//! │  HTTP handler (POST /receive)                                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   stockroom-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────────┐   ┌───────────────────┐   ┌──────────────┐  │   │
//! │  │   │   engine     │   │   repository      │   │  migrations  │  │   │
//! │  │   │ receiving    │──►│ purchase_order    │   │  (embedded)  │  │   │
//! │  │   │ reversal     │   │ invoice, ledger   │   │              │  │   │
//! │  │   │ resolver     │   │ product, category │   │ 001_init.sql │  │   │
//! │  │   │ stock        │   └─────────┬─────────┘   └──────────────┘  │   │
//! │  │   └──────┬───────┘             │                                │   │
//! │  │          │  one sqlx::Transaction per operation                  │   │
//! │  │          ▼                     ▼                                │   │
//! │  │   ┌───────────────────────────────────────┐                    │   │
//! │  │   │      Database (pool.rs) SqlitePool     │                    │   │
//! │  │   └───────────────────────────────────────┘                    │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Table-level access (reads, and writes usable inside a transaction)
//! - [`engine`] - Multi-table operations: resolver, receiving, reversal, stock moves
//!
//! ## Usage
//!
//! ```rust,ignore
//! use stockroom_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("stockroom.db")).await?;
//!
//! db.purchase_orders().create(&header, &items).await?;
//! let receipt = db.receiving().receive(&request).await?;
//! db.reversal().cancel_invoice(&cancel).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod engine;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use engine::receiving::ReceivingEngine;
pub use engine::reversal::ReversalEngine;
pub use engine::stock::StockEngine;
pub use repository::category::CategoryRepository;
pub use repository::invoice::InvoiceRepository;
pub use repository::ledger::LedgerRepository;
pub use repository::product::ProductRepository;
pub use repository::purchase_order::PurchaseOrderRepository;

//! # stockroom-core: Pure Business Logic for Stockroom
//!
//! This crate is the **heart** of the purchase-order receiving engine. It
//! holds the domain types and every rule that can be decided without touching
//! storage.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Stockroom Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    HTTP API (apps/server)                       │   │
//! │  │   /purchase-orders ─ /receive ─ /invoice/cancel ─ /products     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             stockroom-db (repositories + engines)               │   │
//! │  │   resolver • receiving • reversal • stock                       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ calls pure rules                       │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              ★ stockroom-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │  status   │  │ receiving │  │ validation│  │   │
//! │  │   │    PO     │  │  derive   │  │   plan    │  │   rules   │  │   │
//! │  │   │  Invoice  │  │  status   │  │  receipt  │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, PurchaseOrder, PoDetail, Invoice, StockTransaction)
//! - [`status`] - Purchase order status derivation from line quantities
//! - [`receiving`] - Matching delivered items to PO lines
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation
//!
//! ## Example Usage
//!
//! ```rust
//! use stockroom_core::status::derive_status;
//! use stockroom_core::PoStatus;
//!
//! // (ordered, received) per line
//! assert_eq!(derive_status([(10, 0), (5, 0)]), PoStatus::Open);
//! assert_eq!(derive_status([(10, 4), (5, 0)]), PoStatus::Partial);
//! assert_eq!(derive_status([(10, 10), (5, 5)]), PoStatus::Completed);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod receiving;
pub mod status;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Category given to products the resolver creates on the fly.
///
/// Created in the category table on first use.
pub const DEFAULT_CATEGORY: &str = "Consumable";

/// Ledger reference written by manual stock imports.
pub const MANUAL_IMPORT_REF: &str = "Manual Import";

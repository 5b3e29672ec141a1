//! # Error Types
//!
//! Domain-specific error types for stockroom-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  stockroom-core errors (this file)                                     │
//! │  ├── CoreError        - Business rule rejections                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  stockroom-db errors (separate crate)                                  │
//! │  └── DbError          - Database failures, wraps CoreError             │
//! │                                                                         │
//! │  HTTP errors (apps/server)                                             │
//! │  └── ApiError         - Status code + JSON body                        │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → ApiError → Client       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every variant of [`CoreError`] maps to exactly one HTTP status in the
//! server crate, so new variants need a matching arm there.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Business rule rejections.
///
/// Raised before or inside a transaction; whichever layer sees one aborts
/// the unit of work without writing anything.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A purchase order with this ID already exists.
    #[error("Purchase order {0} already exists")]
    DuplicatePurchaseOrder(String),

    /// This invoice number was already used on the purchase order.
    #[error("Invoice {invoice_no} already exists for purchase order {po_id}")]
    DuplicateInvoice { po_id: String, invoice_no: String },

    /// The purchase order is not in a state that allows the operation.
    ///
    /// ## When This Occurs
    /// - Editing a PO that is Partial, Completed, or Cancelled
    /// - Editing a PO that any invoice references
    /// - Receiving into a Cancelled PO
    #[error("Purchase order {po_id} cannot be modified: {reason}")]
    InvalidState { po_id: String, reason: String },

    /// The purchase order is referenced by invoices and cannot be removed.
    #[error("Purchase order {po_id} cannot be deleted: {reason}")]
    Conflict { po_id: String, reason: String },

    /// A referenced entity does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Receiving would push a line past its ordered quantity.
    ///
    /// ## Example
    /// ```text
    /// Line ordered 10, received 8, invoice brings 5
    ///      │
    ///      ▼
    /// OverReceipt { ordered: 10, received: 8, requested: 5 }
    /// ```
    #[error(
        "Over-receipt on line {detail_id}: ordered {ordered}, received {received}, requested {requested}"
    )]
    OverReceipt {
        detail_id: String,
        ordered: i64,
        received: i64,
        requested: i64,
    },

    /// The invoice has already been cancelled.
    #[error("Invoice {0} is already cancelled")]
    AlreadyCancelled(String),

    /// Not enough stock on hand to withdraw or reverse.
    #[error("Insufficient stock for {product_id}: available {available}, requested {requested}")]
    InsufficientStock {
        product_id: String,
        available: i64,
        requested: i64,
    },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        CoreError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These are produced before any transaction is opened.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// A list must carry at least one entry.
    #[error("{field} must contain at least one item")]
    Empty { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid date).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// A lookup key matched more than one record.
    #[error("{field} '{value}' matches more than one record")]
    Ambiguous { field: String, value: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_over_receipt_message() {
        let err = CoreError::OverReceipt {
            detail_id: "d-1".to_string(),
            ordered: 10,
            received: 8,
            requested: 5,
        };
        assert_eq!(
            err.to_string(),
            "Over-receipt on line d-1: ordered 10, received 8, requested 5"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "PO_ID".to_string(),
        };
        assert_eq!(err.to_string(), "PO_ID is required");

        let err = ValidationError::Empty {
            field: "Items".to_string(),
        };
        assert_eq!(err.to_string(), "Items must contain at least one item");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::MustBePositive {
            field: "Qty".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}

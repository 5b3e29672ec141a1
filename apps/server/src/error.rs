//! # API Error Type
//!
//! Unified error type for HTTP handlers.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Stockroom                              │
//! │                                                                         │
//! │  Handler  ──►  Result<Json<T>, ApiError>                                │
//! │                        │                                                │
//! │   DbError::Domain(CoreError::OverReceipt{..}) ──► 400 OVER_RECEIPT      │
//! │   DbError::Domain(CoreError::NotFound{..})    ──► 404 NOT_FOUND         │
//! │   DbError::QueryFailed(..)  (logged)          ──► 500 DATABASE_ERROR    │
//! │                        │                                                │
//! │                        ▼                                                │
//! │   { "code": "OVER_RECEIPT", "message": "Over-receipt on line ..." }    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Business rejections carry their own message. Store failures are logged
//! with the real cause and answered with a generic message.

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use stockroom_core::{CoreError, ValidationError};
use stockroom_db::DbError;

pub type ApiResult<T> = Result<T, ApiError>;

/// API error returned from handlers.
///
/// ## Serialization
/// ```json
/// {
///   "code": "NOT_FOUND",
///   "message": "Purchase order not found: PO-404"
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Resource not found (404)
    NotFound,

    /// Input validation failed (400)
    ValidationError,

    /// PO ID already used (409)
    DuplicatePurchaseOrder,

    /// Invoice number already used on the PO (409)
    DuplicateInvoice,

    /// PO state does not allow the operation (400)
    InvalidState,

    /// PO is referenced by invoices (400)
    Conflict,

    /// Receipt exceeds ordered quantity (400)
    OverReceipt,

    /// Invoice was already cancelled (409)
    AlreadyCancelled,

    /// Not enough stock on hand (400)
    InsufficientStock,

    /// Database operation failed (500)
    DatabaseError,

    /// Internal server error (500)
    Internal,
}

impl ErrorCode {
    pub fn status(&self) -> StatusCode {
        match self {
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::ValidationError
            | ErrorCode::InvalidState
            | ErrorCode::Conflict
            | ErrorCode::OverReceipt
            | ErrorCode::InsufficientStock => StatusCode::BAD_REQUEST,
            ErrorCode::DuplicatePurchaseOrder
            | ErrorCode::DuplicateInvoice
            | ErrorCode::AlreadyCancelled => StatusCode::CONFLICT,
            ErrorCode::DatabaseError | ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.code.status(), Json(self)).into_response()
    }
}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Domain(core) => ApiError::from(core),
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::UniqueViolation { field, .. } => {
                tracing::error!("Unique constraint violation: {}", field);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::ForeignKeyViolation { message } => {
                tracing::error!("Foreign key violation: {}", message);
                ApiError::new(ErrorCode::DatabaseError, "Invalid reference")
            }
            DbError::ConnectionFailed(e) => {
                tracing::error!("Database connection failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database connection failed")
            }
            DbError::MigrationFailed(e) => {
                tracing::error!("Database migration failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database migration failed")
            }
            DbError::QueryFailed(e) => {
                tracing::error!("Database query failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::TransactionFailed(e) => {
                tracing::error!("Transaction failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database transaction failed")
            }
            DbError::PoolExhausted => {
                tracing::error!("Database pool exhausted");
                ApiError::new(ErrorCode::DatabaseError, "Database pool exhausted")
            }
            DbError::Internal(e) => {
                tracing::error!("Internal database error: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let code = match &err {
            CoreError::DuplicatePurchaseOrder(_) => ErrorCode::DuplicatePurchaseOrder,
            CoreError::DuplicateInvoice { .. } => ErrorCode::DuplicateInvoice,
            CoreError::InvalidState { .. } => ErrorCode::InvalidState,
            CoreError::Conflict { .. } => ErrorCode::Conflict,
            CoreError::NotFound { .. } => ErrorCode::NotFound,
            CoreError::OverReceipt { .. } => ErrorCode::OverReceipt,
            CoreError::AlreadyCancelled(_) => ErrorCode::AlreadyCancelled,
            CoreError::InsufficientStock { .. } => ErrorCode::InsufficientStock,
            CoreError::Validation(_) => ErrorCode::ValidationError,
        };
        ApiError::new(code, err.to_string())
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

/// Malformed or mistyped JSON bodies.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::validation(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::validation(rejection.body_text())
    }
}

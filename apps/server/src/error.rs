//! # Error Types
//!
//! Workflow errors and their HTTP rendering.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  ValidationError ─┐                                                     │
//! │  CoreError ───────┼──► ServiceError ──► ApiError ──► HTTP response     │
//! │  DbError ─────────┘                                                     │
//! │                                                                         │
//! │  ServiceError          HTTP   code                                      │
//! │  ────────────          ────   ────                                      │
//! │  Validation            400    VALIDATION_ERROR                          │
//! │  NotFound              404    NOT_FOUND                                 │
//! │  InsufficientStock     400    INSUFFICIENT_STOCK                        │
//! │  Persistence           500    PERSISTENCE_ERROR                         │
//! │  PartialFailure        500    PARTIAL_FAILURE                           │
//! │  Export                500    INTERNAL_ERROR                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Response body:
//! ```json
//! { "error": "Not enough stock for Cola. Available: 3, Required: 5", "code": "INSUFFICIENT_STOCK" }
//! ```

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use stockroom_core::{CoreError, ValidationError};
use stockroom_db::DbError;

// =============================================================================
// Service Error
// =============================================================================

/// Outcome of a failed workflow.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Bad input; nothing was written.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Missing entity or business rule violation; nothing was written.
    #[error(transparent)]
    Domain(#[from] CoreError),

    /// The store failed. Nothing was written unless the workflow says
    /// otherwise.
    #[error("Persistence failure: {0}")]
    Persistence(#[source] DbError),

    /// A destructive step succeeded and its compensating step failed.
    #[error("{message}")]
    PartialFailure {
        message: String,
        #[source]
        source: DbError,
    },
}

impl ServiceError {
    pub fn item_not_found(id: impl Into<String>) -> Self {
        ServiceError::Domain(CoreError::ItemNotFound(id.into()))
    }

    pub fn sale_not_found(id: impl Into<String>) -> Self {
        ServiceError::Domain(CoreError::SaleNotFound(id.into()))
    }

    pub fn insufficient_stock(item: impl Into<String>, available: i64, required: i64) -> Self {
        ServiceError::Domain(CoreError::InsufficientStock {
            item: item.into(),
            available,
            required,
        })
    }
}

/// Store errors that describe the domain become domain errors; the rest
/// are persistence failures.
impl From<DbError> for ServiceError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } if entity == "Sale" => ServiceError::sale_not_found(id),
            DbError::NotFound { entity, id } if entity == "Item" => ServiceError::item_not_found(id),
            DbError::InsufficientStock {
                item_id,
                available,
                requested,
            } => ServiceError::insufficient_stock(item_id, available, requested),
            other => ServiceError::Persistence(other),
        }
    }
}

/// Result type for service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;

// =============================================================================
// API Error
// =============================================================================

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Input validation failed (400)
    ValidationError,

    /// Resource not found (404)
    NotFound,

    /// Not enough stock on hand (400)
    InsufficientStock,

    /// Database operation failed (500)
    PersistenceError,

    /// Partially applied write, needs manual reconciliation (500)
    PartialFailure,

    /// Unexpected server-side failure (500)
    InternalError,

    /// Database unreachable (503)
    ServiceUnavailable,
}

impl ErrorCode {
    pub fn status(&self) -> StatusCode {
        match self {
            ErrorCode::ValidationError | ErrorCode::InsufficientStock => StatusCode::BAD_REQUEST,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::PersistenceError | ErrorCode::PartialFailure | ErrorCode::InternalError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

/// API error returned from HTTP handlers.
#[derive(Debug, Clone, Serialize)]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    #[serde(rename = "error")]
    pub message: String,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    pub fn status(&self) -> StatusCode {
        self.code.status()
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Validation(e) => ApiError::validation(e.to_string()),
            ServiceError::Domain(CoreError::Validation(e)) => ApiError::validation(e.to_string()),
            ServiceError::Domain(e @ (CoreError::ItemNotFound(_) | CoreError::SaleNotFound(_))) => {
                ApiError::new(ErrorCode::NotFound, e.to_string())
            }
            ServiceError::Domain(e @ CoreError::InsufficientStock { .. }) => {
                ApiError::new(ErrorCode::InsufficientStock, e.to_string())
            }
            ServiceError::Domain(e @ CoreError::Export(_)) => {
                tracing::error!(error = %e, "Report rendering failed");
                ApiError::new(ErrorCode::InternalError, e.to_string())
            }
            ServiceError::Persistence(e) => {
                // Log the actual error but return a generic message
                tracing::error!(error = %e, "Database operation failed");
                ApiError::new(ErrorCode::PersistenceError, "Database operation failed")
            }
            ServiceError::PartialFailure { message, .. } => {
                ApiError::new(ErrorCode::PartialFailure, message)
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(self)).into_response()
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        ApiError::from(self).into_response()
    }
}

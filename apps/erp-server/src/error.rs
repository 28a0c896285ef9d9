//! Error types for the ERP server.
//!
//! ## Status Mapping
//! ```text
//! CoreError::*NotFound, DbError::NotFound          → 404 NOT_FOUND
//! CoreError::CreditLimitExceeded                   → 400 CREDIT_LIMIT_EXCEEDED
//! CoreError::InsufficientStock                     → 400 INSUFFICIENT_STOCK
//! CoreError::InvalidOrderStatus                    → 400 INVALID_STATE
//! CoreError::Validation, DbError::InvalidInput     → 400 VALIDATION
//! DbError unique / foreign key / check             → 400 CONSTRAINT_VIOLATION
//! EtlError::ShuttingDown                           → 503 UNAVAILABLE
//! everything else                                  → 500 INTERNAL
//! ```
//! Bodies are always `{"code": ..., "message": ...}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::error;

use erp_analytics::AnalyticsError;
use erp_core::CoreError;
use erp_db::{DbError, EngineError};
use erp_etl::EtlError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

/// Server API errors.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),

    /// Business rule, state or input rejection.
    #[error("{message}")]
    BadRequest { code: &'static str, message: String },

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::BadRequest { code, .. } => *code,
            ApiError::Unavailable(_) => "UNAVAILABLE",
            ApiError::Internal(_) => "INTERNAL",
        }
    }

    fn bad_request(code: &'static str, message: impl ToString) -> Self {
        ApiError::BadRequest {
            code,
            message: message.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "Request failed");
        }
        let body = ErrorBody {
            code: self.code().to_string(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

// =============================================================================
// Conversions
// =============================================================================

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match &err {
            e if e.is_not_found() => ApiError::NotFound(err.to_string()),
            CoreError::CreditLimitExceeded { .. } => ApiError::bad_request("CREDIT_LIMIT_EXCEEDED", &err),
            CoreError::InsufficientStock { .. } => ApiError::bad_request("INSUFFICIENT_STOCK", &err),
            CoreError::InvalidOrderStatus { .. } => ApiError::bad_request("INVALID_STATE", &err),
            _ => ApiError::bad_request("VALIDATION", &err),
        }
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match &err {
            DbError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            DbError::InvalidInput(_) => ApiError::bad_request("VALIDATION", &err),
            DbError::UniqueViolation { .. }
            | DbError::ForeignKeyViolation { .. }
            | DbError::CheckViolation { .. } => ApiError::bad_request("CONSTRAINT_VIOLATION", &err),
            _ => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Core(e) => e.into(),
            EngineError::Db(e) => e.into(),
        }
    }
}

impl From<EtlError> for ApiError {
    fn from(err: EtlError) -> Self {
        match &err {
            EtlError::ShuttingDown => ApiError::Unavailable(err.to_string()),
            _ => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<AnalyticsError> for ApiError {
    fn from(err: AnalyticsError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

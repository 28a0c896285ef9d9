//! # Error Types
//!
//! Domain-specific error types for erp-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  erp-core errors (this file)                                           │
//! │  ├── CoreError        - Business rule violations / missing entities    │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  erp-db errors (separate crate)                                        │
//! │  ├── DbError          - Database operation failures                    │
//! │  └── EngineError      - CoreError | DbError from the order engine      │
//! │                                                                         │
//! │  erp-server errors                                                     │
//! │  └── ApiError         - What HTTP clients see (JSON + status)          │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → EngineError → ApiError → Client   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Audited Rejections
//! Two rejections must leave a trace in the audit log even though the
//! rejected action never commits: a blocked order (credit limit) and a failed
//! stock check. [`CoreError::audit_entry`] derives that trace from the error
//! value itself, so the engine writes exactly what the error says.

use thiserror::Error;

use crate::types::{AuditAction, NewAuditEntry};

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// Client cannot be found.
    #[error("Client not found: {0}")]
    ClientNotFound(String),

    /// Product cannot be found.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Order cannot be found.
    #[error("Order not found: {0}")]
    OrderNotFound(String),

    /// Client owes more than its credit limit allows.
    ///
    /// ## When This Occurs
    /// `current_debt > credit_limit` at order creation time. Equality is
    /// still allowed to order.
    #[error("Order blocked: credit limit exceeded for client {client_id} (debt {debt_cents}, limit {limit_cents})")]
    CreditLimitExceeded {
        client_id: String,
        debt_cents: i64,
        limit_cents: i64,
    },

    /// Insufficient stock to validate an order line.
    ///
    /// ## User Workflow
    /// ```text
    /// PUT /orders/{id}/validate
    ///      │
    ///      ▼
    /// Check pass: line wants 5, stock is 2
    ///      │
    ///      ▼
    /// InsufficientStock { sku: "EAN003", available: 2, requested: 5 }
    ///      │
    ///      ▼
    /// STOCK_ERROR audited, no stock touched, 400 to caller
    /// ```
    #[error("Insufficient stock for {sku} (order {order_id}): available {available}, requested {requested}")]
    InsufficientStock {
        order_id: String,
        sku: String,
        available: i64,
        requested: i64,
    },

    /// Order is not in a state that allows the requested operation.
    #[error("Order {order_id} is {current_status}, cannot perform operation")]
    InvalidOrderStatus {
        order_id: String,
        current_status: String,
    },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Returns the audit entry that must accompany this rejection, if any.
    ///
    /// ## Audited Variants
    /// - `CreditLimitExceeded` → `BLOCKED_ORDER`
    /// - `InsufficientStock`   → `STOCK_ERROR`
    ///
    /// Everything else (missing entities, bad input, wrong state) is returned
    /// to the caller without an audit trace.
    pub fn audit_entry(&self, actor_id: Option<&str>) -> Option<NewAuditEntry> {
        match self {
            CoreError::CreditLimitExceeded { client_id, .. } => Some(NewAuditEntry::new(
                AuditAction::BlockedOrder,
                format!("Client {} exceeded its credit limit.", client_id),
                actor_id,
            )),
            CoreError::InsufficientStock { order_id, sku, .. } => Some(NewAuditEntry::new(
                AuditAction::StockError,
                format!("Stock-out on product {} for order {}", sku, order_id),
                actor_id,
            )),
            _ => None,
        }
    }

    /// True for missing clients, products or orders.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            CoreError::ClientNotFound(_)
                | CoreError::ProductNotFound(_)
                | CoreError::OrderNotFound(_)
        )
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when request input doesn't meet requirements.
/// Used for early validation before any transaction is opened.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid UUID).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
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
    fn test_error_messages() {
        let err = CoreError::InsufficientStock {
            order_id: "o-1".to_string(),
            sku: "EAN003".to_string(),
            available: 2,
            requested: 5,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for EAN003 (order o-1): available 2, requested 5"
        );
    }

    #[test]
    fn test_credit_rejection_is_audited() {
        let err = CoreError::CreditLimitExceeded {
            client_id: "c-1".to_string(),
            debt_cents: 60_000,
            limit_cents: 50_000,
        };
        let entry = err.audit_entry(Some("u-1")).unwrap();
        assert_eq!(entry.action, AuditAction::BlockedOrder);
        assert_eq!(entry.user_id.as_deref(), Some("u-1"));
        assert!(entry.details.contains("c-1"));
    }

    #[test]
    fn test_stock_rejection_is_audited() {
        let err = CoreError::InsufficientStock {
            order_id: "o-9".to_string(),
            sku: "EAN003".to_string(),
            available: 2,
            requested: 5,
        };
        let entry = err.audit_entry(None).unwrap();
        assert_eq!(entry.action, AuditAction::StockError);
        assert!(entry.details.contains("EAN003"));
        assert!(entry.user_id.is_none());
    }

    #[test]
    fn test_not_found_is_not_audited() {
        let err = CoreError::ProductNotFound("p-1".to_string());
        assert!(err.audit_entry(Some("u-1")).is_none());
        assert!(err.is_not_found());
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "items".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}

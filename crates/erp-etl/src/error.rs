//! # ETL Error Types
//!
//! ## Error Categories
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        ETL Error Categories                             │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Configuration  │  │    Pipeline     │  │       Worker            │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  InvalidConfig  │  │  Extract        │  │  ShuttingDown           │ │
//! │  │  ConfigLoad     │  │  Load           │  │                         │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Pipeline errors never escape the worker: they are written to the status
//! board as `"Failed: <message>"` and the next run proceeds normally.

use thiserror::Error;

/// Result type alias for ETL operations.
pub type EtlResult<T> = Result<T, EtlError>;

#[derive(Debug, Error)]
pub enum EtlError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    #[error("Invalid ETL configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    // =========================================================================
    // Pipeline Errors
    // =========================================================================
    /// Reading validated order lines from the ERP store failed.
    #[error("Extract failed: {0}")]
    ExtractFailed(#[source] erp_db::DbError),

    /// Replacing the warehouse tables failed. The previous image is intact.
    #[error("Load failed: {0}")]
    LoadFailed(#[source] erp_db::DbError),

    // =========================================================================
    // Worker Errors
    // =========================================================================
    /// The worker has stopped and no longer accepts run requests.
    #[error("ETL worker is shutting down")]
    ShuttingDown,
}

impl From<std::io::Error> for EtlError {
    fn from(err: std::io::Error) -> Self {
        EtlError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for EtlError {
    fn from(err: toml::de::Error) -> Self {
        EtlError::ConfigLoadFailed(err.to_string())
    }
}

impl EtlError {
    /// Returns true if this error indicates a configuration problem.
    pub fn is_config_error(&self) -> bool {
        matches!(self, EtlError::InvalidConfig(_) | EtlError::ConfigLoadFailed(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_errors() {
        assert!(EtlError::InvalidConfig("interval".into()).is_config_error());
        assert!(!EtlError::ShuttingDown.is_config_error());
    }

    #[test]
    fn test_load_error_display() {
        let err = EtlError::LoadFailed(erp_db::DbError::QueryFailed("disk full".into()));
        assert!(err.to_string().starts_with("Load failed"));
        assert!(err.to_string().contains("disk full"));
    }
}

//! # Analytics Error Types
//!
//! Too little data is not an error: segmentation and forecasting answer
//! with a degraded report instead. What remains here are read failures and
//! numerical failures of the forecast fit.

use thiserror::Error;

pub type AnalyticsResult<T> = Result<T, AnalyticsError>;

#[derive(Debug, Error)]
pub enum AnalyticsError {
    /// Reading the warehouse failed.
    #[error("Warehouse read failed: {0}")]
    Database(#[from] erp_db::DbError),

    /// The series cannot be fitted (too short after differencing, or holds
    /// non-finite values).
    #[error("Degenerate series: {0}")]
    DegenerateSeries(String),

    /// The fit objective was non-finite for every candidate.
    #[error("Model fit failed: {0}")]
    FitFailed(String),
}
